//! Debug script to output grown regions and node types as ASCII

use map_generator::ascii::{node_char, region_char};
use map_generator::generator::config::{calculate_region_size_limit, Configuration};
use map_generator::generator::node::{NodeGrid, NodeType};
use map_generator::generator::random;
use map_generator::generator::region::{grow_regions, seed_regions, RegionLayout, WATER_REGION};
use std::fs::File;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let size = 72;
    let config = Configuration { player_count: 4, water_percentage: 20, seed: 12345, ..Configuration::default() };

    let size_limit = calculate_region_size_limit(&config, size, size);
    let layout = RegionLayout::plan(&config, size, size, size_limit);
    let mut grid = NodeGrid::new(size);
    let mut rng = random::seeded(config.seed);
    let mut regions = seed_regions(&mut grid, &config, &layout, size_limit.max(0) as usize, &mut rng);
    let rounds = grow_regions(&mut regions, &mut grid, config.water_percentage, &mut rng);

    // Open output file
    let mut file = File::create("regions_debug.txt").unwrap();

    writeln!(file, "=== REGION DEBUG MAP ({}x{}) seed={} ===", size, size, config.seed).unwrap();
    writeln!(file, "Players: {}  Water: {}%", config.player_count, config.water_percentage).unwrap();
    writeln!(file, "Size limit: {}  Layout: {:?}  Growth rounds: {}", size_limit, layout, rounds).unwrap();
    writeln!(file).unwrap();

    writeln!(file, "LEGEND (Nodes):").unwrap();
    writeln!(file, "  . = Open   + = Border   , = Coast   ~ = Water").unwrap();
    writeln!(file).unwrap();

    writeln!(file, "=== REGIONS ===").unwrap();
    for y in 0..size as i32 {
        let row: String = (0..size as i32).map(|x| region_char(grid.node_at(x, y).region)).collect();
        writeln!(file, "{}", row).unwrap();
    }
    writeln!(file).unwrap();

    writeln!(file, "=== NODES ===").unwrap();
    for y in 0..size as i32 {
        let row: String = (0..size as i32)
            .map(|x| {
                let node = grid.node_at(x, y);
                if node.region == WATER_REGION {
                    '~'
                } else {
                    node_char(node.node_type)
                }
            })
            .collect();
        writeln!(file, "{}", row).unwrap();
    }
    writeln!(file).unwrap();

    writeln!(file, "=== STATISTICS ===").unwrap();
    for region in &regions {
        let border = region
            .nodes
            .iter()
            .filter(|&&i| grid.node(i).node_type == NodeType::Border)
            .count();
        writeln!(
            file,
            "  {:>2} {:?} {:10} tiles {:>5} border {:>4} neighbours {:?} water {}",
            region.id,
            region.region_type,
            region.ground.name(),
            region.tile_count(),
            border,
            region.neighbours,
            region.touches_water
        )
        .unwrap();
    }

    println!("Wrote regions_debug.txt ({} regions, {} growth rounds)", regions.len() - 1, rounds);
}
