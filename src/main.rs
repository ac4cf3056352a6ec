use std::path::PathBuf;
use std::process;

use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use map_generator::ascii::{self, AsciiMode};
use map_generator::generator::config::{Configuration, MonsterStrength, ResourceDensity};
use map_generator::map_export::{export_all_maps, MapExportConfig};
use map_generator::world::{MapFormat, ObjectCatalog};
use map_generator::{generate_map, GenerationError, GenerationReport, PrefabLibrary};

#[derive(Parser, Debug)]
#[command(name = "map_generator")]
#[command(about = "Generate random adventure maps split into guarded regions")]
struct Args {
    /// Side length of the square map in tiles
    #[arg(short = 'S', long, default_value = "72")]
    size: usize,

    /// Number of players (2-6)
    #[arg(short, long)]
    players: Option<u8>,

    /// Share of the map covered by water, in percent
    #[arg(short, long)]
    water: Option<i32>,

    /// Random seed (0 or unset picks one)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Resource density: scarce, normal or abundant
    #[arg(long)]
    density: Option<String>,

    /// Monster strength: weak, normal, strong or deadly
    #[arg(long)]
    monsters: Option<String>,

    /// Load settings from a JSON file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Directory with object_sets.json overrides
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print the map to stdout in this mode (terrain, regions, nodes)
    #[arg(long)]
    print: Option<String>,

    /// Export the map and statistics to a text file
    #[arg(long)]
    ascii: Option<String>,

    /// Include per-tile data in the text export
    #[arg(long)]
    verbose: bool,

    /// Export PNG views into this directory
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pixels per tile in PNG exports
    #[arg(long, default_value = "4")]
    png_scale: u32,

    /// Write the generated map as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the generation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Generate seeds 1..=N in parallel and print a summary instead of exporting
    #[arg(long)]
    sweep: Option<u32>,
}

fn build_config(args: &Args) -> Result<Configuration, String> {
    let mut config = match &args.config {
        Some(path) => Configuration::load_from(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Configuration::default(),
    };

    if let Some(players) = args.players {
        config.player_count = players;
    }
    if let Some(water) = args.water {
        config.water_percentage = water;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ref density) = args.density {
        config.resource_density =
            ResourceDensity::from_str(density).ok_or_else(|| format!("unknown resource density '{}'", density))?;
    }
    if let Some(ref monsters) = args.monsters {
        config.monster_strength =
            MonsterStrength::from_str(monsters).ok_or_else(|| format!("unknown monster strength '{}'", monsters))?;
    }

    Ok(config)
}

fn print_report(report: &GenerationReport) {
    println!("Seed: {}  region size limit: {}  growth rounds: {}", report.seed, report.size_limit, report.growth_rounds);
    for region in &report.regions {
        println!(
            "  region {:>2} {:?} {} on {}: {} tiles, {} neighbours, {} connections",
            region.id,
            region.region_type,
            region.owner.map_or("neutral", |c| c.name()),
            region.ground.name(),
            region.tiles,
            region.neighbours.len(),
            region.connections.len()
        );
    }
    let mines: Vec<String> = report.mines.iter().map(|(r, n)| format!("{} {}", r.name(), n)).collect();
    println!("Mines: {}", mines.join(", "));
    println!("All action locations are reachable from every castle");
}

fn run_sweep(config: &Configuration, size: usize, count: u32, catalog: &ObjectCatalog, prefabs: &PrefabLibrary) {
    println!("Sweeping seeds 1..={} on a {}x{} map...", count, size, size);

    let results: Vec<(u32, Result<GenerationReport, GenerationError>)> = (1..=count)
        .into_par_iter()
        .map(|seed| {
            let config = Configuration { seed, ..config.clone() };
            let mut map = MapFormat::new(size);
            let result = generate_map(&mut map, &config, size, catalog, prefabs);
            (seed, result)
        })
        .collect();

    let mut failed = 0;
    let mut unplayable = 0;
    for (seed, result) in &results {
        match result {
            Ok(_) => {}
            Err(e) => {
                failed += 1;
                if matches!(e, GenerationError::Unplayable { .. }) {
                    unplayable += 1;
                }
                println!("  seed {}: failed: {}", seed, e);
            }
        }
    }
    println!("{} maps, {} failed, {} of them unplayable", results.len(), failed, unplayable);
}

fn main() {
    // Generation warnings are shown by default; RUST_LOG=debug shows each phase.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            process::exit(2);
        }
    };

    if let Some(ref path) = args.save_config {
        match config.save_to(path) {
            Ok(()) => println!("Saved settings to {}", path.display()),
            Err(e) => eprintln!("Failed to save settings: {}", e),
        }
    }

    let catalog = ObjectCatalog::standard();
    let prefabs = match args.data_dir {
        Some(ref dir) => PrefabLibrary::load_from(dir),
        None => PrefabLibrary::defaults(),
    };

    if let Some(count) = args.sweep {
        run_sweep(&config, args.size, count, &catalog, &prefabs);
        return;
    }

    println!(
        "Generating {}x{} map for {} players with {}% water",
        args.size, args.size, config.player_count, config.water_percentage
    );

    let mut map = MapFormat::new(args.size);
    let report = match generate_map(&mut map, &config, args.size, &catalog, &prefabs) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            process::exit(1);
        }
    };

    println!("{}", map.name);
    println!("{}", map.description);
    print_report(&report);

    if let Some(ref mode) = args.print {
        match AsciiMode::from_str(mode) {
            Some(mode) => ascii::print_ascii_map(&map, mode),
            None => eprintln!("Unknown print mode '{}'", mode),
        }
    }

    if let Some(ref path) = args.ascii {
        match ascii::export_map_file(&map, &report, path, args.verbose) {
            Ok(()) => println!("Exported map file to {}", path),
            Err(e) => eprintln!("Failed to export map file: {}", e),
        }
    }

    if let Some(ref dir) = args.png {
        let export_config = MapExportConfig { pixels_per_tile: args.png_scale, ..MapExportConfig::default() };
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create {}: {}", dir.display(), e);
        } else if let Err(e) = export_all_maps(&map, dir, report.seed, &export_config) {
            eprintln!("Failed to export PNG maps: {}", e);
        }
    }

    if let Some(ref path) = args.output {
        let written = serde_json::to_string(&map)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("Saved map to {}", path.display()),
            Err(e) => eprintln!("Failed to save map: {}", e),
        }
    }

    if let Some(ref path) = args.report {
        let written = serde_json::to_string_pretty(&report)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("Saved report to {}", path.display()),
            Err(e) => eprintln!("Failed to save report: {}", e),
        }
    }
}
