//! Regions: seeding on concentric rings, competitive growth and border
//! classification.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use tracing::{debug, warn};

use super::config::{ground_tiles, Configuration};
use super::node::{Direction, NodeGrid, NodeType};
use super::random::{self, GeneratorRng};
use crate::world::ground::{NEUTRAL_TERRAIN, PLAYER_STARTING_TERRAIN};
use crate::world::{Ground, PlayerColor};

/// Id of the pseudo-region holding water and everything off the map.
pub const WATER_REGION: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RegionType {
    Neutral,
    Starting,
    Expansion,
}

#[derive(Clone, Debug)]
pub struct Region {
    pub id: u32,
    pub center_index: i32,
    pub owner: Option<PlayerColor>,
    pub ground: Ground,
    pub size_limit: usize,
    pub treasure_limit: i32,
    pub region_type: RegionType,
    pub is_inner: bool,
    /// Claimed tiles in growth order.
    pub nodes: Vec<i32>,
    last_processed: usize,
    pub neighbours: BTreeSet<u32>,
    /// Neighbour region id to the connector tile shared with it.
    pub connections: BTreeMap<u32, i32>,
    pub touches_water: bool,
}

impl Region {
    pub fn new(
        id: u32,
        center_index: i32,
        owner: Option<PlayerColor>,
        ground: Ground,
        size_limit: usize,
        region_type: RegionType,
        is_inner: bool,
    ) -> Self {
        Self {
            id,
            center_index,
            owner,
            ground,
            size_limit,
            treasure_limit: 0,
            region_type,
            is_inner,
            nodes: Vec::new(),
            last_processed: 0,
            neighbours: BTreeSet::new(),
            connections: BTreeMap::new(),
            touches_water: false,
        }
    }

    fn water() -> Self {
        Self::new(WATER_REGION, -1, None, Ground::Water, 0, RegionType::Neutral, false)
    }

    pub fn is_real(&self) -> bool {
        self.id != WATER_REGION
    }

    /// Claim the seed tile.
    pub fn seed(&mut self, grid: &mut NodeGrid) {
        grid.claim(self.center_index, self.id, NodeType::Open);
        self.nodes.push(self.center_index);
    }

    pub fn tile_count(&self) -> usize {
        self.nodes.len()
    }

    /// Spend part of the treasure budget. Negative amounts are ignored so the
    /// budget never grows back.
    pub fn debit(&mut self, value: i32) {
        self.treasure_limit -= value.max(0);
    }

    fn check_adjacent_tiles(&mut self, grid: &mut NodeGrid, current: i32, rng: &mut GeneratorRng, mode: GrowthMode) {
        for direction in Direction::ALL {
            if mode == GrowthMode::Limited && self.nodes.len() >= self.size_limit {
                grid.set_type(current, NodeType::Border);
                break;
            }
            if direction.is_diagonal() {
                if mode == GrowthMode::Saturate || random::coin_flip(rng) {
                    continue;
                }
            }
            let Some(next) = grid.neighbor(current, direction) else {
                continue;
            };

            let neighbour = *grid.node(next);
            if neighbour.region == WATER_REGION && neighbour.node_type == NodeType::Open {
                grid.claim(next, self.id, NodeType::Open);
                self.nodes.push(next);
            } else if neighbour.region != self.id {
                grid.set_type(current, NodeType::Border);
                self.neighbours.insert(neighbour.region);
            }
        }
    }

    /// One growth round over the frontier that existed when the round began.
    /// Returns whether there was any frontier left to process.
    fn expand(&mut self, grid: &mut NodeGrid, rng: &mut GeneratorRng, mode: GrowthMode) -> bool {
        let end = self.nodes.len();
        if self.last_processed >= end {
            return false;
        }

        while self.last_processed < end {
            let current = self.nodes[self.last_processed];
            self.check_adjacent_tiles(grid, current, rng, mode);
            self.last_processed += 1;
        }

        true
    }

    /// Open tiles bucketed into jittered distance rings around the center,
    /// each ring shuffled.
    pub fn open_tiles_by_distance(&self, grid: &NodeGrid, rng: &mut GeneratorRng) -> Vec<Vec<i32>> {
        let (cx, cy) = grid.coords(self.center_index);
        let mut rings: Vec<Vec<i32>> = Vec::new();

        for &index in &self.nodes {
            if grid.node(index).node_type != NodeType::Open {
                continue;
            }
            let (x, y) = grid.coords(index);
            let distance = f64::from((x - cx) * (x - cx) + (y - cy) * (y - cy)).sqrt();
            let ring = distance as usize + random::range(rng, 0, 2) as usize;
            if rings.len() <= ring {
                rings.resize(ring + 1, Vec::new());
            }
            rings[ring].push(index);
        }

        for ring in &mut rings {
            random::shuffle(rng, ring);
        }

        rings
    }

    /// Move the center so a castle footprint fits inside the map and return the
    /// castle anchor. The new center is the end of the road stub below the gate.
    pub fn adjust_to_fit_castle(&mut self, grid: &NodeGrid) -> i32 {
        let size = grid.size();
        let (x, y) = grid.coords(self.center_index);
        let x = x.clamp(4, size - 5);
        let y = y.clamp(4, size - 4);
        // Both coordinates are clamped inside the grid.
        let castle = y * size + x;
        self.center_index = (y + 2).min(size - 1) * size + x;
        castle
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GrowthMode {
    /// Stop at the size limit, skip diagonals on a coin flip.
    Limited,
    /// Fill every remaining tile orthogonally.
    Saturate,
}

/// Region counts and ring radii for the mirrored layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionLayout {
    pub expected: usize,
    pub inner: usize,
    pub outer: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl RegionLayout {
    pub fn plan(config: &Configuration, width: usize, height: usize, size_limit: i32) -> Self {
        let players = usize::from(config.player_count);
        let ground = ground_tiles(width, height, config.water_percentage).max(0) as usize;
        let expected = ground / size_limit.max(1) as usize;

        let neutral = expected.saturating_sub(players).max(1);
        let inner = neutral.min(players);
        let outer = neutral.min(inner * 2).max(players);

        let radius = ((inner + outer) as f64 * f64::from(size_limit) / PI).sqrt();
        let outer_radius = if inner + outer > expected {
            width.max(height) as f64 * 0.47
        } else {
            radius * 0.85
        };
        let inner_radius = if inner == 1 { 0.0 } else { outer_radius / 3.0 };

        Self { expected, inner, outer, inner_radius, outer_radius }
    }
}

/// Place one seed per region on the layout's two rings. Index 0 of the result
/// is the water pseudo-region; every other entry's index equals its id.
pub fn seed_regions(
    grid: &mut NodeGrid,
    config: &Configuration,
    layout: &RegionLayout,
    size_limit: usize,
    rng: &mut GeneratorRng,
) -> Vec<Region> {
    let size = grid.size();
    let players = usize::from(config.player_count);
    let mut regions = vec![Region::water()];

    let rings = [(layout.inner, layout.inner_radius, true), (layout.outer, layout.outer_radius, false)];
    for (count, radius, is_inner) in rings {
        if count == 0 {
            continue;
        }
        let start_angle = f64::from(random::range(rng, 0, 359));
        let step = 360.0 / count as f64;
        let factor = (count / players).max(1);

        for i in 0..count {
            let angle = (start_angle + step * i as f64).to_radians();
            let x = (f64::from(size) / 2.0 + angle.cos() * radius) as i32;
            let y = (f64::from(size) / 2.0 + angle.sin() * radius) as i32;
            let x = x.clamp(0, size - 1);
            let y = y.clamp(0, size - 1);

            let Some(center) = nearest_unclaimed(grid, x, y) else {
                warn!(x, y, "no unclaimed tile left for a region seed");
                continue;
            };

            let (region_type, owner) = if is_inner {
                (RegionType::Neutral, None)
            } else if i % factor == 0 && i / factor < players {
                (RegionType::Starting, PlayerColor::from_index(i / factor))
            } else if count % players == 0 {
                (RegionType::Expansion, None)
            } else {
                (RegionType::Neutral, None)
            };

            let terrain: &[Ground] = if region_type == RegionType::Starting {
                &PLAYER_STARTING_TERRAIN
            } else {
                &NEUTRAL_TERRAIN
            };
            let ground = random::pick(rng, terrain).copied().unwrap_or(Ground::Grass);

            let id = regions.len() as u32;
            let mut region = Region::new(id, center, owner, ground, size_limit, region_type, is_inner);
            region.seed(grid);
            debug!(id, ?region_type, ?ground, x, y, "seeded region");
            regions.push(region);
        }
    }

    regions
}

/// Closest tile to (x, y) that no region owns yet, searching square rings outward.
fn nearest_unclaimed(grid: &NodeGrid, x: i32, y: i32) -> Option<i32> {
    let size = grid.size();
    for radius in 0..size {
        let mut best: Option<(i32, i32)> = None;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let node = grid.node_at(x + dx, y + dy);
                if node.is_valid() && node.region == WATER_REGION {
                    let distance = dx * dx + dy * dy;
                    if best.map_or(true, |(d, _)| distance < d) {
                        best = Some((distance, node.index));
                    }
                }
            }
        }
        if let Some((_, index)) = best {
            return Some(index);
        }
    }
    None
}

/// Grow all regions in synchronous rounds until none can expand. With no water
/// requested, leftover land is then absorbed so every tile belongs to a region.
pub fn grow_regions(regions: &mut [Region], grid: &mut NodeGrid, water_percentage: i32, rng: &mut GeneratorRng) -> usize {
    let mut rounds = run_growth(regions, grid, rng, GrowthMode::Limited);

    if water_percentage == 0 {
        for region in regions.iter_mut().filter(|r| r.is_real()) {
            region.last_processed = 0;
        }
        rounds += run_growth(regions, grid, rng, GrowthMode::Saturate);
    }

    classify_borders(regions, grid);
    link_neighbours(regions);
    rounds
}

fn run_growth(regions: &mut [Region], grid: &mut NodeGrid, rng: &mut GeneratorRng, mode: GrowthMode) -> usize {
    let cap = grid.len() * 2 + 1;
    let mut rounds = 0;

    loop {
        let mut grew = false;
        for region in regions.iter_mut().filter(|r| r.is_real()) {
            grew |= region.expand(grid, rng, mode);
        }
        if !grew {
            break;
        }
        rounds += 1;
        if rounds >= cap {
            warn!(rounds, "region growth hit the round cap");
            break;
        }
    }

    rounds
}

/// Recompute node types from final ownership: tiles touching another region are
/// borders, tiles touching only water are coast, everything else is open.
/// Regions count as neighbours only when they share an edge.
fn classify_borders(regions: &mut [Region], grid: &mut NodeGrid) {
    for region in regions.iter_mut() {
        region.neighbours.clear();
        region.touches_water = false;
    }

    for index in 0..grid.len() as i32 {
        let region_id = grid.node(index).region;
        if region_id == WATER_REGION {
            continue;
        }

        let mut foreign_land = false;
        let mut water = false;
        for direction in Direction::ALL {
            let Some(next) = grid.neighbor(index, direction) else {
                continue;
            };
            let other = grid.node(next).region;
            if other == region_id {
                continue;
            }
            if other == WATER_REGION {
                water = true;
            } else {
                foreign_land = true;
                // Only edge contact can carry a connector pair.
                if !direction.is_diagonal() {
                    regions[region_id as usize].neighbours.insert(other);
                }
            }
        }

        let node_type = if foreign_land {
            NodeType::Border
        } else if water {
            NodeType::Coast
        } else {
            NodeType::Open
        };
        if water {
            regions[region_id as usize].touches_water = true;
        }
        grid.set_type(index, node_type);
    }
}

/// Make neighbour links symmetric. Returns how many links had to be added.
pub fn link_neighbours(regions: &mut [Region]) -> usize {
    let mut missing = Vec::new();
    for region in regions.iter() {
        for &other in &region.neighbours {
            if !regions[other as usize].neighbours.contains(&region.id) {
                missing.push((other, region.id));
            }
        }
    }

    for &(region, other) in &missing {
        warn!(region, other, "repaired one-sided neighbour link");
        regions[region as usize].neighbours.insert(other);
    }

    missing.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grown(size: usize, players: u8, water: i32, seed: u32) -> (NodeGrid, Vec<Region>) {
        let config = Configuration { player_count: players, water_percentage: water, ..Configuration::default() };
        let limit = super::super::config::calculate_region_size_limit(&config, size, size);
        let layout = RegionLayout::plan(&config, size, size, limit);
        let mut grid = NodeGrid::new(size);
        let mut rng = random::seeded(seed);
        let mut regions = seed_regions(&mut grid, &config, &layout, limit as usize, &mut rng);
        grow_regions(&mut regions, &mut grid, water, &mut rng);
        (grid, regions)
    }

    #[test]
    fn test_layout_small_map() {
        let config = Configuration::default();
        let layout = RegionLayout::plan(&config, 36, 36, 432);
        assert_eq!(layout.expected, 3);
        assert_eq!(layout.inner, 1);
        assert_eq!(layout.outer, 2);
        assert_eq!(layout.inner_radius, 0.0);
        assert!(layout.outer_radius > 0.0);
    }

    #[test]
    fn test_seeding_assigns_every_player() {
        let config = Configuration { player_count: 4, ..Configuration::default() };
        let layout = RegionLayout::plan(&config, 72, 72, 600);
        let mut grid = NodeGrid::new(72);
        let mut rng = random::seeded(3);
        let regions = seed_regions(&mut grid, &config, &layout, 600, &mut rng);

        assert_eq!(regions[0].id, WATER_REGION);
        for (i, region) in regions.iter().enumerate() {
            assert_eq!(region.id as usize, i);
        }
        let owners: BTreeSet<_> = regions.iter().filter_map(|r| r.owner).collect();
        assert_eq!(owners.len(), 4);
        let starting = regions.iter().filter(|r| r.region_type == RegionType::Starting).count();
        assert_eq!(starting, 4);
        for region in regions.iter().filter(|r| r.region_type == RegionType::Starting) {
            assert!(PLAYER_STARTING_TERRAIN.contains(&region.ground));
        }
    }

    #[test]
    fn test_seeds_never_collide() {
        let mut grid = NodeGrid::new(20);
        grid.claim(grid.index_of(10, 10).unwrap(), 1, NodeType::Open);
        let index = nearest_unclaimed(&grid, 10, 10).unwrap();
        let (x, y) = grid.coords(index);
        assert_ne!((x, y), (10, 10));
        assert!((x - 10).abs() <= 1 && (y - 10).abs() <= 1);
    }

    #[test]
    fn test_growth_covers_dry_map() {
        let (grid, regions) = grown(36, 2, 0, 42);
        assert!(grid.nodes().all(|n| n.region != WATER_REGION));

        let total: usize = regions.iter().map(|r| r.tile_count()).sum();
        assert_eq!(total, grid.len());
    }

    #[test]
    fn test_region_nodes_are_consistent() {
        let (grid, regions) = grown(48, 3, 20, 11);
        for region in regions.iter().filter(|r| r.is_real()) {
            let unique: BTreeSet<_> = region.nodes.iter().collect();
            assert_eq!(unique.len(), region.nodes.len());
            for &index in &region.nodes {
                assert_eq!(grid.node(index).region, region.id);
            }
        }
    }

    #[test]
    fn test_wet_map_respects_size_limit() {
        let (grid, regions) = grown(48, 3, 40, 5);
        for region in regions.iter().filter(|r| r.is_real()) {
            assert!(region.tile_count() <= region.size_limit);
        }
        assert!(grid.nodes().any(|n| n.region == WATER_REGION));
        assert!(regions.iter().any(|r| r.touches_water));
    }

    #[test]
    fn test_neighbours_are_symmetric_and_bordered() {
        let (grid, mut regions) = grown(48, 4, 0, 8);
        assert_eq!(link_neighbours(&mut regions), 0);
        for region in &regions {
            assert!(!region.neighbours.contains(&WATER_REGION));
            for &other in &region.neighbours {
                assert!(regions[other as usize].neighbours.contains(&region.id));
            }
        }
        for node in grid.nodes() {
            if node.node_type == NodeType::Border {
                let touches_other = Direction::ALL.iter().any(|&d| {
                    grid.neighbor(node.index, d)
                        .map_or(false, |n| grid.node(n).region != node.region)
                });
                assert!(touches_other);
            }
        }
    }

    #[test]
    fn test_corner_contact_is_not_a_neighbour() {
        // Two 2x2 regions meeting only at a corner, water elsewhere.
        let mut grid = NodeGrid::new(4);
        let mut regions = vec![Region::water()];
        for (id, origin) in [(1, (0, 0)), (2, (2, 2))] {
            let mut region = Region::new(id, -1, None, Ground::Grass, 4, RegionType::Neutral, false);
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let index = grid.index_of(origin.0 + dx, origin.1 + dy).unwrap();
                grid.claim(index, id, NodeType::Open);
                region.nodes.push(index);
            }
            regions.push(region);
        }

        classify_borders(&mut regions, &mut grid);
        assert!(regions[1].neighbours.is_empty());
        assert!(regions[2].neighbours.is_empty());
        assert_eq!(grid.node_at(1, 1).node_type, NodeType::Border);
        assert_eq!(grid.node_at(1, 0).node_type, NodeType::Coast);

        // Sharing an edge makes them neighbours.
        let index = grid.index_of(2, 1).unwrap();
        grid.claim(index, 2, NodeType::Open);
        regions[2].nodes.push(index);
        classify_borders(&mut regions, &mut grid);
        assert!(regions[1].neighbours.contains(&2));
        assert!(regions[2].neighbours.contains(&1));
    }

    #[test]
    fn test_growth_is_deterministic() {
        let (a, _) = grown(40, 2, 10, 99);
        let (b, _) = grown(40, 2, 10, 99);
        let ra: Vec<u32> = a.nodes().map(|n| n.region).collect();
        let rb: Vec<u32> = b.nodes().map(|n| n.region).collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_jittered_rings() {
        let (grid, regions) = grown(36, 2, 0, 42);
        let mut rng = random::seeded(1);
        let region = &regions[1];
        let rings = region.open_tiles_by_distance(&grid, &mut rng);
        let count: usize = rings.iter().map(Vec::len).sum();
        let open = region.nodes.iter().filter(|&&i| grid.node(i).node_type == NodeType::Open).count();
        assert_eq!(count, open);
    }

    #[test]
    fn test_debit_never_increases() {
        let mut region = Region::new(1, 0, None, Ground::Grass, 10, RegionType::Neutral, false);
        region.treasure_limit = 1000;
        region.debit(1500);
        assert_eq!(region.treasure_limit, -500);
        region.debit(-300);
        assert_eq!(region.treasure_limit, -500);
    }

    #[test]
    fn test_adjust_to_fit_castle() {
        let grid = NodeGrid::new(36);
        let mut region = Region::new(1, grid.index_of(35, 1).unwrap(), None, Ground::Grass, 10, RegionType::Starting, false);
        let castle = region.adjust_to_fit_castle(&grid);
        assert_eq!(grid.coords(castle), (31, 4));
        assert_eq!(grid.coords(region.center_index), (31, 6));
    }
}
