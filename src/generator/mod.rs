//! Random map generation.
//!
//! `generate_map` runs the whole pipeline on a scratch map: validate the
//! configuration, grow regions over the node grid, fill them with content,
//! route roads and streams, then check that every player can reach what was
//! placed. The caller's map is only replaced once everything succeeded.

pub mod config;
pub mod content;
pub mod economy;
pub mod node;
pub mod object_sets;
pub mod placement;
pub mod random;
pub mod region;
pub mod roads;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::world::{Ground, MapFormat, ObjectCatalog, ObjectIdAllocator, PlayerColor, Resource};
use config::{calculate_region_size_limit, ConfigError, Configuration, SMALLEST_STARTING_REGION};
use content::ContentPlanner;
use node::NodeGrid;
use object_sets::PrefabLibrary;
use placement::MapWriter;
use region::{grow_regions, seed_regions, RegionLayout, RegionType};

/// Why a map could not be generated. The target map is untouched in every case.
#[derive(Debug)]
pub enum GenerationError {
    Config(ConfigError),
    /// The map is too small or too wet for the requested player count.
    RegionTooSmall { limit: i32, minimum: i32 },
    /// No room for a player's castle in their starting region.
    StartingCastle { player: PlayerColor, tile: i32 },
    /// Two neighbouring regions share no crossable border.
    Disconnected { region: u32, other: u32 },
    /// Some castle, mine, dwelling or hub cannot be walked to from a starting
    /// castle. `start` and `target` name the first such pair.
    Unplayable { start: i32, target: i32, pairs: usize },
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Config(e) => write!(f, "Configuration error: {}", e),
            GenerationError::RegionTooSmall { limit, minimum } => {
                write!(f, "region size limit {} is below the minimum of {} tiles", limit, minimum)
            }
            GenerationError::StartingCastle { player, tile } => {
                write!(f, "no room for the {} castle near tile {}", player.name(), tile)
            }
            GenerationError::Disconnected { region, other } => {
                write!(f, "regions {} and {} touch but cannot be connected", region, other)
            }
            GenerationError::Unplayable { start, target, pairs } => {
                write!(f, "tile {} cannot be reached from the start at {} ({} unreachable pairs)", target, start, pairs)
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for GenerationError {
    fn from(e: ConfigError) -> Self {
        GenerationError::Config(e)
    }
}

/// Per-region outcome, for logs and JSON export.
#[derive(Clone, Debug, Serialize)]
pub struct RegionSummary {
    pub id: u32,
    pub region_type: RegionType,
    pub owner: Option<PlayerColor>,
    pub ground: Ground,
    pub tiles: usize,
    /// Road tile every route of the region grows from.
    pub hub: i32,
    pub neighbours: Vec<u32>,
    pub connections: Vec<u32>,
    pub treasure_left: i32,
}

/// What a successful run produced besides the map itself.
#[derive(Clone, Debug, Serialize)]
pub struct GenerationReport {
    pub seed: u32,
    pub size_limit: i32,
    pub growth_rounds: usize,
    pub regions: Vec<RegionSummary>,
    pub mines: BTreeMap<Resource, u32>,
}

impl GenerationReport {
    fn new(seed: u32, size_limit: i32, growth_rounds: usize, planner: &ContentPlanner) -> Self {
        let regions = planner
            .regions()
            .iter()
            .filter(|r| r.is_real())
            .map(|r| RegionSummary {
                id: r.id,
                region_type: r.region_type,
                owner: r.owner,
                ground: r.ground,
                tiles: r.tile_count(),
                hub: r.center_index,
                neighbours: r.neighbours.iter().copied().collect(),
                connections: r.connections.keys().copied().collect(),
                treasure_left: r.treasure_limit,
            })
            .collect();

        Self {
            seed,
            size_limit,
            growth_rounds,
            regions,
            mines: planner.economy().mines_count().clone(),
        }
    }
}

/// Generate a square map of `width` tiles into `map`.
///
/// On error `map` keeps whatever it held before the call.
pub fn generate_map(
    map: &mut MapFormat,
    config: &Configuration,
    width: usize,
    catalog: &ObjectCatalog,
    prefabs: &PrefabLibrary,
) -> Result<GenerationReport, GenerationError> {
    config.validate(width)?;

    let size_limit = calculate_region_size_limit(config, width, width);
    if size_limit < SMALLEST_STARTING_REGION {
        return Err(GenerationError::RegionTooSmall { limit: size_limit, minimum: SMALLEST_STARTING_REGION });
    }

    let seed = random::resolve_seed(config.seed);
    info!(
        seed,
        size_limit,
        players = config.player_count,
        water = config.water_percentage,
        "generating {}x{} map",
        width,
        width
    );

    let mut rng = random::seeded(seed);
    let mut grid = NodeGrid::new(width);
    let layout = RegionLayout::plan(config, width, width, size_limit);
    let mut regions = seed_regions(&mut grid, config, &layout, size_limit as usize, &mut rng);
    let growth_rounds = grow_regions(&mut regions, &mut grid, config.water_percentage, &mut rng);
    info!(regions = regions.len() - 1, growth_rounds, "grew regions");

    let mut scratch = MapFormat::new(width);
    let mut uids = ObjectIdAllocator::new();
    let writer = MapWriter::new(&mut scratch, catalog, &mut uids);
    let mut planner = ContentPlanner::new(grid, regions, writer, prefabs, config, size_limit, rng);

    planner.paint_terrain();
    planner.assign_budgets();
    planner.place_castles()?;
    planner.establish_hubs();
    planner.place_starting_mines();
    planner.discover_connectors()?;
    planner.place_border_obstacles();
    planner.place_secondary_mines();
    planner.place_object_sets();
    planner.place_decorations();
    planner.place_connector_guards();
    planner.place_loose_pickups();
    let unreachable = planner.finalize(seed);
    if let Some(&(start, target)) = unreachable.first() {
        return Err(GenerationError::Unplayable { start, target, pairs: unreachable.len() });
    }

    let report = GenerationReport::new(seed, size_limit, growth_rounds, &planner);
    drop(planner);
    *map = scratch;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = GenerationError::RegionTooSmall { limit: 36, minimum: 200 };
        assert!(e.to_string().contains("36"));
        let e = GenerationError::from(ConfigError::InvalidPlayerCount(9));
        assert!(e.to_string().contains("9"));
        assert!(std::error::Error::source(&e).is_some());
        let e = GenerationError::Unplayable { start: 10, target: 99, pairs: 3 };
        assert!(e.to_string().contains("99"));
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn test_invalid_config_leaves_map_alone() {
        let mut map = MapFormat::new(8);
        map.name = "untouched".to_string();
        let config = Configuration { player_count: 9, ..Configuration::default() };
        let result = generate_map(&mut map, &config, 36, &ObjectCatalog::standard(), &PrefabLibrary::defaults());
        assert!(matches!(result, Err(GenerationError::Config(_))));
        assert_eq!(map.name, "untouched");
    }
}
