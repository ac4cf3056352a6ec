use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use map_generator::generator::config::{Configuration, ResourceDensity};
use map_generator::generator::node::NodeType;
use map_generator::generator::region::RegionType;
use map_generator::world::catalog::mine_index;
use map_generator::world::{MapFormat, ObjectCatalog, ObjectGroup, Resource};
use map_generator::{generate_map, GenerationError, GenerationReport, PrefabLibrary};
use tracing_subscriber::EnvFilter;

fn generate(config: &Configuration, size: usize) -> (MapFormat, Result<GenerationReport, GenerationError>) {
    let mut map = MapFormat::new(size);
    let result = generate_map(&mut map, config, size, &ObjectCatalog::standard(), &PrefabLibrary::defaults());
    (map, result)
}

fn two_player_config() -> Configuration {
    Configuration { player_count: 2, water_percentage: 0, seed: 42, ..Configuration::default() }
}

#[test]
fn test_two_player_map_has_castles_and_starting_mines() {
    let (map, result) = generate(&two_player_config(), 36);
    let report = result.expect("36x36 two-player map should generate");

    let starting: Vec<_> = report.regions.iter().filter(|r| r.region_type == RegionType::Starting).collect();
    assert_eq!(starting.len(), 2);
    let owners: BTreeSet<_> = starting.iter().filter_map(|r| r.owner).collect();
    assert_eq!(owners.len(), 2);

    // One owned castle per starting region, each standing in its own region.
    let owned: Vec<_> = map.castles.values().filter(|c| c.owner.is_some()).collect();
    assert_eq!(owned.len(), 2);
    for region in &starting {
        let castles = owned
            .iter()
            .filter(|c| c.owner == region.owner && map.tile(c.tile).region() == region.id)
            .count();
        assert_eq!(castles, 1, "region {}", region.id);
    }

    // Wood and ore in every starting region.
    let mines: BTreeSet<(u32, i32)> = map
        .objects_in_group(ObjectGroup::AdventureMines)
        .map(|(tile, object)| (map.tile(tile).region(), object.index))
        .collect();
    for region in &starting {
        for resource in [Resource::Wood, Resource::Ore] {
            let index = mine_index(resource, region.ground).unwrap();
            assert!(mines.contains(&(region.id, index)), "region {} has no {:?} mine", region.id, resource);
        }
    }

    assert_eq!(map.name, "Random map 42");
    assert!(map.description.contains("36x36"));
    assert_eq!(map.players.available.len(), 2);
}

#[test]
fn test_generation_is_deterministic() {
    let (a, ra) = generate(&two_player_config(), 36);
    let (b, rb) = generate(&two_player_config(), 36);
    let (ra, rb) = (ra.unwrap(), rb.unwrap());

    assert_eq!(ra.regions.len(), rb.regions.len());
    for (x, y) in ra.regions.iter().zip(&rb.regions) {
        assert_eq!((x.hub, &x.connections), (y.hub, &y.connections));
    }
    assert_eq!(ra.mines, rb.mines);
    for (ta, tb) in a.tiles.values().iter().zip(b.tiles.values()) {
        assert_eq!(ta.ground, tb.ground);
        assert_eq!(ta.metadata, tb.metadata);
        assert_eq!(ta.road, tb.road);
        assert_eq!(ta.objects, tb.objects);
    }
}

#[test]
fn test_every_tile_belongs_to_a_region() {
    let (map, result) = generate(&two_player_config(), 36);
    let report = result.unwrap();
    let ids: BTreeSet<u32> = report.regions.iter().map(|r| r.id).collect();

    // Without water the regions cover the whole map.
    for tile in map.tiles.values() {
        assert!(ids.contains(&tile.region()), "tile in unknown region {}", tile.region());
        assert!(!tile.ground.is_water());
    }
    let total: usize = report.regions.iter().map(|r| r.tiles).sum();
    assert_eq!(total, map.tile_count());
}

#[test]
fn test_connections_are_symmetric_and_span_the_map() {
    let (_, result) = generate(&two_player_config(), 36);
    let report = result.unwrap();
    let by_id: BTreeMap<u32, _> = report.regions.iter().map(|r| (r.id, r)).collect();

    for region in &report.regions {
        for other in &region.connections {
            assert!(region.neighbours.contains(other));
            assert!(by_id[other].connections.contains(&region.id));
        }
    }

    // Every region can be reached through connectors from the first one.
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([report.regions[0].id]);
    while let Some(id) = queue.pop_front() {
        if seen.insert(id) {
            queue.extend(by_id[&id].connections.iter().copied());
        }
    }
    assert_eq!(seen.len(), report.regions.len());
}

#[test]
fn test_treasure_budget_not_exceeded_by_much() {
    let (_, result) = generate(&two_player_config(), 36);
    let report = result.unwrap();
    // Placement stops once a budget goes negative; a single group can overshoot
    // by at most its own worth.
    for region in &report.regions {
        assert!(region.treasure_left > -14_000, "region {} at {}", region.id, region.treasure_left);
    }
}

#[test]
fn test_tiny_map_fails_and_leaves_map_unchanged() {
    let config = Configuration { player_count: 6, water_percentage: 0, seed: 7, ..Configuration::default() };
    let mut map = MapFormat::new(16);
    map.name = "before".to_string();

    let result = generate_map(&mut map, &config, 16, &ObjectCatalog::standard(), &PrefabLibrary::defaults());
    assert!(matches!(result, Err(GenerationError::RegionTooSmall { .. })));
    assert_eq!(map.name, "before");
    assert!(map.castles.is_empty());
    assert!(map.tiles.values().iter().all(|t| t.objects.is_empty()));
}

#[test]
fn test_very_wet_map_either_generates_or_fails_cleanly() {
    let config = Configuration { player_count: 6, water_percentage: 90, seed: 3, ..Configuration::default() };
    let (map, result) = generate(&config, 72);
    match result {
        Ok(report) => {
            let starting = report.regions.iter().filter(|r| r.region_type == RegionType::Starting).count();
            assert_eq!(starting, 6);
        }
        Err(GenerationError::RegionTooSmall { limit, minimum }) => {
            assert!(limit < minimum);
            assert!(map.castles.is_empty());
        }
        Err(GenerationError::Disconnected { .. } | GenerationError::Unplayable { .. }) => {
            assert!(map.castles.is_empty());
            assert!(map.tiles.values().iter().all(|t| t.objects.is_empty()));
        }
        Err(e) => panic!("unexpected error: {}", e),
    }
}

/// Tiles a hero can stand on, read back from the baked node metadata.
fn walkable(map: &MapFormat, index: usize) -> bool {
    let tile = map.tiles.at(index);
    tile.region() != 0
        && !matches!(NodeType::from_code(tile.metadata % 100), Some(NodeType::Obstacle | NodeType::Action))
}

fn reachable_from(map: &MapFormat, start: usize) -> Vec<bool> {
    let size = map.size as i32;
    let mut reached = vec![false; map.tile_count()];
    let mut queue = VecDeque::from([start]);
    reached[start] = true;
    while let Some(index) = queue.pop_front() {
        let (x, y) = ((index as i32) % size, (index as i32) / size);
        for (dx, dy) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= size || ny >= size {
                continue;
            }
            let next = (ny * size + nx) as usize;
            if !reached[next] && walkable(map, next) {
                reached[next] = true;
                queue.push_back(next);
            }
        }
    }
    reached
}

fn touches(map: &MapFormat, reached: &[bool], tile: i32) -> bool {
    let size = map.size as i32;
    let (x, y) = (tile % size, tile / size);
    (-1..=1).any(|dy| {
        (-1..=1).any(|dx| {
            let (nx, ny) = (x + dx, y + dy);
            nx >= 0 && ny >= 0 && nx < size && ny < size && reached[(ny * size + nx) as usize]
        })
    })
}

#[test]
fn test_seed_sweep_maps_are_connected_and_playable() {
    let cases = [(36, 2, 0), (48, 3, 10), (72, 4, 20)];
    let mut ok = 0;
    let runs = 24;

    for seed in 1..=runs {
        let (size, players, water) = cases[seed as usize % cases.len()];
        let config = Configuration { player_count: players, water_percentage: water, seed, ..Configuration::default() };
        let mut map = MapFormat::new(size);
        map.name = "before".to_string();
        let result = generate_map(&mut map, &config, size, &ObjectCatalog::standard(), &PrefabLibrary::defaults());

        let report = match result {
            Ok(report) => report,
            Err(GenerationError::Config(e)) => panic!("seed {}: bad configuration {}", seed, e),
            Err(_) => {
                assert_eq!(map.name, "before", "seed {}", seed);
                assert!(map.castles.is_empty(), "seed {}", seed);
                continue;
            }
        };
        ok += 1;

        for region in &report.regions {
            for other in &region.neighbours {
                assert!(
                    region.connections.contains(other),
                    "size {} seed {}: regions {} and {} are not connected",
                    size,
                    seed,
                    region.id,
                    other
                );
            }
        }

        for start in report.regions.iter().filter(|r| r.region_type == RegionType::Starting) {
            let reached = reachable_from(&map, start.hub as usize);
            for region in &report.regions {
                assert!(reached[region.hub as usize], "seed {}: hub of {} cut off from {}", seed, region.id, start.id);
            }
            for castle in map.castles.values() {
                assert!(touches(&map, &reached, castle.tile), "seed {}: castle at {} cut off", seed, castle.tile);
            }
        }
    }

    assert!(ok * 2 >= runs, "only {} of {} maps generated", ok, runs);
}

#[test]
fn test_abundant_density_places_more_mines() {
    let scarce = Configuration { resource_density: ResourceDensity::Scarce, ..two_player_config() };
    let abundant = Configuration { resource_density: ResourceDensity::Abundant, ..two_player_config() };
    let (_, scarce) = generate(&scarce, 48);
    let (_, abundant) = generate(&abundant, 48);

    let total = |r: &GenerationReport| r.mines.values().sum::<u32>();
    assert!(total(&abundant.unwrap()) > total(&scarce.unwrap()));
}

#[test]
fn test_metadata_matches_report() {
    let (map, result) = generate(&two_player_config(), 36);
    let report = result.unwrap();
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for tile in map.tiles.values() {
        *counts.entry(tile.region()).or_insert(0) += 1;
        assert!(tile.metadata % 100 <= 6);
    }
    for region in &report.regions {
        assert_eq!(counts.get(&region.id).copied().unwrap_or(0), region.tiles);
    }
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_generation_logs_reach_the_subscriber() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let (_, result) = tracing::subscriber::with_default(subscriber, || generate(&two_player_config(), 36));
    assert!(result.is_ok());

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("generating 36x36 map"), "{}", output);
    assert!(output.contains("connected regions"), "{}", output);
}
