//! Object placement on the node grid.
//!
//! Every function here is an attempt: a miss returns `false`/`None` and leaves
//! both the grid and the map as they were. Grid edits that may still fail go
//! through a transaction; the map is only written once the grid side is settled.

use tracing::trace;

use super::config::MonsterStrength;
use super::economy::{monsters_by_value, object_gold_value};
use super::node::{NodeGrid, NodeType};
use super::object_sets::{ObjectPlacement, ObjectSet};
use super::random::{self, GeneratorRng};
use super::region::WATER_REGION;
use super::roads::{find_path_to_nearest_road, mark_path};
use crate::world::catalog::{
    basement_index, flag_index, hero_index, mine_index, monster_index, mountain_index, town_index, tree_index,
    ROCK_VARIANTS, TREE_VARIANTS,
};
use crate::world::{
    Ground, MapFormat, ObjectCatalog, ObjectGroup, ObjectIdAllocator, ObjectInfo, PlayerColor, Race, Resource,
};

/// Castle anchors are searched within this many tiles of the requested spot.
const CASTLE_SEARCH_RADIUS: i32 = 5;
const CASTLE_ATTEMPTS: usize = 64;
/// Road tiles laid straight down from a castle gate.
const ROAD_STUB_LENGTH: i32 = 2;

/// Everything needed to write objects into the persistent map.
pub struct MapWriter<'a> {
    pub map: &'a mut MapFormat,
    pub catalog: &'a ObjectCatalog,
    pub uids: &'a mut ObjectIdAllocator,
}

impl<'a> MapWriter<'a> {
    pub fn new(map: &'a mut MapFormat, catalog: &'a ObjectCatalog, uids: &'a mut ObjectIdAllocator) -> Self {
        Self { map, catalog, uids }
    }

    pub fn info(&self, group: ObjectGroup, index: i32) -> Option<&'a ObjectInfo> {
        self.catalog.get(group, index)
    }

    /// Write an object with a fresh id.
    pub fn write(&mut self, position: i32, group: ObjectGroup, index: i32) -> Option<u32> {
        self.map.add_object_to_map(self.catalog, self.uids, position, group, index)
    }

    /// Write an object that shares the id of the object written last.
    fn write_sharing_last_id(&mut self, position: i32, group: ObjectGroup, index: i32) -> Option<u32> {
        let shared = self.uids.last();
        self.uids.rewind_to(shared);
        self.write(position, group, index)
    }

    /// Take back the objects written last, ids included, so the next write
    /// reuses the smallest of them.
    pub fn discard(&mut self, uids: &[u32]) {
        for &uid in uids.iter().rev() {
            self.map.remove_object(uid);
        }
        if let Some(&first) = uids.iter().min() {
            debug_assert!(uids.iter().all(|&uid| uid <= self.uids.last()), "discarding unallocated ids");
            self.uids.rewind_to(first);
        }
    }
}

/// A castle that made it onto the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedCastle {
    pub uid: u32,
    pub anchor: i32,
    /// Last tile of the road stub below the gate.
    pub road_end: i32,
}

fn offset_index(grid: &NodeGrid, position: i32, offset: (i32, i32)) -> Option<i32> {
    let node = grid.node_offset(position, offset);
    node.is_valid().then_some(node.index)
}

/// Horizontal extent of the ground footprint.
fn footprint_columns(info: &ObjectInfo) -> (i32, i32) {
    info.occupied_offsets()
        .fold((0, 0), |(min, max), (dx, _)| (min.min(dx), max.max(dx)))
}

/// Whether `info` fits with its anchor at `position`.
pub fn can_place_object(grid: &NodeGrid, info: &ObjectInfo, position: i32) -> bool {
    let anchor = grid.node(position);
    if anchor.region == WATER_REGION {
        return false;
    }
    let region = anchor.region;
    let is_action = info.object_type.is_action();

    for offset in info.occupied_offsets() {
        let node = grid.node_offset(position, offset);
        if !node.is_valid() || node.region != region {
            return false;
        }
        let fits = match node.node_type {
            NodeType::Open => true,
            NodeType::Border => !is_action,
            _ => false,
        };
        if !fits {
            return false;
        }
    }

    for offset in info.top_offsets() {
        let node = grid.node_offset(position, offset);
        if !node.is_valid() || node.region != region {
            return false;
        }
    }

    if is_action {
        let below = grid.node_offset(position, (0, 1));
        if !below.is_valid() || below.region != region || !matches!(below.node_type, NodeType::Open | NodeType::Path) {
            return false;
        }
    }

    // Buildings are entered from below; keep the row under them walkable.
    if info.object_type.is_stationary_action() {
        let (left, right) = footprint_columns(info);
        for dx in left - 1..=right + 1 {
            let node = grid.node_offset(position, (dx, 1));
            if !node.is_valid() || matches!(node.node_type, NodeType::Obstacle | NodeType::Border) {
                return false;
            }
        }
    }

    true
}

/// Stamp the ground footprint as obstacle, and the anchor of action objects as action.
pub fn mark_object_placement(grid: &mut NodeGrid, info: &ObjectInfo, position: i32) {
    for offset in info.occupied_offsets() {
        if let Some(index) = offset_index(grid, position, offset) {
            grid.set_type(index, NodeType::Obstacle);
        }
    }
    if info.object_type.is_action() {
        grid.set_type(position, NodeType::Action);
    }
}

/// Place an action object and connect it to the region's roads.
///
/// Fit, stamp and route happen inside a transaction; the map is written last,
/// so a missing route leaves nothing behind.
pub fn place_action_object(
    grid: &mut NodeGrid,
    writer: &mut MapWriter,
    group: ObjectGroup,
    index: i32,
    position: i32,
) -> Option<u32> {
    let info = writer.info(group, index)?;
    if !can_place_object(grid, info, position) {
        trace!(?group, index, position, "object does not fit");
        return None;
    }

    let mut tx = grid.begin();
    mark_object_placement(&mut tx, info, position);

    let path = find_path_to_nearest_road(&tx, position);
    if path.is_empty() {
        trace!(?group, index, position, "no road reaches object");
        return None;
    }
    // The anchor itself stays an action tile.
    mark_path(&mut tx, &path[..path.len() - 1]);

    let uid = writer.write(position, group, index)?;
    tx.commit();
    Some(uid)
}

/// Place a castle or town with its basement, gate flags and road stub.
///
/// Candidate anchors around `target` are tried nearest first. Every part of the
/// castle shares one object id; a player's hero gets its own. A castle lands
/// with all of its parts or not at all.
pub fn place_castle(
    grid: &mut NodeGrid,
    writer: &mut MapWriter,
    target: i32,
    ground: Ground,
    race: Race,
    owner: Option<PlayerColor>,
    is_castle: bool,
) -> Option<PlacedCastle> {
    let castle_index = town_index(race, is_castle);
    let castle_info = writer.info(ObjectGroup::KingdomTowns, castle_index)?;

    let region = grid.node(target).region;
    let (target_x, target_y) = grid.coords(target);
    let mut candidates = Vec::new();
    for dy in -CASTLE_SEARCH_RADIUS..=CASTLE_SEARCH_RADIUS {
        for dx in -CASTLE_SEARCH_RADIUS..=CASTLE_SEARCH_RADIUS {
            if let Some(index) = grid.index_of(target_x + dx, target_y + dy) {
                candidates.push((dx * dx + dy * dy, index));
            }
        }
    }
    candidates.sort_unstable();

    for &(_, anchor) in candidates.iter().take(CASTLE_ATTEMPTS) {
        if grid.node(anchor).region != region || !can_place_object(grid, castle_info, anchor) {
            continue;
        }
        let stub: Vec<i32> = (1..=ROAD_STUB_LENGTH)
            .filter_map(|dy| offset_index(grid, anchor, (0, dy)))
            .collect();
        let stub_fits = stub.len() == ROAD_STUB_LENGTH as usize
            && stub.iter().all(|&index| {
                let node = grid.node(index);
                node.region == region && matches!(node.node_type, NodeType::Open | NodeType::Path)
            });
        if !stub_fits {
            continue;
        }

        let mut tx = grid.begin();
        mark_object_placement(&mut tx, castle_info, anchor);
        mark_path(&mut tx, &stub);

        let Some(uid) = writer.write(anchor, ObjectGroup::KingdomTowns, castle_index) else {
            continue;
        };
        let mut written = vec![uid];
        let mut complete = writer
            .write_sharing_last_id(anchor, ObjectGroup::LandscapeTownBasements, basement_index(ground))
            .is_some();
        for (dx, right) in [(-1, false), (1, true)] {
            complete = complete
                && offset_index(&tx, anchor, (dx, 0)).map_or(false, |flag_tile| {
                    writer
                        .write_sharing_last_id(flag_tile, ObjectGroup::LandscapeFlags, flag_index(owner, right))
                        .is_some()
                });
        }
        if let (true, Some(color)) = (complete, owner) {
            match writer.write(stub[0], ObjectGroup::KingdomHeroes, hero_index(color)) {
                Some(hero) => written.push(hero),
                None => complete = false,
            }
        }
        if !complete {
            trace!(anchor, ?race, "castle parts did not fit on the map");
            writer.discard(&written);
            continue;
        }
        tx.commit();

        if let Some(castle) = writer.map.castles.get_mut(&uid) {
            castle.owner = owner;
            castle.race = race;
            castle.default_defenders = owner.is_none();
        }

        for &road in &stub {
            writer.map.update_road_on_tile(road, true);
        }

        return Some(PlacedCastle { uid, anchor, road_end: stub[stub.len() - 1] });
    }

    trace!(target, ?race, "no room for a castle");
    None
}

/// Place a guard worth `value` on `position`. Only the map is touched; the guard
/// stands on its tile without changing how the grid routes roads.
pub fn place_monster(writer: &mut MapWriter, strength: MonsterStrength, value: i32, position: i32) -> Option<u32> {
    let selection = monsters_by_value(strength, value)?;
    let uid = writer.write(position, ObjectGroup::Monsters, monster_index(selection.monster))?;
    if let Some(metadata) = writer.map.monsters.get_mut(&uid) {
        metadata.allowed = selection.allowed;
    }
    Some(uid)
}

/// Place a mine for `resource` matching the ground under it, optionally guarded
/// by a monster on the approach tile.
pub fn place_mine(
    grid: &mut NodeGrid,
    writer: &mut MapWriter,
    resource: Resource,
    ground: Ground,
    position: i32,
    guard: Option<MonsterStrength>,
) -> Option<u32> {
    let index = mine_index(resource, ground)?;
    let uid = place_action_object(grid, writer, ObjectGroup::AdventureMines, index, position)?;

    if let Some(strength) = guard {
        let value = placement_value(writer.catalog, ObjectGroup::AdventureMines, index);
        if place_guard_below(grid, writer, strength, value, position).is_none() {
            trace!(?resource, position, "mine left unguarded");
        }
    }

    Some(uid)
}

/// Guard the approach tile of the object anchored at `position`. A guard off the
/// road blocks its tile; one standing on a road leaves the road walkable.
pub fn place_guard_below(
    grid: &mut NodeGrid,
    writer: &mut MapWriter,
    strength: MonsterStrength,
    value: i32,
    position: i32,
) -> Option<u32> {
    let below = offset_index(grid, position, (0, 1))?;
    let uid = place_monster(writer, strength, value, below)?;
    if grid.node(below).node_type == NodeType::Open {
        grid.set_type(below, NodeType::Action);
    }
    Some(uid)
}

/// Map a ground-agnostic variant to the sprite for `ground`. Trees and mountains
/// come in one run per land ground; everything else is used as is.
pub fn select_terrain_variant(group: ObjectGroup, index: i32, ground: Ground) -> i32 {
    let variant = index.max(0) as usize;
    let themed = match group {
        ObjectGroup::LandscapeTrees => tree_index(ground, variant),
        ObjectGroup::LandscapeMountains => mountain_index(ground, variant),
        _ => None,
    };
    themed.unwrap_or(index)
}

/// Cover `position` with a tree, or a rock when no tree shape fits. Obstacles may
/// sit on border tiles.
pub fn place_random_obstacle(
    grid: &mut NodeGrid,
    writer: &mut MapWriter,
    ground: Ground,
    position: i32,
    rng: &mut GeneratorRng,
) -> bool {
    if ground.is_water() {
        return false;
    }

    let mut trees: Vec<i32> = (0..TREE_VARIANTS as i32)
        .map(|variant| select_terrain_variant(ObjectGroup::LandscapeTrees, variant, ground))
        .collect();
    random::shuffle(rng, &mut trees);
    let mut rocks: Vec<i32> = (0..ROCK_VARIANTS as i32).collect();
    random::shuffle(rng, &mut rocks);

    let candidates = trees
        .into_iter()
        .map(|index| (ObjectGroup::LandscapeTrees, index))
        .chain(rocks.into_iter().map(|index| (ObjectGroup::LandscapeRocks, index)));

    for (group, index) in candidates {
        let Some(info) = writer.info(group, index) else {
            continue;
        };
        if !can_place_object(grid, info, position) {
            continue;
        }
        if writer.write(position, group, index).is_some() {
            mark_object_placement(grid, info, position);
            return true;
        }
    }

    false
}

/// Place a non-routed object described relative to `center`.
pub fn place_simple_object(
    grid: &mut NodeGrid,
    writer: &mut MapWriter,
    center: i32,
    placement: &ObjectPlacement,
    ground: Ground,
) -> Option<u32> {
    let position = offset_index(grid, center, placement.offset)?;
    let index = select_terrain_variant(placement.group, placement.index, ground);
    let info = writer.info(placement.group, index)?;
    if !can_place_object(grid, info, position) {
        trace!(group = ?placement.group, index, position, "simple object does not fit");
        return None;
    }
    let uid = writer.write(position, placement.group, index)?;
    mark_object_placement(grid, info, position);
    Some(uid)
}

/// Whether every member of `set` fits around `center` and its entrance tiles are open.
pub fn can_fit_object_set(grid: &NodeGrid, catalog: &ObjectCatalog, set: &ObjectSet, center: i32, ground: Ground) -> bool {
    for &offset in &set.entrance_check {
        let node = grid.node_offset(center, offset);
        if !node.is_valid() || node.node_type != NodeType::Open {
            return false;
        }
    }

    let region = grid.node(center).region;
    set.placements().all(|placement| {
        let index = select_terrain_variant(placement.group, placement.index, ground);
        let Some(info) = catalog.get(placement.group, index) else {
            return false;
        };
        let node = grid.node_offset(center, placement.offset);
        node.is_valid() && node.region == region && can_place_object(grid, info, node.index)
    })
}

/// Gold worth of whatever `(group, index)` resolves to.
pub fn placement_value(catalog: &ObjectCatalog, group: ObjectGroup, index: i32) -> i32 {
    catalog
        .get(group, index)
        .map_or(0, |info| object_gold_value(info.object_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::catalog::{dwelling_index, RANDOM_RESOURCE};
    use crate::world::map_format::TileObject;
    use crate::world::ObjectType;

    /// A single-region grid with a road along the bottom row.
    fn setup(size: usize) -> NodeGrid {
        let mut grid = NodeGrid::new(size);
        for index in 0..grid.len() as i32 {
            grid.claim(index, 1, NodeType::Open);
        }
        for x in 0..size as i32 {
            let index = grid.index_of(x, size as i32 - 1).unwrap();
            grid.set_type(index, NodeType::Path);
        }
        grid
    }

    fn grass_map(size: usize) -> MapFormat {
        let mut map = MapFormat::new(size);
        for index in 0..(size * size) as i32 {
            map.set_terrain_on_tile(index, Ground::Grass);
        }
        map
    }

    fn snapshot(grid: &NodeGrid) -> Vec<(u32, NodeType)> {
        grid.nodes().map(|n| (n.region, n.node_type)).collect()
    }

    #[test]
    fn test_no_double_placement() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(12);
        let mut grid = setup(12);
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);

        let index = mine_index(Resource::Ore, Ground::Grass).unwrap();
        let info = catalog.get(ObjectGroup::AdventureMines, index).unwrap();
        let position = grid.index_of(5, 5).unwrap();
        assert!(can_place_object(&grid, info, position));
        assert!(place_action_object(&mut grid, &mut writer, ObjectGroup::AdventureMines, index, position).is_some());
        assert!(!can_place_object(&grid, info, position));
        assert!(place_action_object(&mut grid, &mut writer, ObjectGroup::AdventureMines, index, position).is_none());
        assert_eq!(grid.node(position).node_type, NodeType::Action);
    }

    #[test]
    fn test_action_object_is_routed() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(12);
        let mut grid = setup(12);
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);

        let index = dwelling_index(ObjectType::ArcherHouse).unwrap();
        let position = grid.index_of(6, 4).unwrap();
        place_action_object(&mut grid, &mut writer, ObjectGroup::AdventureDwellings, index, position).unwrap();
        let below = grid.index_of(6, 5).unwrap();
        assert_eq!(grid.node(below).node_type, NodeType::Path);
    }

    #[test]
    fn test_failed_route_leaves_no_residue() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(12);
        let mut grid = NodeGrid::new(12);
        for index in 0..grid.len() as i32 {
            grid.claim(index, 1, NodeType::Open);
        }
        // No road anywhere in the region.
        let grid_before = snapshot(&grid);
        let map_before = serde_json::to_string(&map).unwrap();

        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);
        let index = mine_index(Resource::Wood, Ground::Grass).unwrap();
        let position = grid.index_of(5, 5).unwrap();
        assert!(place_action_object(&mut grid, &mut writer, ObjectGroup::AdventureMines, index, position).is_none());

        assert_eq!(snapshot(&grid), grid_before);
        assert_eq!(serde_json::to_string(&map).unwrap(), map_before);
        assert_eq!(uids.last(), 0);
    }

    #[test]
    fn test_castle_shares_one_uid() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(20);
        let mut grid = setup(20);
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);

        let target = grid.index_of(10, 8).unwrap();
        let placed = place_castle(
            &mut grid,
            &mut writer,
            target,
            Ground::Grass,
            Race::Knight,
            Some(PlayerColor::Blue),
            true,
        )
        .unwrap();
        assert_eq!(placed.anchor, target);

        let castle = &map.castles[&placed.uid];
        assert_eq!(castle.owner, Some(PlayerColor::Blue));
        assert!(!castle.default_defenders);

        let flags: Vec<_> = map.objects_in_group(ObjectGroup::LandscapeFlags).map(|(_, o)| o.uid).collect();
        assert_eq!(flags, vec![placed.uid, placed.uid]);
        let basements: Vec<_> = map.objects_in_group(ObjectGroup::LandscapeTownBasements).map(|(_, o)| o.uid).collect();
        assert_eq!(basements, vec![placed.uid]);

        // The hero stands on the gate with its own id.
        let (hero_tile, hero) = map.objects_in_group(ObjectGroup::KingdomHeroes).next().unwrap();
        assert_eq!(hero_tile, target + 20);
        assert_eq!(hero.uid, placed.uid + 1);
        assert!(map.does_contain_road(placed.road_end));
        assert_eq!(grid.node(placed.road_end).node_type, NodeType::Path);
    }

    #[test]
    fn test_castle_is_all_or_nothing() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(20);
        let mut grid = setup(20);
        let target = grid.index_of(10, 8).unwrap();
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);
        // A rock only the map knows about sits where the hero would stand.
        let rock = writer.write(target + 20, ObjectGroup::LandscapeRocks, 0).unwrap();

        let placed = place_castle(
            &mut grid,
            &mut writer,
            target,
            Ground::Grass,
            Race::Knight,
            Some(PlayerColor::Red),
            true,
        )
        .unwrap();
        assert_ne!(placed.anchor, target);
        assert_eq!(placed.uid, rock + 1);
        assert_eq!(map.castles.len(), 1);
        assert_eq!(map.castles[&placed.uid].tile, placed.anchor);

        let castle_groups = [ObjectGroup::KingdomTowns, ObjectGroup::LandscapeTownBasements, ObjectGroup::LandscapeFlags];
        let parts: Vec<&TileObject> =
            map.tiles.values().iter().flat_map(|t| &t.objects).filter(|o| castle_groups.contains(&o.group)).collect();
        assert!(parts.len() > 3);
        assert!(parts.iter().all(|o| o.uid == placed.uid));
        assert_eq!(map.objects_in_group(ObjectGroup::LandscapeFlags).count(), 2);
        assert_eq!(map.objects_in_group(ObjectGroup::LandscapeTownBasements).count(), 1);

        let heroes: Vec<_> = map.objects_in_group(ObjectGroup::KingdomHeroes).collect();
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].0, placed.anchor + 20);
        assert_eq!(heroes[0].1.uid, placed.uid + 1);
        assert_eq!(map.heroes.len(), 1);
    }

    #[test]
    fn test_castle_moves_when_target_is_blocked() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(24);
        let mut grid = setup(24);
        let target = grid.index_of(12, 10).unwrap();
        grid.set_type(target, NodeType::Obstacle);

        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);
        let placed = place_castle(&mut grid, &mut writer, target, Ground::Grass, Race::Random, None, false).unwrap();
        assert_ne!(placed.anchor, target);
        assert!(map.castles[&placed.uid].default_defenders);
        assert!(map.heroes.is_empty());
    }

    #[test]
    fn test_guarded_mine() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(12);
        let mut grid = setup(12);
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);

        let position = grid.index_of(5, 5).unwrap();
        place_mine(&mut grid, &mut writer, Resource::Gold, Ground::Grass, position, Some(MonsterStrength::Normal))
            .unwrap();
        let (tile, _) = map.objects_in_group(ObjectGroup::Monsters).next().unwrap();
        assert_eq!(tile, position + 12);
        let guard = map.monsters.values().next().unwrap();
        assert!(!guard.allowed.is_empty());
        // The guard either stands on the road or blocks its tile.
        assert!(matches!(grid.node(tile).node_type, NodeType::Path | NodeType::Action));
    }

    #[test]
    fn test_obstacles_use_borders() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(12);
        let mut grid = setup(12);
        let position = grid.index_of(3, 3).unwrap();
        grid.set_type(position, NodeType::Border);

        let mut rng = random::seeded(4);
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);
        assert!(place_random_obstacle(&mut grid, &mut writer, Ground::Grass, position, &mut rng));
        assert_eq!(grid.node(position).node_type, NodeType::Obstacle);
        assert!(!place_random_obstacle(&mut grid, &mut writer, Ground::Water, position + 1, &mut rng));
    }

    #[test]
    fn test_select_terrain_variant() {
        assert_eq!(
            select_terrain_variant(ObjectGroup::LandscapeTrees, 2, Ground::Snow),
            tree_index(Ground::Snow, 2).unwrap()
        );
        assert_eq!(select_terrain_variant(ObjectGroup::AdventureTreasures, RANDOM_RESOURCE, Ground::Snow), RANDOM_RESOURCE);
    }

    #[test]
    fn test_simple_object_on_open_tile() {
        let catalog = ObjectCatalog::standard();
        let mut uids = ObjectIdAllocator::new();
        let mut map = grass_map(12);
        let mut grid = setup(12);
        let mut writer = MapWriter::new(&mut map, &catalog, &mut uids);

        let center = grid.index_of(4, 4).unwrap();
        let placement = ObjectPlacement { offset: (1, 0), group: ObjectGroup::LandscapeRocks, index: 0 };
        assert!(place_simple_object(&mut grid, &mut writer, center, &placement, Ground::Grass).is_some());
        assert_eq!(grid.node(center + 1).node_type, NodeType::Obstacle);
        assert!(place_simple_object(&mut grid, &mut writer, center, &placement, Ground::Grass).is_none());
    }
}
