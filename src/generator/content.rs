//! Region content planner.
//!
//! Each phase walks every real region in id order and fills it with one kind
//! of content. A region that has no room for something simply goes without;
//! only a player's castle is mandatory.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, info, trace, warn};

use super::config::{Configuration, RegionalObjects, ResourceDensity};
use super::economy::{
    monsters_by_value, object_gold_value, random_treasure, MapEconomy, MAXIMUM_TREASURE_GROUP_VALUE,
    MINIMAL_TREASURE_VALUE,
};
use super::node::{Direction, NodeGrid, NodeType};
use super::object_sets::{DecorationSet, ObjectPlacement, ObjectSet, PrefabLibrary};
use super::placement::{
    can_fit_object_set, mark_object_placement, place_action_object, place_castle, place_guard_below, place_mine,
    place_monster, place_random_obstacle, place_simple_object, placement_value, select_terrain_variant, MapWriter,
};
use super::random::{self, GeneratorRng};
use super::region::{Region, RegionType, WATER_REGION};
use super::roads::{
    carve_path_to_nearest_road, find_path_to_nearest_road, find_stream_path, is_connected_to_road, mark_path,
};
use super::GenerationError;
use crate::world::catalog::{dwelling_index, mountain_index, DWELLINGS, MOUNTAIN_VARIANTS};
use crate::world::{Ground, ObjectCatalog, ObjectGroup, ObjectType, Race, Resource};

/// Cap on random tries for clusters, dwellings and decorations per region.
const MAX_PLACEMENT_ATTEMPTS: usize = 30;
/// Wood and ore mines stay out of the innermost distance rings.
const FIRST_STARTING_MINE_RING: usize = 4;
/// Fewer rings than this leaves no room for secondary mines.
const MIN_RINGS_FOR_SECONDARY_MINES: usize = 4;
/// Guard worth between two player regions.
const STARTING_CONNECTOR_GUARD_VALUE: i32 = 6000;
const CONNECTOR_GUARD_VALUE: i32 = 3000;
/// One decoration cluster per this many region tiles.
const DECORATION_AREA: usize = 120;
const DWELLING_WEIGHT_SCALE: i32 = 10_000;

pub struct ContentPlanner<'a> {
    grid: NodeGrid,
    regions: Vec<Region>,
    writer: MapWriter<'a>,
    prefabs: &'a PrefabLibrary,
    config: &'a Configuration,
    quota: RegionalObjects,
    size_limit: i32,
    rng: GeneratorRng,
    economy: MapEconomy,
    /// Jittered distance rings per region id, shared by both mine phases.
    rings: Vec<Vec<Vec<i32>>>,
    starting_locations: Vec<i32>,
    action_locations: BTreeSet<i32>,
}

impl<'a> ContentPlanner<'a> {
    pub fn new(
        grid: NodeGrid,
        regions: Vec<Region>,
        writer: MapWriter<'a>,
        prefabs: &'a PrefabLibrary,
        config: &'a Configuration,
        size_limit: i32,
        rng: GeneratorRng,
    ) -> Self {
        let rings = vec![Vec::new(); regions.len()];
        Self {
            grid,
            regions,
            writer,
            prefabs,
            config,
            quota: config.resource_density.regional_objects(),
            size_limit,
            rng,
            economy: MapEconomy::new(),
            rings,
            starting_locations: Vec::new(),
            action_locations: BTreeSet::new(),
        }
    }

    pub fn grid(&self) -> &NodeGrid {
        &self.grid
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn economy(&self) -> &MapEconomy {
        &self.economy
    }

    /// Road hubs of the player regions.
    pub fn starting_locations(&self) -> &[i32] {
        &self.starting_locations
    }

    /// Paint every region's ground, then blend the tiles along region edges and coasts.
    pub fn paint_terrain(&mut self) {
        for region in self.regions.iter().filter(|r| r.is_real()) {
            for &index in &region.nodes {
                self.writer.map.set_terrain_on_tile(index, region.ground);
            }
        }

        let mut blended = 0;
        for index in 0..self.grid.len() as i32 {
            let node = *self.grid.node(index);
            if node.region != WATER_REGION && matches!(node.node_type, NodeType::Border | NodeType::Coast) {
                let ground = self.regions[node.region as usize].ground;
                self.writer.map.set_terrain_with_transition(index, ground);
                blended += 1;
            }
        }
        info!(blended, "painted terrain");
    }

    /// Scale the density's treasure budget by how much of a full region each region got.
    pub fn assign_budgets(&mut self) {
        let budget = i64::from(self.config.resource_density.treasure_budget());
        let limit = i64::from(self.size_limit.max(1));
        for region in self.regions.iter_mut().filter(|r| r.is_real()) {
            region.treasure_limit = (budget * region.tile_count() as i64 / limit) as i32;
        }
    }

    /// Castles for every player region and for neutral regions that outgrew the size limit.
    /// A player castle that cannot be placed fails the whole run.
    pub fn place_castles(&mut self) -> Result<(), GenerationError> {
        for id in 1..self.regions.len() {
            let owner = self.regions[id].owner;
            let oversized = self.regions[id].tile_count() > self.size_limit.max(0) as usize;
            if owner.is_none() && !oversized {
                continue;
            }

            let ground = self.regions[id].ground;
            let original_center = self.regions[id].center_index;
            let mut target = self.regions[id].adjust_to_fit_castle(&self.grid);
            if self.grid.node(target).region != id as u32 {
                target = nearest_region_tile(&self.grid, &self.regions[id], target);
            }

            let (race, is_castle) = match owner {
                Some(_) => (Race::Random, true),
                None => (
                    ground.native_race().unwrap_or(Race::Random),
                    self.config.resource_density == ResourceDensity::Abundant,
                ),
            };

            match place_castle(&mut self.grid, &mut self.writer, target, ground, race, owner, is_castle) {
                Some(castle) => {
                    self.regions[id].center_index = castle.road_end;
                    if owner.is_some() {
                        self.starting_locations.push(castle.road_end);
                    } else {
                        self.action_locations.insert(castle.anchor);
                    }
                    debug!(region = id, ?owner, anchor = castle.anchor, "placed castle");
                }
                None => {
                    if let Some(player) = owner {
                        warn!(region = id, ?player, tile = target, "no room for a starting castle");
                        return Err(GenerationError::StartingCastle { player, tile: target });
                    }
                    self.regions[id].center_index = original_center;
                    trace!(region = id, "neutral region left without a castle");
                }
            }
        }

        info!(players = self.starting_locations.len(), "placed castles");
        Ok(())
    }

    /// Make sure every region has a road tile for its roads to grow from. Castle
    /// regions already have one at the end of the gate stub.
    pub fn establish_hubs(&mut self) {
        for id in 1..self.regions.len() {
            let center = self.regions[id].center_index;
            let node = *self.grid.node(center);
            let own = node.region == id as u32;
            if own && node.node_type == NodeType::Path {
                continue;
            }

            let hub = if own && matches!(node.node_type, NodeType::Open | NodeType::Coast) {
                Some(center)
            } else {
                // Growth order starts at the seed, so the first match is the closest one.
                // Narrow regions fall back to coast or border tiles.
                let nodes = &self.regions[id].nodes;
                let first_of = |node_type: NodeType| {
                    nodes.iter().copied().find(|&index| self.grid.node(index).node_type == node_type)
                };
                first_of(NodeType::Open).or_else(|| first_of(NodeType::Coast)).or_else(|| first_of(NodeType::Border))
            };

            match hub {
                Some(hub) => {
                    self.grid.set_type(hub, NodeType::Path);
                    self.regions[id].center_index = hub;
                }
                None => warn!(region = id, "region has no room for a road hub"),
            }
        }
    }

    /// Wood and ore mines in every region, unguarded, away from the hub.
    pub fn place_starting_mines(&mut self) {
        for id in 1..self.regions.len() {
            let rings = self.regions[id].open_tiles_by_distance(&self.grid, &mut self.rng);
            let ground = self.regions[id].ground;

            for resource in [Resource::Wood, Resource::Ore] {
                let placed = rings
                    .iter()
                    .skip(FIRST_STARTING_MINE_RING)
                    .any(|ring| self.try_mine(ring, resource, ground, false));
                if !placed {
                    debug!(region = id, ?resource, "no room for a mine");
                }
            }

            self.rings[id] = rings;
        }

        info!(
            wood = self.economy.mine_count(Resource::Wood),
            ore = self.economy.mine_count(Resource::Ore),
            "placed starting mines"
        );
    }

    fn try_mine(&mut self, ring: &[i32], resource: Resource, ground: Ground, guarded: bool) -> bool {
        let guard = guarded.then_some(self.config.monster_strength);
        for &tile in ring {
            if place_mine(&mut self.grid, &mut self.writer, resource, ground, tile, guard).is_some() {
                self.economy.increase_mine_count(resource);
                self.action_locations.insert(tile);
                return true;
            }
        }
        false
    }

    /// Pick one connector pair per neighbouring region and route both halves to
    /// their region's roads. Quiet stretches of border are tried first; busy
    /// corners where three regions meet are only used when nothing else worked.
    /// Pairs without a clean crossing get one carved through the border band.
    pub fn discover_connectors(&mut self) -> Result<(), GenerationError> {
        for strict in [true, false] {
            for id in 1..self.regions.len() {
                let nodes = self.regions[id].nodes.clone();
                for index in nodes {
                    self.try_connector(id as u32, index, strict);
                }
            }
        }

        let mut carved = 0;
        for id in 1..self.regions.len() {
            let missing: Vec<u32> = self.regions[id]
                .neighbours
                .iter()
                .copied()
                .filter(|other| !self.regions[id].connections.contains_key(other))
                .collect();
            for other in missing {
                if self.carve_connector(id as u32, other) {
                    carved += 1;
                } else {
                    warn!(region = id, other, "no connector between neighbouring regions");
                    return Err(GenerationError::Disconnected { region: id as u32, other });
                }
            }
        }

        let pairs: usize = self.regions.iter().map(|r| r.connections.len()).sum::<usize>() / 2;
        info!(pairs, carved, "connected regions");
        Ok(())
    }

    /// Force a connector onto the quietest pair of touching border tiles and cut
    /// a road from each side, through border tiles if need be.
    fn carve_connector(&mut self, region_id: u32, other_id: u32) -> bool {
        let mut candidates = Vec::new();
        let crossable = |node_type: NodeType| matches!(node_type, NodeType::Border | NodeType::Path);
        for &index in &self.regions[region_id as usize].nodes {
            if !crossable(self.grid.node(index).node_type) {
                continue;
            }
            for direction in Direction::ORTHOGONAL {
                let Some(other_index) = self.grid.neighbor(index, direction) else {
                    continue;
                };
                let other = self.grid.node(other_index);
                if other.region == other_id && crossable(other.node_type) {
                    let crowd = foreign_regions_around(&self.grid, index) + foreign_regions_around(&self.grid, other_index);
                    candidates.push((crowd, index, other_index));
                }
            }
        }
        candidates.sort_unstable();

        for (_, index, other_index) in candidates {
            let mut tx = self.grid.begin();
            tx.set_type(index, NodeType::Connector);
            tx.set_type(other_index, NodeType::Connector);

            let near_road = carve_path_to_nearest_road(&tx, index);
            if near_road.is_empty() {
                continue;
            }
            mark_path(&mut tx, &near_road[..near_road.len() - 1]);

            let far_road = carve_path_to_nearest_road(&tx, other_index);
            if far_road.is_empty() {
                continue;
            }
            mark_path(&mut tx, &far_road[..far_road.len() - 1]);
            tx.commit();

            self.regions[region_id as usize].connections.insert(other_id, index);
            self.regions[other_id as usize].connections.insert(region_id, other_index);
            debug!(from = region_id, to = other_id, tile = index, "carved connector");
            return true;
        }

        false
    }

    fn try_connector(&mut self, region_id: u32, index: i32, strict: bool) -> bool {
        let node = *self.grid.node(index);
        if node.region != region_id || node.node_type != NodeType::Border {
            return false;
        }
        if strict && foreign_regions_around(&self.grid, index) > 1 {
            return false;
        }

        for direction in Direction::ORTHOGONAL {
            let Some(other_index) = self.grid.neighbor(index, direction) else {
                continue;
            };
            let other = *self.grid.node(other_index);
            if other.region == WATER_REGION || other.region == region_id || other.node_type != NodeType::Border {
                continue;
            }
            if self.regions[region_id as usize].connections.contains_key(&other.region) {
                continue;
            }

            let Some(far) = self.grid.neighbor(other_index, direction) else {
                continue;
            };
            let Some(near) = self.grid.neighbor(index, direction.opposite()) else {
                continue;
            };
            let far_node = self.grid.node(far);
            let near_node = self.grid.node(near);
            if far_node.region != other.region || far_node.node_type != NodeType::Open {
                continue;
            }
            if near_node.region != region_id || !matches!(near_node.node_type, NodeType::Open | NodeType::Path) {
                continue;
            }

            let mut tx = self.grid.begin();
            tx.set_type(index, NodeType::Connector);
            tx.set_type(other_index, NodeType::Connector);

            let near_road = find_path_to_nearest_road(&tx, near);
            if near_road.is_empty() {
                continue;
            }
            mark_path(&mut tx, &near_road);

            let far_road = find_path_to_nearest_road(&tx, far);
            if far_road.is_empty() {
                continue;
            }
            mark_path(&mut tx, &far_road);
            tx.commit();

            self.regions[region_id as usize].connections.insert(other.region, index);
            self.regions[other.region as usize].connections.insert(region_id, other_index);
            trace!(from = region_id, to = other.region, tile = index, "connector");
            return true;
        }

        false
    }

    /// Cover the remaining border tiles with trees, mountains and rocks.
    pub fn place_border_obstacles(&mut self) {
        let mut placed = 0;
        for index in 0..self.grid.len() as i32 {
            let node = *self.grid.node(index);
            if node.region == WATER_REGION || node.node_type != NodeType::Border {
                continue;
            }

            let ground = self.regions[node.region as usize].ground;
            if random::chance(&mut self.rng, ground.mountain_share()) && self.place_mountain(index, ground) {
                placed += 1;
                continue;
            }
            if place_random_obstacle(&mut self.grid, &mut self.writer, ground, index, &mut self.rng) {
                placed += 1;
            }
        }
        info!(placed, "placed border obstacles");
    }

    fn place_mountain(&mut self, index: i32, ground: Ground) -> bool {
        let variant = random::range(&mut self.rng, 0, MOUNTAIN_VARIANTS as i32 - 1);
        if mountain_index(ground, variant as usize).is_none() {
            return false;
        }
        let placement = ObjectPlacement { offset: (0, 0), group: ObjectGroup::LandscapeMountains, index: variant };
        place_simple_object(&mut self.grid, &mut self.writer, index, &placement, ground).is_some()
    }

    /// Guarded rare-resource mines spread evenly over the map, then gold.
    pub fn place_secondary_mines(&mut self) {
        let secondary = (self.quota.mines - 2).clamp(0, Resource::SECONDARY.len() as i32);
        let gold_everywhere = self.quota.mines > 2 + Resource::SECONDARY.len() as i32;

        for id in 1..self.regions.len() {
            let rings = std::mem::take(&mut self.rings[id]);
            if rings.len() < MIN_RINGS_FOR_SECONDARY_MINES {
                continue;
            }
            let ground = self.regions[id].ground;

            for _ in 0..secondary {
                let resource = self.economy.pick_next_mine_resource();
                let placed = (1..=rings.len() - 3)
                    .rev()
                    .any(|ring| self.try_mine(&rings[ring], resource, ground, true));
                if !placed {
                    debug!(region = id, ?resource, "no room for a secondary mine");
                }
            }

            if gold_everywhere || self.regions[id].region_type != RegionType::Starting {
                let placed = (1..rings.len())
                    .rev()
                    .any(|ring| self.try_mine(&rings[ring], Resource::Gold, ground, true));
                if !placed {
                    debug!(region = id, "no room for a gold mine");
                }
            }
        }

        info!(mines = ?self.economy.mines_count(), "placed secondary mines");
    }

    /// Power-up clusters, treasure clusters and standalone dwellings.
    pub fn place_object_sets(&mut self) {
        let prefabs = self.prefabs;
        for id in 1..self.regions.len() {
            let power_ups = self.place_object_set(id, &prefabs.power_up_sets, self.quota.power_ups);
            let treasures = self.place_object_set(id, &prefabs.treasure_sets, self.quota.treasures);
            let dwellings = self.place_dwellings(id, self.quota.objects);
            debug!(
                region = id,
                power_ups,
                treasures,
                dwellings,
                treasure_left = self.regions[id].treasure_limit,
                "placed object sets"
            );
        }
    }

    fn place_object_set(&mut self, id: usize, sets: &[ObjectSet], count: i32) -> i32 {
        if sets.is_empty() {
            return 0;
        }
        let ground = self.regions[id].ground;
        let mut order: Vec<usize> = (0..sets.len()).collect();
        let mut placed = 0;

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            if placed >= count || self.regions[id].treasure_limit < 0 {
                break;
            }
            let Some(&center) = random::pick(&mut self.rng, &self.regions[id].nodes) else {
                break;
            };

            random::shuffle(&mut self.rng, &mut order);
            for &set_index in &order {
                let set = &sets[set_index];
                if !can_fit_object_set(&self.grid, self.writer.catalog, set, center, ground) {
                    continue;
                }
                if self.place_set(id, set, center) {
                    placed += 1;
                    break;
                }
            }
        }

        placed
    }

    /// Stamp a fitted cluster. Placeholder valuables become random treasure within
    /// the region's budget; the guard is sized by the cluster's total worth.
    /// Either every member and the guard land, or nothing does and the budget
    /// is left alone.
    fn place_set(&mut self, id: usize, set: &ObjectSet, center: i32) -> bool {
        let ground = self.regions[id].ground;
        let catalog = self.writer.catalog;
        let strength = self.config.monster_strength;
        let group_limit = self.regions[id].treasure_limit.min(MAXIMUM_TREASURE_GROUP_VALUE);

        let mut group_value = 0;
        let mut members = Vec::new();
        for valuable in &set.valuables {
            let (group, index) = if valuable.group == ObjectGroup::AdventurePowerUps {
                (valuable.group, valuable.index)
            } else {
                let limit = MINIMAL_TREASURE_VALUE.max(group_limit - group_value);
                match random_treasure(limit, &mut self.rng) {
                    Some((group, index, _)) => (group, index),
                    None => continue,
                }
            };
            group_value += placement_value(catalog, group, index);
            members.push(ObjectPlacement { offset: valuable.offset, group, index });
        }
        members.extend(set.obstacles.iter().cloned());

        let mut resolved = Vec::with_capacity(members.len());
        for member in &members {
            let index = select_terrain_variant(member.group, member.index, ground);
            let Some(info) = catalog.get(member.group, index) else {
                return false;
            };
            let node = self.grid.node_offset(center, member.offset);
            if !node.is_valid() {
                return false;
            }
            resolved.push((node.index, member.group, index, info));
        }

        let guard_tile = set
            .monsters
            .first()
            .map(|monster| self.grid.node_offset(center, monster.offset))
            .filter(|node| node.is_valid())
            .map(|node| node.index);
        let guarded = guard_tile.is_some() && monsters_by_value(strength, group_value).is_some();

        let mut tx = self.grid.begin();
        for &(position, _, _, info) in &resolved {
            mark_object_placement(&mut tx, info, position);
        }
        if let (true, Some(tile)) = (guarded, guard_tile) {
            tx.set_type(tile, NodeType::Action);
        }
        if !is_connected_to_road(&tx, guard_tile.unwrap_or(center)) {
            trace!(region = id, center, "cluster would be cut off");
            return false;
        }

        let mut written = Vec::with_capacity(resolved.len() + 1);
        for &(position, group, index, _) in &resolved {
            match self.writer.write(position, group, index) {
                Some(uid) => written.push(uid),
                None => {
                    trace!(?group, index, position, "cluster member rejected by the map");
                    self.writer.discard(&written);
                    return false;
                }
            }
        }
        if let (true, Some(tile)) = (guarded, guard_tile) {
            match place_monster(&mut self.writer, strength, group_value, tile) {
                Some(uid) => written.push(uid),
                None => {
                    trace!(region = id, tile, "cluster guard rejected by the map");
                    self.writer.discard(&written);
                    return false;
                }
            }
        }
        tx.commit();

        self.regions[id].debit(group_value);
        true
    }

    fn place_dwellings(&mut self, id: usize, count: i32) -> i32 {
        let strength = self.config.monster_strength;
        let mut tiles: Vec<i32> = self.regions[id]
            .nodes
            .iter()
            .copied()
            .filter(|&index| self.grid.node(index).node_type == NodeType::Open)
            .collect();
        random::shuffle(&mut self.rng, &mut tiles);
        // Cheaper dwellings are more common.
        let weights: Vec<(ObjectType, u32)> = DWELLINGS
            .iter()
            .map(|&d| (d, (DWELLING_WEIGHT_SCALE / object_gold_value(d).max(1)).max(1) as u32))
            .collect();

        let mut placed = 0;
        for &tile in tiles.iter().take(MAX_PLACEMENT_ATTEMPTS) {
            if placed >= count {
                break;
            }
            let Some(&dwelling) = random::weighted_pick(&mut self.rng, &weights) else {
                break;
            };
            let Some(index) = dwelling_index(dwelling) else {
                continue;
            };
            if place_action_object(&mut self.grid, &mut self.writer, ObjectGroup::AdventureDwellings, index, tile)
                .is_some()
            {
                let value = object_gold_value(dwelling);
                let guarded = place_guard_below(&mut self.grid, &mut self.writer, strength, value, tile).is_some();
                if !guarded && monsters_by_value(strength, value).is_some() {
                    warn!(region = id, tile, ?dwelling, "dwelling left unguarded");
                }
                self.action_locations.insert(tile);
                placed += 1;
            }
        }
        placed
    }

    /// Flavour clusters on open ground, kept one tile clear of everything else.
    pub fn place_decorations(&mut self) {
        let prefabs = self.prefabs;
        let decorations = &prefabs.decorations;
        if decorations.is_empty() {
            return;
        }

        let mut total = 0;
        for id in 1..self.regions.len() {
            let wanted = self.regions[id].tile_count() / DECORATION_AREA;
            let ground = self.regions[id].ground;
            let mut placed = 0;

            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                if placed >= wanted {
                    break;
                }
                let Some(&center) = random::pick(&mut self.rng, &self.regions[id].nodes) else {
                    break;
                };
                let Some(decoration) = random::pick(&mut self.rng, decorations) else {
                    break;
                };
                if !decoration_fits(&self.grid, self.writer.catalog, decoration, center, ground) {
                    continue;
                }
                for object in &decoration.objects {
                    if place_simple_object(&mut self.grid, &mut self.writer, center, object, ground).is_none() {
                        trace!(name = %decoration.name, "decoration part skipped");
                    }
                }
                placed += 1;
            }
            total += placed;
        }
        info!(decorations = total, "placed decorations");
    }

    /// One guard per connected region pair, standing on the lower id's connector tile.
    pub fn place_connector_guards(&mut self) {
        let strength = self.config.monster_strength;
        let mut guards = 0;

        for id in 1..self.regions.len() {
            let connections: Vec<(u32, i32)> =
                self.regions[id].connections.iter().map(|(&other, &tile)| (other, tile)).collect();
            for (other, tile) in connections {
                if (other as usize) < id {
                    continue;
                }
                let both_starting = self.regions[id].region_type == RegionType::Starting
                    && self.regions[other as usize].region_type == RegionType::Starting;
                let value = if both_starting { STARTING_CONNECTOR_GUARD_VALUE } else { CONNECTOR_GUARD_VALUE };
                if place_monster(&mut self.writer, strength, value, tile).is_some() {
                    guards += 1;
                } else {
                    trace!(region = id, other, tile, "connector left unguarded");
                }
            }
        }
        info!(guards, "guarded connectors");
    }

    /// Single pickups dropped beside the roads until the budget or quota runs out.
    pub fn place_loose_pickups(&mut self) {
        let mut total = 0;
        for id in 1..self.regions.len() {
            let mut candidates: Vec<i32> = self.regions[id]
                .nodes
                .iter()
                .copied()
                .filter(|&index| self.grid.node(index).node_type == NodeType::Open && next_to_road(&self.grid, index))
                .collect();
            random::shuffle(&mut self.rng, &mut candidates);

            let mut placed = 0;
            for tile in candidates {
                if placed >= self.quota.pickups || self.regions[id].treasure_limit < 0 {
                    break;
                }
                let limit = self.regions[id]
                    .treasure_limit
                    .clamp(MINIMAL_TREASURE_VALUE, MAXIMUM_TREASURE_GROUP_VALUE);
                let Some((group, index, value)) = random_treasure(limit, &mut self.rng) else {
                    break;
                };
                if place_action_object(&mut self.grid, &mut self.writer, group, index, tile).is_some() {
                    self.regions[id].debit(value);
                    placed += 1;
                }
            }
            total += placed;
        }
        info!(pickups = total, "placed loose pickups");
    }

    /// Roads, streams, playability check and map bookkeeping. Returns the
    /// (start, target) pairs a hero could not walk between; any such pair
    /// makes the map unusable.
    pub fn finalize(&mut self, seed: u32) -> Vec<(i32, i32)> {
        let roads = self.finalize_roads();
        let streams = self.place_streams();
        let unreachable = self.validate_playability();
        self.bake_metadata();

        let flags = self.writer.map.update_player_related_objects();
        self.writer.map.update_map_players();

        let size = self.grid.size();
        self.writer.map.name = format!("Random map {}", seed);
        self.writer.map.description = format!(
            "Randomly generated map of {}x{} with seed {}, {} players and {}% of water.",
            size, size, seed, self.config.player_count, self.config.water_percentage
        );

        info!(roads, streams, flags, unreachable = unreachable.len(), "finalized map");
        unreachable
    }

    fn finalize_roads(&mut self) -> usize {
        let mut roads = 0;
        for index in 0..self.grid.len() as i32 {
            let node_type = self.grid.node(index).node_type;
            if matches!(node_type, NodeType::Path | NodeType::Connector) && self.writer.map.update_road_on_tile(index, true)
            {
                roads += 1;
            }
        }
        roads
    }

    /// One stream per coastal region, from a coast tile up to the nearest road,
    /// with a delta where it meets the water.
    fn place_streams(&mut self) -> usize {
        let mut streams = 0;
        for id in 1..self.regions.len() {
            if !self.regions[id].touches_water {
                continue;
            }

            let mut sources = Vec::new();
            for &index in &self.regions[id].nodes {
                if self.grid.node(index).node_type != NodeType::Coast {
                    continue;
                }
                for (slot, direction) in Direction::ORTHOGONAL.iter().enumerate() {
                    if let Some(water) = self.grid.neighbor(index, *direction) {
                        if self.grid.node(water).region == WATER_REGION {
                            sources.push((index, water, slot));
                        }
                    }
                }
            }
            let Some(&(source, water, slot)) = random::pick(&mut self.rng, &sources) else {
                continue;
            };

            let course = find_stream_path(&self.grid, source);
            if course.len() < 2 {
                continue;
            }
            // The first tile is the road the stream runs into.
            let mut written = 0;
            for &tile in &course[1..] {
                if self.writer.map.add_stream(tile) {
                    written += 1;
                }
            }
            if written < course.len() - 1 {
                warn!(region = id, source, skipped = course.len() - 1 - written, "stream tiles already taken");
            }
            self.writer.map.connect_stream_to_delta(source);
            if self.writer.write(water, ObjectGroup::LandscapeRiverDeltas, slot as i32).is_none() {
                trace!(region = id, water, "delta rejected by the map");
            }
            streams += 1;
        }
        streams
    }

    /// Walk from every starting hub and report the castles, mines, dwellings and
    /// other hubs no hero could reach.
    pub fn validate_playability(&self) -> Vec<(i32, i32)> {
        let hubs = self
            .regions
            .iter()
            .filter(|r| r.is_real() && self.grid.node(r.center_index).node_type == NodeType::Path)
            .map(|r| r.center_index);
        let targets: BTreeSet<i32> = self
            .action_locations
            .iter()
            .chain(&self.starting_locations)
            .copied()
            .chain(hubs)
            .collect();

        let mut unreachable = Vec::new();
        for &start in &self.starting_locations {
            let reached = walkable_from(&self.grid, start);
            for &target in &targets {
                let visited = reached[target as usize]
                    || Direction::ALL
                        .iter()
                        .filter_map(|&d| self.grid.neighbor(target, d))
                        .any(|n| reached[n as usize]);
                if !visited {
                    warn!(start, target, "no way from a starting castle to an action location");
                    unreachable.push((start, target));
                }
            }
        }
        unreachable
    }

    fn bake_metadata(&mut self) {
        for node in self.grid.nodes() {
            self.writer.map.tile_mut(node.index).metadata = node.node_type.code() + 100 * node.region;
        }
    }
}

/// Tile of `region` closest to `target`.
fn nearest_region_tile(grid: &NodeGrid, region: &Region, target: i32) -> i32 {
    let (tx, ty) = grid.coords(target);
    region
        .nodes
        .iter()
        .copied()
        .min_by_key(|&index| {
            let (x, y) = grid.coords(index);
            (x - tx) * (x - tx) + (y - ty) * (y - ty)
        })
        .unwrap_or(region.center_index)
}

/// Distinct land regions other than the tile's own around it.
fn foreign_regions_around(grid: &NodeGrid, index: i32) -> usize {
    let own = grid.node(index).region;
    Direction::ALL
        .iter()
        .filter_map(|&d| grid.neighbor(index, d))
        .map(|n| grid.node(n).region)
        .filter(|&region| region != own && region != WATER_REGION)
        .collect::<BTreeSet<_>>()
        .len()
}

fn next_to_road(grid: &NodeGrid, index: i32) -> bool {
    Direction::ALL
        .iter()
        .filter_map(|&d| grid.neighbor(index, d))
        .any(|n| grid.node(n).node_type == NodeType::Path)
}

fn decoration_fits(
    grid: &NodeGrid,
    catalog: &ObjectCatalog,
    decoration: &DecorationSet,
    center: i32,
    ground: Ground,
) -> bool {
    let region = grid.node(center).region;
    let mut footprint = BTreeSet::new();
    for object in &decoration.objects {
        let index = select_terrain_variant(object.group, object.index, ground);
        let Some(info) = catalog.get(object.group, index) else {
            return false;
        };
        for (dx, dy) in info.occupied_offsets().chain(info.top_offsets()) {
            footprint.insert((object.offset.0 + dx, object.offset.1 + dy));
        }
    }

    footprint.iter().all(|&(x, y)| {
        (-1..=1).all(|dy| {
            (-1..=1).all(|dx| {
                let node = grid.node_offset(center, (x + dx, y + dy));
                node.is_valid() && node.region == region && node.node_type == NodeType::Open
            })
        })
    })
}

/// Tiles a hero can walk to from `start`, moving in eight directions over land
/// that no object blocks.
fn walkable_from(grid: &NodeGrid, start: i32) -> Vec<bool> {
    let mut reached = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    reached[start as usize] = true;
    queue.push_back(start);

    while let Some(index) = queue.pop_front() {
        for direction in Direction::ALL {
            let Some(next) = grid.neighbor(index, direction) else {
                continue;
            };
            let node = grid.node(next);
            if reached[next as usize]
                || node.region == WATER_REGION
                || matches!(node.node_type, NodeType::Obstacle | NodeType::Action)
            {
                continue;
            }
            reached[next as usize] = true;
            queue.push_back(next);
        }
    }

    reached
}
