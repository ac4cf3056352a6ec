//! Persistent adventure map store.
//!
//! Holds per-tile terrain, roads, streams and object parts, plus the
//! metadata tables for castles, monsters and heroes keyed by object id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{flag_index, LayerType, ObjectCatalog, ObjectGroup, ObjectInfo, ObjectType};
use super::{Ground, Monster, ObjectIdAllocator, PlayerColor, Race};
use crate::tilemap::Tilemap;

/// Neighbour offsets used for terrain transition masks: top, right, bottom,
/// left, then the four diagonals clockwise from top-left.
const TRANSITION_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, -1),
    (1, 1),
    (-1, 1),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileObject {
    pub uid: u32,
    pub group: ObjectGroup,
    pub index: i32,
    pub layer: LayerType,
    /// True for the part sitting on the object's anchor tile.
    pub is_anchor: bool,
    /// Drawn above everything else; never blocks the tile.
    pub top_level: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TileInfo {
    pub ground: Ground,
    pub terrain_image: u16,
    /// Bit `d` is set when the neighbour in direction `d` has a different ground.
    pub transition: u8,
    pub objects: Vec<TileObject>,
    pub road: bool,
    pub stream: bool,
    /// The stream on this tile flows into a river delta.
    pub delta: bool,
    /// Generator bookkeeping: `node_type + 100 * region`.
    pub metadata: u32,
}

impl TileInfo {
    fn has_blocking_object(&self) -> bool {
        self.objects.iter().any(|o| o.layer == LayerType::Object && !o.top_level)
    }

    pub fn region(&self) -> u32 {
        self.metadata / 100
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CastleMetadata {
    pub tile: i32,
    pub owner: Option<PlayerColor>,
    pub race: Race,
    pub is_castle: bool,
    /// Neutral castles start with the faction's default garrison.
    pub default_defenders: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterMetadata {
    pub tile: i32,
    pub monster: Monster,
    /// Candidates the game may substitute for a random placeholder.
    pub allowed: Vec<Monster>,
    /// Stack size, 0 lets the game pick one.
    pub count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    pub available: Vec<PlayerColor>,
    pub human: Vec<PlayerColor>,
    pub computer: Vec<PlayerColor>,
    pub races: BTreeMap<PlayerColor, Race>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapFormat {
    pub size: usize,
    pub tiles: Tilemap<TileInfo>,
    pub castles: BTreeMap<u32, CastleMetadata>,
    pub monsters: BTreeMap<u32, MonsterMetadata>,
    pub heroes: BTreeMap<u32, PlayerColor>,
    pub players: PlayerSettings,
    pub name: String,
    pub description: String,
}

impl MapFormat {
    /// A square map of open water.
    pub fn new(size: usize) -> Self {
        let tiles = Tilemap::from_fn(size, size, |index| TileInfo {
            terrain_image: Ground::Water.terrain_image_base() + plain_variant(index),
            ..TileInfo::default()
        });

        Self {
            size,
            tiles,
            castles: BTreeMap::new(),
            monsters: BTreeMap::new(),
            heroes: BTreeMap::new(),
            players: PlayerSettings::default(),
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, index: i32) -> &TileInfo {
        self.tiles.at(index as usize)
    }

    pub fn tile_mut(&mut self, index: i32) -> &mut TileInfo {
        self.tiles.at_mut(index as usize)
    }

    fn offset_index(&self, index: i32, (dx, dy): (i32, i32)) -> Option<i32> {
        let (x, y) = self.tiles.coords(index as usize);
        self.tiles
            .index_of(x as i32 + dx, y as i32 + dy)
            .map(|i| i as i32)
    }

    /// Paint a plain terrain image. Transitions are left untouched.
    pub fn set_terrain_on_tile(&mut self, index: i32, ground: Ground) {
        let tile = self.tile_mut(index);
        tile.ground = ground;
        tile.terrain_image = ground.terrain_image_base() + plain_variant(index as usize);
    }

    /// Paint a tile and refresh the transition masks of the tile and its neighbours.
    pub fn set_terrain_with_transition(&mut self, index: i32, ground: Ground) {
        self.set_terrain_on_tile(index, ground);
        self.update_transition(index);
        for offset in TRANSITION_OFFSETS {
            if let Some(neighbour) = self.offset_index(index, offset) {
                self.update_transition(neighbour);
            }
        }
    }

    fn update_transition(&mut self, index: i32) {
        let ground = self.tile(index).ground;
        let mut mask = 0u8;
        for (bit, offset) in TRANSITION_OFFSETS.iter().enumerate() {
            if let Some(neighbour) = self.offset_index(index, *offset) {
                if self.tile(neighbour).ground != ground {
                    mask |= 1 << bit;
                }
            }
        }
        self.tile_mut(index).transition = mask;
    }

    /// Write every part of `info` around `index`. Fails without writing anything if an
    /// occupying part falls off the map or onto another occupying part.
    pub fn set_object_on_tile(
        &mut self,
        index: i32,
        info: &ObjectInfo,
        uid: u32,
        group: ObjectGroup,
        object_index: i32,
    ) -> bool {
        for part in &info.ground_parts {
            if part.layer != LayerType::Object {
                continue;
            }
            match self.offset_index(index, part.offset) {
                Some(target) if !self.tile(target).has_blocking_object() => {}
                _ => return false,
            }
        }

        let ground_parts = info
            .ground_parts
            .iter()
            .filter(|part| part.layer != LayerType::Shadow)
            .map(|part| (part, false));
        let top_parts = info.top_parts.iter().map(|part| (part, true));
        for (part, top_level) in ground_parts.chain(top_parts) {
            if let Some(target) = self.offset_index(index, part.offset) {
                self.tile_mut(target).objects.push(TileObject {
                    uid,
                    group,
                    index: object_index,
                    layer: part.layer,
                    is_anchor: !top_level && part.offset == (0, 0) && part.layer == info.main_part().layer,
                    top_level,
                });
            }
        }

        true
    }

    /// Look up an object prototype, give it a fresh id and write it to the map.
    /// Returns the id, or `None` when the prototype is unknown or the tiles are taken.
    pub fn add_object_to_map(
        &mut self,
        catalog: &ObjectCatalog,
        uids: &mut ObjectIdAllocator,
        index: i32,
        group: ObjectGroup,
        object_index: i32,
    ) -> Option<u32> {
        let info = catalog.get(group, object_index)?;
        let uid = uids.allocate();
        if !self.set_object_on_tile(index, info, uid, group, object_index) {
            uids.rewind_to(uid);
            return None;
        }

        match info.object_type {
            ObjectType::Castle | ObjectType::Town => {
                let race = Race::from_index(info.metadata[0] as usize).unwrap_or(Race::Random);
                self.castles.insert(
                    uid,
                    CastleMetadata {
                        tile: index,
                        owner: None,
                        race,
                        is_castle: info.object_type == ObjectType::Castle,
                        default_defenders: false,
                    },
                );
            }
            ObjectType::Monster => {
                let monster = monster_from_index(info.metadata[0] as usize);
                self.monsters.insert(
                    uid,
                    MonsterMetadata { tile: index, monster, allowed: Vec::new(), count: 0 },
                );
            }
            ObjectType::Hero => {
                if let Some(color) = PlayerColor::from_index(info.metadata[0] as usize) {
                    self.heroes.insert(uid, color);
                }
            }
            _ => {}
        }

        Some(uid)
    }

    /// Take every part of object `uid` off the map along with its metadata.
    /// Returns how many parts were removed.
    pub fn remove_object(&mut self, uid: u32) -> usize {
        let mut removed = 0;
        for tile in self.tiles.values_mut() {
            let before = tile.objects.len();
            tile.objects.retain(|object| object.uid != uid);
            removed += before - tile.objects.len();
        }
        self.castles.remove(&uid);
        self.monsters.remove(&uid);
        self.heroes.remove(&uid);
        removed
    }

    /// Set or clear a road. Water never carries roads. Returns whether the tile changed.
    pub fn update_road_on_tile(&mut self, index: i32, set: bool) -> bool {
        let tile = self.tile_mut(index);
        if tile.ground.is_water() || tile.road == set {
            return false;
        }
        tile.road = set;
        true
    }

    pub fn does_contain_road(&self, index: i32) -> bool {
        self.tile(index).road
    }

    pub fn add_stream(&mut self, index: i32) -> bool {
        let tile = self.tile_mut(index);
        if tile.ground.is_water() || tile.stream {
            return false;
        }
        tile.stream = true;
        true
    }

    /// Mark the stream tile that empties into the delta on its water neighbour.
    pub fn connect_stream_to_delta(&mut self, index: i32) {
        let tile = self.tile_mut(index);
        tile.stream = true;
        tile.delta = true;
    }

    /// Recolor the gate flags of every castle to match its owner. Returns how many flags changed.
    pub fn update_player_related_objects(&mut self) -> usize {
        let mut changed = 0;
        let castles: Vec<(u32, CastleMetadata)> =
            self.castles.iter().map(|(uid, meta)| (*uid, meta.clone())).collect();

        for (uid, castle) in castles {
            for (side, dx) in [(false, -1), (true, 1)] {
                let Some(flag_tile) = self.offset_index(castle.tile, (dx, 0)) else {
                    continue;
                };
                let wanted = flag_index(castle.owner, side);
                for object in &mut self.tile_mut(flag_tile).objects {
                    if object.uid == uid && object.group == ObjectGroup::LandscapeFlags && object.index != wanted {
                        object.index = wanted;
                        changed += 1;
                    }
                }
            }
        }

        changed
    }

    /// Rebuild the player table from owned castles and heroes.
    pub fn update_map_players(&mut self) {
        let mut settings = PlayerSettings::default();

        for castle in self.castles.values() {
            if let Some(color) = castle.owner {
                settings.races.entry(color).or_insert(castle.race);
            }
        }
        for &color in self.heroes.values() {
            settings.races.entry(color).or_insert(Race::Random);
        }

        settings.available = settings.races.keys().copied().collect();
        settings.human = settings.available.clone();
        settings.computer = settings.available.clone();
        self.players = settings;
    }

    /// Object parts on a tile that belong to `group`.
    pub fn objects_in_group(&self, group: ObjectGroup) -> impl Iterator<Item = (i32, &TileObject)> + '_ {
        self.tiles.values().iter().enumerate().flat_map(move |(index, tile)| {
            tile.objects
                .iter()
                .filter(move |object| object.group == group && object.is_anchor)
                .map(move |object| (index as i32, object))
        })
    }
}

/// Deterministic pick among the plain images of a ground.
fn plain_variant(index: usize) -> u16 {
    ((index.wrapping_mul(2_654_435_761)) >> 7) as u16 % super::ground::TERRAIN_IMAGE_VARIANTS
}

fn monster_from_index(index: usize) -> Monster {
    // Catalog entries are built in discriminant order.
    MONSTERS_BY_INDEX.get(index).copied().unwrap_or(Monster::RandomMonster)
}

const MONSTERS_BY_INDEX: [Monster; Monster::COUNT] = {
    use Monster::*;
    [
        Peasant, Archer, Goblin, Sprite, Centaur, Halfling, Skeleton, Pikeman, Orc, Wolf, Dwarf,
        Gargoyle, Boar, Zombie, Rogue, VeteranPikeman, Elf, GrandElf, Griffin, Ogre, IronGolem,
        Mummy, Nomad, Swordsman, MasterSwordsman, Cavalry, Druid, Minotaur, OgreLord, Roc,
        Vampire, Medusa, EarthElement, AirElement, FireElement, WaterElement, Champion, Troll,
        WarTroll, Unicorn, Hydra, Mage, Lich, VampireLord, Ghost, Paladin, Cyclops, Giant, Genie,
        Phoenix, Archmage, PowerLich, Crusader, BoneDragon, GreenDragon, RedDragon, BlackDragon,
        Titan, RandomMonster, RandomMonsterLevel1, RandomMonsterLevel2, RandomMonsterLevel3,
        RandomMonsterLevel4,
    ]
};
