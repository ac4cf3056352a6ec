//! Object prototype catalog.
//!
//! Every placeable map object is addressed by `(ObjectGroup, index)`. An entry
//! describes the object's footprint as a list of parts relative to its anchor
//! tile: ground-level parts (the first one is the anchor itself) and top-level
//! parts drawn above other objects. Indexing helpers at the bottom of this file
//! keep the generator free of magic sprite numbers.

use serde::{Deserialize, Serialize};

use super::{Ground, Monster, PlayerColor, Race, Resource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectGroup {
    LandscapeTrees,
    LandscapeMountains,
    LandscapeRocks,
    LandscapeLakes,
    LandscapeTownBasements,
    LandscapeFlags,
    LandscapeRiverDeltas,
    KingdomTowns,
    KingdomHeroes,
    AdventureMines,
    AdventureTreasures,
    AdventureArtifacts,
    AdventurePowerUps,
    AdventureDwellings,
    Monsters,
}

impl ObjectGroup {
    pub const COUNT: usize = ObjectGroup::Monsters as usize + 1;
}

/// Drawing layer of an object part. Only `Object` parts occupy a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerType {
    Object,
    Background,
    Shadow,
    Terrain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    None,
    Tree,
    Mountain,
    Rock,
    Lake,
    TownBasement,
    Flag,
    RiverDelta,
    Castle,
    Town,
    Hero,
    Sawmill,
    Mine,
    AlchemistLab,
    GoldMine,
    Resource,
    RandomResource,
    Campfire,
    TreasureChest,
    GenieLamp,
    RandomArtifact,
    RandomArtifactTreasure,
    RandomArtifactMinor,
    RandomArtifactMajor,
    Fort,
    Gazebo,
    MercenaryCamp,
    ShrineFirstCircle,
    ShrineSecondCircle,
    ShrineThirdCircle,
    StandingStones,
    TreeOfKnowledge,
    WitchDoctorsHut,
    Xanadu,
    PeasantHut,
    ArcherHouse,
    GoblinHut,
    DwarfCottage,
    HalflingHole,
    TreeHouse,
    WatchTower,
    Excavation,
    Cave,
    DesertTent,
    TreeCity,
    Ruins,
    WagonCamp,
    Monster,
}

impl ObjectType {
    /// Anything a hero can interact with.
    pub fn is_action(self) -> bool {
        !matches!(
            self,
            ObjectType::None
                | ObjectType::Tree
                | ObjectType::Mountain
                | ObjectType::Rock
                | ObjectType::Lake
                | ObjectType::TownBasement
                | ObjectType::Flag
                | ObjectType::RiverDelta
        )
    }

    /// Action objects that stay on the map after a visit and are entered from the tile below.
    pub fn is_stationary_action(self) -> bool {
        self.is_action() && !self.is_pickup() && !matches!(self, ObjectType::Monster | ObjectType::Hero)
    }

    /// Objects removed from the map once collected.
    pub fn is_pickup(self) -> bool {
        matches!(
            self,
            ObjectType::Resource
                | ObjectType::RandomResource
                | ObjectType::Campfire
                | ObjectType::TreasureChest
                | ObjectType::GenieLamp
                | ObjectType::RandomArtifact
                | ObjectType::RandomArtifactTreasure
                | ObjectType::RandomArtifactMinor
                | ObjectType::RandomArtifactMajor
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectPart {
    pub offset: (i32, i32),
    pub layer: LayerType,
    pub object_type: ObjectType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Ground-level parts. The first one is the anchor at offset (0, 0).
    pub ground_parts: Vec<ObjectPart>,
    pub top_parts: Vec<ObjectPart>,
    pub object_type: ObjectType,
    /// Object-specific extras: resource, race, color or monster index.
    pub metadata: [u32; 3],
}

impl ObjectInfo {
    pub fn main_part(&self) -> &ObjectPart {
        &self.ground_parts[0]
    }

    /// Offsets of the ground parts that block a tile (shadow and terrain layers excluded).
    pub fn occupied_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.ground_parts
            .iter()
            .filter(|part| matches!(part.layer, LayerType::Object | LayerType::Background))
            .map(|part| part.offset)
    }

    pub fn top_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.top_parts.iter().map(|part| part.offset)
    }
}

/// Read-only catalog of every object prototype, indexed by group then sprite index.
#[derive(Clone, Debug)]
pub struct ObjectCatalog {
    groups: Vec<Vec<ObjectInfo>>,
}

pub const TREE_VARIANTS: usize = 6;
pub const MOUNTAIN_VARIANTS: usize = 6;
pub const ROCK_VARIANTS: usize = 4;
pub const LAKE_VARIANTS: usize = 3;

pub const RANDOM_RESOURCE: i32 = 7;
pub const CAMPFIRE: i32 = 8;
pub const TREASURE_CHEST: i32 = 9;

pub const ARTIFACT_TREASURE: i32 = 1;
pub const ARTIFACT_MINOR: i32 = 2;
pub const ARTIFACT_MAJOR: i32 = 3;

/// Power-ups in sprite order.
pub const POWER_UPS: [ObjectType; 10] = [
    ObjectType::Fort,
    ObjectType::Gazebo,
    ObjectType::MercenaryCamp,
    ObjectType::ShrineFirstCircle,
    ObjectType::ShrineSecondCircle,
    ObjectType::ShrineThirdCircle,
    ObjectType::StandingStones,
    ObjectType::TreeOfKnowledge,
    ObjectType::WitchDoctorsHut,
    ObjectType::Xanadu,
];

/// Creature dwellings in sprite order.
pub const DWELLINGS: [ObjectType; 13] = [
    ObjectType::PeasantHut,
    ObjectType::ArcherHouse,
    ObjectType::GoblinHut,
    ObjectType::DwarfCottage,
    ObjectType::HalflingHole,
    ObjectType::TreeHouse,
    ObjectType::WatchTower,
    ObjectType::Excavation,
    ObjectType::Cave,
    ObjectType::DesertTent,
    ObjectType::TreeCity,
    ObjectType::Ruins,
    ObjectType::WagonCamp,
];

const TREE_SHAPES: [Shape; TREE_VARIANTS] = [
    Shape { ground: &[(0, 0)], top: &[(0, -1)], shadow: &[(-1, 0)] },
    Shape { ground: &[(0, 0), (1, 0)], top: &[(0, -1), (1, -1)], shadow: &[(-1, 0)] },
    Shape { ground: &[(0, 0), (1, 0), (2, 0)], top: &[(1, -1)], shadow: &[] },
    Shape { ground: &[(0, 0), (1, 0), (0, -1), (1, -1)], top: &[(0, -2), (1, -2)], shadow: &[] },
    Shape { ground: &[(0, 0), (-1, 0)], top: &[(-1, -1), (0, -1)], shadow: &[(-2, 0)] },
    Shape { ground: &[(0, 0), (1, 0), (2, 0), (1, -1)], top: &[(1, -2)], shadow: &[] },
];

const MOUNTAIN_SHAPES: [Shape; MOUNTAIN_VARIANTS] = [
    Shape { ground: &[(0, 0), (1, 0), (-1, 0), (0, -1)], top: &[(0, -2)], shadow: &[(-2, 0)] },
    Shape {
        ground: &[(0, 0), (1, 0), (2, 0), (0, -1), (1, -1), (2, -1)],
        top: &[(1, -2)],
        shadow: &[],
    },
    Shape {
        ground: &[(0, 0), (-1, 0), (1, 0), (-1, -1), (0, -1), (1, -1)],
        top: &[(-1, -2), (0, -2), (1, -2)],
        shadow: &[(-2, 0)],
    },
    Shape { ground: &[(0, 0), (1, 0)], top: &[(0, -1), (1, -1)], shadow: &[] },
    Shape {
        ground: &[(0, 0), (1, 0), (2, 0), (3, 0), (1, -1), (2, -1)],
        top: &[(1, -2), (2, -2)],
        shadow: &[],
    },
    Shape { ground: &[(0, 0), (-1, 0), (0, -1)], top: &[(0, -2)], shadow: &[(-2, 0)] },
];

const ROCK_SHAPES: [Shape; ROCK_VARIANTS] = [
    Shape { ground: &[(0, 0)], top: &[], shadow: &[(-1, 0)] },
    Shape { ground: &[(0, 0), (1, 0)], top: &[], shadow: &[] },
    Shape { ground: &[(0, 0), (-1, 0)], top: &[], shadow: &[] },
    Shape { ground: &[(0, 0), (1, 0), (0, -1)], top: &[], shadow: &[] },
];

const LAKE_SHAPES: [Shape; LAKE_VARIANTS] = [
    Shape { ground: &[(0, 0), (1, 0)], top: &[], shadow: &[] },
    Shape { ground: &[(0, 0), (1, 0), (2, 0), (0, -1), (1, -1), (2, -1)], top: &[], shadow: &[] },
    Shape { ground: &[(0, 0), (-1, 0), (1, 0), (0, -1)], top: &[], shadow: &[] },
];

const CASTLE_SHAPE: Shape = Shape {
    ground: &[
        (0, 0), (-2, 0), (-1, 0), (1, 0), (2, 0),
        (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1),
    ],
    top: &[
        (-2, -2), (-1, -2), (0, -2), (1, -2), (2, -2),
        (-1, -3), (0, -3), (1, -3),
    ],
    shadow: &[(-3, 0), (-3, -1)],
};

const MINE_SHAPE: Shape = Shape {
    ground: &[(0, 0), (-1, 0), (1, 0), (-1, -1), (0, -1), (1, -1)],
    top: &[],
    shadow: &[(-2, 0)],
};

const SAWMILL_SHAPE: Shape = Shape {
    ground: &[(0, 0), (-1, 0), (1, 0), (0, -1)],
    top: &[(-1, -1)],
    shadow: &[(-2, 0)],
};

const SINGLE_TILE: Shape = Shape { ground: &[(0, 0)], top: &[], shadow: &[] };
const SINGLE_WITH_TOP: Shape = Shape { ground: &[(0, 0)], top: &[(0, -1)], shadow: &[] };
const WIDE_LEFT: Shape = Shape { ground: &[(0, 0), (-1, 0)], top: &[(0, -1)], shadow: &[] };
const WIDE_THREE: Shape = Shape { ground: &[(0, 0), (-1, 0), (1, 0)], top: &[(0, -1)], shadow: &[] };
const BLOCK_THREE_BY_TWO: Shape = Shape {
    ground: &[(0, 0), (-1, 0), (1, 0), (-1, -1), (0, -1), (1, -1)],
    top: &[(0, -2)],
    shadow: &[],
};

/// Compact footprint description used to build catalog entries.
struct Shape {
    ground: &'static [(i32, i32)],
    top: &'static [(i32, i32)],
    shadow: &'static [(i32, i32)],
}

impl Shape {
    fn build(&self, object_type: ObjectType, layer: LayerType, metadata: [u32; 3]) -> ObjectInfo {
        let mut ground_parts: Vec<ObjectPart> = self
            .ground
            .iter()
            .map(|&offset| ObjectPart { offset, layer, object_type })
            .collect();
        ground_parts.extend(self.shadow.iter().map(|&offset| ObjectPart {
            offset,
            layer: LayerType::Shadow,
            object_type: ObjectType::None,
        }));

        let top_parts = self
            .top
            .iter()
            .map(|&offset| ObjectPart { offset, layer: LayerType::Object, object_type })
            .collect();

        debug_assert_eq!(self.ground[0], (0, 0));

        ObjectInfo { ground_parts, top_parts, object_type, metadata }
    }
}

fn power_up_shape(object_type: ObjectType) -> &'static Shape {
    match object_type {
        ObjectType::Fort | ObjectType::Xanadu => &BLOCK_THREE_BY_TWO,
        ObjectType::MercenaryCamp | ObjectType::StandingStones => &WIDE_THREE,
        ObjectType::Gazebo | ObjectType::TreeOfKnowledge | ObjectType::WitchDoctorsHut => &WIDE_LEFT,
        _ => &SINGLE_WITH_TOP,
    }
}

fn dwelling_shape(object_type: ObjectType) -> &'static Shape {
    match object_type {
        ObjectType::TreeCity | ObjectType::Ruins | ObjectType::Excavation => &WIDE_THREE,
        ObjectType::PeasantHut | ObjectType::GoblinHut | ObjectType::HalflingHole => &SINGLE_WITH_TOP,
        _ => &WIDE_LEFT,
    }
}

fn mine_type(resource: Resource) -> ObjectType {
    match resource {
        Resource::Wood => ObjectType::Sawmill,
        Resource::Mercury => ObjectType::AlchemistLab,
        Resource::Gold => ObjectType::GoldMine,
        _ => ObjectType::Mine,
    }
}

impl ObjectCatalog {
    /// The built-in object set.
    pub fn standard() -> Self {
        let mut groups: Vec<Vec<ObjectInfo>> = vec![Vec::new(); ObjectGroup::COUNT];
        let object = LayerType::Object;

        for _ground in 0..Ground::LAND_COUNT {
            for shape in &TREE_SHAPES {
                groups[ObjectGroup::LandscapeTrees as usize].push(shape.build(ObjectType::Tree, object, [0; 3]));
            }
            for shape in &MOUNTAIN_SHAPES {
                groups[ObjectGroup::LandscapeMountains as usize]
                    .push(shape.build(ObjectType::Mountain, object, [0; 3]));
            }
        }

        for shape in &ROCK_SHAPES {
            groups[ObjectGroup::LandscapeRocks as usize].push(shape.build(ObjectType::Rock, object, [0; 3]));
        }
        for shape in &LAKE_SHAPES {
            groups[ObjectGroup::LandscapeLakes as usize].push(shape.build(ObjectType::Lake, object, [0; 3]));
        }

        let basement = Shape {
            ground: &[(0, 0), (-3, 0), (-2, 0), (-1, 0), (1, 0), (2, 0), (3, 0), (-2, 1), (-1, 1), (1, 1), (2, 1)],
            top: &[],
            shadow: &[],
        };
        for ground in Ground::ALL {
            groups[ObjectGroup::LandscapeTownBasements as usize].push(basement.build(
                ObjectType::TownBasement,
                LayerType::Terrain,
                [ground.index() as u32, 0, 0],
            ));
        }

        for color in 0..=PlayerColor::NEUTRAL_INDEX {
            for side in 0..2 {
                groups[ObjectGroup::LandscapeFlags as usize].push(SINGLE_TILE.build(
                    ObjectType::Flag,
                    LayerType::Background,
                    [color as u32, side, 0],
                ));
            }
        }

        for direction in 0..4 {
            groups[ObjectGroup::LandscapeRiverDeltas as usize].push(SINGLE_TILE.build(
                ObjectType::RiverDelta,
                LayerType::Background,
                [direction, 0, 0],
            ));
        }

        for race in Race::PLAYABLE.iter().copied().chain(std::iter::once(Race::Random)) {
            for (object_type, is_castle) in [(ObjectType::Castle, 1), (ObjectType::Town, 0)] {
                groups[ObjectGroup::KingdomTowns as usize].push(CASTLE_SHAPE.build(
                    object_type,
                    object,
                    [race.index() as u32, is_castle, 0],
                ));
            }
        }

        for color in PlayerColor::ALL {
            groups[ObjectGroup::KingdomHeroes as usize].push(SINGLE_TILE.build(
                ObjectType::Hero,
                object,
                [color.index() as u32, 0, 0],
            ));
        }

        for resource in Resource::ALL {
            let object_type = mine_type(resource);
            let shape = if object_type == ObjectType::Sawmill { &SAWMILL_SHAPE } else { &MINE_SHAPE };
            for ground in 1..Ground::COUNT {
                groups[ObjectGroup::AdventureMines as usize].push(shape.build(
                    object_type,
                    object,
                    [resource.index() as u32, ground as u32, 0],
                ));
            }
        }

        let treasures = &mut groups[ObjectGroup::AdventureTreasures as usize];
        for resource in Resource::ALL {
            treasures.push(SINGLE_TILE.build(ObjectType::Resource, object, [resource.index() as u32, 0, 0]));
        }
        for object_type in [
            ObjectType::RandomResource,
            ObjectType::Campfire,
            ObjectType::TreasureChest,
            ObjectType::GenieLamp,
        ] {
            treasures.push(SINGLE_TILE.build(object_type, object, [0; 3]));
        }

        for object_type in [
            ObjectType::RandomArtifact,
            ObjectType::RandomArtifactTreasure,
            ObjectType::RandomArtifactMinor,
            ObjectType::RandomArtifactMajor,
        ] {
            groups[ObjectGroup::AdventureArtifacts as usize].push(SINGLE_TILE.build(object_type, object, [0; 3]));
        }

        for object_type in POWER_UPS {
            groups[ObjectGroup::AdventurePowerUps as usize]
                .push(power_up_shape(object_type).build(object_type, object, [0; 3]));
        }
        for object_type in DWELLINGS {
            groups[ObjectGroup::AdventureDwellings as usize]
                .push(dwelling_shape(object_type).build(object_type, object, [0; 3]));
        }

        for index in 0..Monster::COUNT {
            groups[ObjectGroup::Monsters as usize].push(SINGLE_TILE.build(
                ObjectType::Monster,
                object,
                [index as u32, 0, 0],
            ));
        }

        Self { groups }
    }

    /// Look up an object prototype. `None` means the index does not exist in the group.
    pub fn get(&self, group: ObjectGroup, index: i32) -> Option<&ObjectInfo> {
        if index < 0 {
            return None;
        }
        self.groups[group as usize].get(index as usize)
    }
}

impl Default for ObjectCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn tree_index(ground: Ground, variant: usize) -> Option<i32> {
    ground
        .land_index()
        .map(|land| (land * TREE_VARIANTS + variant % TREE_VARIANTS) as i32)
}

pub fn mountain_index(ground: Ground, variant: usize) -> Option<i32> {
    ground
        .land_index()
        .map(|land| (land * MOUNTAIN_VARIANTS + variant % MOUNTAIN_VARIANTS) as i32)
}

pub fn basement_index(ground: Ground) -> i32 {
    ground.index() as i32
}

/// Flag sprite for an owner; `right` selects the flag on the right side of the gate.
pub fn flag_index(owner: Option<PlayerColor>, right: bool) -> i32 {
    let color = owner.map_or(PlayerColor::NEUTRAL_INDEX, PlayerColor::index);
    (color * 2 + usize::from(right)) as i32
}

pub fn town_index(race: Race, is_castle: bool) -> i32 {
    (race.index() * 2 + usize::from(!is_castle)) as i32
}

pub fn hero_index(color: PlayerColor) -> i32 {
    color.index() as i32
}

pub fn mine_index(resource: Resource, ground: Ground) -> Option<i32> {
    ground
        .land_index()
        .map(|land| (resource.index() * Ground::LAND_COUNT + land) as i32)
}

pub fn dwelling_index(object_type: ObjectType) -> Option<i32> {
    DWELLINGS.iter().position(|&t| t == object_type).map(|i| i as i32)
}

pub fn monster_index(monster: Monster) -> i32 {
    monster.index() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_has_anchor_first() {
        let catalog = ObjectCatalog::standard();
        for group_index in 0..ObjectGroup::COUNT {
            for info in &catalog.groups[group_index] {
                assert!(!info.ground_parts.is_empty());
                assert_eq!(info.main_part().offset, (0, 0));
            }
        }
    }

    #[test]
    fn test_indexing_helpers_resolve() {
        let catalog = ObjectCatalog::standard();

        let mine = catalog.get(ObjectGroup::AdventureMines, mine_index(Resource::Mercury, Ground::Swamp).unwrap()).unwrap();
        assert_eq!(mine.object_type, ObjectType::AlchemistLab);
        assert_eq!(mine.metadata[0], Resource::Mercury.index() as u32);
        assert_eq!(mine.metadata[1], Ground::Swamp.index() as u32);

        let town = catalog.get(ObjectGroup::KingdomTowns, town_index(Race::Random, false)).unwrap();
        assert_eq!(town.object_type, ObjectType::Town);
        assert_eq!(town_index(Race::Random, true), 12);

        let flag = catalog.get(ObjectGroup::LandscapeFlags, flag_index(None, true)).unwrap();
        assert_eq!(flag.metadata, [PlayerColor::NEUTRAL_INDEX as u32, 1, 0]);

        assert!(catalog.get(ObjectGroup::Monsters, monster_index(Monster::RandomMonsterLevel4)).is_some());
        assert!(catalog.get(ObjectGroup::LandscapeTrees, tree_index(Ground::Beach, 5).unwrap()).is_some());
        assert!(mine_index(Resource::Gold, Ground::Water).is_none());
    }

    #[test]
    fn test_invalid_index_is_none() {
        let catalog = ObjectCatalog::standard();
        assert!(catalog.get(ObjectGroup::AdventurePowerUps, -1).is_none());
        assert!(catalog.get(ObjectGroup::AdventurePowerUps, POWER_UPS.len() as i32).is_none());
    }

    #[test]
    fn test_action_classes() {
        assert!(ObjectType::Mine.is_stationary_action());
        assert!(ObjectType::Castle.is_stationary_action());
        assert!(ObjectType::TreasureChest.is_action());
        assert!(!ObjectType::TreasureChest.is_stationary_action());
        assert!(!ObjectType::Monster.is_stationary_action());
        assert!(!ObjectType::Tree.is_action());
    }

    #[test]
    fn test_shadow_parts_do_not_occupy() {
        let catalog = ObjectCatalog::standard();
        let tree = catalog.get(ObjectGroup::LandscapeTrees, 0).unwrap();
        let occupied: Vec<_> = tree.occupied_offsets().collect();
        assert_eq!(occupied, vec![(0, 0)]);
        assert_eq!(tree.ground_parts.len(), 2);
    }
}
