//! In-memory adventure map store and its reference data.
//!
//! The generator only talks to the world through this module: ground types,
//! the object catalog, the object id allocator and the `MapFormat` tile store.

pub mod catalog;
pub mod ground;
pub mod map_format;
pub mod monster;
pub mod object_uid;

use serde::{Deserialize, Serialize};

pub use catalog::{LayerType, ObjectCatalog, ObjectGroup, ObjectInfo, ObjectPart, ObjectType};
pub use ground::Ground;
pub use map_format::{CastleMetadata, MapFormat, MonsterMetadata, PlayerSettings, TileInfo, TileObject};
pub use monster::Monster;
pub use object_uid::ObjectIdAllocator;

/// Player colors in turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerColor {
    Blue,
    Green,
    Red,
    Yellow,
    Orange,
    Purple,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 6] = [
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Red,
        PlayerColor::Yellow,
        PlayerColor::Orange,
        PlayerColor::Purple,
    ];

    /// Index used by colored sprite groups. Neutral objects use `PlayerColor::NEUTRAL_INDEX`.
    pub const NEUTRAL_INDEX: usize = 6;

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Blue => "Blue",
            PlayerColor::Green => "Green",
            PlayerColor::Red => "Red",
            PlayerColor::Yellow => "Yellow",
            PlayerColor::Orange => "Orange",
            PlayerColor::Purple => "Purple",
        }
    }
}

/// Castle factions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Race {
    Knight,
    Barbarian,
    Sorceress,
    Warlock,
    Wizard,
    Necromancer,
    Random,
}

impl Race {
    pub const PLAYABLE: [Race; 6] = [
        Race::Knight,
        Race::Barbarian,
        Race::Sorceress,
        Race::Warlock,
        Race::Wizard,
        Race::Necromancer,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0..=5 => Some(Self::PLAYABLE[index]),
            6 => Some(Race::Random),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Mineable and collectable resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Ore,
    Crystal,
    Sulfur,
    Gems,
    Mercury,
    Gold,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Wood,
        Resource::Ore,
        Resource::Crystal,
        Resource::Sulfur,
        Resource::Gems,
        Resource::Mercury,
        Resource::Gold,
    ];

    /// Rare resources that secondary mines rotate through.
    pub const SECONDARY: [Resource; 4] = [
        Resource::Crystal,
        Resource::Sulfur,
        Resource::Gems,
        Resource::Mercury,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Ore => "ore",
            Resource::Crystal => "crystal",
            Resource::Sulfur => "sulfur",
            Resource::Gems => "gems",
            Resource::Mercury => "mercury",
            Resource::Gold => "gold",
        }
    }
}
