//! Terrain ground types and the per-ground lookup tables used by the generator.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ground {
    #[default]
    Water,
    Grass,
    Snow,
    Swamp,
    Lava,
    Desert,
    Dirt,
    Wasteland,
    Beach,
}

/// Grounds a player's starting region may be painted with.
pub const PLAYER_STARTING_TERRAIN: [Ground; 5] = [
    Ground::Grass,
    Ground::Dirt,
    Ground::Snow,
    Ground::Lava,
    Ground::Wasteland,
];

/// Grounds available to neutral and expansion regions.
pub const NEUTRAL_TERRAIN: [Ground; 8] = [
    Ground::Grass,
    Ground::Dirt,
    Ground::Snow,
    Ground::Lava,
    Ground::Wasteland,
    Ground::Beach,
    Ground::Swamp,
    Ground::Desert,
];

/// Number of plain (non-transition) terrain images per ground.
pub const TERRAIN_IMAGE_VARIANTS: u16 = 16;

/// Percent chance that a border obstacle is a mountain rather than a tree, by ground index.
const MOUNTAIN_SHARE: [u32; Ground::COUNT] = [0, 30, 50, 10, 70, 40, 40, 60, 20];

/// Castle faction that fits each ground best, by ground index. Water has none.
const NATIVE_RACE: [Option<crate::world::Race>; Ground::COUNT] = {
    use crate::world::Race::*;
    [
        None,
        Some(Knight),
        Some(Wizard),
        Some(Warlock),
        Some(Necromancer),
        Some(Barbarian),
        Some(Sorceress),
        Some(Warlock),
        Some(Knight),
    ]
};

impl Ground {
    pub const COUNT: usize = 9;

    pub const ALL: [Ground; Ground::COUNT] = [
        Ground::Water,
        Ground::Grass,
        Ground::Snow,
        Ground::Swamp,
        Ground::Lava,
        Ground::Desert,
        Ground::Dirt,
        Ground::Wasteland,
        Ground::Beach,
    ];

    pub const LAND_COUNT: usize = Ground::COUNT - 1;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_water(self) -> bool {
        self == Ground::Water
    }

    /// Position among land grounds, used to pick ground-specific sprite variants.
    pub fn land_index(self) -> Option<usize> {
        if self.is_water() {
            None
        } else {
            Some(self.index() - 1)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Ground::Water => "Water",
            Ground::Grass => "Grass",
            Ground::Snow => "Snow",
            Ground::Swamp => "Swamp",
            Ground::Lava => "Lava",
            Ground::Desert => "Desert",
            Ground::Dirt => "Dirt",
            Ground::Wasteland => "Wasteland",
            Ground::Beach => "Beach",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.name().eq_ignore_ascii_case(s))
    }

    /// First plain terrain image of this ground.
    pub fn terrain_image_base(self) -> u16 {
        self.index() as u16 * TERRAIN_IMAGE_VARIANTS * 2
    }

    pub fn mountain_share(self) -> u32 {
        MOUNTAIN_SHARE[self.index()]
    }

    pub fn native_race(self) -> Option<crate::world::Race> {
        NATIVE_RACE[self.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_land_index_skips_water() {
        assert_eq!(Ground::Water.land_index(), None);
        assert_eq!(Ground::Grass.land_index(), Some(0));
        assert_eq!(Ground::Beach.land_index(), Some(Ground::LAND_COUNT - 1));
    }

    #[test]
    fn test_terrain_lists_are_land() {
        assert!(PLAYER_STARTING_TERRAIN.iter().all(|g| !g.is_water()));
        assert!(NEUTRAL_TERRAIN.iter().all(|g| !g.is_water()));
        for ground in PLAYER_STARTING_TERRAIN {
            assert!(NEUTRAL_TERRAIN.contains(&ground));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Ground::from_str("lava"), Some(Ground::Lava));
        assert_eq!(Ground::from_str("lava2"), None);
    }
}
