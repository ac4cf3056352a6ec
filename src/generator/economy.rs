//! Gold values, mine bookkeeping and guard selection.

use std::collections::BTreeMap;

use super::config::MonsterStrength;
use super::random::{self, GeneratorRng};
use crate::world::catalog::{
    ARTIFACT_MAJOR, ARTIFACT_MINOR, ARTIFACT_TREASURE, CAMPFIRE, RANDOM_RESOURCE, TREASURE_CHEST,
};
use crate::world::{Monster, ObjectGroup, ObjectType, Resource};

/// Cheapest valuable worth placing.
pub const MINIMAL_TREASURE_VALUE: i32 = 650;
/// Cap on the combined value of one treasure cluster.
pub const MAXIMUM_TREASURE_GROUP_VALUE: i32 = 14_000;

/// Counts mines per resource across the whole map so secondary mines stay balanced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapEconomy {
    mines_count: BTreeMap<Resource, u32>,
}

impl MapEconomy {
    pub fn new() -> Self {
        Self { mines_count: Resource::ALL.iter().map(|&r| (r, 0)).collect() }
    }

    pub fn increase_mine_count(&mut self, resource: Resource) {
        *self.mines_count.entry(resource).or_insert(0) += 1;
    }

    pub fn mine_count(&self, resource: Resource) -> u32 {
        self.mines_count.get(&resource).copied().unwrap_or(0)
    }

    pub fn mines_count(&self) -> &BTreeMap<Resource, u32> {
        &self.mines_count
    }

    /// The rare resource with the fewest mines so far; ties go to the earlier one.
    pub fn pick_next_mine_resource(&self) -> Resource {
        let mut best = Resource::SECONDARY[0];
        for resource in Resource::SECONDARY {
            if self.mine_count(resource) < self.mine_count(best) {
                best = resource;
            }
        }
        best
    }
}

impl Default for MapEconomy {
    fn default() -> Self {
        Self::new()
    }
}

/// Approximate gold-equivalent worth of an object.
pub fn object_gold_value(object_type: ObjectType) -> i32 {
    match object_type {
        ObjectType::Sawmill => 3500,
        ObjectType::Mine => 5000,
        ObjectType::AlchemistLab => 5000,
        ObjectType::GoldMine => 7500,

        ObjectType::Resource | ObjectType::RandomResource => 650,
        ObjectType::Campfire => 1000,
        ObjectType::TreasureChest => 1500,
        ObjectType::GenieLamp => 6000,
        ObjectType::RandomArtifact => 4500,
        ObjectType::RandomArtifactTreasure => 2000,
        ObjectType::RandomArtifactMinor => 4500,
        ObjectType::RandomArtifactMajor => 10_000,

        ObjectType::ShrineFirstCircle => 1000,
        ObjectType::Gazebo => 1500,
        ObjectType::ShrineSecondCircle
        | ObjectType::Fort
        | ObjectType::MercenaryCamp
        | ObjectType::StandingStones
        | ObjectType::WitchDoctorsHut => 2000,
        ObjectType::ShrineThirdCircle | ObjectType::TreeOfKnowledge => 3000,
        ObjectType::Xanadu => 5000,

        ObjectType::PeasantHut | ObjectType::GoblinHut | ObjectType::HalflingHole => 1500,
        ObjectType::ArcherHouse | ObjectType::WatchTower | ObjectType::WagonCamp => 2000,
        ObjectType::DwarfCottage | ObjectType::TreeHouse | ObjectType::DesertTent => 2500,
        ObjectType::Excavation | ObjectType::Cave => 3000,
        ObjectType::Ruins => 4000,
        ObjectType::TreeCity => 5000,

        _ => 0,
    }
}

/// A chosen guard: the monster to place, its tier and the roster the game may pick from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterSelection {
    pub tier: u8,
    pub monster: Monster,
    pub allowed: Vec<Monster>,
}

/// Lower value bound (exclusive) of tiers 1 to 7.
const TIER_THRESHOLDS: [i32; 7] = [750, 1500, 3000, 4500, 6000, 8500, 12_000];

/// Candidate roster and random-placeholder level of tiers 1 to 7.
const TIER_ROSTERS: [(&[Monster], u8); 7] = {
    use Monster::*;
    [
        (&[Peasant, Archer, Goblin, Sprite, Centaur, Halfling, Skeleton], 1),
        (&[Pikeman, Orc, Wolf, Dwarf, Gargoyle, Boar, Zombie, Rogue], 2),
        (&[VeteranPikeman, Elf, GrandElf, Griffin, Ogre, IronGolem, Mummy, Nomad, Swordsman], 2),
        (
            &[
                MasterSwordsman, Cavalry, Druid, Minotaur, OgreLord, Roc, Vampire, Medusa, EarthElement,
                AirElement, FireElement, WaterElement,
            ],
            3,
        ),
        (&[Champion, Troll, WarTroll, Unicorn, Hydra, Mage, Lich, VampireLord, Ghost, Paladin, Cyclops], 3),
        (&[Giant, Genie, Phoenix, Archmage, PowerLich, Crusader, BoneDragon], 4),
        (&[GreenDragon, RedDragon, BlackDragon, Titan], 4),
    ]
};

/// Guard tier for a value after the strength offset, 0 meaning "no guard".
pub fn monster_tier(strength: MonsterStrength, value: i32) -> u8 {
    let adjusted = value + strength.value_offset();
    TIER_THRESHOLDS.iter().filter(|&&threshold| adjusted > threshold).count() as u8
}

/// Pick a guard for an object or cluster worth `value`. `None` when it is too cheap to guard.
pub fn monsters_by_value(strength: MonsterStrength, value: i32) -> Option<MonsterSelection> {
    let tier = monster_tier(strength, value);
    if tier == 0 {
        return None;
    }
    let (roster, level) = TIER_ROSTERS[usize::from(tier) - 1];
    Some(MonsterSelection { tier, monster: Monster::random_of_level(level), allowed: roster.to_vec() })
}

/// Loose valuables with their relative weights. Chests and random resources
/// turn up twice as often as the rest.
const TREASURE_CANDIDATES: [(ObjectGroup, i32, ObjectType, u32); 6] = [
    (ObjectGroup::AdventureTreasures, TREASURE_CHEST, ObjectType::TreasureChest, 2),
    (ObjectGroup::AdventureTreasures, RANDOM_RESOURCE, ObjectType::RandomResource, 2),
    (ObjectGroup::AdventureTreasures, CAMPFIRE, ObjectType::Campfire, 1),
    (ObjectGroup::AdventureArtifacts, ARTIFACT_TREASURE, ObjectType::RandomArtifactTreasure, 1),
    (ObjectGroup::AdventureArtifacts, ARTIFACT_MINOR, ObjectType::RandomArtifactMinor, 1),
    (ObjectGroup::AdventureArtifacts, ARTIFACT_MAJOR, ObjectType::RandomArtifactMajor, 1),
];

/// A random valuable worth at most `limit`, as (group, index, value).
pub fn random_treasure(limit: i32, rng: &mut GeneratorRng) -> Option<(ObjectGroup, i32, i32)> {
    let fitting: Vec<((ObjectGroup, i32, i32), u32)> = TREASURE_CANDIDATES
        .iter()
        .map(|&(group, index, object_type, weight)| ((group, index, object_gold_value(object_type)), weight))
        .filter(|&((_, _, value), _)| value <= limit)
        .collect();
    random::weighted_pick(rng, &fitting).copied()
}
