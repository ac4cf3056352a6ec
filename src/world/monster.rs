//! Wandering monster roster.

use serde::{Deserialize, Serialize};

/// Monsters that can guard map objects. The discriminant is the sprite index
/// inside `ObjectGroup::Monsters`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Monster {
    // Level 1
    Peasant,
    Archer,
    Goblin,
    Sprite,
    Centaur,
    Halfling,
    Skeleton,
    // Level 2
    Pikeman,
    Orc,
    Wolf,
    Dwarf,
    Gargoyle,
    Boar,
    Zombie,
    Rogue,
    // Level 2, upgraded
    VeteranPikeman,
    Elf,
    GrandElf,
    Griffin,
    Ogre,
    IronGolem,
    Mummy,
    Nomad,
    Swordsman,
    // Level 3
    MasterSwordsman,
    Cavalry,
    Druid,
    Minotaur,
    OgreLord,
    Roc,
    Vampire,
    Medusa,
    EarthElement,
    AirElement,
    FireElement,
    WaterElement,
    // Level 3, upgraded
    Champion,
    Troll,
    WarTroll,
    Unicorn,
    Hydra,
    Mage,
    Lich,
    VampireLord,
    Ghost,
    Paladin,
    Cyclops,
    // Level 4
    Giant,
    Genie,
    Phoenix,
    Archmage,
    PowerLich,
    Crusader,
    BoneDragon,
    GreenDragon,
    RedDragon,
    BlackDragon,
    Titan,
    // Placeholders resolved by the game when the map loads
    RandomMonster,
    RandomMonsterLevel1,
    RandomMonsterLevel2,
    RandomMonsterLevel3,
    RandomMonsterLevel4,
}

impl Monster {
    pub const COUNT: usize = Monster::RandomMonsterLevel4 as usize + 1;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Roster tier, 1 to 4. Random placeholders report the level they resolve to, or 0.
    pub fn level(self) -> u8 {
        use Monster::*;
        match self {
            Peasant | Archer | Goblin | Sprite | Centaur | Halfling | Skeleton => 1,
            Pikeman | Orc | Wolf | Dwarf | Gargoyle | Boar | Zombie | Rogue | VeteranPikeman
            | Elf | GrandElf | Griffin | Ogre | IronGolem | Mummy | Nomad | Swordsman => 2,
            MasterSwordsman | Cavalry | Druid | Minotaur | OgreLord | Roc | Vampire | Medusa
            | EarthElement | AirElement | FireElement | WaterElement | Champion | Troll
            | WarTroll | Unicorn | Hydra | Mage | Lich | VampireLord | Ghost | Paladin
            | Cyclops => 3,
            Giant | Genie | Phoenix | Archmage | PowerLich | Crusader | BoneDragon
            | GreenDragon | RedDragon | BlackDragon | Titan => 4,
            RandomMonsterLevel1 => 1,
            RandomMonsterLevel2 => 2,
            RandomMonsterLevel3 => 3,
            RandomMonsterLevel4 => 4,
            RandomMonster => 0,
        }
    }

    pub fn is_random(self) -> bool {
        self >= Monster::RandomMonster
    }

    /// Random placeholder of the given level; anything outside 1..=4 maps to the any-level one.
    pub fn random_of_level(level: u8) -> Monster {
        match level {
            1 => Monster::RandomMonsterLevel1,
            2 => Monster::RandomMonsterLevel2,
            3 => Monster::RandomMonsterLevel3,
            4 => Monster::RandomMonsterLevel4,
            _ => Monster::RandomMonster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_placeholders() {
        assert!(Monster::RandomMonsterLevel3.is_random());
        assert!(!Monster::Titan.is_random());
        assert_eq!(Monster::random_of_level(2).level(), 2);
        assert_eq!(Monster::random_of_level(9), Monster::RandomMonster);
    }

    #[test]
    fn test_count_matches_last_variant() {
        assert_eq!(Monster::COUNT, Monster::RandomMonsterLevel4.index() + 1);
        assert_eq!(Monster::Titan.level(), 4);
    }
}
