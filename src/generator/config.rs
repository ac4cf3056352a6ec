//! Generation settings and the sizing math derived from them.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 6;

/// Smallest region a player can start in.
pub const SMALLEST_STARTING_REGION: i32 = 200;

/// Share of a region kept free of objects, in percent.
const EMPTY_SPACE_PERCENTAGE: i32 = 40;

/// Tile area reserved for each object category.
const CASTLE_AREA: i32 = 49;
const MINE_AREA: i32 = 15;
const OBJECT_AREA: i32 = 6;
const POWER_UP_AREA: i32 = 9;
const TREASURE_AREA: i32 = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Players evenly spaced on an outer ring around neutral land.
    #[default]
    Mirrored,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceDensity {
    Scarce,
    #[default]
    Normal,
    Abundant,
}

impl ResourceDensity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scarce" => Some(ResourceDensity::Scarce),
            "normal" => Some(ResourceDensity::Normal),
            "abundant" => Some(ResourceDensity::Abundant),
            _ => None,
        }
    }

    /// Object quotas for one region at this density.
    pub fn regional_objects(self) -> RegionalObjects {
        match self {
            ResourceDensity::Scarce => RegionalObjects {
                castles: 1,
                mines: 2,
                objects: 1,
                power_ups: 1,
                treasures: 2,
                pickups: 2,
            },
            ResourceDensity::Normal => RegionalObjects {
                castles: 1,
                mines: 6,
                objects: 2,
                power_ups: 1,
                treasures: 3,
                pickups: 4,
            },
            ResourceDensity::Abundant => RegionalObjects {
                castles: 1,
                mines: 7,
                objects: 2,
                power_ups: 2,
                treasures: 5,
                pickups: 6,
            },
        }
    }

    /// Gold worth of valuables a full-size region may hold.
    pub fn treasure_budget(self) -> i32 {
        match self {
            ResourceDensity::Scarce => 15_000,
            ResourceDensity::Normal => 30_000,
            ResourceDensity::Abundant => 50_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterStrength {
    Weak,
    #[default]
    Normal,
    Strong,
    Deadly,
}

impl MonsterStrength {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weak" => Some(MonsterStrength::Weak),
            "normal" => Some(MonsterStrength::Normal),
            "strong" => Some(MonsterStrength::Strong),
            "deadly" => Some(MonsterStrength::Deadly),
            _ => None,
        }
    }

    /// Gold-value adjustment applied before picking a guard.
    pub fn value_offset(self) -> i32 {
        match self {
            MonsterStrength::Weak => -1500,
            MonsterStrength::Normal => 0,
            MonsterStrength::Strong => 1000,
            MonsterStrength::Deadly => 2500,
        }
    }
}

/// Per-region object quotas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionalObjects {
    pub castles: i32,
    pub mines: i32,
    pub objects: i32,
    pub power_ups: i32,
    pub treasures: i32,
    pub pickups: i32,
}

impl RegionalObjects {
    /// Tiles needed to fit the quota, empty space included.
    pub fn required_space(&self) -> i32 {
        let occupied = self.castles * CASTLE_AREA
            + self.mines * MINE_AREA
            + self.objects * OBJECT_AREA
            + self.power_ups * POWER_UP_AREA
            + self.treasures * TREASURE_AREA;
        occupied * 100 / (100 - EMPTY_SPACE_PERCENTAGE)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub player_count: u8,
    pub water_percentage: i32,
    /// 0 picks a random seed.
    pub seed: u32,
    pub layout: Layout,
    pub resource_density: ResourceDensity,
    pub monster_strength: MonsterStrength,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            player_count: 2,
            water_percentage: 0,
            seed: 0,
            layout: Layout::Mirrored,
            resource_density: ResourceDensity::Normal,
            monster_strength: MonsterStrength::Normal,
        }
    }
}

impl Configuration {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Configuration =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check the settings against a map of `size` tiles per side.
    pub fn validate(&self, size: usize) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::InvalidPlayerCount(self.player_count));
        }
        if !(0..100).contains(&self.water_percentage) {
            return Err(ConfigError::InvalidWaterPercentage(self.water_percentage));
        }
        if size < 16 {
            return Err(ConfigError::InvalidMapSize(size));
        }
        Ok(())
    }
}

/// Tiles of land on a `width` x `height` map with the given share of water.
pub fn ground_tiles(width: usize, height: usize, water_percentage: i32) -> i32 {
    (width * height) as i32 * (100 - water_percentage) / 100
}

/// Size cap for every region so that the layout's regions fit the land area.
pub fn calculate_region_size_limit(config: &Configuration, width: usize, height: usize) -> i32 {
    let required = config.resource_density.regional_objects().required_space();
    let inner_radius = (f64::from(required) / PI).sqrt().ceil();
    let border_size = (2.0 * (inner_radius + 1.0) * PI) as i32;
    let target_size = required + border_size;

    let ground = ground_tiles(width, height, config.water_percentage);
    let player_count = i32::from(config.player_count);
    let upper_limit = player_count * 3;
    let average = ground / target_size;
    let can_fit = average.max(player_count + 1).min(upper_limit);

    ground / can_fit
}

/// Highest water percentage (in steps of 5) that still leaves player regions big enough.
pub fn calculate_maximum_water_percentage(player_count: u8, width: usize) -> i32 {
    let mut config = Configuration { player_count, ..Configuration::default() };
    let mut best = 0;
    for water in (0..100).step_by(5) {
        config.water_percentage = water;
        if calculate_region_size_limit(&config, width, width) < SMALLEST_STARTING_REGION {
            break;
        }
        best = water;
    }
    best
}

/// Errors raised while reading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    InvalidPlayerCount(u8),
    InvalidWaterPercentage(i32),
    InvalidMapSize(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidPlayerCount(n) => {
                write!(f, "player count {} outside {}..={}", n, MIN_PLAYERS, MAX_PLAYERS)
            }
            ConfigError::InvalidWaterPercentage(p) => write!(f, "water percentage {} outside 0..100", p),
            ConfigError::InvalidMapSize(s) => write!(f, "map size {} is too small", s),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_required_space() {
        // (49 + 6*15 + 2*6 + 9 + 3*16) * 100 / 60
        assert_eq!(ResourceDensity::Normal.regional_objects().required_space(), 346);
        assert!(
            ResourceDensity::Scarce.regional_objects().required_space()
                < ResourceDensity::Abundant.regional_objects().required_space()
        );
    }

    #[test]
    fn test_region_size_limit_small_map() {
        let config = Configuration { player_count: 2, ..Configuration::default() };
        // 1296 land tiles fit three regions of the normal quota.
        assert_eq!(calculate_region_size_limit(&config, 36, 36), 432);
    }

    #[test]
    fn test_region_size_limit_is_capped_by_players() {
        let config = Configuration { player_count: 2, ..Configuration::default() };
        // A huge map still holds at most 3 regions per player.
        let limit = calculate_region_size_limit(&config, 144, 144);
        assert_eq!(limit, 144 * 144 / 6);
    }

    #[test]
    fn test_water_shrinks_regions() {
        let dry = Configuration { player_count: 4, ..Configuration::default() };
        let wet = Configuration { water_percentage: 60, ..dry.clone() };
        assert!(calculate_region_size_limit(&wet, 72, 72) < calculate_region_size_limit(&dry, 72, 72));
    }

    #[test]
    fn test_maximum_water_percentage() {
        let small = calculate_maximum_water_percentage(6, 36);
        let large = calculate_maximum_water_percentage(2, 144);
        assert!(large > small);
        assert_eq!(small, 0);
    }

    #[test]
    fn test_validate() {
        let mut config = Configuration::default();
        assert!(config.validate(36).is_ok());
        config.player_count = 7;
        assert!(matches!(config.validate(36), Err(ConfigError::InvalidPlayerCount(7))));
        config.player_count = 2;
        config.water_percentage = 100;
        assert!(matches!(config.validate(36), Err(ConfigError::InvalidWaterPercentage(100))));
        config.water_percentage = 10;
        assert!(matches!(config.validate(8), Err(ConfigError::InvalidMapSize(8))));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let config = Configuration {
            player_count: 4,
            water_percentage: 25,
            seed: 1234,
            layout: Layout::Mirrored,
            resource_density: ResourceDensity::Abundant,
            monster_strength: MonsterStrength::Deadly,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Configuration::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "player_count": 3 }"#).unwrap();
        let config = Configuration::load_from(&path).unwrap();
        assert_eq!(config.player_count, 3);
        assert_eq!(config.resource_density, ResourceDensity::Normal);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Configuration::load_from(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
