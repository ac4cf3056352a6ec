//! Prefab object sets.
//!
//! Treasure clusters, power-up clusters and decoration groups are described
//! as objects at offsets from a center tile. Defaults are embedded in the
//! binary via `include_str!`; a data directory can override any section.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::world::ObjectGroup;

const DEFAULT_OBJECT_SETS_JSON: &str = include_str!("../../data/defaults/object_sets.json");

/// One object of a set, relative to the set's center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub offset: (i32, i32),
    pub group: ObjectGroup,
    pub index: i32,
}

/// A guarded cluster. Valuables other than power-ups are placeholders that get
/// replaced by random treasure fitting the region's budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSet {
    #[serde(default)]
    pub obstacles: Vec<ObjectPlacement>,
    pub valuables: Vec<ObjectPlacement>,
    #[serde(default)]
    pub monsters: Vec<ObjectPlacement>,
    /// Offsets that must still be open for the cluster to be reachable.
    #[serde(default)]
    pub entrance_check: Vec<(i32, i32)>,
}

impl ObjectSet {
    /// Members in placement order: valuables, then obstacles, then guards.
    pub fn placements(&self) -> impl Iterator<Item = &ObjectPlacement> {
        self.valuables.iter().chain(&self.obstacles).chain(&self.monsters)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationSet {
    pub name: String,
    pub objects: Vec<ObjectPlacement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabLibrary {
    pub treasure_sets: Vec<ObjectSet>,
    pub power_up_sets: Vec<ObjectSet>,
    pub decorations: Vec<DecorationSet>,
}

/// Override file layout: every section is optional.
#[derive(Debug, Deserialize)]
struct PrefabFile {
    treasure_sets: Option<Vec<ObjectSet>>,
    power_up_sets: Option<Vec<ObjectSet>>,
    decorations: Option<Vec<DecorationSet>>,
}

impl PrefabLibrary {
    /// Load from embedded defaults compiled into the binary.
    pub fn defaults() -> Self {
        serde_json::from_str(DEFAULT_OBJECT_SETS_JSON).expect("Failed to parse embedded object_sets.json")
    }

    /// Load from a directory, falling back to the embedded defaults for
    /// anything the directory does not provide.
    pub fn load_from(dir: &Path) -> Self {
        let mut library = Self::defaults();

        let path = dir.join("object_sets.json");
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if let Ok(file) = serde_json::from_str::<PrefabFile>(&contents) {
                    if let Some(sets) = file.treasure_sets {
                        library.treasure_sets = sets;
                    }
                    if let Some(sets) = file.power_up_sets {
                        library.power_up_sets = sets;
                    }
                    if let Some(decorations) = file.decorations {
                        library.decorations = decorations;
                    }
                } else {
                    warn!("failed to parse {}", path.display());
                }
            }
        }

        library
    }
}

impl Default for PrefabLibrary {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::placement::select_terrain_variant;
    use crate::world::{Ground, ObjectCatalog};
    use tempfile::tempdir;

    #[test]
    fn test_defaults_load() {
        let library = PrefabLibrary::defaults();
        assert_eq!(library.treasure_sets.len(), 5);
        assert_eq!(library.power_up_sets.len(), 3);
        assert!(library.decorations.len() >= 4);
        for set in library.treasure_sets.iter().chain(&library.power_up_sets) {
            assert!(!set.valuables.is_empty());
            assert_eq!(set.monsters.len(), 1);
        }
    }

    #[test]
    fn test_every_placement_resolves() {
        let library = PrefabLibrary::defaults();
        let catalog = ObjectCatalog::standard();
        let placements = library
            .treasure_sets
            .iter()
            .chain(&library.power_up_sets)
            .flat_map(ObjectSet::placements)
            .chain(library.decorations.iter().flat_map(|d| d.objects.iter()));
        for placement in placements {
            for ground in [Ground::Grass, Ground::Snow, Ground::Beach] {
                let index = select_terrain_variant(placement.group, placement.index, ground);
                assert!(catalog.get(placement.group, index).is_some(), "{:?}", placement);
            }
        }
    }

    #[test]
    fn test_set_members_do_not_overlap() {
        let library = PrefabLibrary::defaults();
        let catalog = ObjectCatalog::standard();
        for set in library.treasure_sets.iter().chain(&library.power_up_sets) {
            let mut taken = std::collections::HashSet::new();
            for placement in set.placements() {
                let index = select_terrain_variant(placement.group, placement.index, Ground::Grass);
                let info = catalog.get(placement.group, index).unwrap();
                for (dx, dy) in info.occupied_offsets() {
                    let tile = (placement.offset.0 + dx, placement.offset.1 + dy);
                    assert!(taken.insert(tile), "{:?} overlaps at {:?}", placement, tile);
                }
            }
            for offset in &set.entrance_check {
                assert!(!taken.contains(offset));
            }
        }
    }

    #[test]
    fn test_load_from_nonexistent_dir() {
        let library = PrefabLibrary::load_from(Path::new("/nonexistent/path"));
        assert_eq!(library, PrefabLibrary::defaults());
    }

    #[test]
    fn test_partial_override() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("object_sets.json"),
            r#"{ "decorations": [ { "name": "single_rock", "objects": [
                { "offset": [0, 0], "group": "LandscapeRocks", "index": 0 } ] } ] }"#,
        )
        .unwrap();

        let library = PrefabLibrary::load_from(dir.path());
        assert_eq!(library.decorations.len(), 1);
        assert_eq!(library.decorations[0].name, "single_rock");
        assert_eq!(library.treasure_sets, PrefabLibrary::defaults().treasure_sets);
    }

    #[test]
    fn test_broken_override_keeps_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("object_sets.json"), "{ not json").unwrap();
        assert_eq!(PrefabLibrary::load_from(dir.path()), PrefabLibrary::defaults());
    }
}
