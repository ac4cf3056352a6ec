//! Random adventure map generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod generator;
pub mod map_export;
pub mod tilemap;
pub mod world;

pub use generator::config::Configuration;
pub use generator::object_sets::PrefabLibrary;
pub use generator::{generate_map, GenerationError, GenerationReport};
