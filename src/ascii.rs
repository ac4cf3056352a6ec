//! ASCII rendering and export module for generated maps
//!
//! Provides functions to render map data as ASCII text and export to files.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::generator::node::NodeType;
use crate::generator::GenerationReport;
use crate::world::{Ground, MapFormat, ObjectGroup, TileInfo};

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsciiMode {
    /// Ground, roads and object anchors
    Terrain,
    /// Region ids
    Regions,
    /// Generator node types
    Nodes,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Terrain => "Terrain",
            AsciiMode::Regions => "Regions",
            AsciiMode::Nodes => "Nodes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.name().eq_ignore_ascii_case(s))
    }

    pub fn all() -> &'static [AsciiMode] {
        &[AsciiMode::Terrain, AsciiMode::Regions, AsciiMode::Nodes]
    }
}

/// Get ASCII character for a ground
pub fn ground_char(ground: Ground) -> char {
    match ground {
        Ground::Water => '~',
        Ground::Grass => '.',
        Ground::Snow => '*',
        Ground::Swamp => '%',
        Ground::Lava => '&',
        Ground::Desert => ':',
        Ground::Dirt => ',',
        Ground::Wasteland => '_',
        Ground::Beach => '\'',
    }
}

/// Get ASCII character for the anchor of an object group
pub fn object_char(group: ObjectGroup) -> char {
    match group {
        ObjectGroup::LandscapeTrees => 'T',
        ObjectGroup::LandscapeMountains => '^',
        ObjectGroup::LandscapeRocks => 'o',
        ObjectGroup::LandscapeLakes => 'O',
        ObjectGroup::LandscapeTownBasements => '=',
        ObjectGroup::LandscapeFlags => 'f',
        ObjectGroup::LandscapeRiverDeltas => 'v',
        ObjectGroup::KingdomTowns => 'C',
        ObjectGroup::KingdomHeroes => 'H',
        ObjectGroup::AdventureMines => 'M',
        ObjectGroup::AdventureTreasures => '$',
        ObjectGroup::AdventureArtifacts => 'a',
        ObjectGroup::AdventurePowerUps => 'P',
        ObjectGroup::AdventureDwellings => 'D',
        ObjectGroup::Monsters => 'm',
    }
}

/// Get ASCII character for a node type
pub fn node_char(node_type: NodeType) -> char {
    match node_type {
        NodeType::Open => '.',
        NodeType::Border => '+',
        NodeType::Coast => ',',
        NodeType::Connector => 'X',
        NodeType::Obstacle => '#',
        NodeType::Action => '!',
        NodeType::Path => '=',
    }
}

/// Region ids 1-9 as digits, then letters. Water is blank.
pub fn region_char(region: u32) -> char {
    match region {
        0 => ' ',
        1..=9 => char::from_digit(region, 10).unwrap_or('?'),
        10..=35 => (b'a' + (region - 10) as u8) as char,
        _ => '?',
    }
}

/// Terrain view of one tile: the most important object anchor wins, then roads,
/// then streams, then the ground.
pub fn terrain_char(tile: &TileInfo) -> char {
    let anchor = tile
        .objects
        .iter()
        .filter(|o| o.is_anchor && !o.top_level)
        .max_by_key(|o| o.group);
    if let Some(object) = anchor {
        return object_char(object.group);
    }
    if tile.road {
        return '#';
    }
    if tile.stream {
        return '|';
    }
    ground_char(tile.ground)
}

/// Render a map to ASCII string
pub fn render_ascii_map(map: &MapFormat, mode: AsciiMode) -> String {
    let size = map.size;
    let mut result = String::with_capacity((size + 1) * size);

    for y in 0..size {
        for x in 0..size {
            let tile = map.tiles.get(x, y);
            let ch = match mode {
                AsciiMode::Terrain => terrain_char(tile),
                AsciiMode::Regions => region_char(tile.region()),
                AsciiMode::Nodes => {
                    if tile.region() == 0 {
                        '~'
                    } else {
                        NodeType::from_code(tile.metadata % 100).map_or('?', node_char)
                    }
                }
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Generate legend for terrain characters
pub fn terrain_legend() -> String {
    let mut legend = String::new();
    legend.push_str("=== LEGEND ===\n");
    legend.push_str("GROUND:\n");
    legend.push_str("  ~ Water   . Grass   * Snow   % Swamp   & Lava\n");
    legend.push_str("  : Desert  , Dirt    _ Wasteland        ' Beach\n");
    legend.push_str("OBJECTS:\n");
    legend.push_str("  C Castle  H Hero    M Mine   $ Treasure  a Artifact\n");
    legend.push_str("  P Power-up          D Dwelling         m Monster\n");
    legend.push_str("  T Tree    ^ Mountain         o Rock    v Delta\n");
    legend.push_str("  # Road    | Stream\n");
    legend
}

/// Count tiles per ground
pub fn calculate_ground_stats(map: &MapFormat) -> BTreeMap<Ground, usize> {
    let mut stats = BTreeMap::new();
    for tile in map.tiles.values() {
        *stats.entry(tile.ground).or_insert(0) += 1;
    }
    stats
}

/// Count object anchors per group
pub fn calculate_object_stats(map: &MapFormat) -> BTreeMap<ObjectGroup, usize> {
    let mut stats = BTreeMap::new();
    for tile in map.tiles.values() {
        for object in tile.objects.iter().filter(|o| o.is_anchor) {
            *stats.entry(object.group).or_insert(0) += 1;
        }
    }
    stats
}

/// Export map data to ASCII file
pub fn export_map_file(map: &MapFormat, report: &GenerationReport, path: &str, verbose: bool) -> io::Result<()> {
    let mut file = File::create(path)?;
    let total = map.tile_count();

    // Header
    writeln!(file, "=== RANDOM MAP FILE ===")?;
    writeln!(file, "Name: {}", map.name)?;
    writeln!(file, "Seed: {}", report.seed)?;
    writeln!(file, "Size: {}x{}", map.size, map.size)?;
    writeln!(file, "Region size limit: {}", report.size_limit)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file, "{}", map.description)?;
    writeln!(file)?;

    writeln!(file, "=== MAP (Terrain View) ===")?;
    write!(file, "{}", render_ascii_map(map, AsciiMode::Terrain))?;
    writeln!(file)?;
    write!(file, "{}", terrain_legend())?;
    writeln!(file)?;

    writeln!(file, "=== MAP (Region View) ===")?;
    write!(file, "{}", render_ascii_map(map, AsciiMode::Regions))?;
    writeln!(file)?;

    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total tiles: {}", total)?;
    writeln!(file, "Ground Distribution:")?;
    let mut grounds: Vec<_> = calculate_ground_stats(map).into_iter().collect();
    grounds.sort_by(|a, b| b.1.cmp(&a.1));
    for (ground, count) in grounds {
        let pct = 100.0 * count as f64 / total as f64;
        writeln!(file, "  {:12} {} {:>6} ({:>5.1}%)", ground.name(), ground_char(ground), count, pct)?;
    }
    writeln!(file)?;

    writeln!(file, "Objects:")?;
    for (group, count) in calculate_object_stats(map) {
        writeln!(file, "  {:24} {:>5}", format!("{:?}", group), count)?;
    }
    writeln!(file)?;

    writeln!(file, "Mines:")?;
    for (resource, count) in &report.mines {
        writeln!(file, "  {:10} {:>3}", resource.name(), count)?;
    }
    writeln!(file)?;

    writeln!(file, "=== REGIONS ===")?;
    for region in &report.regions {
        let owner = region.owner.map_or("neutral", |c| c.name());
        writeln!(
            file,
            "  {:>2} {:9} {:8} {:10} {:>5} tiles  hub {:>5}  treasure left {:>6}  connected to {:?}",
            region.id,
            format!("{:?}", region.region_type),
            owner,
            region.ground.name(),
            region.tiles,
            region.hub,
            region.treasure_left,
            region.connections
        )?;
    }
    writeln!(file)?;

    writeln!(file, "Playability: every action location is reachable")?;

    // Verbose tile data
    if verbose {
        writeln!(file)?;
        writeln!(file, "=== TILE DATA ===")?;
        writeln!(file, "[x,y,ground,region,node,road,stream,objects]")?;
        for (x, y, tile) in map.tiles.iter() {
            let node = NodeType::from_code(tile.metadata % 100).map_or('?', node_char);
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                x,
                y,
                tile.ground.name(),
                tile.region(),
                node,
                tile.road as u8,
                tile.stream as u8,
                tile.objects.len()
            )?;
        }
    }

    Ok(())
}

/// Print ASCII map to stdout
pub fn print_ascii_map(map: &MapFormat, mode: AsciiMode) {
    print!("{}", render_ascii_map(map, mode));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{LayerType, TileObject};

    #[test]
    fn test_mode_from_str() {
        assert_eq!(AsciiMode::from_str("regions"), Some(AsciiMode::Regions));
        assert_eq!(AsciiMode::from_str("bogus"), None);
    }

    #[test]
    fn test_region_char() {
        assert_eq!(region_char(0), ' ');
        assert_eq!(region_char(7), '7');
        assert_eq!(region_char(10), 'a');
    }

    #[test]
    fn test_terrain_char_priority() {
        let mut tile = TileInfo { ground: Ground::Grass, ..TileInfo::default() };
        assert_eq!(terrain_char(&tile), '.');
        tile.road = true;
        assert_eq!(terrain_char(&tile), '#');
        tile.objects.push(TileObject {
            uid: 1,
            group: ObjectGroup::KingdomTowns,
            index: 0,
            layer: LayerType::Object,
            is_anchor: true,
            top_level: false,
        });
        assert_eq!(terrain_char(&tile), 'C');
    }

    #[test]
    fn test_render_dimensions() {
        let map = MapFormat::new(16);
        let rendered = render_ascii_map(&map, AsciiMode::Terrain);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines.iter().all(|l| l.chars().count() == 16 && l.chars().all(|c| c == '~')));
    }
}
