//! PNG export of generated maps
//!
//! Two views:
//! - visual: ground colors with transition shading, roads, streams and object markers
//! - regions: one flat color per region, connectors and water highlighted

use std::error::Error;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::generator::node::NodeType;
use crate::world::{Ground, MapFormat, ObjectGroup, TileInfo};

#[derive(Clone, Debug)]
pub struct MapExportConfig {
    /// Square pixel block drawn per tile
    pub pixels_per_tile: u32,
    pub show_objects: bool,
    pub show_roads: bool,
    /// How strongly edge tiles are darkened where grounds meet (0-1)
    pub transition_shade: f32,
}

impl Default for MapExportConfig {
    fn default() -> Self {
        Self { pixels_per_tile: 4, show_objects: true, show_roads: true, transition_shade: 0.25 }
    }
}

/// Convert HSV to RGB
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h % 360.0;
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Blend two colors with a given ratio (0.0 = color a, 1.0 = color b)
fn blend_colors(a: (u8, u8, u8), b: (u8, u8, u8), ratio: f32) -> (u8, u8, u8) {
    let ratio = ratio.clamp(0.0, 1.0);
    let inv = 1.0 - ratio;
    (
        (a.0 as f32 * inv + b.0 as f32 * ratio) as u8,
        (a.1 as f32 * inv + b.1 as f32 * ratio) as u8,
        (a.2 as f32 * inv + b.2 as f32 * ratio) as u8,
    )
}

pub fn ground_color(ground: Ground) -> (u8, u8, u8) {
    match ground {
        Ground::Water => (30, 70, 150),
        Ground::Grass => (70, 140, 50),
        Ground::Snow => (225, 230, 240),
        Ground::Swamp => (70, 95, 70),
        Ground::Lava => (80, 40, 35),
        Ground::Desert => (220, 190, 110),
        Ground::Dirt => (140, 105, 60),
        Ground::Wasteland => (165, 150, 130),
        Ground::Beach => (235, 215, 160),
    }
}

/// Marker color for an object anchor, or `None` for pure scenery.
pub fn object_color(group: ObjectGroup) -> Option<(u8, u8, u8)> {
    match group {
        ObjectGroup::LandscapeTrees => Some((25, 80, 25)),
        ObjectGroup::LandscapeMountains => Some((105, 95, 90)),
        ObjectGroup::LandscapeRocks => Some((130, 130, 130)),
        ObjectGroup::KingdomTowns => Some((200, 30, 30)),
        ObjectGroup::KingdomHeroes => Some((250, 250, 60)),
        ObjectGroup::AdventureMines => Some((160, 60, 200)),
        ObjectGroup::AdventureTreasures | ObjectGroup::AdventureArtifacts => Some((255, 215, 0)),
        ObjectGroup::AdventurePowerUps => Some((0, 220, 220)),
        ObjectGroup::AdventureDwellings => Some((240, 140, 30)),
        ObjectGroup::Monsters => Some((0, 0, 0)),
        ObjectGroup::LandscapeLakes
        | ObjectGroup::LandscapeTownBasements
        | ObjectGroup::LandscapeFlags
        | ObjectGroup::LandscapeRiverDeltas => None,
    }
}

/// Distinct color per region id, spread around the hue wheel by the golden angle.
pub fn region_color(region: u32) -> (u8, u8, u8) {
    if region == 0 {
        return ground_color(Ground::Water);
    }
    hsv_to_rgb(region as f32 * 137.5, 0.55, 0.85)
}

fn visual_tile_color(tile: &TileInfo, config: &MapExportConfig) -> (u8, u8, u8) {
    let mut color = ground_color(tile.ground);
    if tile.transition != 0 {
        color = blend_colors(color, (0, 0, 0), config.transition_shade);
    }
    if tile.stream {
        color = blend_colors(color, ground_color(Ground::Water), 0.6);
    }
    if config.show_roads && tile.road {
        color = (190, 160, 120);
    }
    if config.show_objects {
        let marker = tile
            .objects
            .iter()
            .filter(|o| !o.top_level)
            .max_by_key(|o| o.group)
            .and_then(|o| object_color(o.group));
        if let Some(marker) = marker {
            color = marker;
        }
    }
    color
}

fn fill_block(img: &mut RgbImage, x: usize, y: usize, scale: u32, color: (u8, u8, u8)) {
    let (r, g, b) = color;
    for dy in 0..scale {
        for dx in 0..scale {
            img.put_pixel(x as u32 * scale + dx, y as u32 * scale + dy, Rgb([r, g, b]));
        }
    }
}

/// Export the visual map
pub fn export_visual_map(map: &MapFormat, filename: &str, config: &MapExportConfig) -> Result<(), Box<dyn Error>> {
    let scale = config.pixels_per_tile.max(1);
    let side = map.size as u32 * scale;
    let mut img: RgbImage = ImageBuffer::new(side, side);

    for (x, y, tile) in map.tiles.iter() {
        fill_block(&mut img, x, y, scale, visual_tile_color(tile, config));
    }

    img.save(filename)?;
    println!("Exported visual map to {}", filename);
    Ok(())
}

/// Export the region map (flat region colors, connectors in white)
pub fn export_region_map(map: &MapFormat, filename: &str, pixels_per_tile: u32) -> Result<(), Box<dyn Error>> {
    let scale = pixels_per_tile.max(1);
    let side = map.size as u32 * scale;
    let mut img: RgbImage = ImageBuffer::new(side, side);

    for (x, y, tile) in map.tiles.iter() {
        let base = region_color(tile.region());
        let color = match NodeType::from_code(tile.metadata % 100) {
            Some(NodeType::Connector) if tile.region() != 0 => (255, 255, 255),
            Some(NodeType::Border) if tile.region() != 0 => blend_colors(base, (0, 0, 0), 0.4),
            Some(NodeType::Path) if tile.region() != 0 => blend_colors(base, (255, 255, 255), 0.5),
            _ => base,
        };
        fill_block(&mut img, x, y, scale, color);
    }

    img.save(filename)?;
    println!("Exported region map to {}", filename);
    Ok(())
}

/// Export all map variants at once
pub fn export_all_maps(
    map: &MapFormat,
    output_dir: &Path,
    seed: u32,
    config: &MapExportConfig,
) -> Result<(), Box<dyn Error>> {
    let prefix = format!("map_{}", seed);

    let visual_path = output_dir.join(format!("{}_visual.png", prefix));
    export_visual_map(map, &visual_path.to_string_lossy(), config)?;

    let region_path = output_dir.join(format!("{}_regions.png", prefix));
    export_region_map(map, &region_path.to_string_lossy(), config.pixels_per_tile)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_region_colors_differ() {
        assert_ne!(region_color(1), region_color(2));
        assert_eq!(region_color(0), ground_color(Ground::Water));
    }

    #[test]
    fn test_export_dimensions() {
        let dir = tempdir().unwrap();
        let map = MapFormat::new(16);
        let config = MapExportConfig { pixels_per_tile: 3, ..MapExportConfig::default() };
        export_all_maps(&map, dir.path(), 7, &config).unwrap();

        let img = image::open(dir.path().join("map_7_visual.png")).unwrap();
        assert_eq!((img.width(), img.height()), (48, 48));
        assert!(dir.path().join("map_7_regions.png").exists());
    }
}
