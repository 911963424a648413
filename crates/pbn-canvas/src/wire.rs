//! JSON form of a painting, as exchanged with the processing service and
//! stored alongside saved paintings.
//!
//! ```json
//! {
//!   "processedImageUrl": "data:image/jpeg;base64,...",
//!   "regions": [{ "id": 1, "colorNumber": 2, "path": "M0,0 L100,0 L100,100 L0,100 Z", "isPainted": false }],
//!   "colors": [{ "number": 1, "hex": "#FF0000", "name": "Red" }],
//!   "dimensions": { "width": 800, "height": 600 }
//! }
//! ```

use pbn_engine::geom::Outline;
use pbn_engine::paint::Color;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::{Dimensions, PaintableImage, Region};
use crate::palette::PaletteEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    #[serde(default)]
    pub processed_image_url: String,
    pub regions: Vec<WireRegion>,
    pub colors: Vec<WireColor>,
    pub dimensions: WireDimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRegion {
    pub id: u32,
    pub color_number: u32,
    pub path: String,
    #[serde(default)]
    pub is_painted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireColor {
    pub number: u32,
    pub hex: String,
    pub name: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDimensions {
    pub width: f32,
    pub height: f32,
}

impl WireImage {
    /// Parses paths and colors, validates, then restores paint state.
    pub fn into_image(self, tolerance: f32) -> Result<PaintableImage> {
        let mut painted = Vec::new();
        let mut regions = Vec::with_capacity(self.regions.len());
        for r in self.regions {
            let outline = Outline::parse(&r.path, tolerance)?;
            if r.is_painted {
                painted.push(r.id);
            }
            regions.push(Region::new(r.id, r.color_number, outline));
        }

        let palette = self
            .colors
            .into_iter()
            .map(|c| Ok(PaletteEntry::new(c.number, Color::from_hex(&c.hex)?, c.name)))
            .collect::<Result<Vec<_>>>()?;

        let dims = Dimensions::new(self.dimensions.width, self.dimensions.height);
        let mut image = PaintableImage::new(self.processed_image_url, regions, palette, dims)?;
        for id in painted {
            image.regions_mut().mark_painted(id);
        }
        Ok(image)
    }

    pub fn from_image(image: &PaintableImage) -> Self {
        let dims = image.dimensions();
        Self {
            processed_image_url: image.background_url().to_string(),
            regions: image
                .regions()
                .iter()
                .map(|r| WireRegion {
                    id: r.id,
                    color_number: r.target_color_index,
                    path: r.outline.path().to_string(),
                    is_painted: r.is_painted(),
                })
                .collect(),
            colors: image
                .palette()
                .iter()
                .map(|e| WireColor { number: e.index, hex: e.color.to_hex(), name: e.label.clone() })
                .collect(),
            dimensions: WireDimensions { width: dims.width, height: dims.height },
        }
    }
}

/// Decodes a painting from JSON.
pub fn from_json(json: &str, tolerance: f32) -> Result<PaintableImage> {
    let wire: WireImage = serde_json::from_str(json)?;
    wire.into_image(tolerance)
}

/// Encodes a painting, including live paint state, as JSON.
pub fn to_json(image: &PaintableImage) -> Result<String> {
    Ok(serde_json::to_string(&WireImage::from_image(image))?)
}

/// Encodes as a JSON value, for embedding in stored records.
pub fn to_value(image: &PaintableImage) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(WireImage::from_image(image))?)
}

/// Decodes a JSON value produced by [`to_value`].
pub fn from_value(value: serde_json::Value, tolerance: f32) -> Result<PaintableImage> {
    let wire: WireImage = serde_json::from_value(value)?;
    wire.into_image(tolerance)
}

#[cfg(test)]
mod tests {
    use pbn_engine::geom::DEFAULT_FLATTEN_TOLERANCE;

    use super::*;
    use crate::error::CanvasError;

    const SCENARIO: &str = r##"{
        "processedImageUrl": "bg.jpg",
        "regions": [
            { "id": 1, "colorNumber": 2, "path": "M0,0 L100,0 L100,100 L0,100 Z" },
            { "id": 2, "colorNumber": 1, "path": "M120,0 h50 v50 h-50 z", "isPainted": true }
        ],
        "colors": [
            { "number": 1, "hex": "#FF0000", "name": "Red" },
            { "number": 2, "hex": "#00FF00", "name": "Green" }
        ],
        "dimensions": { "width": 200, "height": 100 }
    }"##;

    fn decode(json: &str) -> Result<PaintableImage> {
        from_json(json, DEFAULT_FLATTEN_TOLERANCE)
    }

    #[test]
    fn decodes_regions_palette_and_state() {
        let img = decode(SCENARIO).unwrap();
        assert_eq!(img.background_url(), "bg.jpg");
        assert_eq!(img.regions().len(), 2);
        assert!(!img.regions().get_region(1).unwrap().is_painted());
        assert!(img.regions().get_region(2).unwrap().is_painted());
        assert_eq!(img.palette()[1].label, "Green");
        assert_eq!(img.dimensions(), Dimensions::new(200.0, 100.0));
    }

    #[test]
    fn encodes_absolute_paths_and_live_state() {
        let mut img = decode(SCENARIO).unwrap();
        img.regions_mut().mark_painted(1);
        let wire = WireImage::from_image(&img);
        assert!(wire.regions.iter().all(|r| r.is_painted));
        assert_eq!(wire.regions[1].path, "M120,0 L170,0 L170,50 L120,50 Z");
        assert_eq!(wire.colors[0].hex, "#FF0000");

        let back = decode(&to_json(&img).unwrap()).unwrap();
        assert_eq!(back.regions().painted_count(), 2);
    }

    #[test]
    fn missing_background_is_empty() {
        let json = r##"{ "regions": [], "colors": [], "dimensions": { "width": 10, "height": 10 } }"##;
        assert_eq!(decode(json).unwrap().background_url(), "");
    }

    #[test]
    fn bad_path_is_a_path_error() {
        let json = SCENARIO.replace("M120,0 h50 v50 h-50 z", "M120,0 C1,2 3,4 5,6 z");
        assert!(matches!(decode(&json), Err(CanvasError::Path(_))));
    }

    #[test]
    fn bad_hex_is_a_color_error() {
        let json = SCENARIO.replace("#00FF00", "green");
        assert!(matches!(decode(&json), Err(CanvasError::Color(_))));
    }

    #[test]
    fn dangling_color_reference_is_invalid() {
        let json = SCENARIO.replace("\"colorNumber\": 2", "\"colorNumber\": 9");
        assert!(matches!(decode(&json), Err(CanvasError::InvalidImage(_))));
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(decode("{"), Err(CanvasError::Json(_))));
    }

    #[test]
    fn value_round_trip_keeps_state() {
        let img = decode(SCENARIO).unwrap();
        let back = from_value(to_value(&img).unwrap(), DEFAULT_FLATTEN_TOLERANCE).unwrap();
        assert_eq!(WireImage::from_image(&back), WireImage::from_image(&img));
    }
}
