//! The paintable image aggregate and its construction-time checks.

use std::collections::HashSet;
use std::sync::Arc;

use pbn_engine::geom::Outline;

use crate::error::{CanvasError, Result};
use crate::palette::PaletteEntry;
use crate::region::RegionModel;

pub type RegionId = u32;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: f32 = 16384.0;

/// Pixel size all region coordinates are expressed in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_valid(self) -> bool {
        let ok = |v: f32| v.is_finite() && v > 0.0 && v <= MAX_DIMENSION;
        ok(self.width) && ok(self.height)
    }
}

/// A closed shape that must be filled with one palette color.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub target_color_index: u32,
    pub outline: Arc<Outline>,
    pub(crate) painted: bool,
}

impl Region {
    pub fn new(id: RegionId, target_color_index: u32, outline: Outline) -> Self {
        Self { id, target_color_index, outline: Arc::new(outline), painted: false }
    }

    #[inline]
    pub fn is_painted(&self) -> bool {
        self.painted
    }
}

/// Regions, palette and dimensions delivered together by the processing
/// collaborator.
///
/// Structure is fixed after construction; only region paint state changes,
/// through [`regions_mut`](Self::regions_mut).
#[derive(Debug, Clone)]
pub struct PaintableImage {
    background_url: String,
    regions: RegionModel,
    palette: Vec<PaletteEntry>,
    dimensions: Dimensions,
}

impl PaintableImage {
    /// Validates and assembles an image. Every region starts unpainted.
    pub fn new(
        background_url: impl Into<String>,
        regions: Vec<Region>,
        palette: Vec<PaletteEntry>,
        dimensions: Dimensions,
    ) -> Result<Self> {
        validate(&regions, &palette, dimensions)?;
        let mut regions = regions;
        for r in &mut regions {
            r.painted = false;
        }
        Ok(Self {
            background_url: background_url.into(),
            regions: RegionModel::new(regions),
            palette,
            dimensions,
        })
    }

    #[inline]
    pub fn background_url(&self) -> &str {
        &self.background_url
    }

    #[inline]
    pub fn regions(&self) -> &RegionModel {
        &self.regions
    }

    #[inline]
    pub fn regions_mut(&mut self) -> &mut RegionModel {
        &mut self.regions
    }

    #[inline]
    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub(crate) fn palette_entry(&self, index: u32) -> Option<&PaletteEntry> {
        self.palette.iter().find(|e| e.index == index)
    }
}

fn validate(regions: &[Region], palette: &[PaletteEntry], dims: Dimensions) -> Result<()> {
    let invalid = |msg: String| Err(CanvasError::InvalidImage(msg));

    if !dims.is_valid() {
        return invalid(format!(
            "dimensions {}x{} must be positive and at most {}",
            dims.width, dims.height, MAX_DIMENSION
        ));
    }

    let mut indices = HashSet::new();
    for entry in palette {
        if entry.index == 0 {
            return invalid(format!("palette entry {:?} uses index 0", entry.label));
        }
        if !indices.insert(entry.index) {
            return invalid(format!("palette index {} appears twice", entry.index));
        }
    }

    let mut ids = HashSet::new();
    for region in regions {
        if !ids.insert(region.id) {
            return invalid(format!("region id {} appears twice", region.id));
        }
        if !indices.contains(&region.target_color_index) {
            return invalid(format!(
                "region {} targets color {} which is not in the palette",
                region.id, region.target_color_index
            ));
        }
        let outline = &region.outline;
        if outline.path().is_empty() {
            return invalid(format!("region {} has an empty outline", region.id));
        }
        if !outline.is_closed() {
            return invalid(format!("region {} outline is not closed", region.id));
        }
        if !outline.has_distinct_vertices(3) {
            return invalid(format!("region {} outline has fewer than three points", region.id));
        }
    }
    Ok(())
}
