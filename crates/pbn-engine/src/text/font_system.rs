use std::fmt;

use crate::coords::Vec2;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
///
/// `FontId::default()` names the first font loaded, which is what the canvas
/// renderer uses for region numbers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct FontId(pub(crate) usize);

/// Coverage mask of one laid-out glyph, positioned relative to the text
/// block's top-left corner.
#[derive(Debug, Clone)]
pub struct GlyphMask {
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {:?}", id);
        Ok(id)
    }

    #[inline]
    pub fn has_font(&self, id: FontId) -> bool {
        id.0 < self.fonts.len()
    }

    fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Size of the laid-out text block in pixels.
    ///
    /// Falls back to a `0.6em` per-character estimate when the font is not
    /// loaded, so layout stays usable without font files.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32) -> Vec2 {
        let Some(font) = self.get(id) else {
            return Vec2::new(text.chars().count() as f32 * size * 0.6, size * 1.2);
        };

        let glyphs = layout(font, text, size);
        if glyphs.is_empty() {
            return Vec2::new(0.0, size * 1.2);
        }

        let w = glyphs.iter().map(|g| {
            let m = font.metrics_indexed(g.key.glyph_index, size);
            (g.x - m.xmin as f32 + m.advance_width).max(0.0)
        }).fold(0.0f32, f32::max);
        let h = glyphs.iter().map(|g| g.y + g.height as f32).fold(size, f32::max);
        Vec2::new(w, h)
    }

    /// Rasterizes `text` into per-glyph coverage masks. Empty when the font
    /// is not loaded.
    pub fn rasterize(&self, text: &str, id: FontId, size: f32) -> Vec<GlyphMask> {
        let Some(font) = self.get(id) else {
            return Vec::new();
        };
        layout(font, text, size)
            .iter()
            .filter(|g| g.width > 0 && g.height > 0)
            .map(|g| {
                let (metrics, coverage) = font.rasterize_indexed(g.key.glyph_index, size);
                GlyphMask {
                    x: g.x,
                    y: g.y,
                    width: metrics.width,
                    height: metrics.height,
                    coverage,
                }
            })
            .collect()
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn layout(font: &fontdue::Font, text: &str, size: f32) -> Vec<fontdue::layout::GlyphPosition> {
    use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, size, 0));
    layout.glyphs().clone()
}
