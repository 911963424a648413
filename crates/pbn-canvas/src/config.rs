use pbn_engine::geom::DEFAULT_FLATTEN_TOLERANCE;
use pbn_engine::paint::Color;

/// Smallest brush diameter in image pixels.
pub const MIN_BRUSH_SIZE: f32 = 1.0;
/// Largest brush diameter in image pixels.
pub const MAX_BRUSH_SIZE: f32 = 50.0;
pub const DEFAULT_BRUSH_SIZE: f32 = 10.0;

/// Stroke drawn along every region outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineStyle {
    pub width: f32,
    pub color: Color,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self { width: 2.0, color: Color::from_srgb_u8(0x33, 0x33, 0x33, 255) }
    }
}

/// Number plate drawn over unpainted regions.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub plate_color: Color,
    pub text_color: Color,
    pub font_size: f32,
    /// Plate size for a single-digit number.
    pub plate_width: f32,
    pub plate_height: f32,
    /// Extra plate width per additional digit.
    pub digit_width: f32,
}

impl LabelStyle {
    /// Plate width for a label of `digits` characters.
    pub fn plate_width_for(&self, digits: usize) -> f32 {
        self.plate_width + self.digit_width * digits.saturating_sub(1) as f32
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            plate_color: Color::from_straight(1.0, 1.0, 1.0, 0.9),
            text_color: Color::from_srgb_u8(0x33, 0x33, 0x33, 255),
            font_size: 12.0,
            plate_width: 24.0,
            plate_height: 16.0,
            digit_width: 7.0,
        }
    }
}

/// Canvas configuration.
///
/// Built with `Default` and adjusted through the chained setters:
///
/// ```rust
/// use pbn_canvas::CanvasConfig;
///
/// let cfg = CanvasConfig::default().brush_size(80.0).show_numbers(false);
/// assert_eq!(cfg.brush_size, 50.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Brush diameter, clamped to `MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE`.
    pub brush_size: f32,
    pub show_numbers: bool,
    pub outline: OutlineStyle,
    pub label: LabelStyle,
    /// Curve flattening tolerance used when decoding outlines.
    pub flatten_tolerance: f32,
}

impl CanvasConfig {
    pub fn brush_size(mut self, size: f32) -> Self {
        self.brush_size = clamp_brush(size);
        self
    }

    pub fn show_numbers(mut self, show: bool) -> Self {
        self.show_numbers = show;
        self
    }

    pub fn outline(mut self, style: OutlineStyle) -> Self {
        self.outline = style;
        self
    }

    pub fn label(mut self, style: LabelStyle) -> Self {
        self.label = style;
        self
    }

    pub fn flatten_tolerance(mut self, tolerance: f32) -> Self {
        self.flatten_tolerance = tolerance;
        self
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            brush_size: DEFAULT_BRUSH_SIZE,
            show_numbers: true,
            outline: OutlineStyle::default(),
            label: LabelStyle::default(),
            flatten_tolerance: DEFAULT_FLATTEN_TOLERANCE,
        }
    }
}

/// Clamps a brush diameter into the supported range. NaN maps to the default.
pub fn clamp_brush(size: f32) -> f32 {
    if size.is_nan() {
        DEFAULT_BRUSH_SIZE
    } else {
        size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_size_is_clamped() {
        assert_eq!(CanvasConfig::default().brush_size(0.0).brush_size, MIN_BRUSH_SIZE);
        assert_eq!(CanvasConfig::default().brush_size(25.0).brush_size, 25.0);
        assert_eq!(CanvasConfig::default().brush_size(f32::NAN).brush_size, DEFAULT_BRUSH_SIZE);
    }

    #[test]
    fn plate_widens_with_digits() {
        let style = LabelStyle::default();
        assert_eq!(style.plate_width_for(1), 24.0);
        assert_eq!(style.plate_width_for(3), 38.0);
        assert_eq!(style.plate_width_for(0), 24.0);
    }
}
