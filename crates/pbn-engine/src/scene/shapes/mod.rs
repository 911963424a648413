pub(crate) mod circle;
pub(crate) mod image;
pub(crate) mod outline;
pub(crate) mod rect;
pub(crate) mod text;

pub use circle::CircleCmd;
pub use image::ImageCmd;
pub use outline::OutlineCmd;
pub use rect::RectCmd;
pub use text::{TextAlign, TextCmd};

use crate::paint::Color;

/// Stroke drawn along the edge of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

impl Border {
    #[inline]
    pub fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}
