use crate::scene::shapes::circle::CircleCmd;
use crate::scene::shapes::image::ImageCmd;
use crate::scene::shapes::outline::OutlineCmd;
use crate::scene::shapes::rect::RectCmd;
use crate::scene::shapes::text::TextCmd;

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a new shape module under `scene::shapes::*`
/// - add a new variant here
/// - implement push helpers inside that shape module
/// - teach `raster::Rasterizer` to draw it
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Image(ImageCmd),
    Outline(OutlineCmd),
    Rect(RectCmd),
    Circle(CircleCmd),
    Text(TextCmd),
}
