//! Color model shared between the canvas layer and the rasterizer.
//!
//! Geometry types remain in `coords` and `geom`.

pub mod color;

pub use color::{Color, ColorParseError};
