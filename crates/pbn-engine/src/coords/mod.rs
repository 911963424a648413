//! Coordinate and geometry types shared across the canvas and rasterizer.
//!
//! Canonical space:
//! - Image pixels (the dimensions a painting was generated at)
//! - Origin top-left
//! - +X right, +Y down

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
