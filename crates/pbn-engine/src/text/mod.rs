//! Font loading, measurement and glyph coverage.
//!
//! The canvas layer only names fonts by [`FontId`]; the rasterizer owns a
//! [`FontSystem`] and turns text commands into coverage masks.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem, GlyphMask};
