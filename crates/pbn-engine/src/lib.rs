//! Paint-by-numbers engine crate.
//!
//! This crate owns the renderer-agnostic pieces used by the canvas layer:
//! geometry, colors, draw streams, pointer input, frame timing, fonts, and a
//! software rasterizer that turns draw streams into pixels.

pub mod input;
pub mod time;

pub mod logging;
pub mod coords;
pub mod geom;
pub mod paint;
pub mod raster;
pub mod scene;
pub mod text;
