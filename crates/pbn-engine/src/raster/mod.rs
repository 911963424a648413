//! Software rasterizer.
//!
//! Replays a [`DrawList`](crate::scene::DrawList) in paint order onto a
//! `tiny_skia::Pixmap` and hands the result back as an `image::RgbaImage`.
//! Used for PNG export and for pixel-level tests of the canvas renderer;
//! interactive hosts are free to replay the same draw list onto their own
//! surface instead.

mod rasterizer;

pub use rasterizer::{RasterConfig, Rasterizer};
