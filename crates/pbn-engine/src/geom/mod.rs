//! Vector outlines: flattening, bounds and point containment.
//!
//! Outlines come from SVG path data (`pbn-path`). Curves are flattened once
//! at construction so hit-testing and rasterization both work on the same
//! polygons.

mod outline;

pub use outline::{Outline, DEFAULT_FLATTEN_TOLERANCE};
