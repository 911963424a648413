//! Paint-by-numbers canvas core.
//!
//! A [`PaintableImage`] arrives wholesale from an image processing
//! collaborator. From then on only region paint state changes, and only
//! through the [`PaintController`]:
//!
//! ```text
//! Palette::select ─► PaintController ─► HitTester ─► RegionModel::mark_painted
//!                                                          │
//!                       Renderer::render(image, numbers) ◄─┘
//! ```
//!
//! [`Canvas`] bundles these pieces for a UI host. [`ProcessingSession`]
//! owns the current canvas and drops processing results that arrive after a
//! newer request was issued. [`PaintingStore`] is the persistence contract.
//! [`BoardCatalog`] lists ready-made boards to start from.

pub mod boards;
pub mod brush;
pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod hit;
pub mod image;
pub mod palette;
pub mod persist;
pub mod region;
pub mod render;
pub mod session;
pub mod wire;

pub use boards::{Board, BoardCatalog, BoardCategory, BoardFilter, Difficulty};
pub use brush::{BrushSurface, StrokeLayer};
pub use canvas::{Canvas, ColorUsage};
pub use config::{CanvasConfig, LabelStyle, OutlineStyle};
pub use controller::{BrushSettings, ControllerState, PaintController, PaintCtx, PaintOutcome};
pub use error::{CanvasError, Result};
pub use hit::HitTester;
pub use image::{Dimensions, PaintableImage, Region, RegionId};
pub use palette::{Palette, PaletteEntry};
pub use persist::{
    MemoryStore, NewPainting, PaintingId, PaintingRecord, PaintingStore, ProgressUpdate, StoreError, UserId,
};
pub use region::RegionModel;
pub use render::Renderer;
pub use session::{
    fixture_image, Completion, FixtureProcessor, ImagePayload, ImageProcessor, ProcessingError, ProcessingSession,
    ProcessingState, RequestToken,
};
