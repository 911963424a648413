use pbn_engine::input::InputEvent;
use pbn_engine::paint::Color;
use pbn_engine::scene::DrawList;
use pbn_engine::time::FrameClock;

use crate::brush::StrokeLayer;
use crate::config::CanvasConfig;
use crate::controller::{BrushSettings, PaintController, PaintCtx, PaintOutcome};
use crate::error::Result;
use crate::image::PaintableImage;
use crate::palette::Palette;
use crate::render::Renderer;

/// Coverage of one palette color across the regions that need it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorUsage {
    pub index: u32,
    pub label: String,
    pub color: Color,
    /// Painted share of this color's regions, `0..=100`.
    pub percent: u32,
}

/// One painting plus everything needed to paint it interactively.
///
/// The host feeds pointer events through [`handle`](Self::handle), calls
/// [`tick`](Self::tick) once per displayed frame, and draws [`frame`](Self::frame).
pub struct Canvas {
    image: PaintableImage,
    palette: Palette,
    controller: PaintController,
    strokes: StrokeLayer,
    renderer: Renderer,
    clock: FrameClock,
    config: CanvasConfig,
}

impl Canvas {
    pub fn new(image: PaintableImage, config: CanvasConfig) -> Self {
        log::info!(
            "canvas loaded: {} regions, {} colors, {}x{}",
            image.regions().len(),
            image.palette().len(),
            image.dimensions().width,
            image.dimensions().height
        );
        Self {
            palette: Palette::new(image.palette().to_vec()),
            controller: PaintController::new(BrushSettings::new(config.brush_size)),
            strokes: StrokeLayer::new(),
            renderer: Renderer::new(&config),
            clock: FrameClock::new(),
            image,
            config,
        }
    }

    #[inline]
    pub fn image(&self) -> &PaintableImage {
        &self.image
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn controller(&self) -> &PaintController {
        &self.controller
    }

    #[inline]
    pub fn strokes(&self) -> &StrokeLayer {
        &self.strokes
    }

    #[inline]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn completion_ratio(&self) -> f32 {
        self.image.regions().completion_ratio()
    }

    // ── settings ──────────────────────────────────────────────────────────

    pub fn select_color(&mut self, index: u32) -> Result<()> {
        self.palette.select(index)
    }

    pub fn set_show_numbers(&mut self, show: bool) {
        self.config.show_numbers = show;
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.controller.set_brush_size(size);
        self.config.brush_size = self.controller.brush().size();
    }

    // ── frames ────────────────────────────────────────────────────────────

    /// Rendered painting with brush dabs on top.
    pub fn frame(&self) -> DrawList {
        let mut list = self.renderer.render(&self.image, self.config.show_numbers);
        self.strokes.draw_into(&mut list);
        list
    }

    /// Redraws from the region model alone. Brush dabs are discarded.
    pub fn redraw(&mut self) -> DrawList {
        self.strokes.clear();
        self.renderer.render(&self.image, self.config.show_numbers)
    }

    /// Advances the frame clock and applies a pointer move parked during
    /// the previous frame.
    pub fn tick(&mut self) -> Option<PaintOutcome> {
        let frame = self.clock.tick();
        self.begin_frame(frame.frame_index)
    }

    /// Like [`tick`](Self::tick) for hosts that count frames themselves.
    pub fn begin_frame(&mut self, frame_index: u64) -> Option<PaintOutcome> {
        let ctx = PaintCtx { image: &mut self.image, palette: &self.palette, surface: &mut self.strokes };
        let outcome = self.controller.begin_frame(frame_index, ctx);
        self.after_attempt(outcome)
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> Option<PaintOutcome> {
        let ctx = PaintCtx { image: &mut self.image, palette: &self.palette, surface: &mut self.strokes };
        let outcome = self.controller.handle(event, ctx);
        self.after_attempt(outcome)
    }

    /// A newly painted region redraws the canvas, which drops brush dabs.
    fn after_attempt(&mut self, outcome: Option<PaintOutcome>) -> Option<PaintOutcome> {
        if let Some(PaintOutcome::Painted { newly: true, .. }) = outcome {
            self.strokes.clear();
        }
        outcome
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Loads another painting. Selection, stroke state and dabs start over.
    pub fn replace_image(&mut self, image: PaintableImage) {
        log::info!("canvas replaced: {} regions", image.regions().len());
        self.palette = Palette::new(image.palette().to_vec());
        self.image = image;
        self.controller.reset();
        self.strokes.clear();
    }

    /// Starts the same painting over.
    pub fn reset_progress(&mut self) {
        self.image.regions_mut().reset_progress();
        self.controller.reset();
        self.strokes.clear();
    }

    /// Per-color completion, in palette order.
    pub fn color_usage(&self) -> Vec<ColorUsage> {
        let regions = self.image.regions();
        self.palette
            .entries()
            .iter()
            .map(|e| ColorUsage {
                index: e.index,
                label: e.label.clone(),
                color: e.color,
                percent: (regions.coverage(e.index) * 100.0).round() as u32,
            })
            .collect()
    }
}
