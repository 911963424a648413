//! Pointer-driven painting.
//!
//! The controller is a two-state machine:
//!
//! ```text
//! Idle ──pointer down──► Painting ──pointer up / left──► Idle
//!                          │  ▲
//!                          └──┘ pointer move (one attempt per frame)
//! ```
//!
//! Every attempt either paints the region under the pointer, rejects a
//! wrong color, or falls back to a free-hand brush dab.

use pbn_engine::coords::Vec2;
use pbn_engine::input::{InputEvent, InputState, MouseButton, MouseButtonState, PointerButtonEvent};
use pbn_engine::time::FrameGate;

use crate::brush::BrushSurface;
use crate::config::{clamp_brush, DEFAULT_BRUSH_SIZE};
use crate::hit::HitTester;
use crate::image::{PaintableImage, RegionId};
use crate::palette::Palette;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Painting,
}

/// Result of one paint attempt.
///
/// `WrongColor` is an ordinary outcome of user input, not an error.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PaintOutcome {
    /// The hit region matched the selected color. `newly` is false when it
    /// was already painted.
    Painted { region: RegionId, newly: bool },
    /// The hit region needs `expected`; nothing changed.
    WrongColor { region: RegionId, expected: u32, selected: u32 },
    /// No region under the pointer; a brush dab was painted.
    Brushed { center: Vec2 },
    /// The palette is empty, so there is nothing to paint with.
    NoSelection,
}

/// Free-hand brush settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BrushSettings {
    size: f32,
}

impl BrushSettings {
    pub fn new(size: f32) -> Self {
        Self { size: clamp_brush(size) }
    }

    /// Brush diameter in image pixels.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = clamp_brush(size);
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE)
    }
}

/// What a paint attempt reads and writes.
pub struct PaintCtx<'a> {
    pub image: &'a mut PaintableImage,
    pub palette: &'a Palette,
    pub surface: &'a mut dyn BrushSurface,
}

/// Converts pointer input into region model changes.
///
/// Pointer moves are rate-limited through a [`FrameGate`]: the first move
/// of a frame is attempted immediately, later ones only update a pending
/// position that [`begin_frame`](Self::begin_frame) applies on the next
/// frame. Ending the stroke drops the pending position.
#[derive(Debug, Default)]
pub struct PaintController {
    state: ControllerState,
    input: InputState,
    gate: FrameGate,
    pending: Option<Vec2>,
    brush: BrushSettings,
}

impl PaintController {
    pub fn new(brush: BrushSettings) -> Self {
        Self { brush, ..Self::default() }
    }

    #[inline]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    #[inline]
    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.set_size(size);
    }

    /// Drops any stroke in progress.
    pub fn reset(&mut self) {
        self.state = ControllerState::Idle;
        self.pending = None;
        self.gate.reset();
        self.input = InputState::default();
    }

    // ── frames ────────────────────────────────────────────────────────────

    /// Starts frame `frame_index` and applies the move parked during the
    /// previous frame, if any.
    pub fn begin_frame(&mut self, frame_index: u64, ctx: PaintCtx<'_>) -> Option<PaintOutcome> {
        self.gate.begin_frame(frame_index);
        if self.state != ControllerState::Painting {
            return None;
        }
        let p = self.pending.take()?;
        self.gate.try_acquire();
        Some(self.attempt(p, ctx))
    }

    // ── pointer transitions ───────────────────────────────────────────────

    /// Routes a host event. Returns the outcome of any paint attempt it
    /// caused.
    pub fn handle(&mut self, event: &InputEvent, ctx: PaintCtx<'_>) -> Option<PaintOutcome> {
        let transition = self.input.apply_event(event);
        match *event {
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state,
                x,
                y,
            }) if transition => match state {
                MouseButtonState::Pressed => Some(self.pointer_down(Vec2::new(x, y), ctx)),
                MouseButtonState::Released => {
                    self.pointer_up();
                    None
                }
            },
            InputEvent::PointerMoved(m) => self.pointer_move(Vec2::new(m.x, m.y), ctx),
            InputEvent::PointerLeft => {
                self.pointer_left();
                None
            }
            InputEvent::Focused(false) => {
                self.pointer_up();
                None
            }
            _ => None,
        }
    }

    /// `Idle → Painting`, with one immediate attempt at `p`.
    pub fn pointer_down(&mut self, p: Vec2, ctx: PaintCtx<'_>) -> PaintOutcome {
        self.state = ControllerState::Painting;
        self.pending = None;
        self.gate.try_acquire();
        self.attempt(p, ctx)
    }

    /// Attempts at `p` while painting, at most once per frame. Returns
    /// `None` when idle or when the move was parked for the next frame.
    pub fn pointer_move(&mut self, p: Vec2, ctx: PaintCtx<'_>) -> Option<PaintOutcome> {
        if self.state != ControllerState::Painting {
            return None;
        }
        if self.gate.try_acquire() {
            self.pending = None;
            Some(self.attempt(p, ctx))
        } else {
            self.pending = Some(p);
            None
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = ControllerState::Idle;
        self.pending = None;
    }

    /// Ends the stroke. A release outside the surface is never seen, so
    /// held buttons are forgotten too.
    pub fn pointer_left(&mut self) {
        self.pointer_up();
        self.input.buttons_down.clear();
    }

    // ── paint attempt ─────────────────────────────────────────────────────

    /// One paint attempt at `p` with the palette's current selection.
    pub fn attempt(&self, p: Vec2, ctx: PaintCtx<'_>) -> PaintOutcome {
        let Some(selected) = ctx.palette.current() else {
            return PaintOutcome::NoSelection;
        };

        let hit = HitTester::new(ctx.image.regions())
            .region_at(p)
            .map(|r| (r.id, r.target_color_index));

        match hit {
            None => {
                ctx.surface.dab(p, self.brush.radius(), selected.color);
                PaintOutcome::Brushed { center: p }
            }
            Some((id, target)) if target == selected.index => {
                let newly = ctx.image.regions_mut().mark_painted(id);
                if newly {
                    log::debug!("painted region {} with color {}", id, target);
                }
                PaintOutcome::Painted { region: id, newly }
            }
            Some((id, target)) => {
                log::debug!(
                    "wrong color: region {} needs color {}, selected {}",
                    id, target, selected.index
                );
                PaintOutcome::WrongColor { region: id, expected: target, selected: selected.index }
            }
        }
    }
}
