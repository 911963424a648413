//! Pointer scripts: recorded input replayed against a canvas.
//!
//! ```json
//! [
//!   { "select": 2 },
//!   { "down": { "x": 50, "y": 50 } },
//!   { "move": { "x": 60, "y": 55 } },
//!   "frame",
//!   "up"
//! ]
//! ```

use anyhow::{Context, Result};
use pbn_canvas::{Canvas, PaintOutcome};
use pbn_engine::input::InputEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Select a palette index.
    Select(u32),
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    /// Pointer leaves the canvas.
    Leave,
    /// Advance one display frame.
    Frame,
    /// Set the brush diameter.
    Brush(f32),
    /// Show or hide region numbers.
    Numbers(bool),
    /// Redraw from the region model, dropping brush dabs.
    Redraw,
}

/// Tally of paint attempt outcomes during a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub painted: usize,
    pub repainted: usize,
    pub wrong_color: usize,
    pub brushed: usize,
    pub no_selection: usize,
}

impl ReplayReport {
    fn record(&mut self, outcome: PaintOutcome) {
        match outcome {
            PaintOutcome::Painted { newly: true, .. } => self.painted += 1,
            PaintOutcome::Painted { newly: false, .. } => self.repainted += 1,
            PaintOutcome::WrongColor { .. } => self.wrong_color += 1,
            PaintOutcome::Brushed { .. } => self.brushed += 1,
            PaintOutcome::NoSelection => self.no_selection += 1,
        }
    }
}

pub fn parse(json: &str) -> Result<Vec<Step>> {
    serde_json::from_str(json).context("invalid pointer script")
}

/// Applies `steps` in order.
pub fn replay(canvas: &mut Canvas, steps: &[Step]) -> Result<ReplayReport> {
    let mut report = ReplayReport::default();
    let mut last = (0.0, 0.0);
    for (i, step) in steps.iter().enumerate() {
        let outcome = match *step {
            Step::Select(index) => {
                canvas.select_color(index).with_context(|| format!("step {}", i + 1))?;
                None
            }
            Step::Down { x, y } => {
                last = (x, y);
                canvas.handle(&InputEvent::press(x, y))
            }
            Step::Move { x, y } => {
                last = (x, y);
                canvas.handle(&InputEvent::moved(x, y))
            }
            Step::Up => canvas.handle(&InputEvent::release(last.0, last.1)),
            Step::Leave => canvas.handle(&InputEvent::PointerLeft),
            Step::Frame => canvas.tick(),
            Step::Brush(size) => {
                canvas.set_brush_size(size);
                None
            }
            Step::Numbers(show) => {
                canvas.set_show_numbers(show);
                None
            }
            Step::Redraw => {
                canvas.redraw();
                None
            }
        };
        if let Some(outcome) = outcome {
            log::debug!("step {}: {:?}", i + 1, outcome);
            report.record(outcome);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use pbn_canvas::fixture_image;
    use pbn_canvas::CanvasConfig;

    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(fixture_image().unwrap(), CanvasConfig::default())
    }

    #[test]
    fn parses_steps() {
        let steps = parse(r#"[{"select": 2}, {"down": {"x": 1, "y": 2}}, "frame", "up", {"numbers": false}]"#).unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Select(2),
                Step::Down { x: 1.0, y: 2.0 },
                Step::Frame,
                Step::Up,
                Step::Numbers(false),
            ]
        );
    }

    #[test]
    fn rejects_unknown_step() {
        assert!(parse(r#"["jump"]"#).is_err());
    }

    #[test]
    fn replays_wrong_then_right_color() {
        let mut canvas = canvas();
        // Region 2 needs color 2 and covers (270, 140).
        let steps = vec![
            Step::Select(1),
            Step::Down { x: 270.0, y: 140.0 },
            Step::Up,
            Step::Select(2),
            Step::Down { x: 270.0, y: 140.0 },
            Step::Up,
            Step::Down { x: 700.0, y: 550.0 },
            Step::Up,
        ];
        let report = replay(&mut canvas, &steps).unwrap();
        assert_eq!(report.wrong_color, 1);
        assert_eq!(report.painted, 1);
        assert_eq!(report.brushed, 1);
        assert!(canvas.image().regions().get_region(2).unwrap().is_painted());
        assert_eq!(canvas.image().regions().painted_count(), 1);
    }

    #[test]
    fn unknown_color_fails_with_step_number() {
        let err = replay(&mut canvas(), &[Step::Frame, Step::Select(42)]).unwrap_err();
        assert!(format!("{:#}", err).contains("step 2"));
    }
}
