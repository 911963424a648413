use std::sync::Arc;

use crate::geom::Outline;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

use super::Border;

/// Vector outline payload: optional even-odd fill, optional stroke.
///
/// The outline is shared, so recording a frame never copies geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineCmd {
    pub outline: Arc<Outline>,
    pub fill: Option<Color>,
    pub stroke: Option<Border>,
}

impl DrawList {
    /// Records an outline with optional fill and stroke.
    pub fn push_outline(
        &mut self,
        z: ZIndex,
        outline: Arc<Outline>,
        fill: Option<Color>,
        stroke: Option<Border>,
    ) {
        self.push(z, DrawCmd::Outline(OutlineCmd { outline, fill, stroke }));
    }
}
