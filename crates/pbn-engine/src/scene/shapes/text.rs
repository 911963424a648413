use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};
use crate::text::FontId;

/// Where `TextCmd::position` sits relative to the laid-out text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextAlign {
    /// `position` is the top-left of the text block.
    #[default]
    TopLeft,
    /// `position` is the center of the text block.
    Center,
}

/// Text draw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text: String,
    pub font: FontId,
    /// Font size in image pixels.
    pub size: f32,
    pub color: Color,
    pub position: Vec2,
    pub align: TextAlign,
}

impl DrawList {
    /// Records a text draw command.
    pub fn push_text(
        &mut self,
        z: ZIndex,
        text: impl Into<String>,
        font: FontId,
        size: f32,
        color: Color,
        position: Vec2,
        align: TextAlign,
    ) {
        self.push(z, DrawCmd::Text(TextCmd {
            text: text.into(),
            font,
            size,
            color,
            position,
            align,
        }));
    }
}
