use crate::coords::Rect;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Image draw payload.
///
/// `source` is an opaque reference (URL, data URL, file path). Backends
/// resolve it themselves; an unresolved source draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCmd {
    pub source: String,
    /// Destination rectangle; the image is scaled to fill it.
    pub dest: Rect,
}

impl DrawList {
    /// Records an image scaled into `dest`.
    pub fn push_image(&mut self, z: ZIndex, source: impl Into<String>, dest: Rect) {
        self.push(z, DrawCmd::Image(ImageCmd { source: source.into(), dest }));
    }
}
