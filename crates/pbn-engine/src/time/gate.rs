/// Allows one unit of work per frame.
///
/// Pointer moves arrive far more often than frames are drawn; the paint
/// controller asks the gate before each move attempt and parks the latest
/// position when the frame's slot is already used.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    current: u64,
    used: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts frame `frame_index`, freeing the slot if the index moved on.
    pub fn begin_frame(&mut self, frame_index: u64) {
        if frame_index != self.current {
            self.current = frame_index;
            self.used = false;
        }
    }

    /// Claims this frame's slot. Returns `false` when it was already taken.
    pub fn try_acquire(&mut self) -> bool {
        if self.used {
            false
        } else {
            self.used = true;
            true
        }
    }

    /// Frees the slot without advancing the frame (e.g. a new stroke starts).
    pub fn reset(&mut self) {
        self.used = false;
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.current
    }
}
