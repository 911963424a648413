/// Frame snapshot handed to per-frame work.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameTime {
    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per canvas surface. Hosts without a display refresh callback
/// (the studio replaying a script) tick it once per scripted frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { frame_index: 0 }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let ft = FrameTime { frame_index: self.frame_index };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
