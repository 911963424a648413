//! Frame timing.
//!
//! `FrameClock` produces per-frame snapshots; `FrameGate` lets a consumer do
//! at most one unit of work per frame.

mod frame_clock;
mod gate;

pub use frame_clock::{FrameClock, FrameTime};
pub use gate::FrameGate;
