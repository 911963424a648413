//! Input subsystem.
//!
//! Public API is platform-agnostic. Hosts (a browser bridge, a window
//! runtime, the studio's replay scripts) translate their events into
//! `InputEvent`s in image-pixel coordinates.

mod state;
mod types;

pub use state::InputState;
pub use types::{
    InputEvent,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};
