use std::collections::HashSet;

use super::types::{InputEvent, MouseButton, MouseButtonState, PointerButtonEvent, PointerMoveEvent};

/// Current pointer state for a single canvas surface.
///
/// Holds "is down" information and the current pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in image pixels; `None` while outside the surface.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an input event to the current state.
    ///
    /// Returns `true` for a button transition (press of an up button or
    /// release of a held one); repeats are reported as `false`.
    pub fn apply_event(&mut self, ev: &InputEvent) -> bool {
        match ev {
            InputEvent::Focused(f) => {
                if !*f {
                    // A release delivered elsewhere cannot leave a button stuck.
                    self.buttons_down.clear();
                }
                false
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
                false
            }

            // The surface never sees a release that happens outside it.
            InputEvent::PointerLeft => {
                self.pointer_pos = None;
                self.buttons_down.clear();
                false
            }

            InputEvent::PointerButton(PointerButtonEvent { button, state, x, y }) => {
                self.pointer_pos = Some((*x, *y));
                match state {
                    MouseButtonState::Pressed => self.buttons_down.insert(*button),
                    MouseButtonState::Released => self.buttons_down.remove(button),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(s: &InputState) -> bool {
        s.buttons_down.contains(&MouseButton::Left)
    }

    #[test]
    fn press_then_release_transitions_once() {
        let mut s = InputState::default();
        assert!(s.apply_event(&InputEvent::press(1.0, 2.0)));
        assert!(!s.apply_event(&InputEvent::press(1.0, 2.0)));
        assert!(held(&s));
        assert!(s.apply_event(&InputEvent::release(1.0, 2.0)));
        assert!(!held(&s));
    }

    #[test]
    fn leaving_clears_position_and_buttons() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::press(3.0, 4.0));
        assert_eq!(s.pointer_pos, Some((3.0, 4.0)));
        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
        assert!(!held(&s));
        // Coming back in, the next press is a fresh transition.
        assert!(s.apply_event(&InputEvent::press(3.0, 4.0)));
    }

    #[test]
    fn focus_loss_releases_buttons() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::press(0.0, 0.0));
        s.apply_event(&InputEvent::Focused(false));
        assert!(s.buttons_down.is_empty());
    }
}
