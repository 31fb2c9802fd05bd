use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Current input state for the window.
///
/// Holds "is down" information and current pointer position.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in physical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear "down" sets so nothing sticks.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                if let Some((px, py)) = self.pointer_pos {
                    frame.pointer_delta.0 += x - px;
                    frame.pointer_delta.1 += y - py;
                }
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, repeat } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) && !*repeat {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    if self.buttons_down.insert(*button) {
                        frame.buttons_pressed.insert(*button);
                    }
                }
                MouseButtonState::Released => {
                    if self.buttons_down.remove(button) {
                        frame.buttons_released.insert(*button);
                    }
                }
            },

            InputEvent::MouseWheel(delta) => {
                frame.wheel_lines += delta.lines_y();
            }
        }

        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn apply(state: &mut InputState, frame: &mut InputFrame, ev: InputEvent) {
        state.apply_event(frame, ev);
    }

    #[test]
    fn pointer_delta_accumulates_within_a_frame() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        // The first position has nothing to diff against.
        apply(&mut state, &mut frame, InputEvent::PointerMoved { x: 10.0, y: 10.0 });
        apply(&mut state, &mut frame, InputEvent::PointerMoved { x: 14.0, y: 7.0 });
        apply(&mut state, &mut frame, InputEvent::PointerMoved { x: 20.0, y: 9.0 });

        assert_eq!(frame.pointer_delta, (10.0, -1.0));
        assert_eq!(state.pointer_pos, Some((20.0, 9.0)));

        frame.clear();
        assert_eq!(frame.pointer_delta, (0.0, 0.0));
    }

    #[test]
    fn held_button_is_tracked_until_release() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        apply(
            &mut state,
            &mut frame,
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
            },
        );
        assert!(state.button_down(MouseButton::Left));
        assert!(frame.buttons_pressed.contains(&MouseButton::Left));

        frame.clear();
        apply(
            &mut state,
            &mut frame,
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: MouseButtonState::Released,
            },
        );
        assert!(!state.button_down(MouseButton::Left));
        assert!(frame.buttons_released.contains(&MouseButton::Left));
    }

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let press = |repeat| InputEvent::Key {
            key: Key::Space,
            state: KeyState::Pressed,
            repeat,
        };

        apply(&mut state, &mut frame, press(false));
        assert!(frame.key_pressed(Key::Space));

        frame.clear();
        apply(&mut state, &mut frame, press(true));
        assert!(!frame.key_pressed(Key::Space));
        assert!(state.key_down(Key::Space));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            InputEvent::Key {
                key: Key::R,
                state: KeyState::Pressed,
                repeat: false,
            },
        );
        apply(&mut state, &mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::R));
    }

    #[test]
    fn wheel_lines_accumulate() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }),
        );
        apply(
            &mut state,
            &mut frame,
            InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 0.0, y: 40.0 }),
        );
        assert_eq!(frame.wheel_lines, 3.0);
    }
}
