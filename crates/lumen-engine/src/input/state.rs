use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::types::{ButtonState, InputEvent, Key, KeyState, Modifiers, MouseButton};

/// Two presses closer than this form a double click.
const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(300);
/// ...and no farther apart than this, in logical pixels.
const DOUBLE_CLICK_SLOP: f32 = 4.0;

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,

    last_click: Option<(Instant, (f32, f32))>,
}

impl InputState {
    /// Folds an event into the held-state sets.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match *ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = m,

            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Releases are lost while unfocused; avoid stuck keys.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((x, y)),

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = modifiers;
                match state {
                    KeyState::Pressed => {
                        self.keys_down.insert(key);
                    }
                    KeyState::Released => {
                        self.keys_down.remove(&key);
                    }
                }
            }

            InputEvent::PointerButton { button, state, x, y } => {
                self.pointer_pos = Some((x, y));
                match state {
                    ButtonState::Pressed => {
                        self.buttons_down.insert(button);
                    }
                    ButtonState::Released => {
                        self.buttons_down.remove(&button);
                    }
                }
            }

            InputEvent::DoubleClick { .. } | InputEvent::Wheel(_) => {}
        }
    }

    /// Records a primary-button press and reports whether it completes a
    /// double click. A completed double click does not start a new one.
    pub fn register_click(&mut self, now: Instant, pos: (f32, f32)) -> bool {
        let is_double = self.last_click.is_some_and(|(at, (x, y))| {
            now.saturating_duration_since(at) <= DOUBLE_CLICK_INTERVAL
                && (pos.0 - x).abs() <= DOUBLE_CLICK_SLOP
                && (pos.1 - y).abs() <= DOUBLE_CLICK_SLOP
        });

        self.last_click = if is_double { None } else { Some((now, pos)) };
        is_double
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

    #[test]
    fn focus_loss_clears_held_sets() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Key {
            key: Key::W,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        });
        s.apply_event(&InputEvent::PointerButton {
            button: MouseButton::Left,
            state: ButtonState::Pressed,
            x: 1.0,
            y: 2.0,
        });
        assert!(s.key_down(Key::W));
        assert!(s.button_down(MouseButton::Left));
        assert_eq!(s.pointer_pos, Some((1.0, 2.0)));

        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.key_down(Key::W));
        assert!(!s.button_down(MouseButton::Left));
    }

    #[test]
    fn double_click_needs_time_and_proximity() {
        let t0 = Instant::now();
        let mut s = InputState::default();

        assert!(!s.register_click(t0, (10.0, 10.0)));
        assert!(s.register_click(t0 + Duration::from_millis(200), (12.0, 11.0)));
        // Third press starts over.
        assert!(!s.register_click(t0 + Duration::from_millis(250), (12.0, 11.0)));

        assert!(!s.register_click(t0 + Duration::from_millis(700), (12.0, 11.0)));
        assert!(!s.register_click(t0 + Duration::from_millis(800), (40.0, 11.0)));
    }

    #[test]
    fn pressed_key_ignores_repeats() {
        let press = |repeat| InputEvent::Key {
            key: Key::H,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat,
        };
        assert_eq!(press(false).pressed_key(), Some(Key::H));
        assert_eq!(press(true).pressed_key(), None);
    }
}
