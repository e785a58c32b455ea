use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps physical key codes into these variants; anything else
/// arrives as `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Wheel delta. `Line` comes from notched wheels, `Pixel` from touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl WheelDelta {
    /// Vertical component with "positive = scroll down" orientation.
    pub fn scroll_down(&self) -> f32 {
        match *self {
            WheelDelta::Line { y, .. } | WheelDelta::Pixel { y, .. } => -y,
        }
    }
}

/// Platform-agnostic input events, pointer coordinates in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        repeat: bool,
    },

    PointerMoved { x: f32, y: f32 },

    PointerButton {
        button: MouseButton,
        state: ButtonState,
        x: f32,
        y: f32,
    },

    /// Second primary-button press close in time and space to the first.
    DoubleClick { x: f32, y: f32 },

    Wheel(WheelDelta),

    PointerLeft,

    ModifiersChanged(Modifiers),

    Focused(bool),
}

impl InputEvent {
    /// Convenience for key handlers: the key of a fresh (non-repeat) press.
    pub fn pressed_key(&self) -> Option<Key> {
        match *self {
            InputEvent::Key { key, state: KeyState::Pressed, repeat: false, .. } => Some(key),
            _ => None,
        }
    }
}
