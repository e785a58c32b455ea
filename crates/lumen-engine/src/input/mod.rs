//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s (see `translate`).

mod state;
pub(crate) mod translate;
mod types;

pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, KeyState, Modifiers, MouseButton, WheelDelta};
