//! Viewport synchronization: window size, pixel ratio and fullscreen.

mod controller;
mod state;

pub use controller::{FullscreenPlatform, ViewportController};
pub use state::{ViewportConfig, ViewportState};
