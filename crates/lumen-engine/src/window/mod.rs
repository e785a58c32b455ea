//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU surface
//! and the frame scheduler.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
