//! Lumen engine crate.
//!
//! A small real-time 3D viewer runtime: scene graph, cameras, orbit
//! controls, texture loading, tweens and a debug parameter registry, driven
//! by a per-frame scheduler and drawn with wgpu into a winit window.

pub mod error;
pub mod logging;
pub mod time;

pub mod paint;
pub mod scene;
pub mod geometry;
pub mod assets;
pub mod camera;
pub mod controls;
pub mod animation;
pub mod debug;

pub mod input;
pub mod viewport;
pub mod core;

pub mod device;
pub mod render;
pub mod window;
