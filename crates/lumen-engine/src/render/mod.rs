//! Drawing a scene through a camera.
//!
//! [`RenderSurface`] is the seam the frame loop draws through; [`GpuSurface`]
//! implements it on wgpu with an unlit mesh pipeline.
//!
//! Convention:
//! - projection matrices use OpenGL clip depth; the renderer remaps to wgpu's.
//! - surface sizes are logical pixels, the swapchain is scaled by the pixel ratio.

mod cache;
mod common;
mod ctx;
mod gpu_surface;
mod mesh;
mod surface;

pub use ctx::{RenderCtx, RenderTarget};
pub use gpu_surface::{GpuSurface, SurfaceConfig};
pub use mesh::MeshRenderer;
pub use surface::{RenderError, RenderSurface};
