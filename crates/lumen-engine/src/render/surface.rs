use crate::camera::Camera;
use crate::scene::SceneGraph;

/// Per-frame draw failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The frame was dropped (timeout, occluded window); the next may succeed.
    #[error("frame skipped: {0}")]
    SkipFrame(String),

    /// The surface was reconfigured (lost or outdated swapchain); the frame was
    /// not presented.
    #[error("surface reconfigured")]
    Reconfigured,

    /// The surface cannot render anymore (device lost, out of memory).
    #[error("fatal surface error: {0}")]
    Fatal(String),
}

impl RenderError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::Fatal(_))
    }
}

/// Something that can draw a scene from a camera into a sized target.
///
/// Sizes are logical pixels; the backing store is `size * pixel_ratio`.
pub trait RenderSurface {
    fn resize(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Draws one frame. Called once per tick by the frame scheduler.
    fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<(), RenderError>;
}
