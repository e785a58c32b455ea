use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::device::Gpu;
use crate::paint::Color;
use crate::scene::SceneGraph;

use super::ctx::{RenderCtx, RenderTarget};
use super::mesh::{MeshRenderer, DEPTH_FORMAT};
use super::surface::{RenderError, RenderSurface};

/// Presentation settings of a [`GpuSurface`].
#[derive(Debug, Clone, Copy)]
pub struct SurfaceConfig {
    pub clear_color: Color,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { clear_color: Color::BLACK }
    }
}

struct DepthBuffer {
    size: (u32, u32),
    view: wgpu::TextureView,
}

/// [`RenderSurface`] backed by a wgpu swapchain.
///
/// Sizes passed to [`RenderSurface::resize`] are logical; the swapchain is
/// `logical * pixel_ratio`.
pub struct GpuSurface<'w> {
    gpu: Gpu<'w>,
    config: SurfaceConfig,
    logical: (u32, u32),
    pixel_ratio: f32,
    depth: Option<DepthBuffer>,
    meshes: MeshRenderer,
}

impl<'w> GpuSurface<'w> {
    pub fn new(gpu: Gpu<'w>, config: SurfaceConfig, logical: (u32, u32), pixel_ratio: f32) -> Self {
        Self {
            gpu,
            config,
            logical,
            pixel_ratio,
            depth: None,
            meshes: MeshRenderer::new(),
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn config_mut(&mut self) -> &mut SurfaceConfig {
        &mut self.config
    }

    fn physical_size(&self) -> PhysicalSize<u32> {
        let scale = |v: u32| (v as f32 * self.pixel_ratio).round() as u32;
        PhysicalSize::new(scale(self.logical.0), scale(self.logical.1))
    }

    fn apply_size(&mut self) {
        let size = self.physical_size();
        self.gpu.resize(size);
        log::debug!("surface: {}x{} physical", size.width, size.height);
    }

    fn ensure_depth(&mut self) {
        let size = self.gpu.size();
        let size = (size.width, size.height);
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }

        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen depth"),
            size: wgpu::Extent3d { width: size.0, height: size.1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthBuffer { size, view });
    }
}

impl RenderSurface for GpuSurface<'_> {
    fn resize(&mut self, width: u32, height: u32) {
        self.logical = (width, height);
        self.apply_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.pixel_ratio = ratio;
        }
    }

    fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<(), RenderError> {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::SkipFrame("surface has zero size".into()));
        }
        let Some(view_projection) = camera.view_projection(scene) else {
            return Err(RenderError::SkipFrame(format!("camera node {} is gone", camera.node())));
        };

        self.ensure_depth();

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => return Err(self.gpu.handle_surface_error(err)),
        };

        let Some(depth) = self.depth.as_ref() else {
            return Err(RenderError::SkipFrame("depth buffer unavailable".into()));
        };
        let ctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            (size.width, size.height),
        );
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, &depth.view);
            self.meshes.render(&ctx, &mut target, scene, view_projection, self.config.clear_color);
        }

        self.gpu.submit(frame);
        Ok(())
    }
}
