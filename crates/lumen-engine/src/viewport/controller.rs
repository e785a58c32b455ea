use crate::camera::CameraRig;
use crate::error::PlatformError;
use crate::render::RenderSurface;

use super::state::{ViewportConfig, ViewportState};

/// The host window's fullscreen capability.
pub trait FullscreenPlatform {
    fn is_fullscreen(&self) -> bool;

    /// Requests a fullscreen change. Hosts may refuse.
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), PlatformError>;
}

/// Keeps cameras, the render surface and the fullscreen flag in step with the
/// host window.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
}

impl ViewportController {
    pub fn new(config: ViewportConfig, width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let pixel_ratio = effective_ratio(&config, device_pixel_ratio);
        Self {
            config,
            state: ViewportState { width, height, pixel_ratio, fullscreen: false },
        }
    }

    #[inline]
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Applies a new window size.
    ///
    /// Before returning, every camera in `cameras` has the new aspect and a
    /// refreshed projection matrix, and `surface` has the new pixel ratio and
    /// size. A zero-sized viewport (minimized window) updates the state and
    /// the surface but leaves camera aspects untouched.
    pub fn on_resize(
        &mut self,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
        cameras: &mut CameraRig,
        surface: &mut dyn RenderSurface,
    ) {
        self.state.width = width;
        self.state.height = height;
        self.state.pixel_ratio = effective_ratio(&self.config, device_pixel_ratio);

        match self.state.aspect() {
            Some(aspect) => {
                for camera in cameras.iter_mut() {
                    camera.set_aspect(aspect);
                    camera.update_projection();
                }
            }
            None => log::debug!("viewport: {width}x{height} is degenerate, keeping camera aspect"),
        }

        surface.set_pixel_ratio(self.state.pixel_ratio);
        surface.resize(width, height);

        log::debug!(
            "viewport: {}x{} @{}x ({} cameras)",
            width,
            height,
            self.state.pixel_ratio,
            cameras.len()
        );
    }

    /// Requests the opposite of the platform's current fullscreen state.
    ///
    /// Returns the new state. On refusal the error is logged and the state
    /// stays at what the platform last reported.
    pub fn toggle_fullscreen(&mut self, platform: &mut dyn FullscreenPlatform) -> Result<bool, PlatformError> {
        let current = platform.is_fullscreen();
        let wanted = !current;

        match platform.set_fullscreen(wanted) {
            Ok(()) => {
                self.state.fullscreen = wanted;
                log::info!("viewport: fullscreen {}", if wanted { "on" } else { "off" });
                Ok(wanted)
            }
            Err(err) => {
                self.state.fullscreen = current;
                log::warn!("viewport: {err}");
                Err(err)
            }
        }
    }

    /// Syncs the flag when the host changes fullscreen on its own (e.g. Esc).
    pub fn on_fullscreen_changed(&mut self, fullscreen: bool) {
        self.state.fullscreen = fullscreen;
    }
}

fn effective_ratio(config: &ViewportConfig, device_pixel_ratio: f32) -> f32 {
    let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    ratio.min(config.max_pixel_ratio.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, Projection};
    use crate::render::RenderError;
    use crate::scene::{NodeKind, SceneGraph};

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
        size: (u32, u32),
        ratio: f32,
    }

    impl RenderSurface for RecordingSurface {
        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.calls.push(format!("resize {width}x{height}"));
        }

        fn set_pixel_ratio(&mut self, ratio: f32) {
            self.ratio = ratio;
            self.calls.push(format!("ratio {ratio}"));
        }

        fn draw(&mut self, _scene: &SceneGraph, _camera: &Camera) -> Result<(), RenderError> {
            Ok(())
        }
    }

    struct FakeWindow {
        fullscreen: bool,
        deny: bool,
    }

    impl FullscreenPlatform for FakeWindow {
        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), PlatformError> {
            if self.deny {
                return Err(PlatformError::FullscreenDenied { reason: "not allowed".into() });
            }
            self.fullscreen = fullscreen;
            Ok(())
        }
    }

    fn rig() -> CameraRig {
        let mut scene = SceneGraph::new();
        let a = scene.spawn(NodeKind::Camera);
        let b = scene.spawn(NodeKind::Camera);
        let mut rig = CameraRig::new();
        rig.insert(Camera::perspective(a, 75.0, 1.0, 0.1, 100.0).unwrap());
        rig.insert(Camera::orthographic(b, -1.0, 1.0, 1.0, -1.0, 0.1, 100.0).unwrap());
        rig
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_updates_every_camera_and_surface() {
        let mut cameras = rig();
        let mut surface = RecordingSurface::default();
        let mut viewport = ViewportController::new(ViewportConfig::default(), 800, 600, 1.0);

        viewport.on_resize(1600, 900, 3.0, &mut cameras, &mut surface);

        for (_, cam) in cameras.iter() {
            let expected = match *cam.projection() {
                Projection::Perspective { aspect, .. } => {
                    assert!((aspect - 16.0 / 9.0).abs() < 1e-6);
                    cam.projection().matrix()
                }
                Projection::Orthographic { left, right, .. } => {
                    assert!((right - 16.0 / 9.0).abs() < 1e-6);
                    assert!((left + 16.0 / 9.0).abs() < 1e-6);
                    cam.projection().matrix()
                }
            };
            // The projection matrix is already current when on_resize returns.
            assert_eq!(cam.projection_matrix(), expected);
        }

        assert_eq!(surface.size, (1600, 900));
        assert_eq!(surface.ratio, 2.0);
        assert_eq!(surface.calls, vec!["ratio 2", "resize 1600x900"]);
        assert_eq!(viewport.state().physical_size(), (3200, 1800));
    }

    #[test]
    fn zero_height_keeps_camera_aspect() {
        let mut cameras = rig();
        let mut surface = RecordingSurface::default();
        let mut viewport = ViewportController::new(ViewportConfig::default(), 800, 600, 1.0);
        viewport.on_resize(800, 400, 1.0, &mut cameras, &mut surface);
        let before: Vec<_> = cameras.iter().map(|(_, c)| c.projection_matrix()).collect();

        viewport.on_resize(800, 0, 1.0, &mut cameras, &mut surface);

        let after: Vec<_> = cameras.iter().map(|(_, c)| c.projection_matrix()).collect();
        assert_eq!(before, after);
        assert!(after.iter().all(|m| m.is_finite()));
        assert_eq!(surface.size, (800, 0));
        assert_eq!(viewport.state().aspect(), None);
    }

    #[test]
    fn bogus_device_ratio_falls_back_to_one() {
        let viewport = ViewportController::new(ViewportConfig::default(), 10, 10, f32::NAN);
        assert_eq!(viewport.state().pixel_ratio, 1.0);
    }

    // ── fullscreen ────────────────────────────────────────────────────────

    #[test]
    fn toggle_follows_platform_state() {
        let mut viewport = ViewportController::new(ViewportConfig::default(), 10, 10, 1.0);
        let mut window = FakeWindow { fullscreen: false, deny: false };

        assert_eq!(viewport.toggle_fullscreen(&mut window), Ok(true));
        assert!(viewport.state().fullscreen);

        // Host left fullscreen on its own; the toggle queries rather than trusts.
        window.fullscreen = false;
        assert_eq!(viewport.toggle_fullscreen(&mut window), Ok(true));
        assert!(window.fullscreen);

        assert_eq!(viewport.toggle_fullscreen(&mut window), Ok(false));
        assert!(!viewport.state().fullscreen);
    }

    #[test]
    fn denied_toggle_rolls_back() {
        let mut viewport = ViewportController::new(ViewportConfig::default(), 10, 10, 1.0);
        let mut window = FakeWindow { fullscreen: false, deny: true };

        assert!(viewport.toggle_fullscreen(&mut window).is_err());
        assert!(!viewport.state().fullscreen);

        viewport.on_fullscreen_changed(true);
        assert!(viewport.state().fullscreen);
    }
}
