use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use crate::assets::ResourceLoader;
use crate::core::{App, AppControl, FrameRequester, FrameScheduler, Stage};
use crate::device::{Gpu, GpuInit};
use crate::error::PlatformError;
use crate::input::translate::translate_window_event;
use crate::input::{ButtonState, InputEvent, MouseButton};
use crate::render::{GpuSurface, SurfaceConfig};
use crate::viewport::{FullscreenPlatform, ViewportConfig, ViewportController};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub viewport: ViewportConfig,
    pub surface: SurfaceConfig,
    /// Primary double-click toggles fullscreen.
    pub fullscreen_on_double_click: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            viewport: ViewportConfig::default(),
            surface: SurfaceConfig::default(),
            fullscreen_on_double_click: true,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, builds the stage and runs the frame loop until the
    /// window closes or the app exits.
    ///
    /// `setup` runs once the window and GPU exist. It populates the stage
    /// (scene, cameras, controls, loads) and returns the app.
    pub fn run<A, F>(config: RuntimeConfig, gpu_init: GpuInit, loader: ResourceLoader, setup: F) -> Result<()>
    where
        A: App + 'static,
        F: FnOnce(&mut Stage) -> Result<A>,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, gpu_init, loader, setup);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    surface: GpuSurface<'this>,
}

/// Schedules frames through winit redraw requests.
struct WindowRequester<'a>(&'a Window);

impl FrameRequester for WindowRequester<'_> {
    fn schedule_next(&mut self) {
        self.0.request_redraw();
    }
}

/// Borderless fullscreen on the window's current monitor.
struct WinitFullscreen<'a>(&'a Window);

impl FullscreenPlatform for WinitFullscreen<'_> {
    fn is_fullscreen(&self) -> bool {
        self.0.fullscreen().is_some()
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), PlatformError> {
        if !fullscreen {
            self.0.set_fullscreen(None);
            return Ok(());
        }
        let Some(monitor) = self.0.current_monitor() else {
            return Err(PlatformError::FullscreenDenied { reason: "window has no current monitor".into() });
        };
        self.0.set_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        Ok(())
    }
}

fn logical_size(window: &Window) -> LogicalSize<u32> {
    window.inner_size().to_logical(window.scale_factor())
}

struct RuntimeState<A, F>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    loader: Option<ResourceLoader>,
    setup: Option<F>,

    entry: Option<WindowEntry>,
    scheduler: Option<FrameScheduler<A>>,
    failure: Option<anyhow::Error>,
}

impl<A, F> RuntimeState<A, F>
where
    A: App + 'static,
    F: FnOnce(&mut Stage) -> Result<A>,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, loader: ResourceLoader, setup: F) -> Self {
        Self {
            config,
            gpu_init,
            loader: Some(loader),
            setup: Some(setup),
            entry: None,
            scheduler: None,
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let scale = window.scale_factor() as f32;
        let logical = logical_size(&window);
        let viewport = ViewportController::new(self.config.viewport, logical.width, logical.height, scale);
        let pixel_ratio = viewport.state().pixel_ratio;
        let (width, height) = viewport.state().physical_size();

        let gpu_init = self.gpu_init.clone();
        let surface_config = self.config.surface;

        let mut entry = WindowEntryTryBuilder {
            window,
            surface_builder: |window| {
                let gpu = pollster::block_on(Gpu::new(window, PhysicalSize::new(width, height), gpu_init))?;
                Ok::<_, anyhow::Error>(GpuSurface::new(
                    gpu,
                    surface_config,
                    (logical.width, logical.height),
                    pixel_ratio,
                ))
            },
        }
        .try_build()
        .context("GPU initialization failed")?;

        let loader = self.loader.take().context("runtime started twice")?;
        let setup = self.setup.take().context("runtime started twice")?;

        let mut stage = Stage::new(loader, viewport);
        let app = setup(&mut stage).context("app setup failed")?;

        // Cameras added by setup pick up the real window aspect.
        entry.with_surface_mut(|surface| {
            let state = *stage.viewport.state();
            stage.viewport.on_resize(state.width, state.height, scale, &mut stage.cameras, surface);
        });

        let mut scheduler = FrameScheduler::new(stage, app);
        scheduler.start(&mut WindowRequester(entry.borrow_window()));

        log::info!("runtime: window {}x{} @{}x", logical.width, logical.height, pixel_ratio);

        self.entry = Some(entry);
        self.scheduler = Some(scheduler);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("runtime: {err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }
}

/// Hands `event` to the stage and then to the app. Returns `false` once the
/// app asks to exit.
fn dispatch<A: App>(scheduler: &mut FrameScheduler<A>, event: &InputEvent) -> bool {
    let (stage, app) = scheduler.parts_mut();
    stage.apply_input(event);
    app.on_input(stage, event) == AppControl::Continue
}

impl<A, F> ApplicationHandler for RuntimeState<A, F>
where
    A: App + 'static,
    F: FnOnce(&mut Stage) -> Result<A>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.scheduler.as_ref().is_some_and(|s| s.is_stopped()) {
            event_loop.exit();
            return;
        }

        // The scheduler requests each next frame itself.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(entry), Some(scheduler)) = (self.entry.as_mut(), self.scheduler.as_mut()) else {
            return;
        };
        if scheduler.is_stopped() {
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                scheduler.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                entry.with_mut(|fields| {
                    let scale = fields.window.scale_factor() as f32;
                    let logical = logical_size(fields.window);
                    let stage = scheduler.stage_mut();

                    stage.viewport.on_fullscreen_changed(fields.window.fullscreen().is_some());
                    stage.viewport.on_resize(
                        logical.width,
                        logical.height,
                        scale,
                        &mut stage.cameras,
                        fields.surface,
                    );
                    fields.window.request_redraw();
                });
            }

            WindowEvent::RedrawRequested => {
                entry.with_mut(|fields| {
                    scheduler.tick(fields.surface, &mut WindowRequester(fields.window));
                });
                if scheduler.is_stopped() {
                    event_loop.exit();
                }
            }

            _ => {
                let window = entry.borrow_window();
                let Some(input) = translate_window_event(window.scale_factor(), &scheduler.stage().input, &event)
                else {
                    return;
                };

                let mut running = dispatch(scheduler, &input);

                if let InputEvent::PointerButton { button: MouseButton::Left, state: ButtonState::Pressed, x, y } = input
                    && scheduler.stage_mut().input.register_click(Instant::now(), (x, y))
                {
                    running &= dispatch(scheduler, &InputEvent::DoubleClick { x, y });
                    if self.config.fullscreen_on_double_click {
                        // Refusals are logged by the controller.
                        let _ = scheduler
                            .stage_mut()
                            .viewport
                            .toggle_fullscreen(&mut WinitFullscreen(window));
                    }
                }

                if !running {
                    log::info!("app requested exit");
                    scheduler.stop();
                    event_loop.exit();
                }
            }
        }
    }
}
