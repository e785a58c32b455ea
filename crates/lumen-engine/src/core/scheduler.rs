use std::time::Instant;

use crate::render::{RenderError, RenderSurface};
use crate::time::{Clock, FrameTime};

use super::app::{App, AppControl};
use super::ctx::FrameCtx;
use super::stage::Stage;

/// The host's "call me again next frame" primitive.
pub trait FrameRequester {
    fn schedule_next(&mut self);
}

/// What one [`FrameScheduler::tick`] did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Tick {
    /// The frame was drawn.
    Drawn(FrameTime),
    /// Updates ran but nothing was presented (no active camera, or a
    /// recoverable surface error).
    Skipped(FrameTime),
    /// The scheduler is stopped; nothing ran.
    Stopped,
}

/// Drives one frame loop: clock, loads, controls, tweens, app, draw.
///
/// Each [`tick`](FrameScheduler::tick) runs the whole sequence once and then
/// asks the [`FrameRequester`] for the next frame, unless stopped.
#[derive(Debug)]
pub struct FrameScheduler<A: App> {
    clock: Clock,
    stage: Stage,
    app: A,
    stopped: bool,
}

impl<A: App> FrameScheduler<A> {
    pub fn new(stage: Stage, app: A) -> Self {
        Self::with_clock(stage, app, Clock::new())
    }

    pub fn with_clock(stage: Stage, app: A, clock: Clock) -> Self {
        Self { clock, stage, app, stopped: false }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Stage and app together, for input routing between ticks.
    pub fn parts_mut(&mut self) -> (&mut Stage, &mut A) {
        (&mut self.stage, &mut self.app)
    }

    /// Requests the first frame.
    pub fn start(&mut self, requester: &mut dyn FrameRequester) {
        if !self.stopped {
            requester.schedule_next();
        }
    }

    /// Stops the loop. Idempotent.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            log::info!("frame loop stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn tick(&mut self, surface: &mut dyn RenderSurface, requester: &mut dyn FrameRequester) -> Tick {
        self.tick_at(Instant::now(), surface, requester)
    }

    /// Runs one frame as of `now`.
    ///
    /// Per-frame errors are logged and the loop goes on; a fatal surface error
    /// or [`AppControl::Exit`] stops it after this frame.
    pub fn tick_at(
        &mut self,
        now: Instant,
        surface: &mut dyn RenderSurface,
        requester: &mut dyn FrameRequester,
    ) -> Tick {
        if self.stopped {
            return Tick::Stopped;
        }

        let time = self.clock.sample_at(now);

        let completed = self.stage.loader.drain();
        if completed > 0 {
            log::trace!("frame {}: {completed} loads completed", time.frame_index);
        }

        self.stage.update_controls();
        self.stage.tweens.update(&mut self.stage.scene, time.elapsed);

        let control = {
            let mut ctx = FrameCtx { time, stage: &mut self.stage };
            self.app.update(&mut ctx)
        };

        let drawn = self.draw(surface, time);

        if control == AppControl::Exit {
            log::info!("app requested exit");
            self.stop();
        }
        if !self.stopped {
            requester.schedule_next();
        }

        if drawn { Tick::Drawn(time) } else { Tick::Skipped(time) }
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface, time: FrameTime) -> bool {
        let Some(camera) = self.stage.cameras.active() else {
            log::trace!("frame {}: no active camera", time.frame_index);
            return false;
        };

        match surface.draw(&self.stage.scene, camera) {
            Ok(()) => true,
            Err(RenderError::Fatal(reason)) => {
                log::error!("render: fatal surface error: {reason}");
                self.stop();
                false
            }
            Err(err @ RenderError::Reconfigured) => {
                log::debug!("render: {err}");
                false
            }
            Err(err) => {
                log::warn!("render: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::assets::{Completion, Fetcher, ResourceLoader};
    use crate::camera::Camera;
    use crate::scene::{NodeKind, SceneGraph};
    use crate::viewport::{ViewportConfig, ViewportController};

    type Log = Rc<RefCell<Vec<String>>>;

    struct NullFetcher;

    impl Fetcher for NullFetcher {
        fn fetch(&self, _uri: &str, _completion: Completion) {}
    }

    struct Surface {
        log: Log,
        fail_with: Option<RenderError>,
    }

    impl RenderSurface for Surface {
        fn resize(&mut self, _width: u32, _height: u32) {}

        fn set_pixel_ratio(&mut self, _ratio: f32) {}

        fn draw(&mut self, _scene: &SceneGraph, _camera: &Camera) -> Result<(), RenderError> {
            self.log.borrow_mut().push("draw".into());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    struct Requester(Log);

    impl FrameRequester for Requester {
        fn schedule_next(&mut self) {
            self.0.borrow_mut().push("schedule".into());
        }
    }

    struct Recorder {
        log: Log,
        exit_after: Option<u64>,
    }

    impl App for Recorder {
        fn update(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
            self.log.borrow_mut().push(format!("update {}", ctx.time.frame_index));
            match self.exit_after {
                Some(n) if ctx.time.frame_index >= n => AppControl::Exit,
                _ => AppControl::Continue,
            }
        }
    }

    fn scheduler(log: &Log, exit_after: Option<u64>, with_camera: bool) -> (FrameScheduler<Recorder>, Instant) {
        let mut stage = Stage::new(
            ResourceLoader::new(NullFetcher),
            ViewportController::new(ViewportConfig::default(), 640, 480, 1.0),
        );
        if with_camera {
            let node = stage.scene.spawn(NodeKind::Camera);
            stage.cameras.insert(Camera::perspective(node, 75.0, 4.0 / 3.0, 0.1, 100.0).unwrap());
        }
        let t0 = Instant::now();
        let app = Recorder { log: log.clone(), exit_after };
        (FrameScheduler::with_clock(stage, app, Clock::start_at(t0)), t0)
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn tick_updates_then_draws_then_schedules() {
        let log = Log::default();
        let (mut sched, t0) = scheduler(&log, None, true);
        let mut surface = Surface { log: log.clone(), fail_with: None };
        let mut requester = Requester(log.clone());

        let tick = sched.tick_at(t0 + Duration::from_millis(16), &mut surface, &mut requester);
        assert!(matches!(tick, Tick::Drawn(t) if (t.elapsed - 0.016).abs() < 1e-6));
        assert_eq!(*log.borrow(), ["update 0", "draw", "schedule"]);
    }

    #[test]
    fn no_camera_skips_draw_but_keeps_running() {
        let log = Log::default();
        let (mut sched, t0) = scheduler(&log, None, false);
        let mut surface = Surface { log: log.clone(), fail_with: None };
        let mut requester = Requester(log.clone());

        assert!(matches!(sched.tick_at(t0, &mut surface, &mut requester), Tick::Skipped(_)));
        assert_eq!(*log.borrow(), ["update 0", "schedule"]);
    }

    // ── stopping ──────────────────────────────────────────────────────────

    #[test]
    fn stop_is_idempotent_and_halts_ticks() {
        let log = Log::default();
        let (mut sched, t0) = scheduler(&log, None, true);
        let mut surface = Surface { log: log.clone(), fail_with: None };
        let mut requester = Requester(log.clone());

        sched.stop();
        sched.stop();
        assert!(sched.is_stopped());
        assert_eq!(sched.tick_at(t0, &mut surface, &mut requester), Tick::Stopped);
        sched.start(&mut requester);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn exit_draws_last_frame_without_rescheduling() {
        let log = Log::default();
        let (mut sched, t0) = scheduler(&log, Some(0), true);
        let mut surface = Surface { log: log.clone(), fail_with: None };
        let mut requester = Requester(log.clone());

        sched.tick_at(t0, &mut surface, &mut requester);
        assert_eq!(*log.borrow(), ["update 0", "draw"]);
        assert!(sched.is_stopped());
    }

    #[test]
    fn recoverable_errors_keep_the_loop_fatal_stops_it() {
        let log = Log::default();
        let (mut sched, t0) = scheduler(&log, None, true);
        let mut requester = Requester(log.clone());

        let mut flaky = Surface { log: log.clone(), fail_with: Some(RenderError::SkipFrame("timeout".into())) };
        assert!(matches!(sched.tick_at(t0, &mut flaky, &mut requester), Tick::Skipped(_)));
        assert!(!sched.is_stopped());

        let mut lost = Surface { log: log.clone(), fail_with: Some(RenderError::Fatal("device lost".into())) };
        sched.tick_at(t0 + Duration::from_millis(16), &mut lost, &mut requester);
        assert!(sched.is_stopped());
        assert_eq!(log.borrow().iter().filter(|e| *e == "schedule").count(), 1);
    }
}
