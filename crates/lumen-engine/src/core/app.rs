use crate::input::InputEvent;

use super::ctx::FrameCtx;
use super::stage::Stage;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for every input event, between frames, after the stage has
    /// routed it to the orbit controls.
    fn on_input(&mut self, stage: &mut Stage, event: &InputEvent) -> AppControl {
        let _ = (stage, event);
        AppControl::Continue
    }

    /// Called once per tick, after loads, controls and tweens have been
    /// applied and before the frame is drawn.
    fn update(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
