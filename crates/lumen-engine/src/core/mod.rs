//! Frame-loop orchestration.
//!
//! [`FrameScheduler`] owns a [`Stage`] and an [`App`] and runs one strictly
//! ordered tick per frame. The host drives it through a [`RenderSurface`]
//! and a [`FrameRequester`], so the loop runs headless in tests.
//!
//! [`RenderSurface`]: crate::render::RenderSurface

mod app;
mod ctx;
mod scheduler;
mod stage;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
pub use scheduler::{FrameRequester, FrameScheduler, Tick};
pub use stage::Stage;
