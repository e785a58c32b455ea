use crate::time::FrameTime;

use super::stage::Stage;

/// Per-frame context passed to [`App::update`](super::App::update).
pub struct FrameCtx<'a> {
    pub time: FrameTime,
    pub stage: &'a mut Stage,
}
