//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to the runtime.
//! Intended usage:
//! - one `Clock` per frame loop
//! - sample once per tick to obtain `FrameTime` (elapsed + delta)

mod clock;

pub use clock::{Clock, ClockConfig, FrameTime};
