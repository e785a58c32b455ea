//! Time-driven property animation of scene nodes.

mod easing;
mod tween;

pub use easing::Easing;
pub use tween::{Axis, TweenId, TweenProperty, TweenTiming, Tweens};
