//! Interactive camera controllers.

mod orbit;

pub use orbit::{OrbitConfig, OrbitControls};
