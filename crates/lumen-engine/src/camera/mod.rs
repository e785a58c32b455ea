//! Cameras: projection models bound to scene nodes, and the rig that tracks
//! which camera draws.

mod rig;
mod projection;

pub use rig::{Camera, CameraId, CameraRig};
pub use projection::Projection;
