//! Transform hierarchy.
//!
//! Responsibilities:
//! - own every node in a generational arena (`SceneGraph`)
//! - compose local transforms into world matrices top-down
//! - describe drawable payloads (`Mesh`, `BasicMaterial`)

mod graph;
mod material;
mod transform;

pub use graph::{Node, NodeId, NodeKind, SceneError, SceneGraph};
pub use material::{BasicMaterial, MaterialHandle, Mesh};
pub use transform::{Euler, RotationOrder, Transform};
