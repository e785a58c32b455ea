//! Live-tweakable parameters bound to application state.

mod binding;
mod registry;

pub use binding::{BindingError, BindingId, BindingKind, BindingValue, Constraints, FolderId};
pub use registry::{BindingMut, ControllerSnapshot, DebugRegistry};
