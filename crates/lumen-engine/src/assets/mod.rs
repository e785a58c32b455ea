//! Asynchronous resource loading.
//!
//! Requests return a `Pending` handle immediately. Fetchers complete them from
//! any thread through a [`Completion`]; the loader applies completions once per
//! frame in [`ResourceLoader::drain`], which is also where
//! [`LoadingSession`] callbacks fire.

mod fetch;
mod loader;
mod resource;
mod sampling;
mod session;
mod texture;

pub use fetch::{Completion, Fetcher, FileFetcher};
pub use loader::ResourceLoader;
pub use resource::{ResourceId, ResourceStatus};
pub use sampling::{ColorSpace, FilterMode, TextureSampling, WrapMode};
pub use session::{LoadingSession, SessionId};
pub use texture::{ImageData, TextureHandle, TextureUpload};
