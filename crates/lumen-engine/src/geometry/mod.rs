//! Triangle geometry: builders and shared, disposable handles.

mod box_geometry;
mod buffer;
mod handle;

pub use box_geometry::BoxGeometry;
pub use buffer::Geometry;
pub use handle::GeometryHandle;
