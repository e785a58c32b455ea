use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::ResourceId;

use super::buffer::Geometry;

#[derive(Debug)]
struct GeometryState {
    id: ResourceId,
    geometry: Option<Geometry>,
    needs_upload: bool,
}

/// Shared handle to an uploadable geometry.
///
/// Clones alias the same geometry. `dispose` drops the vertex data; a disposed
/// geometry is never drawn and its GPU buffers are released on the next frame.
#[derive(Debug, Clone)]
pub struct GeometryHandle(Rc<RefCell<GeometryState>>);

impl GeometryHandle {
    pub fn new(geometry: Geometry) -> Self {
        Self(Rc::new(RefCell::new(GeometryState {
            id: ResourceId::next(),
            geometry: Some(geometry),
            needs_upload: true,
        })))
    }

    pub fn id(&self) -> ResourceId {
        self.0.borrow().id
    }

    /// Runs `f` against the geometry unless it was disposed.
    pub fn with<R>(&self, f: impl FnOnce(&Geometry) -> R) -> Option<R> {
        self.0.borrow().geometry.as_ref().map(f)
    }

    pub fn needs_upload(&self) -> bool {
        self.0.borrow().needs_upload
    }

    /// Takes a copy of the geometry for upload and clears `needs_upload`.
    pub fn take_upload(&self) -> Option<Geometry> {
        let mut state = self.0.borrow_mut();
        if !state.needs_upload {
            return None;
        }
        let geometry = state.geometry.clone()?;
        state.needs_upload = false;
        Some(geometry)
    }

    /// Releases the vertex data. Idempotent.
    pub fn dispose(&self) {
        let mut state = self.0.borrow_mut();
        if state.geometry.take().is_some() {
            state.needs_upload = false;
            log::debug!("geometry {} disposed", state.id);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().geometry.is_none()
    }

    pub fn ptr_eq(&self, other: &GeometryHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Geometry> for GeometryHandle {
    fn from(geometry: Geometry) -> Self {
        Self::new(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxGeometry;

    #[test]
    fn uploads_once_then_disposes() {
        let handle = GeometryHandle::new(BoxGeometry::default().build());
        let alias = handle.clone();

        assert!(handle.needs_upload());
        assert_eq!(handle.take_upload().map(|g| g.vertex_count()), Some(24));
        assert!(handle.take_upload().is_none());

        alias.dispose();
        assert!(handle.is_disposed());
        assert_eq!(handle.with(|g| g.vertex_count()), None);
        alias.dispose();
    }

    #[test]
    fn ids_are_unique() {
        let a = GeometryHandle::new(Geometry::default());
        let b = GeometryHandle::new(Geometry::default());
        assert_ne!(a.id(), b.id());
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
