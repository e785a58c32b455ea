use std::collections::HashMap;

use crate::assets::{ResourceId, TextureHandle};
use crate::geometry::GeometryHandle;

/// A CPU resource that owns GPU-side state in a [`ResourceCache`].
pub(super) trait GpuResource {
    fn resource_id(&self) -> ResourceId;
    fn is_disposed(&self) -> bool;
}

impl GpuResource for TextureHandle {
    fn resource_id(&self) -> ResourceId {
        self.id()
    }

    fn is_disposed(&self) -> bool {
        TextureHandle::is_disposed(self)
    }
}

impl GpuResource for GeometryHandle {
    fn resource_id(&self) -> ResourceId {
        self.id()
    }

    fn is_disposed(&self) -> bool {
        GeometryHandle::is_disposed(self)
    }
}

/// GPU objects keyed by resource id, released once their resource is
/// disposed.
///
/// Each entry keeps a clone of the CPU handle so disposal is observed even
/// after the scene stops referencing the resource.
pub(super) struct ResourceCache<H, V> {
    entries: HashMap<ResourceId, (H, V)>,
}

impl<H, V> Default for ResourceCache<H, V> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<H: GpuResource, V> ResourceCache<H, V> {
    pub(super) fn get(&self, id: ResourceId) -> Option<&V> {
        self.entries.get(&id).map(|(_, v)| v)
    }

    /// Inserts or replaces the GPU state for `handle`.
    pub(super) fn insert(&mut self, handle: H, value: V) {
        self.entries.insert(handle.resource_id(), (handle, value));
    }

    /// Drops entries whose resource was disposed. Returns how many.
    pub(super) fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (handle, _)| !handle.is_disposed());
        before - self.entries.len()
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}
