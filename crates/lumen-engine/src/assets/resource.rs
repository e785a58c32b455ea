use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of an uploadable resource.
///
/// GPU-side caches are keyed by this id, never by pointer identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

/// Lifecycle of a loaded resource.
///
/// `Pending -> Loaded | Errored`; once resolved the status never changes again.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Pending,
    Loaded,
    Errored,
}

impl ResourceStatus {
    #[inline]
    pub fn is_resolved(self) -> bool {
        !matches!(self, ResourceStatus::Pending)
    }
}
