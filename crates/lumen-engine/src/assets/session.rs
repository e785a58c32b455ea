use crate::error::LoadError;

type ItemCallback = Box<dyn FnMut(&str, usize, usize)>;
type LoadCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(&str, &LoadError)>;

/// Identifies a [`LoadingSession`] inside its [`ResourceLoader`](super::ResourceLoader).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) usize);

/// Progress tracking for a batch of loads.
///
/// A session is *loading* from the moment an item is queued while it was idle
/// until every queued item has completed. Counters accumulate over the
/// session's lifetime; a new batch after `on_load` keeps counting from there.
///
/// Callbacks run on the frame thread inside
/// [`ResourceLoader::drain`](super::ResourceLoader::drain), except `on_start`
/// which runs when the item is queued.
#[derive(Default)]
pub struct LoadingSession {
    name: String,
    items_loaded: usize,
    items_total: usize,
    items_failed: usize,
    loading: bool,
    on_start: Option<ItemCallback>,
    on_progress: Option<ItemCallback>,
    on_load: Option<LoadCallback>,
    on_error: Option<ErrorCallback>,
}

impl std::fmt::Debug for LoadingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingSession")
            .field("name", &self.name)
            .field("items_loaded", &self.items_loaded)
            .field("items_total", &self.items_total)
            .field("items_failed", &self.items_failed)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl LoadingSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// `(uri, items_loaded, items_total)` when a batch begins.
    pub fn on_start(mut self, f: impl FnMut(&str, usize, usize) + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// `(uri, items_loaded, items_total)` after every completion.
    pub fn on_progress(mut self, f: impl FnMut(&str, usize, usize) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Once per batch, when every queued item has completed.
    pub fn on_load(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_load = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&str, &LoadError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items_loaded(&self) -> usize {
        self.items_loaded
    }

    pub fn items_total(&self) -> usize {
        self.items_total
    }

    pub fn items_failed(&self) -> usize {
        self.items_failed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn item_start(&mut self, uri: &str) {
        self.items_total += 1;
        if !self.loading {
            self.loading = true;
            log::debug!("session '{}': batch started with {uri}", self.name);
            if let Some(f) = self.on_start.as_mut() {
                f(uri, self.items_loaded, self.items_total);
            }
        }
    }

    pub(crate) fn item_end(&mut self, uri: &str, error: Option<&LoadError>) {
        if let Some(err) = error {
            self.items_failed += 1;
            if let Some(f) = self.on_error.as_mut() {
                f(uri, err);
            }
        }

        self.items_loaded += 1;
        if let Some(f) = self.on_progress.as_mut() {
            f(uri, self.items_loaded, self.items_total);
        }

        if self.items_loaded == self.items_total {
            self.loading = false;
            log::debug!(
                "session '{}': batch complete ({} items, {} failed)",
                self.name, self.items_total, self.items_failed
            );
            if let Some(f) = self.on_load.as_mut() {
                f();
            }
        }
    }
}
