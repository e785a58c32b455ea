use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;

use crate::error::LoadError;

use super::texture::ImageData;

pub(crate) type CompletionMsg = (u64, Result<ImageData, LoadError>);

/// One-shot reply slot for a fetch request.
///
/// `Send`, so a fetcher may move it to a worker thread. Resolving posts the
/// outcome to the loader's queue; dropping it unresolved posts
/// [`LoadError::Abandoned`], so every request completes exactly once.
#[derive(Debug)]
pub struct Completion {
    request: u64,
    uri: String,
    tx: Option<mpsc::Sender<CompletionMsg>>,
}

impl Completion {
    pub(crate) fn new(request: u64, uri: String, tx: mpsc::Sender<CompletionMsg>) -> Self {
        Self { request, uri, tx: Some(tx) }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn succeed(self, image: ImageData) {
        self.resolve(Ok(image));
    }

    pub fn fail(self, error: LoadError) {
        self.resolve(Err(error));
    }

    pub fn resolve(mut self, outcome: Result<ImageData, LoadError>) {
        self.post(outcome);
    }

    fn post(&mut self, outcome: Result<ImageData, LoadError>) {
        if let Some(tx) = self.tx.take() {
            // The loader may be gone; nothing left to notify then.
            let _ = tx.send((self.request, outcome));
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.tx.is_some() {
            let uri = self.uri.clone();
            self.post(Err(LoadError::Abandoned { uri }));
        }
    }
}

/// Asynchronous fetch-and-decode primitive.
///
/// `fetch` must not block the calling (frame) thread; the outcome is delivered
/// through the [`Completion`], from any thread, at any later time.
pub trait Fetcher {
    fn fetch(&self, uri: &str, completion: Completion);
}

/// Reads images from a directory on background threads.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `uri` under the root. URIs escaping the root are refused.
    fn resolve_path(&self, uri: &str) -> Option<PathBuf> {
        let relative = Path::new(uri.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, uri: &str, completion: Completion) {
        let Some(path) = self.resolve_path(uri) else {
            let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "path escapes asset root");
            completion.fail(LoadError::Io {
                uri: uri.to_string(),
                path: PathBuf::from(uri),
                source: error,
            });
            return;
        };

        let uri = uri.to_string();
        let spawned = std::thread::Builder::new()
            .name("lumen-fetch".to_string())
            .spawn(move || {
                let outcome = std::fs::read(&path)
                    .map_err(|source| LoadError::Io { uri: uri.clone(), path: path.clone(), source })
                    .and_then(|bytes| ImageData::decode(&uri, &bytes));
                completion.resolve(outcome);
            });

        // On failure the closure (and its completion) is dropped, which
        // reports the request as abandoned.
        if let Err(err) = spawned {
            log::warn!("fetch: could not spawn worker thread: {err}");
        }
    }
}
