use std::collections::HashMap;
use std::sync::mpsc;

use super::fetch::{Completion, CompletionMsg, Fetcher};
use super::session::{LoadingSession, SessionId};
use super::texture::TextureHandle;

struct InFlight {
    uri: String,
    texture: TextureHandle,
    session: SessionId,
}

/// Issues texture loads and applies their completions on the frame thread.
///
/// Fetchers post outcomes to an internal channel from any thread;
/// [`ResourceLoader::drain`] is the only place where texture status and
/// session callbacks change, and it runs once per frame.
pub struct ResourceLoader {
    fetcher: Box<dyn Fetcher>,
    tx: mpsc::Sender<CompletionMsg>,
    rx: mpsc::Receiver<CompletionMsg>,
    next_request: u64,
    in_flight: HashMap<u64, InFlight>,
    sessions: Vec<LoadingSession>,
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("in_flight", &self.in_flight.len())
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl ResourceLoader {
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher: Box::new(fetcher),
            tx,
            rx,
            next_request: 0,
            in_flight: HashMap::new(),
            sessions: vec![LoadingSession::new("default")],
        }
    }

    /// Session used by [`ResourceLoader::load`].
    pub fn default_session(&self) -> SessionId {
        SessionId(0)
    }

    pub fn create_session(&mut self, session: LoadingSession) -> SessionId {
        self.sessions.push(session);
        SessionId(self.sessions.len() - 1)
    }

    pub fn session(&self, id: SessionId) -> Option<&LoadingSession> {
        self.sessions.get(id.0)
    }

    /// Starts loading `uri` in the default session.
    pub fn load(&mut self, uri: &str) -> TextureHandle {
        self.load_in(self.default_session(), uri)
    }

    /// Starts loading `uri` and returns its handle immediately, in `Pending`
    /// state. The handle resolves during a later [`ResourceLoader::drain`].
    pub fn load_in(&mut self, session: SessionId, uri: &str) -> TextureHandle {
        let session = if session.0 < self.sessions.len() {
            session
        } else {
            log::warn!("loader: unknown session {session:?}, using default");
            self.default_session()
        };

        let texture = TextureHandle::pending(uri);
        let request = self.next_request;
        self.next_request += 1;

        self.in_flight.insert(
            request,
            InFlight {
                uri: uri.to_string(),
                texture: texture.clone(),
                session,
            },
        );
        self.sessions[session.0].item_start(uri);

        log::debug!("loader: request {request} for {uri}");
        self.fetcher.fetch(uri, Completion::new(request, uri.to_string(), self.tx.clone()));

        texture
    }

    /// Number of requests that have not completed yet.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Applies every completion that has arrived. Returns how many were
    /// processed.
    ///
    /// Never blocks. Outcomes for disposed textures still count toward their
    /// session's progress, but their payload is dropped.
    pub fn drain(&mut self) -> usize {
        let mut processed = 0;

        while let Ok((request, outcome)) = self.rx.try_recv() {
            let Some(flight) = self.in_flight.remove(&request) else {
                log::trace!("loader: ignoring duplicate completion for request {request}");
                continue;
            };
            processed += 1;

            let session = &mut self.sessions[flight.session.0];
            match outcome {
                Ok(image) => {
                    if !flight.texture.resolve(Ok(image)) {
                        log::debug!("loader: discarded {} (disposed before completion)", flight.uri);
                    }
                    session.item_end(&flight.uri, None);
                }
                Err(err) if flight.texture.is_disposed() => {
                    log::debug!("loader: discarded failure for disposed {}: {err}", flight.uri);
                    session.item_end(&flight.uri, None);
                }
                Err(err) => {
                    log::warn!("loader: {err}");
                    flight.texture.resolve(Err(&err));
                    session.item_end(&flight.uri, Some(&err));
                }
            }
        }

        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, ResourceStatus};
    use crate::error::LoadError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Holds completions until the test resolves them.
    #[derive(Clone, Default)]
    struct ManualFetcher(Rc<RefCell<Vec<Completion>>>);

    impl Fetcher for ManualFetcher {
        fn fetch(&self, _uri: &str, completion: Completion) {
            self.0.borrow_mut().push(completion);
        }
    }

    impl ManualFetcher {
        fn take(&self, uri: &str) -> Completion {
            let mut queue = self.0.borrow_mut();
            let pos = queue.iter().position(|c| c.uri() == uri).unwrap();
            queue.remove(pos)
        }
    }

    #[derive(Default)]
    struct Counts {
        start: usize,
        progress: Vec<(usize, usize)>,
        load: usize,
        error: usize,
    }

    fn counted_session(counts: &Rc<RefCell<Counts>>) -> LoadingSession {
        let (a, b, c, d) = (counts.clone(), counts.clone(), counts.clone(), counts.clone());
        LoadingSession::new("test")
            .on_start(move |_, _, _| a.borrow_mut().start += 1)
            .on_progress(move |_, loaded, total| b.borrow_mut().progress.push((loaded, total)))
            .on_load(move || c.borrow_mut().load += 1)
            .on_error(move |_, _| d.borrow_mut().error += 1)
    }

    fn image() -> ImageData {
        ImageData::solid(1, 1, [255, 255, 255, 255]).unwrap()
    }

    // ── handles ───────────────────────────────────────────────────────────

    #[test]
    fn load_returns_pending_until_drained() {
        let fetcher = ManualFetcher::default();
        let mut loader = ResourceLoader::new(fetcher.clone());

        let tex = loader.load("door.jpg");
        assert_eq!(tex.status(), ResourceStatus::Pending);

        fetcher.take("door.jpg").succeed(image());
        assert_eq!(tex.status(), ResourceStatus::Pending);

        assert_eq!(loader.drain(), 1);
        assert_eq!(tex.status(), ResourceStatus::Loaded);
        assert!(tex.needs_upload());
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn dropped_completion_errors_the_texture() {
        let fetcher = ManualFetcher::default();
        let mut loader = ResourceLoader::new(fetcher.clone());

        let tex = loader.load("gone.png");
        drop(fetcher.take("gone.png"));
        loader.drain();

        assert_eq!(tex.status(), ResourceStatus::Errored);
        assert!(tex.error().unwrap().contains("abandoned"));
    }

    #[test]
    fn disposed_texture_ignores_completion_but_session_finishes() {
        let fetcher = ManualFetcher::default();
        let mut loader = ResourceLoader::new(fetcher.clone());
        let counts = Rc::new(RefCell::new(Counts::default()));
        let session = loader.create_session(counted_session(&counts));

        let tex = loader.load_in(session, "late.png");
        tex.dispose();
        fetcher.take("late.png").succeed(image());
        loader.drain();

        assert!(tex.is_disposed());
        assert_eq!(tex.status(), ResourceStatus::Pending);
        assert_eq!(counts.borrow().load, 1);
        assert_eq!(counts.borrow().error, 0);
    }

    // ── sessions ──────────────────────────────────────────────────────────

    #[test]
    fn session_callbacks_for_n_items_with_k_failures() {
        let fetcher = ManualFetcher::default();
        let mut loader = ResourceLoader::new(fetcher.clone());
        let counts = Rc::new(RefCell::new(Counts::default()));
        let session = loader.create_session(counted_session(&counts));

        let uris = ["a.png", "b.png", "c.png", "d.png", "e.png"];
        for uri in uris {
            loader.load_in(session, uri);
        }
        assert_eq!(counts.borrow().start, 1);
        assert!(loader.session(session).unwrap().is_loading());

        // Out-of-order completion; two failures.
        for uri in ["c.png", "a.png", "e.png"] {
            fetcher.take(uri).succeed(image());
        }
        fetcher.take("b.png").fail(LoadError::Decode { uri: "b.png".into(), message: "bad".into() });
        drop(fetcher.take("d.png"));

        loader.drain();

        let counts = counts.borrow();
        assert_eq!(counts.start, 1);
        assert_eq!(counts.progress.len(), 5);
        assert_eq!(counts.error, 2);
        assert_eq!(counts.load, 1);
        assert_eq!(counts.progress.last(), Some(&(5, 5)));
        // items_loaded never exceeds items_total.
        assert!(counts.progress.iter().all(|(l, t)| l <= t));

        let s = loader.session(session).unwrap();
        assert!(!s.is_loading());
        assert_eq!(s.items_failed(), 2);
    }

    #[test]
    fn empty_session_never_loads() {
        let mut loader = ResourceLoader::new(ManualFetcher::default());
        let counts = Rc::new(RefCell::new(Counts::default()));
        loader.create_session(counted_session(&counts));

        loader.drain();
        assert_eq!(counts.borrow().load, 0);
        assert_eq!(counts.borrow().start, 0);
    }

    #[test]
    fn second_batch_restarts_session() {
        let fetcher = ManualFetcher::default();
        let mut loader = ResourceLoader::new(fetcher.clone());
        let counts = Rc::new(RefCell::new(Counts::default()));
        let session = loader.create_session(counted_session(&counts));

        loader.load_in(session, "one.png");
        fetcher.take("one.png").succeed(image());
        loader.drain();

        loader.load_in(session, "two.png");
        fetcher.take("two.png").succeed(image());
        loader.drain();

        let counts = counts.borrow();
        assert_eq!(counts.start, 2);
        assert_eq!(counts.load, 2);
        assert_eq!(counts.progress, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn sessions_are_independent() {
        let fetcher = ManualFetcher::default();
        let mut loader = ResourceLoader::new(fetcher.clone());
        let first = Rc::new(RefCell::new(Counts::default()));
        let second = Rc::new(RefCell::new(Counts::default()));
        let s1 = loader.create_session(counted_session(&first));
        let s2 = loader.create_session(counted_session(&second));

        loader.load_in(s1, "x.png");
        loader.load_in(s2, "y.png");
        fetcher.take("x.png").succeed(image());
        loader.drain();

        assert_eq!(first.borrow().load, 1);
        assert_eq!(second.borrow().load, 0);
        assert!(loader.session(s2).unwrap().is_loading());
    }
}
