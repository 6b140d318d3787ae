//! Media transports: the engine's view of the external decode layer.
//!
//! **Why**: The engine never decodes anything. Each clip owns exactly one
//! transport handle (the media-element analog) created when the clip is
//! created and released when the clip is deleted - never left dangling.
//!
//! All transport calls are fire-and-forget; readiness is polled each tick
//! via `is_ready`, never awaited. A transport that never becomes ready just
//! leaves its clip silent/blank without erroring anything else.

use std::collections::HashMap;

use log::{debug, trace};
use uuid::Uuid;

use crate::entities::media::MediaKind;

/// Playback handle for one clip's media, provided by the host environment.
pub trait MediaTransport {
    /// Decoded far enough to seek/present
    fn is_ready(&self) -> bool;

    /// Current position within the source, seconds
    fn position(&self) -> f64;

    fn seek_to(&mut self, t: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;
}

/// Creates transports from a source handle. Implemented by the host
/// environment; `StubFactory` covers tests and the demo driver.
pub trait TransportFactory {
    fn create(&mut self, source: &str, kind: MediaKind) -> Box<dyn MediaTransport>;
}

/// One transport per clip id, lifetime locked to the clip's.
pub struct TransportRegistry {
    factory: Box<dyn TransportFactory>,
    entries: HashMap<Uuid, Box<dyn MediaTransport>>,
}

impl TransportRegistry {
    pub fn new(factory: Box<dyn TransportFactory>) -> Self {
        Self {
            factory,
            entries: HashMap::new(),
        }
    }

    /// Create the transport for a freshly created clip. A split's new half
    /// gets its own entry on the same source - seek state stays independent.
    pub fn create_for(&mut self, clip_id: Uuid, source: &str, kind: MediaKind) {
        trace!("transport created for clip {} ({:?})", clip_id, kind);
        let transport = self.factory.create(source, kind);
        self.entries.insert(clip_id, transport);
    }

    /// Drop the transport of a deleted clip.
    pub fn release(&mut self, clip_id: Uuid) {
        if self.entries.remove(&clip_id).is_some() {
            debug!("transport released for clip {}", clip_id);
        }
    }

    pub fn get(&self, clip_id: Uuid) -> Option<&dyn MediaTransport> {
        self.entries.get(&clip_id).map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, clip_id: Uuid) -> Option<&mut (dyn MediaTransport + 'static)> {
        self.entries.get_mut(&clip_id).map(|b| b.as_mut())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// === Stub implementation (tests + demo driver) ===

pub mod stub {
    //! Scripted in-memory transport: records calls, simulates readiness.

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{MediaTransport, TransportFactory};
    use crate::entities::media::MediaKind;

    /// Observable state of one stub transport, shared with the test body.
    #[derive(Debug, Default)]
    pub struct StubState {
        pub ready: bool,
        pub position: f64,
        pub paused: bool,
        pub play_calls: u32,
        pub pause_calls: u32,
        pub seek_calls: u32,
        pub source: String,
        pub kind: Option<MediaKind>,
    }

    impl StubState {
        fn new() -> Self {
            Self {
                ready: true,
                paused: true,
                ..Self::default()
            }
        }
    }

    pub struct StubTransport {
        state: Rc<RefCell<StubState>>,
    }

    impl MediaTransport for StubTransport {
        fn is_ready(&self) -> bool {
            self.state.borrow().ready
        }

        fn position(&self) -> f64 {
            self.state.borrow().position
        }

        fn seek_to(&mut self, t: f64) {
            let mut s = self.state.borrow_mut();
            s.seek_calls += 1;
            s.position = t;
        }

        fn play(&mut self) {
            let mut s = self.state.borrow_mut();
            s.play_calls += 1;
            s.paused = false;
        }

        fn pause(&mut self) {
            let mut s = self.state.borrow_mut();
            s.pause_calls += 1;
            s.paused = true;
        }

        fn is_paused(&self) -> bool {
            self.state.borrow().paused
        }
    }

    /// Factory that remembers every transport it built, in creation order,
    /// so tests can inspect call counts after the fact.
    #[derive(Default)]
    pub struct StubFactory {
        pub created: Vec<Rc<RefCell<StubState>>>,
    }

    impl StubFactory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Shared handle to every created transport's state, for assertions.
        pub fn states(&self) -> &[Rc<RefCell<StubState>>] {
            &self.created
        }
    }

    impl TransportFactory for StubFactory {
        fn create(&mut self, source: &str, kind: MediaKind) -> Box<dyn MediaTransport> {
            let state = Rc::new(RefCell::new(StubState::new()));
            {
                let mut s = state.borrow_mut();
                s.source = source.to_string();
                s.kind = Some(kind);
            }
            self.created.push(Rc::clone(&state));
            Box::new(StubTransport { state })
        }
    }

    /// Factory handle that stays inspectable after the registry takes
    /// ownership of the factory.
    #[derive(Clone, Default)]
    pub struct SharedStubFactory {
        inner: Rc<RefCell<StubFactory>>,
    }

    impl SharedStubFactory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn created(&self) -> Vec<Rc<RefCell<StubState>>> {
            self.inner.borrow().created.clone()
        }
    }

    impl TransportFactory for SharedStubFactory {
        fn create(&mut self, source: &str, kind: MediaKind) -> Box<dyn MediaTransport> {
            self.inner.borrow_mut().create(source, kind)
        }
    }
}
