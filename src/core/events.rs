//! Event stream from the engine to the (external) rendering layer.
//!
//! The engine emits events when observable state changes; the UI polls them
//! in its frame loop. Senders are cloneable and may be dummies so entities
//! can be constructed before any consumer exists (and in tests).

use crossbeam_channel::{Receiver, Sender, unbounded};
use uuid::Uuid;

use crate::entities::track::TrackKind;

/// Everything the rendering layer needs to redraw or notify on.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Clips were added, removed, committed, or restructured on a track
    ClipSetChanged { track: TrackKind },

    /// Selection changed (None = cleared)
    SelectionChanged {
        selected: Option<(Uuid, TrackKind)>,
    },

    /// Playback clock moved (tick or scrub)
    PlayheadMoved { time: f64 },

    /// Derived total duration changed
    DurationChanged { total: f64 },

    /// Entered or left the Playing state
    PlaybackStateChanged { playing: bool },

    /// User-facing rejection ("cannot split here" and friends)
    Notification { message: String },
}

/// Cloneable event sender; silent when constructed as a dummy or when the
/// receiving side is gone.
#[derive(Clone, Debug, Default)]
pub struct EventSender {
    sender: Option<Sender<EditorEvent>>,
}

impl EventSender {
    pub fn new(sender: Sender<EditorEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// No-op sender (tests, or engine use before the UI hooks up).
    pub fn dummy() -> Self {
        Self { sender: None }
    }

    /// Emit event (silent if no receiver).
    pub fn emit(&self, event: EditorEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }
}

/// Owner side of the event stream: hands out senders, batches events for the
/// consumer's main loop.
#[derive(Debug)]
pub struct EventHub {
    tx: Sender<EditorEvent>,
    rx: Receiver<EditorEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender::new(self.tx.clone())
    }

    /// Drain all events emitted since the last poll.
    pub fn poll(&self) -> Vec<EditorEvent> {
        self.rx.try_iter().collect()
    }
}
