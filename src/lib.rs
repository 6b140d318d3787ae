//! CUTLINE - timeline editing and playback-sync engine
//!
//! The in-memory clip/track model of a non-linear editor, the structural
//! edits over it, and the soft real-time synchronizer that keeps a preview
//! compositor and any number of audio transports phase-locked to one
//! playback clock. Rendering, decoding and file handling stay outside,
//! behind the `PaintSurface` / `MediaTransport` seams.

// Engine (clock, sync, transports, events, session)
pub mod core;

// Data model
pub mod entities;

// Demo driver support
pub mod cli;
pub mod utils;

// Re-export commonly used types from core
pub use crate::core::events::{EditorEvent, EventHub, EventSender};
pub use crate::core::session::EditorSession;
pub use crate::core::{AudioSynchronizer, Compositor, PaintSurface, PlaybackState, Player};
pub use crate::core::{MediaTransport, TransportFactory, TransportRegistry};

// Re-export entities
pub use crate::entities::{
    Clip, EditError, MediaAsset, MediaCatalog, MediaKind, Selection, Timeline, Track, TrackKind,
};
