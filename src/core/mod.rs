//! Core engine modules - clock, sync, transports, events, session.
//!
//! Everything here is UI-agnostic: the rendering layer talks to the engine
//! through `EditorSession` commands and the polled event stream.

pub mod audio_sync;
pub mod compositor;
pub mod events;
pub mod player;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use audio_sync::AudioSynchronizer;
pub use compositor::{Compositor, PaintSurface};
pub use events::{EditorEvent, EventHub, EventSender};
pub use player::{PlaybackState, Player};
pub use session::EditorSession;
pub use transport::{MediaTransport, TransportFactory, TransportRegistry};
