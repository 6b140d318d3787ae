//! Entities: the editor's data model, independent of any UI or media layer.
//!
//! Clips reference assets in the MediaCatalog; tracks own clips; the
//! Timeline owns both tracks and enforces every structural invariant.

pub mod clip;
pub mod media;
pub mod selection;
pub mod timeline;
pub mod track;

pub use clip::Clip;
pub use media::{MediaAsset, MediaCatalog, MediaKind};
pub use selection::Selection;
pub use timeline::{EditError, Timeline};
pub use track::{Track, TrackKind};
