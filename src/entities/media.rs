//! Media pool: imported assets and their descriptors.
//!
//! **Why**: Clips never own media - they reference an asset in the pool by
//! id. The pool keeps import order so the UI's media list is stable.
//!
//! **Used by**: Timeline (clip creation), EditorSession (import command),
//! TransportRegistry (source handles).

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::track::TrackKind;

/// Video file extensions accepted by the sniffing fallback
pub const VIDEO_EXTS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Image file extensions accepted by the sniffing fallback
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Audio file extensions accepted by the sniffing fallback
pub const AUDIO_EXTS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a"];

/// Broad media category. Decides target track and duration handling:
/// images get a fixed default duration, audio/video wait for probed metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    /// Detect kind from a MIME-style type string ("video/mp4" etc.).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("video") {
            Some(MediaKind::Video)
        } else if mime.starts_with("audio") {
            Some(MediaKind::Audio)
        } else if mime.starts_with("image") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Fallback detection from a file name / URL extension.
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?.to_ascii_lowercase();
        let ext = ext.as_str();
        if VIDEO_EXTS.contains(&ext) {
            Some(MediaKind::Video)
        } else if IMAGE_EXTS.contains(&ext) {
            Some(MediaKind::Image)
        } else if AUDIO_EXTS.contains(&ext) {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    /// Which track this kind of media lands on (images share the video track).
    pub fn track_kind(&self) -> TrackKind {
        match self {
            MediaKind::Video | MediaKind::Image => TrackKind::Video,
            MediaKind::Audio => TrackKind::Audio,
        }
    }

    /// True for kinds whose duration comes from decoded metadata
    /// rather than a fixed default.
    pub fn has_intrinsic_duration(&self) -> bool {
        !matches!(self, MediaKind::Image)
    }
}

/// One imported media item. Immutable once created.
///
/// `source` is the opaque playable handle handed to transports - the
/// engine never opens it itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub name: String,
    pub kind: MediaKind,
    pub source: String,
}

impl MediaAsset {
    pub fn new(name: impl Into<String>, kind: MediaKind, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            source: source.into(),
        }
    }
}

/// Imported media, keyed by id, iterated in import order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaCatalog {
    assets: IndexMap<Uuid, MediaAsset>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an imported file. Kind is taken from the MIME type when the
    /// picker supplies one, otherwise sniffed from the name.
    pub fn import(&mut self, name: &str, mime: &str, source: &str) -> Option<Uuid> {
        let kind = MediaKind::from_mime(mime).or_else(|| MediaKind::from_extension(name))?;
        let asset = MediaAsset::new(name, kind, source);
        let id = asset.id;
        info!("Imported media {:?} ({:?})", name, kind);
        self.assets.insert(id, asset);
        Some(id)
    }

    pub fn get(&self, id: Uuid) -> Option<&MediaAsset> {
        self.assets.get(&id)
    }

    /// Assets in import order (media pool listing).
    pub fn iter(&self) -> impl Iterator<Item = &MediaAsset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
