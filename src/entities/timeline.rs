//! Timeline: both tracks, pending clips, and every structural edit.
//!
//! **Why**: All ordering/clamping invariants live in one place so the
//! playback side (compositor, audio sync) can treat clip state as read-only.
//!
//! **Used by**: EditorSession (commands), Compositor, AudioSynchronizer.
//!
//! # Two-phase clip creation
//!
//! Image clips commit immediately with a fixed default duration. Audio and
//! video clips enter a `pending` list first: their duration is unknown until
//! the external media loader probes metadata. A pending clip is invisible to
//! every track query and to `total_duration()`; `commit_media_duration`
//! performs the real insert. A source that never becomes ready simply stays
//! pending forever - that is not an error.
//!
//! # Overlap
//!
//! Tracks never reject overlapping placement. Video ambiguity is resolved at
//! render time by `Track::active_at` (earliest start wins); overlapping audio
//! clips are all audible.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::clip::Clip;
use crate::entities::media::{MediaAsset, MediaKind};
use crate::entities::track::{Track, TrackKind};

/// Timeline never reports a total shorter than this (seconds).
pub const MIN_TOTAL_DURATION: f64 = 30.0;

/// Span given to image clips until the user resizes them (seconds).
pub const IMAGE_DEFAULT_DURATION: f64 = 5.0;

/// Resize floor for image clips (seconds).
pub const IMAGE_MIN_DURATION: f64 = 0.5;

/// Structural edit failures. All recoverable: the operation is a no-op and
/// the caller decides whether the user needs to hear about it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    /// Operation arguments don't apply to the targeted clip
    InvalidOperation(String),
    /// No committed or pending clip with this id
    UnknownClip(Uuid),
    /// Clip is still waiting for media metadata
    StillPending(Uuid),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            EditError::UnknownClip(id) => write!(f, "Unknown clip: {}", id),
            EditError::StillPending(id) => write!(f, "Clip {} is still loading", id),
        }
    }
}

impl std::error::Error for EditError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    video: Track,
    audio: Track,

    /// Clips waiting for probed media duration, in creation order.
    /// Invisible to track queries until committed.
    pending: Vec<Clip>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            video: Track::new(TrackKind::Video),
            audio: Track::new(TrackKind::Audio),
            pending: Vec::new(),
        }
    }

    // === Queries ===

    pub fn track(&self, kind: TrackKind) -> &Track {
        match kind {
            TrackKind::Video => &self.video,
            TrackKind::Audio => &self.audio,
        }
    }

    fn track_mut(&mut self, kind: TrackKind) -> &mut Track {
        match kind {
            TrackKind::Video => &mut self.video,
            TrackKind::Audio => &mut self.audio,
        }
    }

    /// Find a committed clip on either track.
    pub fn find_clip(&self, id: Uuid) -> Option<(TrackKind, &Clip)> {
        if let Some(c) = self.video.get(id) {
            return Some((TrackKind::Video, c));
        }
        self.audio.get(id).map(|c| (TrackKind::Audio, c))
    }

    fn find_clip_mut(&mut self, id: Uuid) -> Option<(TrackKind, &mut Clip)> {
        if self.video.get(id).is_some() {
            return self.video.get_mut(id).map(|c| (TrackKind::Video, c));
        }
        self.audio.get_mut(id).map(|c| (TrackKind::Audio, c))
    }

    /// Pending (metadata-gated) clips, creation order.
    pub fn pending(&self) -> &[Clip] {
        &self.pending
    }

    /// Total composed duration: the farthest clip end on either track,
    /// floored at `MIN_TOTAL_DURATION`. Derived on every call, never stored.
    pub fn total_duration(&self) -> f64 {
        MIN_TOTAL_DURATION
            .max(self.video.end_time())
            .max(self.audio.end_time())
    }

    // === Structural edits ===

    /// Place `asset` on the timeline at `at` seconds.
    ///
    /// Images commit immediately with `IMAGE_DEFAULT_DURATION`; audio/video
    /// clips are parked in `pending` until `commit_media_duration` delivers
    /// the probed duration. Returns the new clip id either way.
    pub fn add_clip(&mut self, asset: &MediaAsset, at: f64) -> Uuid {
        if asset.kind.has_intrinsic_duration() {
            // Duration unknown until the decode probe reports in
            let clip = Clip::new(asset, at, 0.0);
            let id = clip.id;
            debug!("Clip {} pending metadata for {:?}", id, asset.name);
            self.pending.push(clip);
            id
        } else {
            let clip = Clip::new(asset, at, IMAGE_DEFAULT_DURATION);
            let id = clip.id;
            self.video.insert(clip);
            info!("Added image clip {} at {:.3}s", id, at);
            id
        }
    }

    /// Metadata arrived: move a pending clip onto its track.
    pub fn commit_media_duration(&mut self, id: Uuid, duration: f64) -> Result<(), EditError> {
        if !(duration > 0.0) {
            return Err(EditError::InvalidOperation(format!(
                "probed duration must be positive, got {}",
                duration
            )));
        }
        let idx = self
            .pending
            .iter()
            .position(|c| c.id == id)
            .ok_or(EditError::UnknownClip(id))?;

        let mut clip = self.pending.remove(idx);
        clip.play_duration = duration;
        let track = clip.kind.track_kind();
        info!(
            "Committed clip {} to {} track ({:.3}s at {:.3}s)",
            id, track, duration, clip.track_start
        );
        self.track_mut(track).insert(clip);
        Ok(())
    }

    /// Split a committed clip at timeline instant `at`.
    ///
    /// `at` must be strictly inside the clip's span. The original keeps the
    /// left side; a new clip covers the remainder with its media in-point
    /// advanced accordingly. Duration-preserving by construction.
    pub fn split_clip(&mut self, id: Uuid, at: f64) -> Result<Clip, EditError> {
        let (track_kind, clip) = self
            .find_clip(id)
            .ok_or_else(|| self.missing(id))?;

        if at <= clip.track_start || at >= clip.end() {
            return Err(EditError::InvalidOperation(
                "split point must fall inside the clip".into(),
            ));
        }

        let cut = at - clip.track_start;
        let mut right = clip.clone();
        right.id = Uuid::new_v4();
        right.track_start = at;
        right.play_duration = clip.play_duration - cut;
        right.media_offset = clip.media_offset + cut;

        let track = self.track_mut(track_kind);
        if let Some(left) = track.get_mut(id) {
            left.play_duration = cut;
        }
        track.insert(right.clone());
        info!("Split clip {} at {:.3}s -> new clip {}", id, at, right.id);
        Ok(right)
    }

    /// Resize an image clip via its trim handle. Floors at `IMAGE_MIN_DURATION`.
    pub fn trim_image_clip(&mut self, id: Uuid, new_duration: f64) -> Result<(), EditError> {
        let (_, clip) = self.find_clip_mut(id).ok_or(EditError::UnknownClip(id))?;
        if clip.kind != MediaKind::Image {
            return Err(EditError::InvalidOperation(
                "only image clips can be resized".into(),
            ));
        }
        clip.play_duration = new_duration.max(IMAGE_MIN_DURATION);
        Ok(())
    }

    /// Move a clip to `new_start` (clamped >= 0) WITHOUT re-sorting.
    ///
    /// Mid-gesture updates must not reorder the track - index-based lookups
    /// in the dragging layer would jump. Call `sort_tracks` at gesture end.
    pub fn set_clip_start(&mut self, id: Uuid, new_start: f64) -> Result<(), EditError> {
        let (_, clip) = self.find_clip_mut(id).ok_or(EditError::UnknownClip(id))?;
        clip.track_start = new_start.max(0.0);
        Ok(())
    }

    /// Restore ordering on both tracks (end of a drag gesture).
    pub fn sort_tracks(&mut self) {
        self.video.sort();
        self.audio.sort();
    }

    /// Remove a clip - committed or still pending - and return it so the
    /// caller can release its transport entry.
    pub fn delete_clip(&mut self, id: Uuid) -> Result<Clip, EditError> {
        if let Some(clip) = self.video.remove(id).or_else(|| self.audio.remove(id)) {
            info!("Deleted clip {}", id);
            return Ok(clip);
        }
        if let Some(idx) = self.pending.iter().position(|c| c.id == id) {
            debug!("Deleted pending clip {}", id);
            return Ok(self.pending.remove(idx));
        }
        Err(EditError::UnknownClip(id))
    }

    fn missing(&self, id: Uuid) -> EditError {
        if self.pending.iter().any(|c| c.id == id) {
            EditError::StillPending(id)
        } else {
            EditError::UnknownClip(id)
        }
    }
}
