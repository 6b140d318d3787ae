//! Track: one ordered lane of clips.
//!
//! Clips are kept sorted ascending by `track_start` after every structural
//! mutation. Overlapping placement is allowed; `active_at` resolves overlap
//! deterministically (earliest start wins).

use log::trace;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::clip::Clip;

/// The two timeline lanes. Video carries both video and image clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Video => write!(f, "video"),
            TrackKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            clips: Vec::new(),
        }
    }

    /// Insert a clip and restore ordering.
    pub fn insert(&mut self, clip: Clip) {
        trace!("{} track: insert clip {} at {:.3}s", self.kind, clip.id, clip.track_start);
        self.clips.push(clip);
        self.sort();
    }

    /// Re-sort ascending by track_start. Stable, so equal starts keep their
    /// relative order (insert order decides ties).
    pub fn sort(&mut self) {
        self.clips
            .sort_by(|a, b| a.track_start.total_cmp(&b.track_start));
    }

    /// Remove a clip by id. Returns it so the caller can release resources.
    pub fn remove(&mut self, id: Uuid) -> Option<Clip> {
        let idx = self.clips.iter().position(|c| c.id == id)?;
        Some(self.clips.remove(idx))
    }

    pub fn get(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// The clip that is authoritative at `time`.
    ///
    /// When clips overlap, the FIRST match in ascending `track_start` order
    /// wins - the earliest-starting clip stays on screen until its own end.
    /// This is a deliberate policy, not an accident of iteration order.
    pub fn active_at(&self, time: f64) -> Option<&Clip> {
        self.clips.iter().find(|c| c.contains(time))
    }

    /// Where the last clip on this lane ends, 0 when empty.
    pub fn end_time(&self) -> f64 {
        self.clips.iter().map(|c| c.end()).fold(0.0, f64::max)
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::media::{MediaAsset, MediaKind};

    fn clip(start: f64, duration: f64) -> Clip {
        let asset = MediaAsset::new("v.mp4", MediaKind::Video, "blob:v");
        Clip::new(&asset, start, duration)
    }

    #[test]
    fn test_insert_keeps_sorted() {
        let mut track = Track::new(TrackKind::Video);
        track.insert(clip(8.0, 2.0));
        track.insert(clip(1.0, 2.0));
        track.insert(clip(4.0, 2.0));

        let starts: Vec<f64> = track.clips().iter().map(|c| c.track_start).collect();
        assert_eq!(starts, [1.0, 4.0, 8.0]);
    }

    #[test]
    fn test_overlap_tie_break_earliest_start_wins() {
        // A(start=0, dur=10) and B(start=5, dur=10) overlap on [5, 10)
        let mut track = Track::new(TrackKind::Video);
        let a = clip(0.0, 10.0);
        let a_id = a.id;
        track.insert(clip(5.0, 10.0));
        track.insert(a);

        let active = track.active_at(7.0).unwrap();
        assert_eq!(active.id, a_id, "earliest-starting clip must win the overlap");

        // Past A's end, B takes over
        assert_eq!(track.active_at(12.0).unwrap().track_start, 5.0);
        assert!(track.active_at(15.0).is_none());
    }

    #[test]
    fn test_remove_returns_exactly_one() {
        let mut track = Track::new(TrackKind::Audio);
        let keep = clip(0.0, 3.0);
        let gone = clip(3.0, 3.0);
        let gone_id = gone.id;
        track.insert(keep);
        track.insert(gone);

        let removed = track.remove(gone_id).unwrap();
        assert_eq!(removed.id, gone_id);
        assert_eq!(track.len(), 1);
        assert!(track.remove(gone_id).is_none());
    }

    #[test]
    fn test_end_time() {
        let mut track = Track::new(TrackKind::Video);
        assert_eq!(track.end_time(), 0.0);
        track.insert(clip(0.0, 10.0));
        track.insert(clip(5.0, 2.0));
        assert_eq!(track.end_time(), 10.0);
    }
}
