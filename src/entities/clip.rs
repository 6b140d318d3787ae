//! Clip: a time-bounded placement of a media asset on a track.
//!
//! All times are in seconds. `track_start` positions the clip on the
//! timeline, `play_duration` is how long it occupies, `media_offset` is the
//! in-point inside the source media (grows when the clip is split).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::media::{MediaAsset, MediaKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Stable identifier, also keys the clip's transport entry
    pub id: Uuid,

    /// Asset in the MediaCatalog this clip plays from
    pub media_id: Uuid,

    /// Display name, copied from the asset at creation
    pub name: String,

    pub kind: MediaKind,

    /// Position on the track, seconds, >= 0
    pub track_start: f64,

    /// Occupied span on the track, seconds, > 0 once committed
    pub play_duration: f64,

    /// In-point within the source media, seconds, >= 0
    pub media_offset: f64,
}

impl Clip {
    /// New clip at `track_start` playing `asset` from its beginning.
    pub fn new(asset: &MediaAsset, track_start: f64, play_duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_id: asset.id,
            name: asset.name.clone(),
            kind: asset.kind,
            track_start: track_start.max(0.0),
            play_duration,
            media_offset: 0.0,
        }
    }

    /// End of the clip on the track (exclusive).
    pub fn end(&self) -> f64 {
        self.track_start + self.play_duration
    }

    /// Whether `time` falls inside this clip's span, half-open `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.track_start && time < self.end()
    }

    /// Map a timeline instant to the corresponding position inside the
    /// source media. Only meaningful when `contains(time)`.
    pub fn source_time(&self, time: f64) -> f64 {
        time - self.track_start + self.media_offset
    }
}
