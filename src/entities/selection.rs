//! Single-clip selection state.
//!
//! Split and delete are only offered through this gate; nothing else in the
//! engine may decide their enablement.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::track::TrackKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    current: Option<(Uuid, TrackKind)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection.
    pub fn select(&mut self, clip_id: Uuid, track: TrackKind) {
        self.current = Some((clip_id, track));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn get(&self) -> Option<(Uuid, TrackKind)> {
        self.current
    }

    /// Drop the selection if it points at `clip_id`. Returns true if cleared.
    pub fn drop_if(&mut self, clip_id: Uuid) -> bool {
        if self.current.map(|(id, _)| id) == Some(clip_id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn is_split_eligible(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_delete_eligible(&self) -> bool {
        self.current.is_some()
    }
}
