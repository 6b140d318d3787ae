//! Preview compositor: picks the active video clip and requests a paint.
//!
//! One clip at a time is authoritative on the video track (earliest start
//! wins on overlap, see `Track::active_at`). Paint failures from the host
//! surface are swallowed - one stale or blank frame beats erroring the
//! playback loop.

use log::{debug, trace};
use uuid::Uuid;

use crate::core::transport::TransportRegistry;
use crate::entities::media::MediaKind;
use crate::entities::timeline::Timeline;
use crate::entities::track::TrackKind;

/// Don't reseek the video transport for drift below this (seconds).
/// Constant small seeks stutter worse than a tenth of a second of slip.
pub const VIDEO_SEEK_TOLERANCE: f64 = 0.1;

/// The host's preview canvas.
pub trait PaintSurface {
    /// Present the current frame of `clip_id`'s transport. May fail when the
    /// frame isn't decoded yet.
    fn paint_clip(&mut self, clip_id: Uuid) -> anyhow::Result<()>;

    /// Clear to the background (no active clip, or clip not ready).
    fn paint_background(&mut self);
}

/// Stateless: everything it needs arrives per call.
#[derive(Debug, Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Render the preview for `time`.
    pub fn render_frame(
        &self,
        time: f64,
        timeline: &Timeline,
        registry: &mut TransportRegistry,
        surface: &mut dyn PaintSurface,
    ) {
        let Some(clip) = timeline.track(TrackKind::Video).active_at(time) else {
            surface.paint_background();
            return;
        };

        let clip_id = clip.id;
        let target = clip.source_time(time);
        let is_video = clip.kind == MediaKind::Video;

        let Some(transport) = registry.get_mut(clip_id) else {
            surface.paint_background();
            return;
        };
        if !transport.is_ready() {
            trace!("clip {} not ready, skipping this frame", clip_id);
            surface.paint_background();
            return;
        }

        // Images are static - only video needs its transport chasing the clock
        if is_video && (transport.position() - target).abs() > VIDEO_SEEK_TOLERANCE {
            transport.seek_to(target);
        }

        if let Err(e) = surface.paint_clip(clip_id) {
            // Stale frame is fine; next tick retries
            debug!("paint failed for clip {}: {e:#}", clip_id);
        }
    }
}
