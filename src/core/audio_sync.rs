//! Audio synchronizer: phase-locks every audio transport to the clock.
//!
//! Unlike video there is no single active clip - overlapping audio clips are
//! all audible, so every clip on the audio track gets an independent
//! play/pause/seek decision each tick.

use log::trace;

use crate::core::transport::TransportRegistry;
use crate::entities::timeline::Timeline;
use crate::entities::track::TrackKind;

/// Hard-seek threshold (seconds). Coarser than video: an audible seek glitch
/// is worse than a fifth of a second of drift.
pub const AUDIO_DRIFT_TOLERANCE: f64 = 0.2;

#[derive(Debug, Default)]
pub struct AudioSynchronizer;

impl AudioSynchronizer {
    pub fn new() -> Self {
        Self
    }

    /// Align every audio transport with the clock. All transport calls are
    /// idempotent: already-playing transports aren't re-played, already-
    /// paused ones aren't re-paused, in-tolerance ones aren't re-seeked.
    pub fn tick(
        &self,
        time: f64,
        is_playing: bool,
        timeline: &Timeline,
        registry: &mut TransportRegistry,
    ) {
        for clip in timeline.track(TrackKind::Audio).clips() {
            let Some(transport) = registry.get_mut(clip.id) else {
                continue;
            };
            if !transport.is_ready() {
                continue;
            }

            let active = clip.contains(time);
            if is_playing && active {
                if transport.is_paused() {
                    trace!("audio clip {} starts", clip.id);
                    transport.play();
                }
                let target = clip.source_time(time);
                if (transport.position() - target).abs() > AUDIO_DRIFT_TOLERANCE {
                    trace!("audio clip {} drift, reseek to {:.3}s", clip.id, target);
                    transport.seek_to(target);
                }
            } else if !transport.is_paused() {
                trace!("audio clip {} stops", clip.id);
                transport.pause();
            }
        }
    }

    /// Synchronous sweep used on the Playing -> Paused transition: silence
    /// every audio transport immediately instead of waiting for a tick.
    pub fn pause_all(&self, timeline: &Timeline, registry: &mut TransportRegistry) {
        for clip in timeline.track(TrackKind::Audio).clips() {
            if let Some(transport) = registry.get_mut(clip.id)
                && !transport.is_paused()
            {
                transport.pause();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::stub::SharedStubFactory;
    use crate::entities::media::{MediaAsset, MediaKind};
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    struct Rig {
        timeline: Timeline,
        registry: TransportRegistry,
        factory: SharedStubFactory,
        sync: AudioSynchronizer,
    }

    impl Rig {
        fn new() -> Self {
            let factory = SharedStubFactory::new();
            Self {
                timeline: Timeline::new(),
                registry: TransportRegistry::new(Box::new(factory.clone())),
                factory,
                sync: AudioSynchronizer::new(),
            }
        }

        fn add_audio(&mut self, at: f64, duration: f64) -> Uuid {
            let asset = MediaAsset::new("a.mp3", MediaKind::Audio, "blob:a");
            let id = self.timeline.add_clip(&asset, at);
            self.timeline.commit_media_duration(id, duration).unwrap();
            self.registry.create_for(id, &asset.source, asset.kind);
            id
        }

        fn state(&self, idx: usize) -> Rc<RefCell<crate::core::transport::stub::StubState>> {
            Rc::clone(&self.factory.created()[idx])
        }

        fn tick(&mut self, time: f64, playing: bool) {
            self.sync
                .tick(time, playing, &self.timeline, &mut self.registry);
        }
    }

    #[test]
    fn test_active_clip_plays_inactive_pauses() {
        // clip on [2, 5)
        let mut rig = Rig::new();
        rig.add_audio(2.0, 3.0);

        rig.tick(3.0, true);
        assert!(!rig.state(0).borrow().paused);
        assert_eq!(rig.state(0).borrow().play_calls, 1);

        // past the clip end: paused again
        rig.tick(6.0, true);
        assert!(rig.state(0).borrow().paused);

        // playback stopped entirely: stays paused even inside the span
        rig.state(0).borrow_mut().paused = false;
        rig.tick(3.0, false);
        assert!(rig.state(0).borrow().paused);
    }

    #[test]
    fn test_play_is_idempotent_across_ticks() {
        let mut rig = Rig::new();
        rig.add_audio(0.0, 10.0);

        rig.tick(1.0, true);
        rig.state(0).borrow_mut().position = 2.0;
        rig.tick(2.0, true);
        rig.state(0).borrow_mut().position = 3.0;
        rig.tick(3.0, true);
        assert_eq!(rig.state(0).borrow().play_calls, 1);
    }

    #[test]
    fn test_drift_forces_reseek_only_past_tolerance() {
        let mut rig = Rig::new();
        rig.add_audio(0.0, 10.0);

        // first tick: position 0 vs target 1.0 -> over 0.2s, seek
        rig.tick(1.0, true);
        assert_eq!(rig.state(0).borrow().seek_calls, 1);
        assert_eq!(rig.state(0).borrow().position, 1.0);

        // small slip inside tolerance: no seek
        rig.state(0).borrow_mut().position = 1.12;
        rig.tick(1.2, true);
        assert_eq!(rig.state(0).borrow().seek_calls, 1);
    }

    #[test]
    fn test_offset_clip_seeks_into_source() {
        let mut rig = Rig::new();
        let id = rig.add_audio(2.0, 3.0);
        // split leaves the right half with a nonzero in-point
        let right = rig.timeline.split_clip(id, 3.0).unwrap();
        rig.registry.create_for(right.id, "blob:a", MediaKind::Audio);

        // time 3.5 is inside the right half (starts 3.0, offset 1.0)
        rig.tick(3.5, true);
        let right_binding = rig.state(1);
        let right_state = right_binding.borrow();
        assert_eq!(right_state.position, 1.5);
    }

    #[test]
    fn test_overlapping_clips_are_both_audible() {
        let mut rig = Rig::new();
        rig.add_audio(0.0, 10.0);
        rig.add_audio(5.0, 10.0);

        rig.tick(6.0, true);
        assert!(!rig.state(0).borrow().paused);
        assert!(!rig.state(1).borrow().paused);
    }

    #[test]
    fn test_not_ready_transport_is_left_alone() {
        let mut rig = Rig::new();
        rig.add_audio(0.0, 10.0);
        rig.state(0).borrow_mut().ready = false;

        rig.tick(1.0, true);
        let s_binding = rig.state(0);
        let s = s_binding.borrow();
        assert_eq!(s.play_calls, 0);
        assert_eq!(s.seek_calls, 0);
    }

    #[test]
    fn test_pause_all_sweeps_and_is_idempotent() {
        let mut rig = Rig::new();
        rig.add_audio(0.0, 10.0);
        rig.add_audio(3.0, 4.0);
        rig.tick(3.5, true);
        assert_eq!(rig.state(0).borrow().play_calls, 1);
        assert_eq!(rig.state(1).borrow().play_calls, 1);

        rig.sync.pause_all(&rig.timeline, &mut rig.registry);
        assert!(rig.state(0).borrow().paused);
        assert!(rig.state(1).borrow().paused);

        // second sweep adds no transport calls
        rig.sync.pause_all(&rig.timeline, &mut rig.registry);
        assert_eq!(rig.state(0).borrow().pause_calls, 1);
        assert_eq!(rig.state(1).borrow().pause_calls, 1);
    }
}
