//! EditorSession: the single owned aggregate behind the whole editor.
//!
//! **Why**: Every command the UI can issue lands here, so structural edits
//! and the tick loop are serialized by construction - the session is `&mut
//! self` throughout, one logical thread, no locks. An edit is fully visible
//! or fully invisible to the tick that follows it, never half-applied.
//!
//! **Used by**: the embedding UI layer (commands + event polling), the demo
//! driver in `main.rs`.
//!
//! # Gestures
//!
//! Drag (reposition) and resize run as begin/update/end command triples.
//! Updates mutate the clip in place without re-sorting its track, so the
//! track order the drag code indexed into stays stable; the end command
//! re-sorts and emits the change events.

use std::time::Instant;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::core::audio_sync::AudioSynchronizer;
use crate::core::compositor::{Compositor, PaintSurface};
use crate::core::events::{EditorEvent, EventHub, EventSender};
use crate::core::player::{PlaybackState, Player};
use crate::core::transport::{TransportFactory, TransportRegistry};
use crate::entities::media::MediaCatalog;
use crate::entities::selection::Selection;
use crate::entities::timeline::{EditError, Timeline};
use crate::entities::track::TrackKind;

/// Default timeline scale, pixels per second (presentation only).
pub const DEFAULT_ZOOM: f64 = 50.0;

/// In-flight drag/resize gesture.
#[derive(Debug, Clone, Copy)]
enum Gesture {
    Reposition { clip_id: Uuid },
    Resize { clip_id: Uuid },
}

pub struct EditorSession {
    catalog: MediaCatalog,
    timeline: Timeline,
    selection: Selection,
    registry: TransportRegistry,
    player: Player,
    compositor: Compositor,
    audio_sync: AudioSynchronizer,
    events: EventHub,
    sender: EventSender,
    gesture: Option<Gesture>,

    /// Pixels per second. Pure presentation state - the data model never
    /// reads it.
    zoom: f64,
}

impl EditorSession {
    pub fn new(factory: Box<dyn TransportFactory>) -> Self {
        let events = EventHub::new();
        let sender = events.sender();
        info!("Editor session created");
        Self {
            catalog: MediaCatalog::new(),
            timeline: Timeline::new(),
            selection: Selection::new(),
            registry: TransportRegistry::new(factory),
            player: Player::new(),
            compositor: Compositor::new(),
            audio_sync: AudioSynchronizer::new(),
            events,
            sender,
            gesture: None,
            zoom: DEFAULT_ZOOM,
        }
    }

    // === Read access ===

    pub fn catalog(&self) -> &MediaCatalog {
        &self.catalog
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current_time(&self) -> f64 {
        self.player.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Drain events for the UI's frame loop.
    pub fn poll_events(&self) -> Vec<EditorEvent> {
        self.events.poll()
    }

    // === Media commands ===

    /// Register an imported file (the picker supplies name, MIME type and a
    /// playable source handle). Returns the asset id, or None for media the
    /// editor can't place.
    pub fn import_media(&mut self, name: &str, mime: &str, source: &str) -> Option<Uuid> {
        let id = self.catalog.import(name, mime, source);
        if id.is_none() {
            self.notify(format!("Unsupported media type: {}", name));
        }
        id
    }

    /// Drop a clip for `media_id` at the playhead (the media pool's "+").
    pub fn add_clip_at_playhead(&mut self, media_id: Uuid) -> Option<Uuid> {
        self.add_clip_at(media_id, self.player.current_time())
    }

    /// Drop a clip for `media_id` at `time`. The clip's transport is created
    /// immediately; audio/video clips stay invisible until
    /// `media_metadata_ready` delivers their duration.
    pub fn add_clip_at(&mut self, media_id: Uuid, time: f64) -> Option<Uuid> {
        let Some(asset) = self.catalog.get(media_id).cloned() else {
            warn!("add_clip_at: unknown media {}", media_id);
            return None;
        };

        let clip_id = self.timeline.add_clip(&asset, time);
        self.registry.create_for(clip_id, &asset.source, asset.kind);

        if !asset.kind.has_intrinsic_duration() {
            // Image clips are live right away
            self.emit_clip_set_changed(TrackKind::Video);
            self.emit_duration_changed();
        }
        Some(clip_id)
    }

    /// The external loader probed this clip's media duration
    /// ("loadedmetadata"): commit it onto its track.
    pub fn media_metadata_ready(&mut self, clip_id: Uuid, duration: f64) {
        match self.timeline.commit_media_duration(clip_id, duration) {
            Ok(()) => {
                let track = self
                    .timeline
                    .find_clip(clip_id)
                    .map(|(kind, _)| kind)
                    .unwrap_or(TrackKind::Video);
                self.emit_clip_set_changed(track);
                self.emit_duration_changed();
            }
            Err(e) => warn!("metadata commit failed for {}: {}", clip_id, e),
        }
    }

    // === Selection commands ===

    pub fn select_clip(&mut self, clip_id: Uuid, track: TrackKind) {
        self.selection.select(clip_id, track);
        self.emit_selection_changed();
    }

    /// Activating empty timeline space clears the selection.
    pub fn clear_selection(&mut self) {
        if self.selection.get().is_some() {
            self.selection.clear();
            self.emit_selection_changed();
        }
    }

    // === Edit commands ===

    /// Split the selected clip at the playhead. Rejections surface as
    /// notifications, never as errors.
    pub fn split_selected_at_playhead(&mut self) -> Option<Uuid> {
        let time = self.player.current_time();
        let Some((clip_id, track)) = self.selection.get() else {
            self.notify("Select a clip and move the playhead over it to split.");
            return None;
        };

        match self.timeline.split_clip(clip_id, time) {
            Ok(right) => {
                // The new half gets its own transport on the same source
                if let Some(asset) = self.catalog.get(right.media_id) {
                    self.registry.create_for(right.id, &asset.source, asset.kind);
                }
                self.selection.clear();
                self.emit_selection_changed();
                self.emit_clip_set_changed(track);
                Some(right.id)
            }
            Err(EditError::InvalidOperation(_)) => {
                self.notify("Select a clip and move the playhead over it to split.");
                None
            }
            Err(e) => {
                warn!("split failed: {}", e);
                self.notify("Cannot split this clip.");
                None
            }
        }
    }

    /// Delete the selected clip and release its transport.
    pub fn delete_selected(&mut self) -> bool {
        let Some((clip_id, track)) = self.selection.get() else {
            return false;
        };
        match self.timeline.delete_clip(clip_id) {
            Ok(clip) => {
                self.registry.release(clip.id);
                self.selection.drop_if(clip.id);
                self.emit_selection_changed();
                self.emit_clip_set_changed(track);
                self.emit_duration_changed();
                true
            }
            Err(e) => {
                warn!("delete failed: {}", e);
                false
            }
        }
    }

    // === Gestures ===

    pub fn begin_reposition(&mut self, clip_id: Uuid) {
        debug!("begin reposition {}", clip_id);
        self.gesture = Some(Gesture::Reposition { clip_id });
    }

    /// Pointer-move during a drag: move the clip, keep track order frozen.
    pub fn update_reposition(&mut self, clip_id: Uuid, new_start: f64) {
        if !matches!(self.gesture, Some(Gesture::Reposition { clip_id: id }) if id == clip_id) {
            return;
        }
        if self.timeline.set_clip_start(clip_id, new_start).is_err() {
            warn!("reposition of unknown clip {}", clip_id);
        }
    }

    pub fn end_reposition(&mut self, clip_id: Uuid, new_start: f64) {
        self.update_reposition(clip_id, new_start);
        self.gesture = None;
        self.timeline.sort_tracks();
        if let Some((track, _)) = self.timeline.find_clip(clip_id) {
            self.emit_clip_set_changed(track);
        }
        self.emit_duration_changed();
    }

    pub fn begin_resize(&mut self, clip_id: Uuid) {
        debug!("begin resize {}", clip_id);
        self.gesture = Some(Gesture::Resize { clip_id });
    }

    /// Pointer-move during an image resize.
    pub fn update_resize(&mut self, clip_id: Uuid, new_duration: f64) {
        if !matches!(self.gesture, Some(Gesture::Resize { clip_id: id }) if id == clip_id) {
            return;
        }
        if let Err(e) = self.timeline.trim_image_clip(clip_id, new_duration) {
            warn!("resize rejected: {}", e);
            self.gesture = None;
        }
    }

    pub fn end_resize(&mut self, clip_id: Uuid, new_duration: f64) {
        self.update_resize(clip_id, new_duration);
        self.gesture = None;
        self.timeline.sort_tracks();
        self.emit_clip_set_changed(TrackKind::Video);
        self.emit_duration_changed();
    }

    // === Playback commands ===

    /// Space bar. Entering Playing from the end rewinds to zero first;
    /// leaving Playing sweeps every audio transport to paused right away.
    pub fn toggle_playback(&mut self) {
        self.toggle_playback_at(Instant::now());
    }

    pub fn toggle_playback_at(&mut self, now: Instant) {
        let state = self.player.toggle_at(now, self.timeline.total_duration());
        if state == PlaybackState::Paused {
            self.audio_sync.pause_all(&self.timeline, &mut self.registry);
        }
        self.sender.emit(EditorEvent::PlaybackStateChanged {
            playing: state == PlaybackState::Playing,
        });
        self.sender.emit(EditorEvent::PlayheadMoved {
            time: self.player.current_time(),
        });
    }

    /// Scrub. While paused this also repaints once, since no tick loop will.
    pub fn seek_to(&mut self, time: f64, surface: &mut dyn PaintSurface) {
        let clamped = self.player.seek(time, self.timeline.total_duration());
        self.sender.emit(EditorEvent::PlayheadMoved { time: clamped });
        if !self.player.is_playing() {
            self.render_once(surface);
            // audio transports must not keep running over a paused scrub
            self.audio_sync
                .tick(clamped, false, &self.timeline, &mut self.registry);
        }
    }

    /// One driver tick: advance the clock, then composite and sync audio at
    /// the new time. Call at the host's frame cadence while playing; calling
    /// while paused is a cheap no-op.
    pub fn tick(&mut self, surface: &mut dyn PaintSurface) {
        self.tick_at(Instant::now(), surface);
    }

    pub fn tick_at(&mut self, now: Instant, surface: &mut dyn PaintSurface) {
        let total = self.timeline.total_duration();
        let outcome = self.player.tick_at(now, total);
        if !outcome.moved {
            return;
        }

        self.sender.emit(EditorEvent::PlayheadMoved { time: outcome.time });

        self.compositor
            .render_frame(outcome.time, &self.timeline, &mut self.registry, surface);
        self.audio_sync.tick(
            outcome.time,
            self.player.is_playing(),
            &self.timeline,
            &mut self.registry,
        );

        if outcome.finished {
            debug!("playback reached the end");
            self.audio_sync.pause_all(&self.timeline, &mut self.registry);
            self.sender
                .emit(EditorEvent::PlaybackStateChanged { playing: false });
        }
    }

    /// Repaint the preview at the current playhead without touching the clock.
    pub fn render_once(&mut self, surface: &mut dyn PaintSurface) {
        self.compositor.render_frame(
            self.player.current_time(),
            &self.timeline,
            &mut self.registry,
            surface,
        );
    }

    // === Presentation ===

    /// Pixels-per-second for the timeline ruler. No model effect.
    pub fn set_zoom(&mut self, pixels_per_second: f64) {
        self.zoom = pixels_per_second.max(1.0);
        debug!("zoom set to {:.1} px/s", self.zoom);
    }

    // === Event helpers ===

    fn notify(&self, message: impl Into<String>) {
        self.sender.emit(EditorEvent::Notification {
            message: message.into(),
        });
    }

    fn emit_clip_set_changed(&self, track: TrackKind) {
        self.sender.emit(EditorEvent::ClipSetChanged { track });
    }

    fn emit_duration_changed(&self) {
        self.sender.emit(EditorEvent::DurationChanged {
            total: self.timeline.total_duration(),
        });
    }

    fn emit_selection_changed(&self) {
        self.sender.emit(EditorEvent::SelectionChanged {
            selected: self.selection.get(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compositor::PaintSurface;
    use crate::core::transport::stub::SharedStubFactory;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSurface {
        clip_paints: u32,
        background_paints: u32,
    }

    impl PaintSurface for CountingSurface {
        fn paint_clip(&mut self, _clip_id: Uuid) -> anyhow::Result<()> {
            self.clip_paints += 1;
            Ok(())
        }

        fn paint_background(&mut self) {
            self.background_paints += 1;
        }
    }

    struct Rig {
        session: EditorSession,
        factory: SharedStubFactory,
    }

    impl Rig {
        fn new() -> Self {
            let factory = SharedStubFactory::new();
            Self {
                session: EditorSession::new(Box::new(factory.clone())),
                factory,
            }
        }

        fn import_video(&mut self) -> Uuid {
            self.session
                .import_media("shot.mp4", "video/mp4", "blob:shot")
                .unwrap()
        }

        fn import_audio(&mut self) -> Uuid {
            self.session
                .import_media("tune.mp3", "audio/mpeg", "blob:tune")
                .unwrap()
        }

        /// Add + commit a video clip in one step.
        fn place_video(&mut self, at: f64, duration: f64) -> Uuid {
            let media = self.import_video();
            let clip = self.session.add_clip_at(media, at).unwrap();
            self.session.media_metadata_ready(clip, duration);
            clip
        }

        fn events(&self) -> Vec<EditorEvent> {
            self.session.poll_events()
        }
    }

    #[test]
    fn test_add_and_commit_emits_clip_set_and_duration() {
        let mut rig = Rig::new();
        let media = rig.import_video();
        let clip = rig.session.add_clip_at(media, 10.0).unwrap();
        rig.events(); // drop import-time noise

        rig.session.media_metadata_ready(clip, 25.0);
        let events = rig.events();
        assert!(events.contains(&EditorEvent::ClipSetChanged {
            track: TrackKind::Video
        }));
        assert!(events.contains(&EditorEvent::DurationChanged { total: 35.0 }));
    }

    #[test]
    fn test_transport_exists_while_clip_is_pending() {
        let mut rig = Rig::new();
        let media = rig.import_audio();
        rig.session.add_clip_at(media, 0.0).unwrap();
        // transport created at clip creation, before metadata arrives
        assert_eq!(rig.factory.created().len(), 1);
        assert!(rig.session.timeline().pending().len() == 1);
    }

    #[test]
    fn test_split_without_selection_notifies() {
        let mut rig = Rig::new();
        rig.place_video(0.0, 10.0);
        rig.events();

        assert!(rig.session.split_selected_at_playhead().is_none());
        let events = rig.events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EditorEvent::Notification { .. }))
        );
    }

    #[test]
    fn test_split_outside_clip_notifies_and_keeps_clip() {
        let mut rig = Rig::new();
        let clip = rig.place_video(5.0, 10.0);
        rig.session.select_clip(clip, TrackKind::Video);
        rig.events();

        // playhead at 0, clip spans [5, 15): invalid
        assert!(rig.session.split_selected_at_playhead().is_none());
        assert!(
            rig.events()
                .iter()
                .any(|e| matches!(e, EditorEvent::Notification { .. }))
        );
        assert_eq!(rig.session.timeline().track(TrackKind::Video).len(), 1);
    }

    #[test]
    fn test_split_at_playhead_duplicates_transport_and_clears_selection() {
        let mut rig = Rig::new();
        let clip = rig.place_video(0.0, 10.0);
        let mut surface = CountingSurface::default();
        rig.session.seek_to(4.0, &mut surface);
        rig.session.select_clip(clip, TrackKind::Video);
        rig.events();

        let right = rig.session.split_selected_at_playhead().unwrap();
        assert_ne!(right, clip);
        assert_eq!(rig.session.timeline().track(TrackKind::Video).len(), 2);
        // original transport + the new half's transport
        assert_eq!(rig.factory.created().len(), 2);
        assert!(rig.session.selection().get().is_none());

        let events = rig.events();
        assert!(events.contains(&EditorEvent::SelectionChanged { selected: None }));
        assert!(events.contains(&EditorEvent::ClipSetChanged {
            track: TrackKind::Video
        }));
    }

    #[test]
    fn test_delete_selected_releases_transport() {
        let mut rig = Rig::new();
        let clip = rig.place_video(0.0, 10.0);
        rig.session.select_clip(clip, TrackKind::Video);

        assert!(rig.session.delete_selected());
        assert!(rig.session.timeline().track(TrackKind::Video).is_empty());
        assert!(rig.session.selection().get().is_none());
        // second delete: nothing selected
        assert!(!rig.session.delete_selected());
    }

    #[test]
    fn test_paused_scrub_repaints_once() {
        let mut rig = Rig::new();
        rig.place_video(0.0, 10.0);

        let mut surface = CountingSurface::default();
        rig.session.seek_to(2.0, &mut surface);
        assert_eq!(surface.clip_paints + surface.background_paints, 1);
    }

    #[test]
    fn test_tick_advances_and_finishes_exactly_at_total() {
        let mut rig = Rig::new();
        rig.place_video(0.0, 40.0);
        let start = Instant::now();

        rig.session.toggle_playback_at(start);
        let mut surface = CountingSurface::default();
        rig.session.tick_at(start, &mut surface);
        rig.session
            .tick_at(start + Duration::from_secs(41), &mut surface);

        assert!(!rig.session.is_playing());
        assert_eq!(rig.session.current_time(), 40.0);
        let events = rig.events();
        assert!(events.contains(&EditorEvent::PlaybackStateChanged { playing: false }));
    }

    #[test]
    fn test_toggle_at_end_restarts_from_zero() {
        let mut rig = Rig::new();
        rig.place_video(0.0, 40.0);
        let mut surface = CountingSurface::default();
        rig.session.seek_to(40.0, &mut surface);

        rig.session.toggle_playback_at(Instant::now());
        assert!(rig.session.is_playing());
        assert_eq!(rig.session.current_time(), 0.0);
    }

    #[test]
    fn test_pause_sweeps_audio_transports() {
        let mut rig = Rig::new();
        let media = rig.import_audio();
        let clip = rig.session.add_clip_at(media, 0.0).unwrap();
        rig.session.media_metadata_ready(clip, 20.0);

        let start = Instant::now();
        rig.session.toggle_playback_at(start);
        let mut surface = CountingSurface::default();
        rig.session.tick_at(start, &mut surface);
        rig.session.tick_at(start + Duration::from_secs(1), &mut surface);
        assert!(!rig.factory.created()[0].borrow().paused);

        rig.session.toggle_playback_at(start + Duration::from_secs(2));
        assert!(rig.factory.created()[0].borrow().paused);
    }

    #[test]
    fn test_mid_gesture_updates_do_not_resort() {
        let mut rig = Rig::new();
        let first = rig.place_video(0.0, 2.0);
        let second = rig.place_video(5.0, 2.0);

        rig.session.begin_reposition(first);
        rig.session.update_reposition(first, 9.0);
        let order: Vec<Uuid> = rig
            .session
            .timeline()
            .track(TrackKind::Video)
            .clips()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(order, [first, second], "order frozen mid-drag");

        rig.session.end_reposition(first, 9.0);
        let order: Vec<Uuid> = rig
            .session
            .timeline()
            .track(TrackKind::Video)
            .clips()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(order, [second, first], "gesture end restores sorting");
    }

    #[test]
    fn test_gestureless_update_is_ignored() {
        let mut rig = Rig::new();
        let clip = rig.place_video(3.0, 2.0);
        // no begin_reposition
        rig.session.update_reposition(clip, 9.0);
        let (_, c) = rig.session.timeline().find_clip(clip).unwrap();
        assert_eq!(c.track_start, 3.0);
    }

    #[test]
    fn test_zoom_touches_nothing_in_the_model() {
        let mut rig = Rig::new();
        rig.place_video(0.0, 10.0);
        rig.events();

        let before = serde_json::to_string(rig.session.timeline()).unwrap();
        rig.session.set_zoom(120.0);
        let after = serde_json::to_string(rig.session.timeline()).unwrap();
        assert_eq!(before, after);
        assert_eq!(rig.session.zoom(), 120.0);
        assert!(rig.events().is_empty());
    }

    #[test]
    fn test_unsupported_import_notifies() {
        let mut rig = Rig::new();
        assert!(
            rig.session
                .import_media("notes.txt", "text/plain", "blob:x")
                .is_none()
        );
        assert!(
            rig.events()
                .iter()
                .any(|e| matches!(e, EditorEvent::Notification { .. }))
        );
    }
}
