//! Playback clock and the Paused/Playing state machine.
//!
//! **Why**: Scrubbing and playback must share one monotonic time cursor, and
//! the cursor must stay inside `[0, total_duration]` even while edits are
//! shrinking the timeline under it.
//!
//! **Used by**: EditorSession (drives ticks, compositor and audio sync).
//!
//! # Timing model
//!
//! Wall-clock deltas: each tick advances `current_time` by the real time
//! elapsed since the previous tick. The first tick after entering Playing
//! advances by zero (the reference instant is seeded on start). The tick is
//! a pure function of `(state, now)` - the Player owns no timer; an external
//! driver (UI frame callback, demo loop) decides the cadence and tests feed
//! synthetic instants.

use std::time::Instant;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// What a tick did, so the driver knows which side effects to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Clock position after the tick
    pub time: f64,

    /// Clock advanced (or was pinned) this tick
    pub moved: bool,

    /// The clock hit total_duration and playback stopped
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    state: PlaybackState,
    current_time: f64,

    /// Wall-clock reference of the previous tick (runtime-only)
    #[serde(skip)]
    last_tick: Option<Instant>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Paused,
            current_time: 0.0,
            last_tick: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Toggle between Paused and Playing. Returns the new state.
    pub fn toggle_at(&mut self, now: Instant, total_duration: f64) -> PlaybackState {
        match self.state {
            PlaybackState::Paused => self.play_at(now, total_duration),
            PlaybackState::Playing => self.pause(),
        }
        self.state
    }

    /// Enter Playing. Restarts from zero when the clock already sits at (or
    /// past) the end; seeds the tick reference so the first delta is zero.
    pub fn play_at(&mut self, now: Instant, total_duration: f64) {
        if self.state == PlaybackState::Playing {
            return;
        }
        if self.current_time >= total_duration {
            debug!("play from end, rewinding to 0");
            self.current_time = 0.0;
        }
        self.state = PlaybackState::Playing;
        self.last_tick = Some(now);
    }

    /// Enter Paused. Idempotent. The driver is responsible for the audio
    /// pause sweep that must follow.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            debug!("paused at {:.3}s", self.current_time);
        }
        self.state = PlaybackState::Paused;
        self.last_tick = None;
    }

    /// Advance the clock by the wall-clock delta since the previous tick.
    ///
    /// Reaching `total_duration` pins the clock exactly there and stops
    /// playback (`finished` is set so the driver runs its pause sweep).
    /// A no-op in Paused.
    pub fn tick_at(&mut self, now: Instant, total_duration: f64) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome {
                time: self.current_time,
                moved: false,
                finished: false,
            };
        }

        let delta = match self.last_tick {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.current_time += delta;
        trace!("tick +{:.4}s -> {:.3}s", delta, self.current_time);

        let finished = self.current_time >= total_duration;
        if finished {
            // No overshoot persists: the playhead parks on the exact end
            self.current_time = total_duration;
            self.pause();
        }

        TickOutcome {
            time: self.current_time,
            moved: true,
            finished,
        }
    }

    /// Scrub the clock. Valid while playing or paused; clamps to
    /// `[0, total_duration]` and resets the delta reference so the next
    /// tick doesn't count the time spent scrubbing.
    pub fn seek(&mut self, t: f64, total_duration: f64) -> f64 {
        self.current_time = t.clamp(0.0, total_duration);
        if self.state == PlaybackState::Playing {
            self.last_tick = None;
        }
        self.current_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TOTAL: f64 = 30.0;

    fn t0() -> Instant {
        Instant::now()
    }

    #[test]
    fn test_first_tick_after_play_advances_by_zero() {
        let mut p = Player::new();
        let start = t0();
        p.play_at(start, TOTAL);

        let out = p.tick_at(start, TOTAL);
        assert!(out.moved);
        assert_eq!(out.time, 0.0);
        assert!(!out.finished);
    }

    #[test]
    fn test_ticks_advance_by_wall_clock_delta() {
        let mut p = Player::new();
        let start = t0();
        p.play_at(start, TOTAL);
        p.tick_at(start, TOTAL);

        p.tick_at(start + Duration::from_millis(500), TOTAL);
        let out = p.tick_at(start + Duration::from_millis(750), TOTAL);
        assert!((out.time - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_reaching_end_parks_exactly_and_pauses() {
        let mut p = Player::new();
        let start = t0();
        p.play_at(start, TOTAL);
        p.tick_at(start, TOTAL);

        let out = p.tick_at(start + Duration::from_secs(31), TOTAL);
        assert!(out.finished);
        assert_eq!(out.time, TOTAL);
        assert_eq!(p.current_time(), TOTAL);
        assert_eq!(p.state(), PlaybackState::Paused);

        // subsequent ticks are inert
        let idle = p.tick_at(start + Duration::from_secs(32), TOTAL);
        assert!(!idle.moved);
        assert_eq!(idle.time, TOTAL);
    }

    #[test]
    fn test_play_from_end_rewinds_first() {
        let mut p = Player::new();
        p.seek(TOTAL, TOTAL);
        assert_eq!(p.current_time(), TOTAL);

        p.play_at(t0(), TOTAL);
        assert_eq!(p.current_time(), 0.0);
        assert!(p.is_playing());
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut p = Player::new();
        let start = t0();
        assert_eq!(p.toggle_at(start, TOTAL), PlaybackState::Playing);
        assert_eq!(p.toggle_at(start, TOTAL), PlaybackState::Paused);
        assert!(!p.is_playing());
    }

    #[test]
    fn test_seek_clamps_both_ends() {
        let mut p = Player::new();
        assert_eq!(p.seek(-3.0, TOTAL), 0.0);
        assert_eq!(p.seek(99.0, TOTAL), TOTAL);
        assert_eq!(p.seek(12.5, TOTAL), 12.5);
    }

    #[test]
    fn test_seek_while_playing_resets_delta_reference() {
        let mut p = Player::new();
        let start = t0();
        p.play_at(start, TOTAL);
        p.tick_at(start, TOTAL);

        p.seek(5.0, TOTAL);
        // Next tick must not count the pre-seek elapsed time
        let out = p.tick_at(start + Duration::from_secs(10), TOTAL);
        assert_eq!(out.time, 5.0);
        let out = p.tick_at(start + Duration::from_secs(11), TOTAL);
        assert!((out.time - 6.0).abs() < 1e-9);
    }
}
