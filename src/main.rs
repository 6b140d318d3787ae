//! Headless demo driver: scripts an editing session against stub transports
//! and runs the playback loop in real time.
//!
//! This is the engine exercised end to end without a UI - the embedding
//! application replaces `StubFactory` and `LogSurface` with real media
//! elements and a real canvas.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use uuid::Uuid;

use cutline::cli::Args;
use cutline::core::compositor::PaintSurface;
use cutline::core::events::EditorEvent;
use cutline::core::session::EditorSession;
use cutline::core::transport::stub::SharedStubFactory;
use cutline::entities::track::TrackKind;
use cutline::utils::format_timecode;

/// Paint target that just counts frames (stands in for the preview canvas).
#[derive(Default)]
struct LogSurface {
    frames: u64,
    blanks: u64,
}

impl PaintSurface for LogSurface {
    fn paint_clip(&mut self, clip_id: Uuid) -> Result<()> {
        self.frames += 1;
        log::trace!("frame from clip {}", clip_id);
        Ok(())
    }

    fn paint_background(&mut self) {
        self.blanks += 1;
    }
}

fn init_logger(args: &Args) {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if let Some(path) = &args.log_file {
        let file = match std::fs::File::create(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Cannot create log file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
}

fn report(event: &EditorEvent) {
    match event {
        EditorEvent::PlayheadMoved { time } => {
            debug!("playhead {}", format_timecode(*time));
        }
        EditorEvent::ClipSetChanged { track } => info!("{} track changed", track),
        EditorEvent::SelectionChanged { selected } => match selected {
            Some((id, track)) => info!("selected {} on {} track", id, track),
            None => info!("selection cleared"),
        },
        EditorEvent::DurationChanged { total } => {
            info!("total duration {}", format_timecode(*total));
        }
        EditorEvent::PlaybackStateChanged { playing } => {
            info!("{}", if *playing { "playing" } else { "paused" });
        }
        EditorEvent::Notification { message } => info!("[notice] {}", message),
    }
}

fn drain(session: &EditorSession) {
    for event in session.poll_events() {
        report(&event);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args);
    info!("cutline demo session starting");

    let mut session = EditorSession::new(Box::new(SharedStubFactory::new()));
    let mut surface = LogSurface::default();

    // --- Script: import, place, edit ---
    let shot = session
        .import_media("shot01.mp4", "video/mp4", "blob:shot01")
        .context("video import")?;
    let tune = session
        .import_media("tune.mp3", "audio/mpeg", "blob:tune")
        .context("audio import")?;
    let slate = session
        .import_media("slate.png", "image/png", "blob:slate")
        .context("image import")?;

    let shot_clip = session.add_clip_at(shot, 0.0).context("place video")?;
    let tune_clip = session.add_clip_at(tune, 1.0).context("place audio")?;
    session.add_clip_at(slate, 6.0).context("place image")?;

    // Stub "decode probes" answer immediately; a browser host would call
    // these from its loadedmetadata handlers.
    session.media_metadata_ready(shot_clip, 6.0);
    session.media_metadata_ready(tune_clip, 4.0);
    drain(&session);

    // Split the video at 2s, then remove the left half
    session.seek_to(2.0, &mut surface);
    session.select_clip(shot_clip, TrackKind::Video);
    session
        .split_selected_at_playhead()
        .context("split at playhead")?;
    session.select_clip(shot_clip, TrackKind::Video);
    session.delete_selected();
    session.seek_to(0.0, &mut surface);
    drain(&session);

    info!(
        "timeline: {} video / {} audio clips, total {}",
        session.timeline().track(TrackKind::Video).len(),
        session.timeline().track(TrackKind::Audio).len(),
        format_timecode(session.total_duration()),
    );

    // --- Real-time playback loop ---
    let tick = Duration::from_secs_f64(1.0 / args.tick_rate.max(1) as f64);
    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds.max(0.0));

    session.toggle_playback();
    while session.is_playing() && Instant::now() < deadline {
        session.tick(&mut surface);
        drain(&session);
        std::thread::sleep(tick);
    }
    if session.is_playing() {
        session.toggle_playback();
    }
    drain(&session);

    info!(
        "stopped at {} after {} frames ({} blank)",
        format_timecode(session.current_time()),
        surface.frames,
        surface.blanks,
    );

    if args.dump {
        println!("{}", serde_json::to_string_pretty(session.timeline())?);
    }

    Ok(())
}
