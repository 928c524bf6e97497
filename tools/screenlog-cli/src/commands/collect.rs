//! Capture until interrupted, then compile the report.

use std::sync::Arc;

use screenlog_capture_engine::{get_backend, SessionController, StopHandle};
use screenlog_render_engine::{EncoderFactory, FfmpegEncoderFactory};
use screenlog_session_model::config::{CaptureConfig, ExportMode};

use super::{print_summary, spawn_signal_listener};

pub async fn run(config: CaptureConfig) -> anyhow::Result<()> {
    let backend = get_backend()?;
    let encoders = Arc::new(FfmpegEncoderFactory);
    if config.export == ExportMode::Video && !encoders.is_available() {
        tracing::warn!("ffmpeg not found on PATH; report videos will fail to encode");
    }

    println!("Collecting screenshots into {}", config.frames_dir.display());
    println!("  Interval: {}s", config.interval.as_secs());
    println!("  Merge monitors: {}", config.merge_monitors);
    println!("  Clock: {}", if config.clock.is_utc() { "UTC" } else { "local" });
    println!();

    let stop = StopHandle::new();
    let mut session = SessionController::collector(config, backend, encoders, stop.clone())?;
    let signals = spawn_signal_listener(stop);

    println!("Press Ctrl+C to stop collecting...");
    let summary = session.collect().await?;
    signals.abort();

    print_summary(&summary);
    Ok(())
}
