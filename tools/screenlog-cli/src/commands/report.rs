//! Compile screenshots already in the frames directory.

use std::sync::Arc;

use screenlog_capture_engine::{SessionController, StopHandle};
use screenlog_render_engine::{EncoderFactory, FfmpegEncoderFactory};
use screenlog_session_model::config::{CaptureConfig, ExportMode};

use super::{print_summary, spawn_signal_listener};

pub async fn run(config: CaptureConfig) -> anyhow::Result<()> {
    let encoders = Arc::new(FfmpegEncoderFactory);
    if config.export == ExportMode::Video && !encoders.is_available() {
        tracing::warn!("ffmpeg not found on PATH; report videos will fail to encode");
    }

    println!("Compiling screenshots from {}", config.frames_dir.display());

    let stop = StopHandle::new();
    let mut session = SessionController::reporter(config, encoders, stop.clone())?;
    let signals = spawn_signal_listener(stop);

    let summary = session.report().await?;
    signals.abort();

    print_summary(&summary);
    Ok(())
}
