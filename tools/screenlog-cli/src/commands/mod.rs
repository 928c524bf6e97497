pub mod check;
pub mod collect;
pub mod config;
pub mod report;

use screenlog_capture_engine::{SessionSummary, StopHandle};
use screenlog_session_model::artifact::CompiledArtifact;

/// Forward SIGINT (and SIGTERM on Unix) to the session's stop handle.
///
/// Every signal is forwarded, so a second Ctrl+C during finalization
/// cancels the report.
pub fn spawn_signal_listener(stop: StopHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = listen(stop).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    })
}

#[cfg(unix)]
async fn listen(stop: StopHandle) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            received = terminate.recv() => {
                if received.is_none() {
                    return Ok(());
                }
            }
        }
        tracing::info!("Stop requested");
        stop.request_stop();
    }
}

#[cfg(not(unix))]
async fn listen(stop: StopHandle) -> std::io::Result<()> {
    loop {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Stop requested");
        stop.request_stop();
    }
}

pub fn print_summary(summary: &SessionSummary) {
    println!();
    if summary.ticks > 0 {
        println!(
            "Collected {} screenshot(s) over {} capture(s)",
            summary.frames_written, summary.ticks
        );
    }

    let Some(report) = &summary.compile else {
        println!("Report compilation failed; see log for details.");
        return;
    };

    for artifact in &report.artifacts {
        match artifact {
            CompiledArtifact::Video {
                path,
                tag,
                width,
                height,
                frames_encoded,
            } => println!(
                "  [video] {} ({tag}, {width}x{height}, {frames_encoded} frames)",
                path.display()
            ),
            CompiledArtifact::Archive { path, entries } => {
                println!("  [zip]   {} ({entries} screenshots)", path.display())
            }
        }
    }
    if report.artifacts.is_empty() && !report.cancelled {
        println!("No report produced: no screenshots found.");
    }
    if report.skipped_frames > 0 {
        println!("  Skipped {} unreadable screenshot(s)", report.skipped_frames);
    }
    if report.failed_groups > 0 {
        println!("  {} video(s) failed to encode", report.failed_groups);
    }
    if report.cancelled {
        println!("Report cancelled; partial output removed.");
    }
    println!("Temporary screenshots cleaned up ({} removed).", summary.purged);
}
