//! Per-monitor report videos.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use image::{ImageReader, ImageResult, RgbImage};
use screenlog_common::clock::CaptureTimestamp;
use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use screenlog_frame_store::MonitorGroup;
use screenlog_session_model::artifact::{video_output_path, CompiledArtifact};
use screenlog_session_model::config::ResizeStrategy;

use crate::compile::CompileReport;
use crate::encoder::{EncoderFactory, VideoEncoder};
use crate::normalize::{normalize_frame, target_resolution};

/// Settings shared by every group of one compilation.
#[derive(Debug, Clone)]
pub struct VideoSettings {
    pub fps: u32,
    pub resize: ResizeStrategy,
    pub output: Option<PathBuf>,
    pub session_end: CaptureTimestamp,
}

/// Compile one video per group into `report`.
///
/// A failing group is logged and skipped. Cancellation stops after the
/// current frame, removes the partial video, and abandons remaining groups.
pub fn compile_videos(
    groups: &[MonitorGroup],
    settings: &VideoSettings,
    encoders: &dyn EncoderFactory,
    cancel: &AtomicBool,
    report: &mut CompileReport,
) {
    for group in groups {
        let path = video_output_path(settings.output.as_deref(), &settings.session_end, group.tag);
        match compile_group(group, &path, settings, encoders, cancel, report) {
            Ok(Some(artifact)) => {
                tracing::info!(
                    monitor = %group.tag,
                    path = %path.display(),
                    "Video for monitor saved"
                );
                report.artifacts.push(artifact);
            }
            Ok(None) => report.skipped_groups += 1,
            Err(e) if e.is_cancelled() => {
                remove_partial(&path);
                report.cancelled = true;
                tracing::warn!(monitor = %group.tag, "Video compilation cancelled");
                return;
            }
            Err(e) => {
                remove_partial(&path);
                report.failed_groups += 1;
                tracing::error!(monitor = %group.tag, error = %e, "Video compilation failed");
            }
        }
    }
}

fn compile_group(
    group: &MonitorGroup,
    path: &Path,
    settings: &VideoSettings,
    encoders: &dyn EncoderFactory,
    cancel: &AtomicBool,
    report: &mut CompileReport,
) -> ScreenlogResult<Option<CompiledArtifact>> {
    // Pass 1: header-only scan for the group's target resolution.
    let mut readable = Vec::with_capacity(group.len());
    for frame in &group.frames {
        match read_dimensions(&frame.path) {
            Ok(dims) => readable.push((frame, dims)),
            Err(e) => {
                tracing::warn!(path = %frame.path.display(), error = %e, "Skipping unreadable frame");
                report.skipped_frames += 1;
            }
        }
    }
    let Some(target) = target_resolution(readable.iter().map(|(_, dims)| *dims)) else {
        tracing::warn!(monitor = %group.tag, "No valid frames for monitor");
        return Ok(None);
    };
    tracing::debug!(
        monitor = %group.tag,
        width = target.0,
        height = target.1,
        frames = readable.len(),
        "Computed target resolution"
    );

    // Pass 2: decode, normalize, encode. The encoder opens on the first
    // decodable frame so a group of corrupt frames never leaves an empty video.
    let mut encoder: Option<Box<dyn VideoEncoder>> = None;
    let mut last_frame: Option<RgbImage> = None;
    let mut frames_encoded = 0u64;

    for (frame, _) in readable {
        if cancel.load(Ordering::SeqCst) {
            return Err(ScreenlogError::Cancelled);
        }

        let image = match decode(&frame.path) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(path = %frame.path.display(), error = %e, "Skipping corrupt frame");
                report.skipped_frames += 1;
                continue;
            }
        };
        let image = normalize_frame(image, target, settings.resize);

        if encoder.is_none() {
            encoder = Some(encoders.create(path, target.0, target.1, settings.fps)?);
        }
        if let Some(encoder) = encoder.as_mut() {
            encoder.push(&image)?;
            frames_encoded += 1;
        }
        last_frame = Some(image);
    }

    let (Some(mut encoder), Some(last_frame)) = (encoder, last_frame) else {
        tracing::warn!(monitor = %group.tag, "No valid frames for monitor");
        return Ok(None);
    };

    // Hold the final frame once more. For a lone frame this is what gives
    // the container the two frames it needs to be playable.
    encoder.push(&last_frame)?;
    frames_encoded += 1;
    encoder.finish()?;

    Ok(Some(CompiledArtifact::Video {
        path: path.to_path_buf(),
        tag: group.tag,
        width: target.0,
        height: target.1,
        frames_encoded,
    }))
}

fn read_dimensions(path: &Path) -> ImageResult<(u32, u32)> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
}

fn decode(path: &Path) -> ImageResult<RgbImage> {
    Ok(ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgb8())
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial video");
        }
    }
}
