//! Compilation entry point.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use screenlog_common::clock::CaptureClock;
use screenlog_common::error::ScreenlogResult;
use screenlog_frame_store::FrameStore;
use screenlog_session_model::artifact::{archive_output_path, CompiledArtifact};
use screenlog_session_model::config::{CaptureConfig, ExportMode, ResizeStrategy};
use serde::Serialize;

use crate::archive::write_archive;
use crate::encoder::EncoderFactory;
use crate::video::{compile_videos, VideoSettings};

/// The compilation-relevant slice of a session's configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileSettings {
    pub export: ExportMode,
    pub resize: ResizeStrategy,
    pub fps: u32,
    pub output: Option<PathBuf>,
    pub clock: CaptureClock,
}

impl CompileSettings {
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            export: config.export,
            resize: config.resize,
            fps: config.fps,
            output: config.output.clone(),
            clock: config.clock,
        }
    }
}

/// What a compilation produced and what it had to leave out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompileReport {
    pub artifacts: Vec<CompiledArtifact>,
    /// Individual frames skipped as unreadable or corrupt.
    pub skipped_frames: usize,
    /// Groups (or the archive) skipped for having no valid frames.
    pub skipped_groups: usize,
    /// Groups whose encoder failed.
    pub failed_groups: usize,
    /// Whether a cancellation request cut compilation short.
    pub cancelled: bool,
}

/// Reads a frame store and emits report videos or an archive.
#[derive(Clone)]
pub struct Compiler {
    store: FrameStore,
    settings: CompileSettings,
    encoders: Arc<dyn EncoderFactory>,
}

impl Compiler {
    pub fn new(store: FrameStore, settings: CompileSettings, encoders: Arc<dyn EncoderFactory>) -> Self {
        Self {
            store,
            settings,
            encoders,
        }
    }

    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    /// Compile whatever the store currently holds.
    ///
    /// Only failing to enumerate the store is an error; per-frame and
    /// per-group problems are logged and recorded in the report. The store
    /// is never modified.
    pub fn compile(&self, cancel: &AtomicBool) -> ScreenlogResult<CompileReport> {
        let session_end = self.settings.clock.now();
        let mut report = CompileReport::default();

        match self.settings.export {
            ExportMode::Video => {
                let groups = self.store.groups()?;
                if groups.is_empty() {
                    tracing::warn!("No screenshots found");
                    report.skipped_groups += 1;
                    return Ok(report);
                }
                tracing::info!(
                    groups = groups.len(),
                    encoder = self.encoders.name(),
                    "Compiling report videos"
                );
                let settings = VideoSettings {
                    fps: self.settings.fps,
                    resize: self.settings.resize,
                    output: self.settings.output.clone(),
                    session_end,
                };
                compile_videos(&groups, &settings, self.encoders.as_ref(), cancel, &mut report);
            }
            ExportMode::Archive => {
                let frames = self.store.frames()?;
                let path = archive_output_path(self.settings.output.as_deref(), &session_end);
                match write_archive(&frames, &path, cancel) {
                    Ok((Some(artifact), skipped)) => {
                        report.skipped_frames += skipped;
                        report.artifacts.push(artifact);
                    }
                    Ok((None, skipped)) => {
                        report.skipped_frames += skipped;
                        report.skipped_groups += 1;
                    }
                    Err(e) if e.is_cancelled() => {
                        tracing::warn!("Archive export cancelled");
                        report.cancelled = true;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Archive export failed");
                        report.failed_groups += 1;
                    }
                }
            }
        }

        Ok(report)
    }
}
