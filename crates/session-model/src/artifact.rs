//! Compiled artifacts and their filenames.

use std::path::{Path, PathBuf};

use screenlog_common::clock::CaptureTimestamp;
use serde::{Deserialize, Serialize};

use crate::frame::MonitorTag;

/// Container extension for report videos.
pub const VIDEO_EXTENSION: &str = "mp4";

/// An output file produced by finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompiledArtifact {
    /// One report video for a monitor group.
    Video {
        path: PathBuf,
        tag: MonitorTag,
        width: u32,
        height: u32,
        /// Encoded video frames, including the hold frame.
        frames_encoded: u64,
    },
    /// One uncompressed archive of every stored frame.
    Archive { path: PathBuf, entries: usize },
}

impl CompiledArtifact {
    pub fn path(&self) -> &Path {
        match self {
            CompiledArtifact::Video { path, .. } | CompiledArtifact::Archive { path, .. } => path,
        }
    }
}

/// `report_{YYYYMMDD_HHMMSS}[_m{N}].mp4`
pub fn report_file_name(session_end: &CaptureTimestamp, tag: MonitorTag) -> String {
    format!(
        "report_{}{}.{VIDEO_EXTENSION}",
        session_end.file_stamp(),
        tag.report_suffix()
    )
}

/// `screenshots_{YYYYMMDD_HHMMSS}.zip`
pub fn archive_file_name(session_end: &CaptureTimestamp) -> String {
    format!("screenshots_{}.zip", session_end.file_stamp())
}

/// Resolve where a group's video goes.
///
/// With a pre-supplied path, merged groups use it verbatim and monitor
/// groups get `_m{N}` inserted before the extension so several monitors
/// never overwrite one another.
pub fn video_output_path(
    output: Option<&Path>,
    session_end: &CaptureTimestamp,
    tag: MonitorTag,
) -> PathBuf {
    match output {
        None => PathBuf::from(report_file_name(session_end, tag)),
        Some(path) if tag == MonitorTag::Merged => path.to_path_buf(),
        Some(path) => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report".to_string());
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| VIDEO_EXTENSION.to_string());
            path.with_file_name(format!("{stem}{}.{ext}", tag.report_suffix()))
        }
    }
}

/// Resolve where the archive goes.
pub fn archive_output_path(output: Option<&Path>, session_end: &CaptureTimestamp) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(archive_file_name(session_end)))
}
