//! Frame enumeration, grouping, and cleanup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use screenlog_session_model::frame::{is_image_path, FrameName, MonitorTag};

/// Suffix of frames still being written.
const PARTIAL_SUFFIX: &str = ".part";

/// A frame file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFrame {
    pub path: PathBuf,
    pub file_name: String,
    pub name: FrameName,
}

/// Frames sharing a monitor tag, in sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorGroup {
    pub tag: MonitorTag,
    pub frames: Vec<StoredFrame>,
}

impl MonitorGroup {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Handle to a frame directory.
#[derive(Debug, Clone)]
pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    /// Open the store, creating the directory if needed.
    ///
    /// This is the one failure surfaced as fatal at startup.
    pub fn open(dir: impl Into<PathBuf>) -> ScreenlogResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            ScreenlogError::store(format!(
                "Failed to create frame directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a frame with this name lives.
    pub fn frame_path(&self, name: &FrameName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Persist an encoded frame.
    ///
    /// Bytes land in a `.part` file first and are renamed into place, so a
    /// frame is either fully present or absent.
    pub fn write(&self, name: &FrameName, bytes: &[u8]) -> ScreenlogResult<PathBuf> {
        let path = self.frame_path(name);
        let partial = self
            .dir
            .join(format!("{}{PARTIAL_SUFFIX}", name.file_name()));
        std::fs::write(&partial, bytes)?;
        std::fs::rename(&partial, &path)?;
        Ok(path)
    }

    /// Every stored frame, sorted by filename.
    pub fn frames(&self) -> ScreenlogResult<Vec<StoredFrame>> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match FrameName::parse(file_name) {
                Some(name) => frames.push(StoredFrame {
                    file_name: file_name.to_string(),
                    path: path.clone(),
                    name,
                }),
                None if is_image_path(&path) => {
                    tracing::debug!(path = %path.display(), "Ignoring image with unrecognised name");
                }
                None => {}
            }
        }
        frames.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(frames)
    }

    /// Stored frames partitioned into monitor groups.
    pub fn groups(&self) -> ScreenlogResult<Vec<MonitorGroup>> {
        Ok(group_frames(self.frames()?))
    }

    pub fn is_empty(&self) -> ScreenlogResult<bool> {
        Ok(self.frames()?.is_empty())
    }

    /// Delete every image file (and stale partial writes) from the directory.
    ///
    /// Returns how many files were removed. Files that cannot be removed are
    /// logged and left behind; other files in the directory are untouched.
    pub fn purge(&self) -> ScreenlogResult<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let partial = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(PARTIAL_SUFFIX))
                .unwrap_or(false);
            if !(is_image_path(&path) || partial) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove frame");
                }
            }
        }

        tracing::info!(removed, dir = %self.dir.display(), "Frame store purged");
        Ok(removed)
    }
}

/// Partition frames by monitor tag. Groups come back merged-first, then by
/// monitor index; frames inside a group are in sequence order.
pub fn group_frames(frames: Vec<StoredFrame>) -> Vec<MonitorGroup> {
    let mut groups: BTreeMap<MonitorTag, Vec<StoredFrame>> = BTreeMap::new();
    for frame in frames {
        groups.entry(frame.name.tag).or_default().push(frame);
    }

    groups
        .into_iter()
        .map(|(tag, mut frames)| {
            frames.sort_by(|a, b| {
                a.name
                    .sequence
                    .cmp(&b.name.sequence)
                    .then_with(|| a.file_name.cmp(&b.file_name))
            });
            MonitorGroup { tag, frames }
        })
        .collect()
}
