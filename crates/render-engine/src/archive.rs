//! Uncompressed zip export of raw frames.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use screenlog_frame_store::StoredFrame;
use screenlog_session_model::artifact::CompiledArtifact;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Store every frame, in the given order, under its own filename.
///
/// Returns the archive, or `None` when there is nothing to archive
/// (including when no frame could be opened), together with the number of
/// unreadable frames skipped. A cancelled, failed or empty archive is removed.
pub fn write_archive(
    frames: &[StoredFrame],
    path: &Path,
    cancel: &AtomicBool,
) -> ScreenlogResult<(Option<CompiledArtifact>, usize)> {
    if frames.is_empty() {
        tracing::warn!("No screenshots found");
        return Ok((None, 0));
    }

    let result = write_entries(frames, path, cancel);
    if result.is_err() && path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial archive");
        }
    }
    let (entries, skipped) = result?;

    if entries == 0 {
        tracing::warn!("No readable screenshots to archive");
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove empty archive");
        }
        return Ok((None, skipped));
    }

    tracing::info!(path = %path.display(), entries, "ZIP archive saved");
    let artifact = CompiledArtifact::Archive {
        path: path.to_path_buf(),
        entries,
    };
    Ok((Some(artifact), skipped))
}

fn write_entries(
    frames: &[StoredFrame],
    path: &Path,
    cancel: &AtomicBool,
) -> ScreenlogResult<(usize, usize)> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let mut entries = 0;
    let mut skipped = 0;
    for frame in frames {
        if cancel.load(Ordering::SeqCst) {
            return Err(ScreenlogError::Cancelled);
        }

        let mut source = match File::open(&frame.path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %frame.path.display(), error = %e, "Skipping unreadable frame");
                skipped += 1;
                continue;
            }
        };
        zip.start_file(frame.file_name.as_str(), options)
            .map_err(|e| ScreenlogError::compile(format!("Failed to add zip entry: {e}")))?;
        std::io::copy(&mut source, &mut zip)?;
        entries += 1;
    }

    zip.finish()
        .map_err(|e| ScreenlogError::compile(format!("Failed to finalize zip: {e}")))?;
    Ok((entries, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenlog_common::clock::CaptureClock;
    use screenlog_session_model::frame::{FrameName, MonitorTag};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("screenlog-archive-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn stored(dir: &Path, sequence: u32) -> StoredFrame {
        let name = FrameName::new(sequence, MonitorTag::Merged, CaptureClock::Local.now());
        let file_name = name.file_name();
        StoredFrame {
            path: dir.join(&file_name),
            file_name,
            name,
        }
    }

    #[test]
    fn test_unreadable_frames_only_yield_no_archive() {
        let dir = temp_dir("unreadable");
        let frames = vec![stored(&dir.join("gone"), 0), stored(&dir.join("gone"), 1)];
        let path = dir.join("out.zip");

        let (artifact, skipped) = write_archive(&frames, &path, &AtomicBool::new(false)).unwrap();

        assert!(artifact.is_none());
        assert_eq!(skipped, 2);
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_readable_frames_are_counted_and_missing_skipped() {
        let dir = temp_dir("mixed");
        let present = stored(&dir, 0);
        std::fs::write(&present.path, b"jpeg bytes").unwrap();
        let frames = vec![present, stored(&dir.join("gone"), 1)];
        let path = dir.join("out.zip");

        let (artifact, skipped) = write_archive(&frames, &path, &AtomicBool::new(false)).unwrap();

        assert_eq!(
            artifact,
            Some(CompiledArtifact::Archive {
                path: path.clone(),
                entries: 1,
            })
        );
        assert_eq!(skipped, 1);
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_cancelled_archive_is_removed() {
        let dir = temp_dir("cancel");
        let present = stored(&dir, 0);
        std::fs::write(&present.path, b"jpeg bytes").unwrap();
        let path = dir.join("out.zip");

        let result = write_archive(&[present], &path, &AtomicBool::new(true));

        assert!(matches!(result, Err(ScreenlogError::Cancelled)));
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
