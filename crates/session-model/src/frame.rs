//! Monitor tags and the frame filename scheme.
//!
//! A stored frame is named
//! `{sequence:04}[_monitor{N}]_{YYYYMMDD_HHMMSS}[Z].{ext}`. Sequence numbers
//! are zero-padded to at least four digits so that, up to 9999 frames per
//! session, lexicographic filename order equals capture order.

use std::fmt;
use std::path::Path;

use screenlog_common::clock::{CaptureClock, CaptureTimestamp};
use serde::{Deserialize, Serialize};

/// Extension of frames written by the capture engine.
pub const FRAME_EXTENSION: &str = "jpg";

/// Extensions the frame store treats as frames (enumeration and purge).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "png"];

const MONITOR_MARKER: &str = "_monitor";
const UTC_MARKER: char = 'Z';
const MIN_SEQUENCE_DIGITS: usize = 4;
const FILE_STAMP_LEN: usize = "YYYYMMDD_HHMMSS".len();

/// Which display a frame came from.
///
/// `Merged` sorts before every monitor so merged groups compile first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorTag {
    /// A composite of all displays, or the only display.
    Merged,
    /// A single monitor, 1-based.
    Monitor(u32),
}

impl MonitorTag {
    /// Suffix inserted into frame filenames.
    pub fn frame_suffix(self) -> String {
        match self {
            MonitorTag::Merged => String::new(),
            MonitorTag::Monitor(index) => format!("{MONITOR_MARKER}{index}"),
        }
    }

    /// Suffix inserted into report video filenames.
    pub fn report_suffix(self) -> String {
        match self {
            MonitorTag::Merged => String::new(),
            MonitorTag::Monitor(index) => format!("_m{index}"),
        }
    }
}

impl fmt::Display for MonitorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorTag::Merged => write!(f, "merged"),
            MonitorTag::Monitor(index) => write!(f, "{index}"),
        }
    }
}

/// The parsed identity of a stored frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameName {
    pub sequence: u32,
    pub tag: MonitorTag,
    pub timestamp: CaptureTimestamp,
}

impl FrameName {
    pub fn new(sequence: u32, tag: MonitorTag, timestamp: CaptureTimestamp) -> Self {
        Self {
            sequence,
            tag,
            timestamp,
        }
    }

    /// Filename for a frame written by the capture engine.
    pub fn file_name(&self) -> String {
        format!(
            "{:0width$}{}_{}{}.{FRAME_EXTENSION}",
            self.sequence,
            self.tag.frame_suffix(),
            self.timestamp.file_stamp(),
            if self.timestamp.is_utc() { "Z" } else { "" },
            width = MIN_SEQUENCE_DIGITS,
        )
    }

    /// Parse a stored filename. Returns `None` for anything that is not a frame.
    pub fn parse(file_name: &str) -> Option<Self> {
        if !file_name.is_ascii() {
            return None;
        }
        let (stem, ext) = file_name.rsplit_once('.')?;
        if !is_image_extension(ext) {
            return None;
        }

        let (stem, clock) = match stem.strip_suffix(UTC_MARKER) {
            Some(rest) => (rest, CaptureClock::Utc),
            None => (stem, CaptureClock::Local),
        };
        if stem.len() < FILE_STAMP_LEN + 1 {
            return None;
        }
        let (head, stamp) = stem.split_at(stem.len() - FILE_STAMP_LEN);
        let timestamp = CaptureTimestamp::parse_file_stamp(stamp, clock)?;
        let head = head.strip_suffix('_')?;

        let (sequence, tag) = match head.split_once(MONITOR_MARKER) {
            Some((sequence, index)) => (sequence, MonitorTag::Monitor(parse_digits(index)?)),
            None => (head, MonitorTag::Merged),
        };
        if sequence.len() < MIN_SEQUENCE_DIGITS {
            return None;
        }

        Some(Self {
            sequence: parse_digits(sequence)?,
            tag,
            timestamp,
        })
    }
}

/// Whether `ext` (without the dot) names a frame image.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

/// Whether `path` carries a frame image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(is_image_extension)
        .unwrap_or(false)
}

fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
