//! Capture clock and timestamp formatting.
//!
//! Every frame is stamped with the wall-clock time it was grabbed. The
//! clock is either local time or UTC, chosen once per session; the two
//! never mix inside a frame directory because the filename carries a `Z`
//! marker for UTC captures.

use chrono::{Local, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Format used inside frame and artifact filenames.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Format used for the on-image label.
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which wall clock a session stamps frames with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptureClock {
    #[default]
    Local,
    Utc,
}

impl CaptureClock {
    /// Read the clock, truncated to second precision.
    pub fn now(self) -> CaptureTimestamp {
        let naive = match self {
            CaptureClock::Local => Local::now().naive_local(),
            CaptureClock::Utc => Utc::now().naive_utc(),
        };
        CaptureTimestamp::new(naive, self)
    }

    pub fn is_utc(self) -> bool {
        self == CaptureClock::Utc
    }
}

/// A second-precision wall-clock reading tagged with its clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureTimestamp {
    naive: NaiveDateTime,
    clock: CaptureClock,
}

impl CaptureTimestamp {
    pub fn new(naive: NaiveDateTime, clock: CaptureClock) -> Self {
        let naive = naive.with_nanosecond(0).unwrap_or(naive);
        Self { naive, clock }
    }

    /// `YYYY-MM-DD HH:MM:SS`
    pub fn label(&self) -> String {
        self.naive.format(LABEL_FORMAT).to_string()
    }

    /// `YYYYMMDD_HHMMSS`
    pub fn file_stamp(&self) -> String {
        self.naive.format(FILE_STAMP_FORMAT).to_string()
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.naive
    }

    pub fn clock(&self) -> CaptureClock {
        self.clock
    }

    pub fn is_utc(&self) -> bool {
        self.clock.is_utc()
    }

    /// Parse a `YYYYMMDD_HHMMSS` stamp.
    pub fn parse_file_stamp(stamp: &str, clock: CaptureClock) -> Option<Self> {
        NaiveDateTime::parse_from_str(stamp, FILE_STAMP_FORMAT)
            .ok()
            .map(|naive| Self::new(naive, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_milli_opt(7, 5, 3, 870))
            .unwrap()
    }

    #[test]
    fn test_label_and_file_stamp_are_second_precision() {
        let ts = CaptureTimestamp::new(sample(), CaptureClock::Local);
        assert_eq!(ts.label(), "2024-03-09 07:05:03");
        assert_eq!(ts.file_stamp(), "20240309_070503");
        assert!(!ts.is_utc());
    }

    #[test]
    fn test_parse_file_stamp_roundtrips_formatting() {
        let ts = CaptureTimestamp::parse_file_stamp("20240309_070503", CaptureClock::Utc).unwrap();
        assert_eq!(ts.label(), "2024-03-09 07:05:03");
        assert!(ts.is_utc());
        assert!(CaptureTimestamp::parse_file_stamp("2024-03-09", CaptureClock::Utc).is_none());
    }

    #[test]
    fn test_clock_now_tags_its_clock() {
        assert!(CaptureClock::Utc.now().is_utc());
        assert!(!CaptureClock::Local.now().is_utc());
        assert_eq!(CaptureClock::Utc.now().naive().nanosecond(), 0);
    }

    #[test]
    fn test_timestamps_order_chronologically() {
        let earlier = CaptureTimestamp::new(sample(), CaptureClock::Local);
        let later = CaptureTimestamp::new(sample() + chrono::Duration::seconds(1), CaptureClock::Local);
        let mut stamps = vec![later, earlier];
        stamps.sort();
        assert_eq!(stamps, vec![earlier, later]);
        assert!(CaptureClock::Local < CaptureClock::Utc);
    }
}
