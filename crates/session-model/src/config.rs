//! Per-session capture configuration.

use std::path::PathBuf;
use std::time::Duration;

use screenlog_common::clock::CaptureClock;
use screenlog_common::config::CaptureDefaults;
use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use serde::{Deserialize, Serialize};

/// Largest accepted label font size, in pixels.
pub const MAX_FONT_SIZE: f32 = 512.0;

/// How frames smaller than a group's target resolution are fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizeStrategy {
    /// Stretch to exactly fill the target canvas.
    #[default]
    Scale,
    /// Center on a black canvas of the target size.
    Pad,
}

/// Which artifact finalization produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// One video per monitor group.
    #[default]
    Video,
    /// One uncompressed zip of all raw frames.
    Archive,
}

/// Immutable configuration for one capture/report session.
///
/// Built once at startup and handed by reference to the capture engine,
/// the frame store, and the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Directory that holds in-flight frames.
    pub frames_dir: PathBuf,

    /// Wall-clock sleep between capture ticks.
    pub interval: Duration,

    /// Lossy image quality (1-100).
    pub quality: u8,

    /// Frame rate of compiled videos.
    pub fps: u32,

    /// Grab all displays as one composite surface.
    pub merge_monitors: bool,

    /// Normalization used for mismatched frame sizes.
    pub resize: ResizeStrategy,

    /// Draw the timestamp label onto each frame.
    pub label: bool,

    /// Clock frames are stamped with.
    pub clock: CaptureClock,

    /// Artifact produced at finalization.
    pub export: ExportMode,

    /// Pre-supplied artifact path; a generated name is used when absent.
    pub output: Option<PathBuf>,

    /// Bounded wait for an in-flight capture before compiling.
    pub grace: Duration,

    /// Label font size in pixels.
    pub font_size: f32,

    /// Candidate label fonts, first existing file wins.
    pub font_paths: Vec<PathBuf>,
}

impl CaptureConfig {
    /// Seed a config from file-level defaults; flag overrides are applied by the caller.
    pub fn from_defaults(defaults: &CaptureDefaults) -> Self {
        Self {
            frames_dir: defaults.frames_dir.clone(),
            interval: Duration::from_secs(defaults.interval_secs),
            quality: defaults.quality,
            fps: defaults.fps,
            merge_monitors: false,
            resize: ResizeStrategy::Scale,
            label: true,
            clock: CaptureClock::Local,
            export: ExportMode::Video,
            output: None,
            grace: Duration::from_millis(defaults.grace_millis),
            font_size: defaults.font_size,
            font_paths: defaults.font_paths.clone(),
        }
    }

    /// Check invariants and clamp quality into the encoder's accepted range.
    pub fn validated(mut self) -> ScreenlogResult<Self> {
        if self.interval.is_zero() {
            return Err(ScreenlogError::config("capture interval must be non-zero"));
        }
        if self.fps == 0 {
            return Err(ScreenlogError::config("frame rate must be non-zero"));
        }
        if !(self.font_size > 0.0 && self.font_size <= MAX_FONT_SIZE) {
            return Err(ScreenlogError::config(format!(
                "font size must be in (0, {MAX_FONT_SIZE}], got {}",
                self.font_size
            )));
        }
        self.quality = self.quality.clamp(1, 100);
        Ok(self)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::from_defaults(&CaptureDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_defaults_uses_file_values() {
        let mut defaults = CaptureDefaults::default();
        defaults.interval_secs = 15;
        defaults.grace_millis = 250;
        let config = CaptureConfig::from_defaults(&defaults);
        assert_eq!(config.interval, Duration::from_secs(15));
        assert_eq!(config.grace, Duration::from_millis(250));
        assert_eq!(config.resize, ResizeStrategy::Scale);
        assert_eq!(config.export, ExportMode::Video);
        assert!(config.label);
    }

    #[test]
    fn test_validated_clamps_quality() {
        let config = CaptureConfig {
            quality: 0,
            ..CaptureConfig::default()
        };
        assert_eq!(config.validated().unwrap().quality, 1);

        let config = CaptureConfig {
            quality: 250,
            ..CaptureConfig::default()
        };
        assert_eq!(config.validated().unwrap().quality, 100);
    }

    #[test]
    fn test_validated_rejects_zero_interval_and_fps() {
        let config = CaptureConfig {
            interval: Duration::ZERO,
            ..CaptureConfig::default()
        };
        assert!(matches!(
            config.validated(),
            Err(ScreenlogError::Config { .. })
        ));

        let config = CaptureConfig {
            fps: 0,
            ..CaptureConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_validated_bounds_font_size() {
        for font_size in [0.0, -4.0, f32::NAN, f32::INFINITY, MAX_FONT_SIZE + 1.0, 1.0e10] {
            let config = CaptureConfig {
                font_size,
                ..CaptureConfig::default()
            };
            assert!(
                matches!(config.validated(), Err(ScreenlogError::Config { .. })),
                "font size {font_size} accepted"
            );
        }

        let config = CaptureConfig {
            font_size: MAX_FONT_SIZE,
            ..CaptureConfig::default()
        };
        assert!(config.validated().is_ok());
    }
}
