//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ScreenlogError, ScreenlogResult};

/// Global application configuration, read from `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default capture settings; CLI flags override these.
    #[serde(default)]
    pub capture: CaptureDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Directory that holds in-flight frames.
    pub frames_dir: PathBuf,

    /// Seconds between capture ticks.
    pub interval_secs: u64,

    /// Lossy image quality (0-100).
    pub quality: u8,

    /// Frame rate of compiled report videos.
    pub fps: u32,

    /// How long finalization waits for an in-flight capture, in milliseconds.
    pub grace_millis: u64,

    /// Label font size in pixels.
    pub font_size: f32,

    /// Candidate label fonts, first existing file wins.
    pub font_paths: Vec<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "screenlog=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("screenshots"),
            interval_secs: 60,
            quality: 85,
            fps: 1,
            grace_millis: 1000,
            font_size: 24.0,
            font_paths: default_font_paths(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location.
    ///
    /// A missing file yields the defaults. Runs before logging is set up,
    /// so an unusable file is returned as an error for the caller to report.
    pub fn load() -> ScreenlogResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path. A missing file yields the defaults.
    pub fn load_from(config_path: &Path) -> ScreenlogResult<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(config_path)?;
        serde_json::from_str(&content).map_err(|e| {
            ScreenlogError::config(format!(
                "Failed to parse config at {}: {e}",
                config_path.display()
            ))
        })
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("screenlog").join("config.json")
}

/// Label font candidates for the platforms we ship on, in lookup order.
fn default_font_paths() -> Vec<PathBuf> {
    [
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Monaco.ttf",
        "C:/Windows/Fonts/arial.ttf",
        "C:/Windows/Fonts/Calibri.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}
