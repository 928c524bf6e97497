//! Screenlog platform core contracts.
//!
//! This crate contains cross-platform display data structures used by the
//! capture engine without coupling to a concrete OS backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a capturable display region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceId {
    /// The composite of every connected monitor.
    Merged,
    /// A single monitor, 1-based in enumeration order.
    Monitor(u32),
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceId::Merged => write!(f, "merged"),
            SurfaceId::Monitor(index) => write!(f, "monitor {index}"),
        }
    }
}

/// A capturable region of the virtual desktop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySurface {
    pub id: SurfaceId,
    /// Backend-reported name.
    pub name: String,
    /// Position in the virtual desktop (pixels).
    pub x: i32,
    pub y: i32,
    /// Size in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Whether this monitor is primary.
    pub primary: bool,
}

impl DisplaySurface {
    /// The composite surface spanning every monitor in `monitors`.
    pub fn merged(monitors: &[DisplaySurface]) -> Self {
        let (x, y, width, height) = virtual_desktop_bounds(monitors);
        Self {
            id: SurfaceId::Merged,
            name: "merged".to_string(),
            x,
            y,
            width,
            height,
            primary: false,
        }
    }

    /// Offset of this surface inside a canvas whose origin is `(origin_x, origin_y)`.
    pub fn offset_within(&self, origin_x: i32, origin_y: i32) -> (i64, i64) {
        (
            i64::from(self.x) - i64::from(origin_x),
            i64::from(self.y) - i64::from(origin_y),
        )
    }
}

/// Compute virtual desktop bounds that include all connected monitors.
/// Returns `(min_x, min_y, width, height)` in physical pixels.
pub fn virtual_desktop_bounds(monitors: &[DisplaySurface]) -> (i32, i32, u32, u32) {
    if monitors.is_empty() {
        return (0, 0, 0, 0);
    }

    let min_x = monitors.iter().map(|m| m.x).min().unwrap_or(0);
    let min_y = monitors.iter().map(|m| m.y).min().unwrap_or(0);
    let max_x = monitors
        .iter()
        .map(|m| i64::from(m.x) + i64::from(m.width))
        .max()
        .unwrap_or(0);
    let max_y = monitors
        .iter()
        .map(|m| i64::from(m.y) + i64::from(m.height))
        .max()
        .unwrap_or(0);

    let width = (max_x - i64::from(min_x)).max(1) as u32;
    let height = (max_y - i64::from(min_y)).max(1) as u32;
    (min_x, min_y, width, height)
}
