//! Cross-platform display backend on the `xcap` crate.

use image::{DynamicImage, RgbImage};
use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use screenlog_platform_core::{DisplaySurface, SurfaceId};
use xcap::Monitor;

use super::DisplayBackend;

/// Production backend: X11/Wayland on Linux, CoreGraphics on macOS, DXGI/GDI on Windows.
#[derive(Debug, Default)]
pub struct XcapBackend;

impl XcapBackend {
    pub fn new() -> Self {
        Self
    }

    fn monitors() -> ScreenlogResult<Vec<Monitor>> {
        Monitor::all()
            .map_err(|e| ScreenlogError::platform(format!("Failed to enumerate monitors: {e}")))
    }
}

impl DisplayBackend for XcapBackend {
    fn name(&self) -> &str {
        "xcap"
    }

    fn surfaces(&self) -> ScreenlogResult<Vec<DisplaySurface>> {
        Self::monitors()?
            .iter()
            .enumerate()
            .map(|(i, monitor)| describe(i as u32 + 1, monitor))
            .collect()
    }

    fn grab(&self, surface: &DisplaySurface) -> ScreenlogResult<RgbImage> {
        let SurfaceId::Monitor(index) = surface.id else {
            return Err(ScreenlogError::capture(
                "The merged surface is grabbed through grab_composite",
            ));
        };

        // Enumeration order can shift between ticks; prefer a name match.
        let monitors = Self::monitors()?;
        let monitor = monitors
            .iter()
            .find(|m| m.name().map(|n| n == surface.name).unwrap_or(false))
            .or_else(|| monitors.get(index.saturating_sub(1) as usize))
            .ok_or_else(|| ScreenlogError::capture(format!("Monitor {index} is gone")))?;

        let image = monitor
            .capture_image()
            .map_err(|e| ScreenlogError::capture(format!("Screen capture failed: {e}")))?;
        Ok(DynamicImage::ImageRgba8(image).to_rgb8())
    }
}

fn describe(index: u32, monitor: &Monitor) -> ScreenlogResult<DisplaySurface> {
    let query = |e: xcap::XCapError| {
        ScreenlogError::platform(format!("Failed to query monitor {index}: {e}"))
    };
    Ok(DisplaySurface {
        id: SurfaceId::Monitor(index),
        name: monitor.name().unwrap_or_else(|_| format!("monitor-{index}")),
        x: monitor.x().map_err(query)?,
        y: monitor.y().map_err(query)?,
        width: monitor.width().map_err(query)?,
        height: monitor.height().map_err(query)?,
        primary: monitor.is_primary().unwrap_or(false),
    })
}
