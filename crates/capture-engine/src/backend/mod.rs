use image::{imageops, RgbImage};
use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use screenlog_platform_core::DisplaySurface;

/// Abstract interface for platform display enumeration and capture.
pub trait DisplayBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Enumerate physical monitors. Re-queried every tick, so hot-plugged
    /// or sleeping displays are picked up. May be empty.
    fn surfaces(&self) -> ScreenlogResult<Vec<DisplaySurface>>;

    /// Grab the current pixels of one monitor.
    fn grab(&self, surface: &DisplaySurface) -> ScreenlogResult<RgbImage>;

    /// Grab every monitor onto one canvas covering the virtual desktop.
    ///
    /// Regions not covered by any monitor stay black. Monitors that fail to
    /// grab are logged and left black; the call only fails when none could
    /// be grabbed.
    fn grab_composite(&self, monitors: &[DisplaySurface]) -> ScreenlogResult<RgbImage> {
        if let [only] = monitors {
            return self.grab(only);
        }

        let merged = DisplaySurface::merged(monitors);
        let mut canvas = RgbImage::new(merged.width, merged.height);
        let mut grabbed = 0usize;
        for monitor in monitors {
            match self.grab(monitor) {
                Ok(image) => {
                    let (dx, dy) = monitor.offset_within(merged.x, merged.y);
                    imageops::replace(&mut canvas, &image, dx, dy);
                    grabbed += 1;
                }
                Err(e) => {
                    tracing::warn!(surface = %monitor.id, error = %e, "Failed to grab monitor for composite");
                }
            }
        }

        if grabbed == 0 {
            return Err(ScreenlogError::capture("No monitor could be grabbed"));
        }
        Ok(canvas)
    }
}

#[cfg(feature = "xcap")]
pub mod xcap;

#[cfg(feature = "xcap")]
pub use self::xcap::XcapBackend;

/// Get the production display backend.
pub fn get_backend() -> ScreenlogResult<Box<dyn DisplayBackend>> {
    #[cfg(feature = "xcap")]
    {
        Ok(Box::new(XcapBackend::new()))
    }
    #[cfg(not(feature = "xcap"))]
    {
        Err(ScreenlogError::platform(
            "Built without a display backend; enable the `xcap` feature",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use screenlog_platform_core::SurfaceId;

    struct SolidBackend {
        fail: Option<u32>,
    }

    impl DisplayBackend for SolidBackend {
        fn name(&self) -> &str {
            "solid"
        }

        fn surfaces(&self) -> ScreenlogResult<Vec<DisplaySurface>> {
            Ok(Vec::new())
        }

        fn grab(&self, surface: &DisplaySurface) -> ScreenlogResult<RgbImage> {
            let SurfaceId::Monitor(index) = surface.id else {
                return Err(ScreenlogError::capture("not a monitor"));
            };
            if self.fail == Some(index) {
                return Err(ScreenlogError::capture("grab failed"));
            }
            let shade = (index * 100) as u8;
            Ok(RgbImage::from_pixel(surface.width, surface.height, Rgb([shade; 3])))
        }
    }

    fn monitor(index: u32, x: i32, y: i32, width: u32, height: u32) -> DisplaySurface {
        DisplaySurface {
            id: SurfaceId::Monitor(index),
            name: format!("DP-{index}"),
            x,
            y,
            width,
            height,
            primary: index == 1,
        }
    }

    #[test]
    fn test_composite_places_monitors_at_offsets() {
        let backend = SolidBackend { fail: None };
        let monitors = vec![monitor(1, 0, 40, 100, 60), monitor(2, 100, 0, 50, 50)];

        let canvas = backend.grab_composite(&monitors).unwrap();
        assert_eq!(canvas.dimensions(), (150, 100));
        assert_eq!(canvas.get_pixel(10, 50), &Rgb([100; 3]));
        assert_eq!(canvas.get_pixel(120, 10), &Rgb([200; 3]));
        // Below monitor 2, right of monitor 1: uncovered.
        assert_eq!(canvas.get_pixel(120, 80), &Rgb([0; 3]));
    }

    #[test]
    fn test_composite_handles_negative_origin() {
        let backend = SolidBackend { fail: None };
        let monitors = vec![monitor(1, 0, 0, 40, 40), monitor(2, -40, 0, 40, 40)];

        let canvas = backend.grab_composite(&monitors).unwrap();
        assert_eq!(canvas.dimensions(), (80, 40));
        assert_eq!(canvas.get_pixel(5, 5), &Rgb([200; 3]));
        assert_eq!(canvas.get_pixel(45, 5), &Rgb([100; 3]));
    }

    #[test]
    fn test_composite_skips_failed_monitor() {
        let backend = SolidBackend { fail: Some(2) };
        let monitors = vec![monitor(1, 0, 0, 20, 20), monitor(2, 20, 0, 20, 20)];

        let canvas = backend.grab_composite(&monitors).unwrap();
        assert_eq!(canvas.get_pixel(5, 5), &Rgb([100; 3]));
        assert_eq!(canvas.get_pixel(25, 5), &Rgb([0; 3]));
    }

    #[test]
    fn test_composite_fails_when_nothing_grabbed() {
        let backend = SolidBackend { fail: Some(1) };
        let monitors = vec![monitor(1, 0, 0, 20, 20)];
        assert!(backend.grab_composite(&monitors).is_err());
    }
}
