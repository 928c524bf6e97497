//! One capture tick: enumerate, grab, label, encode, store.

use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use screenlog_common::clock::CaptureClock;
use screenlog_common::error::ScreenlogResult;
use screenlog_frame_store::FrameStore;
use screenlog_platform_core::{DisplaySurface, SurfaceId};
use screenlog_session_model::config::CaptureConfig;
use screenlog_session_model::frame::{FrameName, MonitorTag};

use crate::backend::DisplayBackend;
use crate::label::{label_text, LabelFont};

/// A frame written to the store during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub name: FrameName,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Result of one capture tick.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// At least one surface was attempted; holds the frames that were written.
    Captured(Vec<CapturedFrame>),
    /// No display was available (e.g. all monitors asleep).
    NoOp,
}

impl CaptureOutcome {
    pub fn frames_written(&self) -> usize {
        match self {
            CaptureOutcome::Captured(frames) => frames.len(),
            CaptureOutcome::NoOp => 0,
        }
    }
}

/// Turns display surfaces into stored, labeled frames.
pub struct CaptureEngine {
    backend: Box<dyn DisplayBackend>,
    store: FrameStore,
    font: Option<LabelFont>,
    merge_monitors: bool,
    clock: CaptureClock,
    quality: u8,
}

impl CaptureEngine {
    /// Build an engine. The label font is resolved here, once.
    pub fn new(backend: Box<dyn DisplayBackend>, store: FrameStore, config: &CaptureConfig) -> Self {
        let font = config
            .label
            .then(|| LabelFont::resolve(&config.font_paths, config.font_size));
        Self::with_font(backend, store, config, font)
    }

    pub fn with_font(
        backend: Box<dyn DisplayBackend>,
        store: FrameStore,
        config: &CaptureConfig,
        font: Option<LabelFont>,
    ) -> Self {
        Self {
            backend,
            store,
            font,
            merge_monitors: config.merge_monitors,
            clock: config.clock,
            quality: config.quality,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Capture every current surface under `sequence`.
    ///
    /// Never fails: enumeration problems yield `NoOp`, and a surface that
    /// cannot be grabbed or written is logged and skipped.
    pub fn capture(&self, sequence: u32) -> CaptureOutcome {
        let monitors = match self.backend.surfaces() {
            Ok(monitors) => monitors,
            Err(e) => {
                tracing::warn!(sequence, error = %e, "Display enumeration failed, skipping tick");
                return CaptureOutcome::NoOp;
            }
        };
        if monitors.is_empty() {
            tracing::warn!(sequence, "No monitors found. Maybe in sleeping mode?");
            return CaptureOutcome::NoOp;
        }

        let mut frames = Vec::new();
        if self.merge_monitors || monitors.len() == 1 {
            let timestamp = self.clock.now();
            let name = FrameName::new(sequence, MonitorTag::Merged, timestamp);
            let grabbed = self.backend.grab_composite(&monitors);
            if let Some(frame) = self.store_grab(name, grabbed, monitors.len()) {
                frames.push(frame);
            }
        } else {
            for monitor in &monitors {
                let SurfaceId::Monitor(index) = monitor.id else {
                    continue;
                };
                let timestamp = self.clock.now();
                let name = FrameName::new(sequence, MonitorTag::Monitor(index), timestamp);
                let grabbed = self.backend.grab(monitor);
                if let Some(frame) = self.store_grab(name, grabbed, monitors.len()) {
                    frames.push(frame);
                }
            }
        }

        CaptureOutcome::Captured(frames)
    }

    fn store_grab(
        &self,
        name: FrameName,
        grabbed: ScreenlogResult<RgbImage>,
        monitors: usize,
    ) -> Option<CapturedFrame> {
        let result = grabbed.and_then(|mut image| {
            if let Some(font) = &self.font {
                font.draw(&mut image, &label_text(name.tag, &name.timestamp, monitors));
            }
            let bytes = encode_jpeg(&image, self.quality)?;
            let path = self.store.write(&name, &bytes)?;
            Ok((path, image.dimensions()))
        });

        match result {
            Ok((path, (width, height))) => {
                tracing::info!(path = %path.display(), "Screenshot saved");
                Some(CapturedFrame {
                    name,
                    path,
                    width,
                    height,
                })
            }
            Err(e) => {
                tracing::warn!(
                    sequence = name.sequence,
                    monitor = %name.tag,
                    error = %e,
                    "Capture failed, skipping surface"
                );
                None
            }
        }
    }
}

/// Lossy-encode a frame at `quality` (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> ScreenlogResult<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(image)?;
    Ok(bytes)
}

/// Surfaces a tick would produce frames for, without grabbing.
pub fn planned_surfaces(monitors: &[DisplaySurface], merge_monitors: bool) -> Vec<SurfaceId> {
    match monitors {
        [] => Vec::new(),
        [_] => vec![SurfaceId::Merged],
        _ if merge_monitors => vec![SurfaceId::Merged],
        _ => monitors.iter().map(|m| m.id).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use screenlog_common::error::ScreenlogError;
    use screenlog_session_model::frame::FRAME_EXTENSION;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeBackend {
        monitors: Vec<DisplaySurface>,
        broken: Option<u32>,
        grabs: Arc<AtomicUsize>,
    }

    impl DisplayBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        fn surfaces(&self) -> ScreenlogResult<Vec<DisplaySurface>> {
            Ok(self.monitors.clone())
        }

        fn grab(&self, surface: &DisplaySurface) -> ScreenlogResult<RgbImage> {
            self.grabs.fetch_add(1, Ordering::SeqCst);
            if let SurfaceId::Monitor(index) = surface.id {
                if self.broken == Some(index) {
                    return Err(ScreenlogError::capture("display went away"));
                }
            }
            Ok(RgbImage::from_pixel(surface.width, surface.height, Rgb([40, 40, 40])))
        }
    }

    fn monitor(index: u32, x: i32) -> DisplaySurface {
        DisplaySurface {
            id: SurfaceId::Monitor(index),
            name: format!("HDMI-{index}"),
            x,
            y: 0,
            width: 64,
            height: 48,
            primary: index == 1,
        }
    }

    struct Setup {
        dir: PathBuf,
        engine: CaptureEngine,
        grabs: Arc<AtomicUsize>,
    }

    impl Drop for Setup {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn setup(name: &str, monitors: Vec<DisplaySurface>, merge: bool, label: bool) -> Setup {
        setup_with(name, monitors, merge, label, None)
    }

    fn setup_with(
        name: &str,
        monitors: Vec<DisplaySurface>,
        merge: bool,
        label: bool,
        broken: Option<u32>,
    ) -> Setup {
        let dir = std::env::temp_dir().join(format!("screenlog-engine-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = FrameStore::open(&dir).unwrap();
        let grabs = Arc::new(AtomicUsize::new(0));
        let backend = FakeBackend {
            monitors,
            broken,
            grabs: grabs.clone(),
        };
        let config = CaptureConfig {
            frames_dir: dir.clone(),
            merge_monitors: merge,
            label,
            ..CaptureConfig::default()
        };
        let font = label.then(|| LabelFont::builtin(8.0));
        Setup {
            engine: CaptureEngine::with_font(Box::new(backend), store, &config, font),
            dir,
            grabs,
        }
    }

    #[test]
    fn test_no_monitors_is_noop() {
        let s = setup("noop", Vec::new(), false, true);
        assert_eq!(s.engine.capture(0), CaptureOutcome::NoOp);
        assert_eq!(s.grabs.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(&s.dir).unwrap().count(), 0);
    }

    #[test]
    fn test_per_monitor_frames() {
        let s = setup("per-monitor", vec![monitor(1, 0), monitor(2, 64)], false, false);
        let outcome = s.engine.capture(7);

        let CaptureOutcome::Captured(frames) = outcome else {
            panic!("expected frames");
        };
        assert_eq!(frames.len(), 2);
        let names: Vec<String> = frames.iter().map(|f| f.name.file_name()).collect();
        assert!(names[0].starts_with("0007_monitor1_"));
        assert!(names[1].starts_with("0007_monitor2_"));
        assert!(names.iter().all(|n| n.ends_with(FRAME_EXTENSION)));
        assert!(frames.iter().all(|f| f.path.exists()));
    }

    #[test]
    fn test_merge_produces_one_composite() {
        let s = setup("merge", vec![monitor(1, 0), monitor(2, 64)], true, false);
        let CaptureOutcome::Captured(frames) = s.engine.capture(0) else {
            panic!("expected frames");
        };
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name.tag, MonitorTag::Merged);
        assert_eq!((frames[0].width, frames[0].height), (128, 48));
    }

    #[test]
    fn test_single_monitor_is_merged_surface() {
        let s = setup("single", vec![monitor(1, 0)], false, false);
        let CaptureOutcome::Captured(frames) = s.engine.capture(0) else {
            panic!("expected frames");
        };
        assert_eq!(frames[0].name.tag, MonitorTag::Merged);
        assert!(frames[0].name.file_name().starts_with("0000_2"));
    }

    #[test]
    fn test_failed_surface_is_skipped() {
        let s = setup_with("broken", vec![monitor(1, 0), monitor(2, 64)], false, false, Some(1));
        let CaptureOutcome::Captured(frames) = s.engine.capture(3) else {
            panic!("expected frames");
        };
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name.tag, MonitorTag::Monitor(2));
    }

    #[test]
    fn test_label_brightens_top_rows() {
        let plain = setup("plain", vec![monitor(1, 0)], false, false);
        let labeled = setup("labeled", vec![monitor(1, 0)], false, true);

        let brightest_top = |s: &Setup| {
            let CaptureOutcome::Captured(frames) = s.engine.capture(0) else {
                panic!("expected frames");
            };
            let image = image::open(&frames[0].path).unwrap().to_rgb8();
            (0..image.width())
                .flat_map(|x| (0..8).map(move |y| (x, y)))
                .map(|(x, y)| image.get_pixel(x, y)[0])
                .max()
                .unwrap()
        };

        assert!(brightest_top(&plain) < 80);
        assert!(brightest_top(&labeled) > 150);
    }

    #[test]
    fn test_planned_surfaces() {
        let two = vec![monitor(1, 0), monitor(2, 64)];
        assert!(planned_surfaces(&[], false).is_empty());
        assert_eq!(planned_surfaces(&two[..1], false), vec![SurfaceId::Merged]);
        assert_eq!(planned_surfaces(&two, true), vec![SurfaceId::Merged]);
        assert_eq!(
            planned_surfaces(&two, false),
            vec![SurfaceId::Monitor(1), SurfaceId::Monitor(2)]
        );
    }

    #[test]
    fn test_encode_jpeg_clamps_quality() {
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let bytes = encode_jpeg(&image, 0).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
