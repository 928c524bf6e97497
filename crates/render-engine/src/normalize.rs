//! Resolution normalization for heterogeneous frame sizes.
//!
//! Every frame in a monitor group is fitted to one target canvas: the
//! per-axis maximum over the group. Smaller frames are either stretched to
//! fill it or centered on black borders.

use image::imageops::{self, FilterType};
use image::RgbImage;
use screenlog_session_model::config::ResizeStrategy;

/// Per-axis maximum of `dims`, or `None` when nothing has a non-zero size.
pub fn target_resolution<I>(dims: I) -> Option<(u32, u32)>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let (width, height) = dims
        .into_iter()
        .fold((0, 0), |(w, h), (fw, fh)| (w.max(fw), h.max(fh)));
    if width == 0 || height == 0 {
        None
    } else {
        Some((width, height))
    }
}

/// Black border added around a frame to reach the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Padding {
    /// Center `actual` inside `target`: top/left get the floor of half the
    /// slack, bottom/right the remainder.
    pub fn centered(actual: (u32, u32), target: (u32, u32)) -> Self {
        let slack_x = target.0.saturating_sub(actual.0);
        let slack_y = target.1.saturating_sub(actual.1);
        let left = slack_x / 2;
        let top = slack_y / 2;
        Self {
            top,
            bottom: slack_y - top,
            left,
            right: slack_x - left,
        }
    }
}

/// Fit `frame` to exactly `target` using `strategy`.
pub fn normalize_frame(frame: RgbImage, target: (u32, u32), strategy: ResizeStrategy) -> RgbImage {
    if frame.dimensions() == target {
        return frame;
    }

    match strategy {
        ResizeStrategy::Scale => imageops::resize(&frame, target.0, target.1, FilterType::Triangle),
        ResizeStrategy::Pad => {
            let padding = Padding::centered(frame.dimensions(), target);
            let mut canvas = RgbImage::new(target.0, target.1);
            imageops::replace(
                &mut canvas,
                &frame,
                i64::from(padding.left),
                i64::from(padding.top),
            );
            canvas
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    #[test]
    fn test_target_is_per_axis_maximum() {
        let dims = [(1920, 1080), (1280, 1440), (800, 600)];
        assert_eq!(target_resolution(dims), Some((1920, 1440)));
        assert_eq!(target_resolution(Vec::new()), None);
    }

    #[test]
    fn test_scale_stretches_to_exact_target() {
        let frame = RgbImage::from_pixel(1280, 720, Rgb([200, 10, 10]));
        let out = normalize_frame(frame, (1920, 1080), ResizeStrategy::Scale);
        assert_eq!(out.dimensions(), (1920, 1080));
        assert_eq!(out.get_pixel(0, 0), &Rgb([200, 10, 10]));
    }

    #[test]
    fn test_scale_ignores_aspect_ratio() {
        let frame = RgbImage::from_pixel(100, 400, Rgb([1, 2, 3]));
        let out = normalize_frame(frame, (640, 480), ResizeStrategy::Scale);
        assert_eq!(out.dimensions(), (640, 480));
    }

    #[test]
    fn test_pad_centers_on_black() {
        let frame = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        let out = normalize_frame(frame, (5, 5), ResizeStrategy::Pad);
        assert_eq!(out.dimensions(), (5, 5));
        // slack 3 on each axis: 1 before, 2 after
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(1, 1), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(2, 2), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_matching_frame_is_returned_untouched() {
        let frame = RgbImage::from_pixel(4, 3, Rgb([9, 9, 9]));
        let out = normalize_frame(frame.clone(), (4, 3), ResizeStrategy::Pad);
        assert_eq!(out, frame);
    }

    proptest! {
        #[test]
        fn prop_padding_adds_exact_slack(
            w in 1u32..4000, h in 1u32..4000, dw in 0u32..2000, dh in 0u32..2000
        ) {
            let target = (w + dw, h + dh);
            let pad = Padding::centered((w, h), target);
            prop_assert_eq!(pad.left + pad.right, dw);
            prop_assert_eq!(pad.top + pad.bottom, dh);
            prop_assert_eq!(pad.top, dh / 2);
            prop_assert_eq!(pad.left, dw / 2);
        }
    }
}
