//! Timestamp labels drawn onto frames.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use screenlog_common::clock::CaptureTimestamp;
use screenlog_session_model::frame::MonitorTag;

use crate::glyphs::{glyph, is_lit, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_TOP: u32 = 1;
/// Upper bound on the built-in glyph pixel size.
const MAX_CELL: u32 = 64;

/// Font used for frame labels, resolved once per session.
pub enum LabelFont {
    TrueType {
        font: FontVec,
        scale: PxScale,
        source: PathBuf,
    },
    /// Built-in bitmap glyphs, each cell drawn as a `cell`-pixel square.
    Builtin { cell: u32 },
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::TrueType { source, scale, .. } => f
                .debug_struct("TrueType")
                .field("source", source)
                .field("size", &scale.y)
                .finish(),
            LabelFont::Builtin { cell } => f.debug_struct("Builtin").field("cell", cell).finish(),
        }
    }
}

impl LabelFont {
    /// First candidate that loads as a font wins; otherwise fall back to
    /// the built-in glyphs sized to roughly match `size` pixels.
    pub fn resolve(candidates: &[PathBuf], size: f32) -> Self {
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match load_font(path) {
                Ok(font) => {
                    tracing::debug!(path = %path.display(), "Using label font");
                    return LabelFont::TrueType {
                        font,
                        scale: PxScale::from(size),
                        source: path.clone(),
                    };
                }
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "Unusable font"),
            }
        }

        tracing::warn!("No label font found, falling back to built-in glyphs");
        LabelFont::builtin(size)
    }

    pub fn builtin(size: f32) -> Self {
        let cell = (size / (GLYPH_HEIGHT + 1) as f32)
            .round()
            .clamp(1.0, MAX_CELL as f32) as u32;
        LabelFont::Builtin { cell }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, LabelFont::Builtin { .. })
    }

    /// Rendered width and height of `text`.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            LabelFont::TrueType { font, scale, .. } => text_size(*scale, font, text),
            LabelFont::Builtin { cell } => {
                let chars = text.chars().count() as u32;
                let width = if chars == 0 {
                    0
                } else {
                    chars
                        .saturating_mul(GLYPH_ADVANCE)
                        .saturating_sub(1)
                        .saturating_mul(*cell)
                };
                (width, GLYPH_HEIGHT.saturating_mul(*cell))
            }
        }
    }

    /// Draw `text` horizontally centered near the top edge.
    pub fn draw(&self, image: &mut RgbImage, text: &str) {
        let (text_width, _) = self.measure(text);
        let x = image.width().saturating_sub(text_width) / 2;

        match self {
            LabelFont::TrueType { font, scale, .. } => {
                draw_text_mut(image, LABEL_COLOR, x as i32, LABEL_TOP as i32, *scale, font, text);
            }
            LabelFont::Builtin { cell } => draw_builtin(image, x, LABEL_TOP, *cell, text),
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    FontVec::try_from_vec(bytes).map_err(|e| e.to_string())
}

fn draw_builtin(image: &mut RgbImage, x: u32, y: u32, cell: u32, text: &str) {
    let (width, height) = image.dimensions();
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else { continue };
        let advance = GLYPH_ADVANCE.saturating_mul(cell);
        let origin_x = x.saturating_add((i as u32).saturating_mul(advance));
        if origin_x >= width {
            break;
        }
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !is_lit(&rows, col, row) {
                    continue;
                }
                let left = origin_x.saturating_add(col.saturating_mul(cell));
                let top = y.saturating_add(row.saturating_mul(cell));
                for py in (0..cell).map(|dy| top.saturating_add(dy)) {
                    if py >= height {
                        break;
                    }
                    for px in (0..cell).map(|dx| left.saturating_add(dx)) {
                        if px >= width {
                            break;
                        }
                        image.put_pixel(px, py, LABEL_COLOR);
                    }
                }
            }
        }
    }
}

/// Label for a frame.
///
/// `monitors` is the number of physical monitors present this tick.
pub fn label_text(tag: MonitorTag, timestamp: &CaptureTimestamp, monitors: usize) -> String {
    let stamp = timestamp.label();
    match tag {
        MonitorTag::Monitor(index) => format!("Monitor {index}: {stamp}"),
        MonitorTag::Merged if monitors > 1 => format!("{stamp} (merged)"),
        MonitorTag::Merged => stamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use screenlog_common::clock::CaptureClock;

    fn timestamp() -> CaptureTimestamp {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        CaptureTimestamp::new(naive, CaptureClock::Local)
    }

    #[test]
    fn test_label_text_variants() {
        let ts = timestamp();
        assert_eq!(
            label_text(MonitorTag::Monitor(2), &ts, 2),
            "Monitor 2: 2024-01-01 10:00:00"
        );
        assert_eq!(
            label_text(MonitorTag::Merged, &ts, 3),
            "2024-01-01 10:00:00 (merged)"
        );
        assert_eq!(label_text(MonitorTag::Merged, &ts, 1), "2024-01-01 10:00:00");
    }

    #[test]
    fn test_resolve_falls_back_to_builtin() {
        let missing = std::env::temp_dir().join("screenlog-no-such-font.ttf");
        let font = LabelFont::resolve(&[missing], 24.0);
        assert!(font.is_builtin());
    }

    #[test]
    fn test_resolve_skips_unparsable_font() {
        let path = std::env::temp_dir().join(format!("screenlog-bad-font-{}.ttf", std::process::id()));
        std::fs::write(&path, b"not a font").unwrap();
        let font = LabelFont::resolve(&[path.clone()], 24.0);
        assert!(font.is_builtin());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_builtin_measure() {
        let font = LabelFont::Builtin { cell: 2 };
        assert_eq!(font.measure("AB"), ((2 * 6 - 1) * 2, 14));
        assert_eq!(font.measure(""), (0, 14));
    }

    #[test]
    fn test_builtin_draw_is_centered_at_top() {
        let font = LabelFont::Builtin { cell: 1 };
        let mut image = RgbImage::new(100, 20);
        font.draw(&mut image, "-");

        // One 5-wide glyph centered in 100px starts at x = 47; the bar is row 3.
        let lit: Vec<u32> = (0..100)
            .filter(|x| image.get_pixel(*x, LABEL_TOP + 3) == &LABEL_COLOR)
            .collect();
        assert_eq!(lit, vec![47, 48, 49, 50, 51]);
        assert_eq!(image.get_pixel(47, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_builtin_draw_clamps_wide_text() {
        let font = LabelFont::Builtin { cell: 3 };
        let mut image = RgbImage::new(30, 30);
        font.draw(&mut image, "2024-01-01 10:00:00");
        // Too wide to center: starts at x = 0 and is clipped at the edge.
        // Row 1 of '2' lights its leftmost column.
        assert_eq!(image.get_pixel(0, LABEL_TOP + 3), &LABEL_COLOR);
    }

    #[test]
    fn test_builtin_cell_is_bounded() {
        assert!(matches!(LabelFont::builtin(0.0), LabelFont::Builtin { cell: 1 }));
        assert!(matches!(
            LabelFont::builtin(1.0e10),
            LabelFont::Builtin { cell: MAX_CELL }
        ));

        // Far too wide to center, so it starts at x = 0. Row 0 of '2' lights
        // columns 1 to 3, one 64px cell each.
        let mut image = RgbImage::new(160, 48);
        LabelFont::builtin(1.0e10).draw(&mut image, "2024-01-01 10:00:00");
        assert_eq!(image.get_pixel(0, LABEL_TOP), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(MAX_CELL, LABEL_TOP), &LABEL_COLOR);
        assert_eq!(image.get_pixel(159, 47), &LABEL_COLOR);
    }

    #[test]
    fn test_builtin_measure_saturates() {
        let font = LabelFont::Builtin { cell: u32::MAX };
        assert_eq!(font.measure("2024"), (u32::MAX, u32::MAX));

        let mut image = RgbImage::new(8, 8);
        font.draw(&mut image, "2024");
    }
}
