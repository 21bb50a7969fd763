//! Text rasterization.
//!
//! Two painters are provided: [`FontPainter`] draws a TrueType font with
//! anti-aliased glyph coverage, and [`BitmapPainter`] draws a scaled 5x7
//! block font that needs no font file at all.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use rusttype::{point, Font, Scale};

use birthcard_common::error::{BirthcardError, BirthcardResult};
use birthcard_composition_model::color::Rgb;

use crate::raster::blend_pixel;

/// Size of a laid-out line of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}

/// Something that can measure and draw a single line of text.
pub trait TextPainter: Send + Sync {
    fn measure(&self, text: &str, px: f32) -> TextMetrics;

    /// Draw with the top-left corner of the text box at `(x, y)`.
    fn draw(&self, canvas: &mut RgbaImage, text: &str, px: f32, x: f32, y: f32, color: Rgb);

    /// Draw centered on `(cx, cy)` on both axes.
    fn draw_centered(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        px: f32,
        cx: f32,
        cy: f32,
        color: Rgb,
    ) -> TextMetrics {
        let metrics = self.measure(text, px);
        let x = (cx - metrics.width / 2.0).round();
        let y = (cy - metrics.height / 2.0).round();
        self.draw(canvas, text, px, x, y, color);
        metrics
    }
}

/// TrueType painter with optional synthetic bold.
pub struct FontPainter {
    font: Font<'static>,
    bold: bool,
}

impl FontPainter {
    pub fn from_bytes(bytes: Vec<u8>) -> BirthcardResult<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| BirthcardError::asset_load("font data is not a valid TrueType font"))?;
        Ok(Self { font, bold: true })
    }

    pub fn from_file(path: &Path) -> BirthcardResult<Self> {
        if !path.exists() {
            return Err(BirthcardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes).map_err(|_| {
            BirthcardError::asset_load(format!("{} is not a valid TrueType font", path.display()))
        })
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Horizontal over-strike distance used to fake a bold weight.
    fn embolden_px(&self, px: f32) -> i64 {
        if self.bold {
            (px / 40.0).round().max(1.0) as i64
        } else {
            0
        }
    }
}

impl TextPainter for FontPainter {
    fn measure(&self, text: &str, px: f32) -> TextMetrics {
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        let height = (v_metrics.ascent - v_metrics.descent).max(1.0);
        if text.is_empty() {
            return TextMetrics { width: 0.0, height };
        }
        let width = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .fold(0.0f32, f32::max);
        TextMetrics {
            width: width + self.embolden_px(px) as f32,
            height,
        }
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, px: f32, x: f32, y: f32, color: Rgb) {
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        let src = color.to_rgba();
        let strikes = self.embolden_px(px);

        for glyph in self.font.layout(text, scale, point(x, y + v_metrics.ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                if coverage <= 0.0 {
                    return;
                }
                let py = bb.min.y as i64 + gy as i64;
                for dx in 0..=strikes {
                    let tx = bb.min.x as i64 + gx as i64 + dx;
                    blend_pixel(canvas, tx, py, src, coverage);
                }
            });
        }
    }
}

/// Scaled 5x7 block font used when no TrueType font is configured.
///
/// Lowercase letters are drawn with their uppercase glyphs; characters
/// without a glyph are drawn as `?`. Bold is on by default and widens
/// every stroke by the same over-strike distance as [`FontPainter`].
#[derive(Debug, Clone, Copy)]
pub struct BitmapPainter {
    bold: bool,
}

const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_COLUMNS + 1;

impl Default for BitmapPainter {
    fn default() -> Self {
        Self { bold: true }
    }
}

impl BitmapPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Side length of one glyph cell, in pixels, for a requested font size.
    fn cell(px: f32) -> u32 {
        (px / (GLYPH_ROWS + 1) as f32).round().max(1.0) as u32
    }

    fn embolden_px(&self, px: f32) -> u32 {
        if self.bold {
            (px / 40.0).round().max(1.0) as u32
        } else {
            0
        }
    }
}

impl TextPainter for BitmapPainter {
    fn measure(&self, text: &str, px: f32) -> TextMetrics {
        let cell = Self::cell(px) as f32;
        let chars = text.chars().count() as f32;
        let width = if chars == 0.0 {
            0.0
        } else {
            (chars * GLYPH_ADVANCE as f32 - 1.0) * cell + self.embolden_px(px) as f32
        };
        TextMetrics {
            width,
            height: GLYPH_ROWS as f32 * cell,
        }
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, px: f32, x: f32, y: f32, color: Rgb) {
        let cell = Self::cell(px);
        let stroke = cell + self.embolden_px(px);
        let fill = Rgba(color.to_rgba());
        let origin_x = x.round() as i32;
        let origin_y = y.round() as i32;

        for (index, ch) in text.chars().enumerate() {
            let rows = glyph5x7(ch);
            let glyph_x = origin_x + (index as u32 * GLYPH_ADVANCE * cell) as i32;
            for (ry, bits) in rows.iter().enumerate() {
                for rx in 0..GLYPH_COLUMNS {
                    if bits & (1 << (GLYPH_COLUMNS - 1 - rx)) == 0 {
                        continue;
                    }
                    let rect = Rect::at(
                        glyph_x + (rx * cell) as i32,
                        origin_y + (ry as u32 * cell) as i32,
                    )
                    .of_size(stroke, cell);
                    draw_filled_rect_mut(canvas, rect, fill);
                }
            }
        }
    }
}

/// Rows of a 5x7 glyph; the low 5 bits of each row are pixels, bit 4 leftmost.
fn glyph5x7(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        ' ' => [0; 7],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        _ => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_measure_scales_with_size() {
        let painter = BitmapPainter::default();
        let small = painter.measure("AB", 16.0);
        let large = painter.measure("AB", 80.0);
        // Bold adds one over-strike width at the end of the line.
        assert_eq!(small, TextMetrics { width: 23.0, height: 14.0 });
        assert_eq!(large, TextMetrics { width: 112.0, height: 70.0 });
        let regular = painter.with_bold(false).measure("AB", 80.0);
        assert_eq!(regular.width, 110.0);
        assert_eq!(painter.measure("", 80.0).width, 0.0);
    }

    #[test]
    fn test_bitmap_draw_centered_stays_in_box() {
        let mut canvas = RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]));
        let red = Rgb::new(255, 0, 0);
        let metrics = BitmapPainter::default().draw_centered(&mut canvas, "HI", 40.0, 100.0, 50.0, red);

        let left = (100.0 - metrics.width / 2.0).round() as u32;
        let top = (50.0 - metrics.height / 2.0).round() as u32;
        let mut inside = 0;
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel.0 == [255, 0, 0, 255] {
                inside += 1;
                assert!(x >= left && x < left + metrics.width as u32);
                assert!(y >= top && y < top + metrics.height as u32);
            }
        }
        assert!(inside > 0);
        // The top-left cell of 'H' is set.
        assert_eq!(canvas.get_pixel(left, top).0, [255, 0, 0, 255]);
    }

    /// Length of the run of `color` pixels starting at `(x, y)` going right.
    fn run_length(canvas: &RgbaImage, x: u32, y: u32, color: [u8; 4]) -> u32 {
        (x..canvas.width())
            .take_while(|&cx| canvas.get_pixel(cx, y).0 == color)
            .count() as u32
    }

    #[test]
    fn test_bitmap_bold_widens_strokes() {
        let black = Rgb::new(0, 0, 0);
        let ink = [0, 0, 0, 255];
        // At 80px a cell is 10px and bold over-strikes by 2px.
        // The vertical stroke of 'I' sits in column 2, rows 1..=5.
        let mut bold = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        BitmapPainter::default().draw(&mut bold, "I", 80.0, 0.0, 0.0, black);
        assert_eq!(run_length(&bold, 20, 35, ink), 12);

        let mut regular = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        BitmapPainter::new()
            .with_bold(false)
            .draw(&mut regular, "I", 80.0, 0.0, 0.0, black);
        assert_eq!(run_length(&regular, 20, 35, ink), 10);
    }

    /// A TrueType font from the host, if one is installed.
    fn system_font() -> Option<FontPainter> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/Library/Fonts/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .and_then(|path| FontPainter::from_file(path).ok())
    }

    #[test]
    fn test_font_painter_measure_and_center() {
        let Some(painter) = system_font() else {
            eprintln!("no TrueType font installed; skipping");
            return;
        };

        let short = painter.measure("Ar", 60.0);
        let long = painter.measure("Aryan", 60.0);
        assert!(short.width > 0.0 && short.height > 0.0);
        assert!(long.width > short.width);
        assert!(painter.measure("Aryan", 120.0).width > long.width);
        assert_eq!(painter.measure("", 60.0).width, 0.0);

        let mut canvas = RgbaImage::from_pixel(400, 200, Rgba([255, 255, 255, 255]));
        let metrics =
            painter.draw_centered(&mut canvas, "Aryan", 60.0, 200.0, 100.0, Rgb::new(0, 0, 255));

        let left = (200.0 - metrics.width / 2.0).round() - 3.0;
        let right = (200.0 + metrics.width / 2.0).round() + 3.0;
        let top = (100.0 - metrics.height / 2.0).round() - 3.0;
        let bottom = (100.0 + metrics.height / 2.0).round() + 3.0;
        let (mut inked, mut min_x, mut max_x) = (0, u32::MAX, 0);
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel.0 != [255, 255, 255, 255] {
                inked += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                assert!((x as f32) >= left && (x as f32) <= right, "x {x} outside box");
                assert!((y as f32) >= top && (y as f32) <= bottom, "y {y} outside box");
            }
        }
        assert!(inked > 0);
        // Ink is roughly balanced around the anchor.
        let ink_center = (min_x + max_x) as f32 / 2.0;
        assert!((ink_center - 200.0).abs() < metrics.width / 4.0);
    }

    #[test]
    fn test_lowercase_uses_uppercase_glyphs() {
        assert_eq!(glyph5x7('a'), glyph5x7('A'));
        assert_eq!(glyph5x7('~'), glyph5x7('?'));
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(matches!(
            FontPainter::from_bytes(b"not a font".to_vec()),
            Err(BirthcardError::AssetLoadFailed { .. })
        ));
    }
}
