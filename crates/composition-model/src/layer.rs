//! Layer geometry and styling.
//!
//! All positions are percentages of the canvas: `(0, 0)` is the top-left
//! corner, `(100, 100)` the bottom-right. Text layers are anchored at their
//! center; the photo layer's position is the center of its clip circle.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use birthcard_common::error::{BirthcardError, BirthcardResult};

use crate::color::Rgb;

/// Accepted parameter ranges (inclusive).
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const POSITION: RangeInclusive<f64> = 0.0..=100.0;
    pub const FONT_SIZE_PX: RangeInclusive<u32> = 10..=200;
    pub const PHOTO_SIZE: RangeInclusive<f64> = 5.0..=100.0;
    pub const PHOTO_ZOOM: RangeInclusive<f64> = 100.0..=300.0;
    pub const PHOTO_PAN: RangeInclusive<f64> = -100.0..=100.0;
}

/// Clamp a float into an inclusive range. NaN collapses to the lower bound.
pub fn clamp_f64(value: f64, range: RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

pub fn clamp_font_size(px: u32) -> u32 {
    px.clamp(*ranges::FONT_SIZE_PX.start(), *ranges::FONT_SIZE_PX.end())
}

/// A point expressed as percentages of the canvas width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub const CENTER: PercentPoint = PercentPoint { x: 50.0, y: 50.0 };

    /// Create a point, clamping both axes to `[0, 100]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_f64(x, ranges::POSITION),
            y: clamp_f64(y, ranges::POSITION),
        }
    }

    /// Resolve to pixel coordinates on a canvas of the given size.
    pub fn to_pixels(&self, canvas_width: u32, canvas_height: u32) -> (f64, f64) {
        (
            canvas_width as f64 * self.x / 100.0,
            canvas_height as f64 * self.y / 100.0,
        )
    }
}

/// Offset of the photo within its clip circle, as percentages of the
/// drawn (zoomed) image size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

/// A styled, positioned line of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub position: PercentPoint,
    pub font_size_px: u32,
    pub color: Rgb,
}

/// Geometry of the circular photo crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoLayout {
    /// Center of the clip circle.
    pub position: PercentPoint,
    /// Circle diameter as a percentage of `max(canvas_width, canvas_height)`.
    pub size_percent: f64,
    /// Extra scale on top of cover-fit; 100 means exactly covering the circle.
    pub zoom_percent: f64,
    pub pan: Pan,
}

impl PhotoLayout {
    /// Copy with every field forced into its accepted range.
    pub fn clamped(&self) -> Self {
        Self {
            position: PercentPoint::new(self.position.x, self.position.y),
            size_percent: clamp_f64(self.size_percent, ranges::PHOTO_SIZE),
            zoom_percent: clamp_f64(self.zoom_percent, ranges::PHOTO_ZOOM),
            pan: Pan {
                x: clamp_f64(self.pan.x, ranges::PHOTO_PAN),
                y: clamp_f64(self.pan.y, ranges::PHOTO_PAN),
            },
        }
    }

    /// Reset everything but the size, which is configured per layout.
    pub fn reset_placement(&mut self) {
        self.position = PercentPoint::CENTER;
        self.zoom_percent = 100.0;
        self.pan = Pan::default();
    }
}

/// Configuration of all three overlay layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub cast: TextLayer,
    pub date: TextLayer,
    pub photo: PhotoLayout,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cast: TextLayer {
                position: PercentPoint { x: 50.0, y: 22.0 },
                font_size_px: 80,
                color: Rgb::new(0x1E, 0x40, 0xAF),
            },
            date: TextLayer {
                position: PercentPoint { x: 50.0, y: 63.0 },
                font_size_px: 60,
                color: Rgb::new(0x4B, 0x55, 0x63),
            },
            photo: PhotoLayout {
                position: PercentPoint { x: 50.0, y: 41.5 },
                size_percent: 29.0,
                zoom_percent: 100.0,
                pan: Pan::default(),
            },
        }
    }
}

/// The three editable layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Cast,
    Date,
    Photo,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Cast => "cast",
            LayerKind::Date => "date",
            LayerKind::Photo => "photo",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cast" | "name" | "caption" => Ok(LayerKind::Cast),
            "date" => Ok(LayerKind::Date),
            "photo" => Ok(LayerKind::Photo),
            other => Err(format!("unknown layer '{other}', expected cast, date or photo")),
        }
    }
}

/// A single field edit on one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerField {
    X(f64),
    Y(f64),
    FontSize(u32),
    Color(Rgb),
    Size(f64),
    Zoom(f64),
    PanX(f64),
    PanY(f64),
}

impl LayerField {
    pub fn name(&self) -> &'static str {
        match self {
            LayerField::X(_) => "x",
            LayerField::Y(_) => "y",
            LayerField::FontSize(_) => "size",
            LayerField::Color(_) => "color",
            LayerField::Size(_) => "size",
            LayerField::Zoom(_) => "zoom",
            LayerField::PanX(_) => "pan_x",
            LayerField::PanY(_) => "pan_y",
        }
    }

    /// Parse `field=value` for the given layer.
    ///
    /// `size` means font size on text layers and crop diameter on the photo.
    pub fn parse(layer: LayerKind, field: &str, value: &str) -> Result<Self, String> {
        let float = || {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("{layer}.{field}: '{value}' is not a number"))
        };
        match (layer, field.trim().to_ascii_lowercase().as_str()) {
            (_, "x") => Ok(LayerField::X(float()?)),
            (_, "y") => Ok(LayerField::Y(float()?)),
            (LayerKind::Cast | LayerKind::Date, "size" | "font_size") => {
                let px = value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("{layer}.{field}: '{value}' is not a pixel size"))?;
                Ok(LayerField::FontSize(px))
            }
            (LayerKind::Cast | LayerKind::Date, "color") => {
                Ok(LayerField::Color(Rgb::from_hex(value)?))
            }
            (LayerKind::Photo, "size") => Ok(LayerField::Size(float()?)),
            (LayerKind::Photo, "zoom") => Ok(LayerField::Zoom(float()?)),
            (LayerKind::Photo, "pan_x" | "panx") => Ok(LayerField::PanX(float()?)),
            (LayerKind::Photo, "pan_y" | "pany") => Ok(LayerField::PanY(float()?)),
            (layer, other) => Err(format!("layer '{layer}' has no field '{other}'")),
        }
    }
}

impl Layout {
    /// Apply one field edit, clamping the value into its accepted range.
    pub fn apply(&mut self, layer: LayerKind, field: LayerField) -> BirthcardResult<()> {
        match layer {
            LayerKind::Cast | LayerKind::Date => {
                let text = if layer == LayerKind::Cast {
                    &mut self.cast
                } else {
                    &mut self.date
                };
                match field {
                    LayerField::X(x) => text.position.x = clamp_f64(x, ranges::POSITION),
                    LayerField::Y(y) => text.position.y = clamp_f64(y, ranges::POSITION),
                    LayerField::FontSize(px) => text.font_size_px = clamp_font_size(px),
                    LayerField::Color(color) => text.color = color,
                    other => {
                        return Err(BirthcardError::invalid_field(format!(
                            "text layer '{layer}' has no '{}' field",
                            other.name()
                        )))
                    }
                }
            }
            LayerKind::Photo => {
                let photo = &mut self.photo;
                match field {
                    LayerField::X(x) => photo.position.x = clamp_f64(x, ranges::POSITION),
                    LayerField::Y(y) => photo.position.y = clamp_f64(y, ranges::POSITION),
                    LayerField::Size(s) => photo.size_percent = clamp_f64(s, ranges::PHOTO_SIZE),
                    LayerField::Zoom(z) => photo.zoom_percent = clamp_f64(z, ranges::PHOTO_ZOOM),
                    LayerField::PanX(p) => photo.pan.x = clamp_f64(p, ranges::PHOTO_PAN),
                    LayerField::PanY(p) => photo.pan.y = clamp_f64(p, ranges::PHOTO_PAN),
                    other => {
                        return Err(BirthcardError::invalid_field(format!(
                            "photo layer has no '{}' field",
                            other.name()
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    pub fn text(&self, layer: LayerKind) -> Option<&TextLayer> {
        match layer {
            LayerKind::Cast => Some(&self.cast),
            LayerKind::Date => Some(&self.date),
            LayerKind::Photo => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = Layout::default();
        assert_eq!(layout.cast.font_size_px, 80);
        assert_eq!(layout.cast.color.to_hex(), "#1E40AF");
        assert_eq!(layout.date.position, PercentPoint { x: 50.0, y: 63.0 });
        assert!((layout.photo.position.y - 41.5).abs() < 1e-9);
        assert!((layout.photo.size_percent - 29.0).abs() < 1e-9);
        assert!((layout.photo.zoom_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_clamps_to_ranges() {
        let mut layout = Layout::default();
        layout.apply(LayerKind::Cast, LayerField::X(140.0)).unwrap();
        layout.apply(LayerKind::Cast, LayerField::FontSize(4)).unwrap();
        layout.apply(LayerKind::Date, LayerField::FontSize(999)).unwrap();
        layout.apply(LayerKind::Photo, LayerField::Zoom(50.0)).unwrap();
        layout.apply(LayerKind::Photo, LayerField::PanY(-250.0)).unwrap();
        layout.apply(LayerKind::Photo, LayerField::Size(0.0)).unwrap();

        assert_eq!(layout.cast.position.x, 100.0);
        assert_eq!(layout.cast.font_size_px, 10);
        assert_eq!(layout.date.font_size_px, 200);
        assert_eq!(layout.photo.zoom_percent, 100.0);
        assert_eq!(layout.photo.pan.y, -100.0);
        assert_eq!(layout.photo.size_percent, 5.0);
    }

    #[test]
    fn test_apply_rejects_foreign_fields() {
        let mut layout = Layout::default();
        let before = layout;
        assert!(layout.apply(LayerKind::Cast, LayerField::Zoom(150.0)).is_err());
        assert!(layout
            .apply(LayerKind::Photo, LayerField::Color(Rgb::new(0, 0, 0)))
            .is_err());
        assert_eq!(layout, before);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            LayerField::parse(LayerKind::Photo, "size", "40").unwrap(),
            LayerField::Size(40.0)
        );
        assert_eq!(
            LayerField::parse(LayerKind::Date, "size", "48").unwrap(),
            LayerField::FontSize(48)
        );
        assert_eq!(
            LayerField::parse(LayerKind::Cast, "color", "#000000").unwrap(),
            LayerField::Color(Rgb::new(0, 0, 0))
        );
        assert!(LayerField::parse(LayerKind::Cast, "zoom", "150").is_err());
        assert!(LayerField::parse(LayerKind::Photo, "x", "abc").is_err());
    }

    #[test]
    fn test_nan_clamps_to_minimum() {
        assert_eq!(clamp_f64(f64::NAN, ranges::PHOTO_ZOOM), 100.0);
    }

    #[test]
    fn test_layout_json_roundtrip() {
        let json = serde_json::to_string_pretty(&Layout::default()).unwrap();
        assert!(json.contains("\"#4B5563\""));
        let parsed: Layout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Layout::default());
    }
}
