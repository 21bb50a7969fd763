//! Frame compositor: combines template, photo, and text into one raster.
//!
//! [`render`] is a pure function of its inputs. Every call allocates a
//! fresh canvas with the template's natural dimensions and draws, in order:
//! template, clipped photo, cast line, date line.

use std::sync::Arc;

use birthcard_common::config::FontConfig;
use birthcard_common::error::BirthcardResult;
use birthcard_composition_model::color::Rgb;
use birthcard_composition_model::gender::Gender;
use birthcard_composition_model::layer::{clamp_font_size, LayerKind, PercentPoint, TextLayer};
use birthcard_composition_model::state::CompositionState;

use crate::assets::DecodedImage;
use crate::photo::{draw_clipped_photo, PhotoPlacement};
use crate::raster::Raster;
use crate::text::{BitmapPainter, FontPainter, TextMetrics, TextPainter};

/// Painters for the two text layers.
#[derive(Clone)]
pub struct TextPainters {
    pub cast: Arc<dyn TextPainter>,
    pub date: Arc<dyn TextPainter>,
}

impl TextPainters {
    /// Use the same painter for both layers.
    pub fn uniform(painter: Arc<dyn TextPainter>) -> Self {
        Self {
            cast: painter.clone(),
            date: painter,
        }
    }

    /// Built-in block font for both layers.
    pub fn bitmap() -> Self {
        Self::uniform(Arc::new(BitmapPainter::default()))
    }

    /// Load configured TrueType fonts; layers without one use the block font.
    pub fn from_config(fonts: &FontConfig) -> BirthcardResult<Self> {
        let load = |path: &Option<std::path::PathBuf>| -> BirthcardResult<Arc<dyn TextPainter>> {
            let painter: Arc<dyn TextPainter> = match path {
                Some(path) => Arc::new(FontPainter::from_file(path)?),
                None => Arc::new(BitmapPainter::default()),
            };
            Ok(painter)
        };
        Ok(Self {
            cast: load(&fonts.cast)?,
            date: load(&fonts.date)?,
        })
    }

    fn for_layer(&self, layer: LayerKind) -> &dyn TextPainter {
        match layer {
            LayerKind::Date => self.date.as_ref(),
            _ => self.cast.as_ref(),
        }
    }
}

impl Default for TextPainters {
    fn default() -> Self {
        Self::bitmap()
    }
}

/// Everything a render reads.
pub struct RenderInputs<'a> {
    pub state: &'a CompositionState,
    pub template: &'a DecodedImage,
    pub photo: Option<&'a DecodedImage>,
    pub painters: &'a TextPainters,
}

/// One text line as it was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    pub layer: LayerKind,
    pub text: String,
    /// Anchor point (center of the text box) in canvas pixels.
    pub center: (f64, f64),
    pub font_size_px: u32,
    pub color: Rgb,
    pub metrics: TextMetrics,
}

/// What a render did, for previews, logging, and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    /// Template the frame was drawn on.
    pub gender: Gender,
    pub width: u32,
    pub height: u32,
    pub photo: Option<PhotoPlacement>,
    pub photo_pixels: usize,
    pub texts: Vec<DrawnText>,
}

impl RenderReport {
    pub fn text(&self, layer: LayerKind) -> Option<&DrawnText> {
        self.texts.iter().find(|t| t.layer == layer)
    }
}

/// Composite the state onto its template.
pub fn render(inputs: &RenderInputs<'_>) -> (Raster, RenderReport) {
    let state = inputs.state;

    // Draw the template at the origin: the canvas is the template's own pixels.
    let mut canvas = inputs.template.pixels().clone();
    let (width, height) = canvas.dimensions();

    let mut report = RenderReport {
        gender: state.gender,
        width,
        height,
        photo: None,
        photo_pixels: 0,
        texts: Vec::with_capacity(2),
    };

    if let Some(photo) = inputs.photo {
        let placement = PhotoPlacement::compute(&state.layout.photo, width, height, photo);
        report.photo_pixels = draw_clipped_photo(&mut canvas, photo, &placement);
        report.photo = Some(placement);
    }

    let lines = [
        (LayerKind::Cast, state.caption_line().map(str::to_string)),
        (LayerKind::Date, state.date_line()),
    ];
    for (layer, line) in lines {
        let Some(text) = line else {
            continue;
        };
        let Some(style) = state.layout.text(layer) else {
            continue;
        };
        let painter = inputs.painters.for_layer(layer);
        report
            .texts
            .push(draw_text_layer(&mut canvas, painter, layer, &text, style));
    }

    tracing::debug!(
        width,
        height,
        photo = report.photo.is_some(),
        texts = report.texts.len(),
        "Composited frame"
    );

    (Raster::new(canvas), report)
}

fn draw_text_layer(
    canvas: &mut image::RgbaImage,
    painter: &dyn TextPainter,
    layer: LayerKind,
    text: &str,
    style: &TextLayer,
) -> DrawnText {
    let position = PercentPoint::new(style.position.x, style.position.y);
    let center = position.to_pixels(canvas.width(), canvas.height());
    let font_size_px = clamp_font_size(style.font_size_px);

    let metrics = painter.draw_centered(
        canvas,
        text,
        font_size_px as f32,
        center.0 as f32,
        center.1 as f32,
        style.color,
    );

    DrawnText {
        layer,
        text: text.to_string(),
        center,
        font_size_px,
        color: style.color,
        metrics,
    }
}
