//! Circular photo crop.
//!
//! The photo is cover-fitted to the clip circle's bounding square, scaled
//! by the zoom factor, shifted by the pan offset, and sampled only where
//! the destination pixel center lies inside the circle.

use image::RgbaImage;

use birthcard_composition_model::layer::PhotoLayout;

use crate::assets::DecodedImage;
use crate::raster::blend_pixel;

/// The region outside which the photo has no effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipCircle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl ClipCircle {
    /// Resolve a (clamped) layout against the canvas size.
    pub fn from_layout(layout: &PhotoLayout, canvas_width: u32, canvas_height: u32) -> Self {
        let layout = layout.clamped();
        let (cx, cy) = layout.position.to_pixels(canvas_width, canvas_height);
        let diameter = canvas_width.max(canvas_height) as f64 * layout.size_percent / 100.0;
        Self {
            cx,
            cy,
            radius: diameter / 2.0,
        }
    }

    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.cx;
        let dy = y - self.cy;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Smallest `(width, height)` with the given aspect ratio covering a
/// `diameter`-sided square.
pub fn cover_fit(aspect_ratio: f64, diameter: f64) -> (f64, f64) {
    let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };
    let mut width = diameter;
    let mut height = diameter / aspect;
    if height < diameter {
        height = diameter;
        width = diameter * aspect;
    }
    (width, height)
}

/// Where the photo lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoPlacement {
    pub clip: ClipCircle,
    /// Left edge of the drawn photo.
    pub left: f64,
    /// Top edge of the drawn photo.
    pub top: f64,
    /// Drawn size after cover-fit and zoom, before pan.
    pub width: f64,
    pub height: f64,
}

impl PhotoPlacement {
    pub fn compute(
        layout: &PhotoLayout,
        canvas_width: u32,
        canvas_height: u32,
        photo: &DecodedImage,
    ) -> Self {
        let layout = layout.clamped();
        let clip = ClipCircle::from_layout(&layout, canvas_width, canvas_height);
        let (fit_w, fit_h) = cover_fit(photo.aspect_ratio(), clip.diameter());

        let zoom = layout.zoom_percent / 100.0;
        let width = fit_w * zoom;
        let height = fit_h * zoom;

        let pan_x = width * layout.pan.x / 100.0;
        let pan_y = height * layout.pan.y / 100.0;

        Self {
            clip,
            left: clip.cx - width / 2.0 + pan_x,
            top: clip.cy - height / 2.0 + pan_y,
            width,
            height,
        }
    }
}

/// Draw `photo` into `canvas` through the placement's clip circle.
///
/// Returns the number of canvas pixels touched.
pub fn draw_clipped_photo(
    canvas: &mut RgbaImage,
    photo: &DecodedImage,
    placement: &PhotoPlacement,
) -> usize {
    let clip = placement.clip;
    if clip.radius <= 0.0 || placement.width <= 0.0 || placement.height <= 0.0 {
        return 0;
    }

    let max_x = canvas.width() as i64 - 1;
    let max_y = canvas.height() as i64 - 1;
    let x0 = ((clip.cx - clip.radius).floor() as i64).max(0);
    let x1 = ((clip.cx + clip.radius).ceil() as i64).min(max_x);
    let y0 = ((clip.cy - clip.radius).floor() as i64).max(0);
    let y1 = ((clip.cy + clip.radius).ceil() as i64).min(max_y);

    let pixels = photo.pixels();
    let src_w = pixels.width() as f64;
    let src_h = pixels.height() as f64;
    let mut touched = 0;

    for y in y0..=y1 {
        let sy = y as f64 + 0.5;
        for x in x0..=x1 {
            let sx = x as f64 + 0.5;
            if !clip.contains(sx, sy) {
                continue;
            }
            let u = (sx - placement.left) / placement.width * src_w;
            let v = (sy - placement.top) / placement.height * src_h;
            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                continue;
            }
            blend_pixel(canvas, x, y, sample_bilinear(pixels, u, v), 1.0);
            touched += 1;
        }
    }
    touched
}

/// Bilinear sample at continuous source coordinates (pixel centers at +0.5).
fn sample_bilinear(image: &RgbaImage, u: f64, v: f64) -> [u8; 4] {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0 = fx.floor() as i64;
    let y0 = fy.floor() as i64;
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let at = |x: i64, y: i64| image.get_pixel(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32).0;
    let p00 = at(x0, y0);
    let p10 = at(x0 + 1, y0);
    let p01 = at(x0, y0 + 1);
    let p11 = at(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use birthcard_composition_model::layer::{Pan, PercentPoint};
    use image::Rgba;
    use proptest::prelude::*;

    fn layout(size: f64, zoom: f64, pan: (f64, f64)) -> PhotoLayout {
        PhotoLayout {
            position: PercentPoint::CENTER,
            size_percent: size,
            zoom_percent: zoom,
            pan: Pan { x: pan.0, y: pan.1 },
        }
    }

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
        DecodedImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba(rgba))).unwrap()
    }

    #[test]
    fn test_clip_circle_uses_longer_canvas_side() {
        let clip = ClipCircle::from_layout(&layout(50.0, 100.0, (0.0, 0.0)), 400, 200);
        assert_eq!((clip.cx, clip.cy), (200.0, 100.0));
        assert_eq!(clip.radius, 100.0);
    }

    #[test]
    fn test_cover_fit_wide_and_tall() {
        assert_eq!(cover_fit(2.0, 100.0), (200.0, 100.0));
        assert_eq!(cover_fit(0.5, 100.0), (100.0, 200.0));
        assert_eq!(cover_fit(1.0, 100.0), (100.0, 100.0));
        assert_eq!(cover_fit(f64::NAN, 100.0), (100.0, 100.0));
    }

    #[test]
    fn test_zoom_below_range_is_clamped() {
        let photo = solid(10, 10, [0, 0, 0, 255]);
        let placement = PhotoPlacement::compute(&layout(50.0, 40.0, (0.0, 0.0)), 200, 200, &photo);
        assert_eq!(placement.width, 100.0);
        assert_eq!(placement.height, 100.0);
    }

    #[test]
    fn test_pan_shifts_drawn_rect() {
        let photo = solid(10, 10, [0, 0, 0, 255]);
        let placement =
            PhotoPlacement::compute(&layout(50.0, 200.0, (10.0, -20.0)), 200, 200, &photo);
        assert_eq!(placement.width, 200.0);
        assert_eq!(placement.left, 100.0 - 100.0 + 20.0);
        assert_eq!(placement.top, 100.0 - 100.0 - 40.0);
    }

    #[test]
    fn test_draw_only_inside_circle() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let photo = solid(30, 20, [0, 0, 255, 255]);
        let placement = PhotoPlacement::compute(&layout(40.0, 100.0, (0.0, 0.0)), 100, 100, &photo);

        let touched = draw_clipped_photo(&mut canvas, &photo, &placement);
        assert!(touched > 0);

        for (x, y, pixel) in canvas.enumerate_pixels() {
            let inside = placement.clip.contains(x as f64 + 0.5, y as f64 + 0.5);
            if inside {
                assert_eq!(pixel.0, [0, 0, 255, 255], "({x},{y}) should be covered");
            } else {
                assert_eq!(pixel.0, [255, 255, 255, 255], "({x},{y}) should be untouched");
            }
        }
    }

    #[test]
    fn test_pan_past_edge_exposes_background() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let photo = solid(10, 10, [0, 0, 255, 255]);
        let placement =
            PhotoPlacement::compute(&layout(40.0, 100.0, (100.0, 0.0)), 100, 100, &photo);

        let touched = draw_clipped_photo(&mut canvas, &photo, &placement);
        // Panned a full width to the right, the photo clears the circle.
        assert_eq!(touched, 0);
        assert_eq!(canvas.get_pixel(35, 50).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(65, 50).0, [255, 255, 255, 255]);
    }

    proptest! {
        #[test]
        fn prop_cover_fit_always_covers_circle(
            photo_w in 1u32..512,
            photo_h in 1u32..512,
            canvas_w in 1u32..3000,
            canvas_h in 1u32..3000,
            size in 0.0f64..150.0,
            zoom in 0.0f64..400.0,
        ) {
            let photo = DecodedImage::from_rgba(RgbaImage::new(photo_w, photo_h)).unwrap();
            let placement = PhotoPlacement::compute(
                &layout(size, zoom, (0.0, 0.0)),
                canvas_w,
                canvas_h,
                &photo,
            );
            let diameter = placement.clip.diameter();
            prop_assert!(placement.width + 1e-9 >= diameter);
            prop_assert!(placement.height + 1e-9 >= diameter);
        }
    }
}
