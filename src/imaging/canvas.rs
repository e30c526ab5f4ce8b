//! The pixel buffer owned by a single generation call.
//!
//! Every drawing stage plots through [`Canvas`], which clips out-of-range
//! coordinates instead of failing: sine curves and glyph outlines routinely
//! overshoot the image edges.

use super::color::Color;
use image::{Rgba, RgbaImage};

#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A `width` × `height` canvas filled with `background`. The fill is a
    /// straight copy, so transparent backgrounds stay transparent.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background.to_rgba()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    fn index(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < self.width() && y < self.height()).then_some((x, y))
    }

    /// Overwrite one pixel. Returns `false` when the point was clipped.
    pub fn set(&mut self, x: i64, y: i64, color: Color) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.image.put_pixel(x, y, color.to_rgba());
                true
            }
            None => false,
        }
    }

    /// Composite `color` over the existing pixel with the given coverage
    /// (`0.0` = untouched, `1.0` = full `color`).
    pub fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        let Some((x, y)) = self.index(x, y) else {
            return;
        };
        let coverage = coverage.clamp(0.0, 1.0);
        if coverage == 0.0 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x, y);
        *pixel = over(color.to_rgba(), coverage, *pixel);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width() && y < self.height()).then(|| Color(*self.image.get_pixel(x, y)))
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Straight-alpha source-over. An opaque destination stays exactly opaque.
fn over(src: Rgba<u8>, coverage: f32, dst: Rgba<u8>) -> Rgba<u8> {
    let unit = |v: u8| f32::from(v) / 255.0;
    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    let sa = unit(src.0[3]) * coverage;
    let da = unit(dst.0[3]);
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (unit(src.0[i]) * sa + unit(dst.0[i]) * da * (1.0 - sa)) / out_a;
        out[i] = to_u8(c);
    }
    out[3] = if dst.0[3] == 255 { 255 } else { to_u8(out_a) };
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_background() {
        let canvas = Canvas::new(3, 2, Color::rgb(9, 8, 7));
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 2);
        for px in canvas.as_image().pixels() {
            assert_eq!(*px, Rgba([9, 8, 7, 255]));
        }
    }

    #[test]
    fn transparent_background_is_preserved() {
        let canvas = Canvas::new(2, 2, Color::TRANSPARENT);
        assert!(canvas.as_image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn set_clips_out_of_range_points() {
        let mut canvas = Canvas::new(4, 4, Color::WHITE);
        assert!(canvas.set(0, 0, Color::BLACK));
        assert!(canvas.set(3, 3, Color::BLACK));
        assert!(!canvas.set(-1, 0, Color::BLACK));
        assert!(!canvas.set(0, 4, Color::BLACK));
        assert!(!canvas.set(4, 0, Color::BLACK));
        assert_eq!(canvas.get(0, 0), Some(Color::BLACK));
        assert_eq!(canvas.get(3, 3), Some(Color::BLACK));
        assert_eq!(canvas.get(4, 4), None);
    }

    #[test]
    fn full_coverage_blend_replaces_pixel() {
        let mut canvas = Canvas::new(1, 1, Color::WHITE);
        canvas.blend(0, 0, Color::rgb(10, 20, 30), 1.0);
        assert_eq!(canvas.get(0, 0), Some(Color::rgb(10, 20, 30)));
    }

    #[test]
    fn zero_coverage_blend_is_noop() {
        let mut canvas = Canvas::new(1, 1, Color::WHITE);
        canvas.blend(0, 0, Color::BLACK, 0.0);
        assert_eq!(canvas.get(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn partial_coverage_on_transparent_keeps_hue() {
        let mut canvas = Canvas::new(1, 1, Color::TRANSPARENT);
        canvas.blend(0, 0, Color::rgb(200, 0, 0), 0.5);
        let [r, g, b, a] = canvas.get(0, 0).unwrap().0.0;
        assert!((199..=200).contains(&r));
        assert_eq!((g, b), (0, 0));
        assert!((126..=129).contains(&a));
    }

    #[test]
    fn partial_coverage_on_opaque_stays_opaque() {
        let mut canvas = Canvas::new(1, 1, Color::WHITE);
        canvas.blend(0, 0, Color::BLACK, 0.5);
        let [r, g, b, a] = canvas.get(0, 0).unwrap().0.0;
        assert_eq!(a, 255);
        assert_eq!((r, g), (g, b));
        assert!((127..=128).contains(&r));
    }
}
