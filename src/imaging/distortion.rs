//! Sine-curve strokes drawn across the captcha.
//!
//! Each curve is a single-pixel trace of
//! `y = anchor + amplitude · sin(π · frequency · x / width) · flip`
//! over a randomly trimmed x-range, in one color from the [`ColorPolicy`].
//! No thickness, no anti-aliasing.

use super::calculations::{curve_margin_limit, curve_span, random_below};
use super::canvas::Canvas;
use super::color::{Color, ColorPolicy};
use rand::Rng;
use std::f64::consts::PI;

/// Randomized parameters for one stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineCurve {
    /// First and last x (inclusive).
    pub x_start: i64,
    pub x_end: i64,
    pub amplitude: f64,
    pub anchor: i64,
    /// In `[1, 2)`: how many half-periods fit across the image.
    pub frequency: f64,
    /// `1.0` or `-1.0`.
    pub flip: f64,
    pub color: Color,
}

impl SineCurve {
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        width: u32,
        height: u32,
        policy: &ColorPolicy<'_>,
    ) -> Self {
        let margin_limit = curve_margin_limit(width);
        let margins = (
            random_below(rng, margin_limit),
            random_below(rng, margin_limit),
        );
        let (x_start, x_end) = curve_span(width, margins);

        let sixth = height / 6;
        let amplitude = f64::from(random_below(rng, sixth) + sixth);
        let anchor = i64::from(random_below(rng, height * 2 / 3) + sixth);
        let frequency = 1.0 + rng.random::<f64>();
        let flip = if rng.random_bool(0.5) { -1.0 } else { 1.0 };

        Self {
            x_start,
            x_end,
            amplitude,
            anchor,
            frequency,
            flip,
            color: policy.pick(rng),
        }
    }

    /// The y plotted at column `x`. Truncates toward zero.
    pub fn y_at(&self, x: i64, width: u32) -> i64 {
        let phase = PI * self.frequency * x as f64 / f64::from(width);
        self.anchor + (phase.sin() * self.amplitude * self.flip) as i64
    }

    /// Plot the curve. Points that fall off the canvas are clipped.
    pub fn draw(&self, canvas: &mut Canvas) {
        let width = canvas.width();
        for x in self.x_start..=self.x_end {
            canvas.set(x, self.y_at(x, width), self.color);
        }
    }
}

/// Draw `count` independently sampled curves.
pub fn draw_curves<R: Rng + ?Sized>(
    canvas: &mut Canvas,
    rng: &mut R,
    count: usize,
    policy: &ColorPolicy<'_>,
) {
    let (width, height) = (canvas.width(), canvas.height());
    for _ in 0..count {
        SineCurve::sample(rng, width, height, policy).draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{count_pixels_not, seeded_rng};

    #[test]
    fn sampled_parameters_respect_bounds() {
        let mut rng = seeded_rng(21);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        for _ in 0..500 {
            let c = SineCurve::sample(&mut rng, 150, 60, &policy);
            assert!((10.0..20.0).contains(&c.amplitude), "{c:?}");
            assert!((10..50).contains(&c.anchor), "{c:?}");
            assert!((1.0..2.0).contains(&c.frequency), "{c:?}");
            assert!(c.flip == 1.0 || c.flip == -1.0);
            assert!((1..=15).contains(&c.x_start), "{c:?}");
            assert!((135..=149).contains(&c.x_end), "{c:?}");
        }
    }

    #[test]
    fn narrow_image_spans_full_width() {
        let mut rng = seeded_rng(22);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let c = SineCurve::sample(&mut rng, 30, 30, &policy);
        assert_eq!((c.x_start, c.x_end), (1, 29));
    }

    #[test]
    fn y_at_follows_sine() {
        let c = SineCurve {
            x_start: 0,
            x_end: 99,
            amplitude: 10.0,
            anchor: 20,
            frequency: 1.0,
            flip: 1.0,
            color: Color::BLACK,
        };
        assert_eq!(c.y_at(0, 100), 20);
        // sin(π/2) = 1
        assert_eq!(c.y_at(50, 100), 30);

        let flipped = SineCurve { flip: -1.0, ..c };
        assert_eq!(flipped.y_at(50, 100), 10);
    }

    #[test]
    fn draw_plots_one_pixel_per_column() {
        let c = SineCurve {
            x_start: 1,
            x_end: 98,
            amplitude: 5.0,
            anchor: 10,
            frequency: 1.5,
            flip: 1.0,
            color: Color::BLACK,
        };
        let mut canvas = Canvas::new(100, 20, Color::WHITE);
        c.draw(&mut canvas);
        assert_eq!(count_pixels_not(&canvas, Color::WHITE), 98);
        for x in 1..=98u32 {
            let y = c.y_at(i64::from(x), 100) as u32;
            assert_eq!(canvas.get(x, y), Some(Color::BLACK));
        }
    }

    #[test]
    fn curve_uses_palette_color() {
        let palette = [Color::rgb(0, 128, 0)];
        let policy = ColorPolicy::new(Color::WHITE, &palette);
        let mut rng = seeded_rng(23);
        let mut canvas = Canvas::new(120, 40, Color::WHITE);
        draw_curves(&mut canvas, &mut rng, 3, &policy);
        assert!(
            canvas
                .as_image()
                .pixels()
                .all(|p| Color(*p) == Color::WHITE || Color(*p) == palette[0])
        );
        assert!(count_pixels_not(&canvas, Color::WHITE) > 0);
    }

    #[test]
    fn zero_curves_leaves_canvas_untouched() {
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let mut rng = seeded_rng(24);
        let mut canvas = Canvas::new(50, 20, Color::WHITE);
        draw_curves(&mut canvas, &mut rng, 0, &policy);
        assert_eq!(count_pixels_not(&canvas, Color::WHITE), 0);
    }

    #[test]
    fn tiny_canvas_does_not_panic() {
        let policy = ColorPolicy::new(Color::BLACK, &[]);
        let mut rng = seeded_rng(25);
        let mut canvas = Canvas::new(1, 1, Color::BLACK);
        draw_curves(&mut canvas, &mut rng, 5, &policy);
    }
}
