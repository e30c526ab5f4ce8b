//! Random-pixel noise.

use super::calculations::{noise_count, random_below};
use super::canvas::Canvas;
use super::color::random_opaque;
use rand::Rng;

/// Scatter `floor(width · height · noise_factor / 28)` random opaque pixels.
///
/// Coordinates are drawn with replacement, so a pixel may be painted more than
/// once. Colors ignore the palette and the background on purpose: noise should
/// not be separable from glyphs by color alone.
///
/// `noise_factor` must be positive; [`Options::validate`](crate::config::Options::validate)
/// guarantees that before the pipeline runs.
pub fn draw_noise<R: Rng + ?Sized>(canvas: &mut Canvas, rng: &mut R, noise_factor: f64) -> usize {
    let (width, height) = (canvas.width(), canvas.height());
    let count = noise_count(width, height, noise_factor);
    for _ in 0..count {
        let x = random_below(rng, width);
        let y = random_below(rng, height);
        canvas.set(i64::from(x), i64::from(y), random_opaque(rng));
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Color;
    use crate::test_helpers::seeded_rng;

    #[test]
    fn draws_expected_number_of_points() {
        let mut canvas = Canvas::new(150, 50, Color::TRANSPARENT);
        let mut rng = seeded_rng(31);
        assert_eq!(draw_noise(&mut canvas, &mut rng, 1.0), 267);
    }

    #[test]
    fn noise_pixels_are_opaque() {
        let mut canvas = Canvas::new(60, 30, Color::TRANSPARENT);
        let mut rng = seeded_rng(32);
        draw_noise(&mut canvas, &mut rng, 4.0);

        let painted: Vec<_> = canvas
            .as_image()
            .pixels()
            .filter(|p| p.0[3] != 0)
            .collect();
        assert!(!painted.is_empty());
        assert!(painted.iter().all(|p| p.0[3] == 255));
        // Collisions mean never more painted pixels than draws
        assert!(painted.len() <= noise_count(60, 30, 4.0));
    }

    #[test]
    fn higher_factor_paints_more() {
        let mut rng = seeded_rng(33);
        let mut sparse = Canvas::new(100, 100, Color::TRANSPARENT);
        let mut dense = Canvas::new(100, 100, Color::TRANSPARENT);
        let few = draw_noise(&mut sparse, &mut rng, 0.5);
        let many = draw_noise(&mut dense, &mut rng, 5.0);
        assert!(many > few * 5);
    }
}
