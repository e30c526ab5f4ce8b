//! Per-character text rasterization with jitter.
//!
//! The challenge text is never laid out as a string. Each character gets its
//! own slot of `width / len` pixels, a random size (height / U[0.8, 1.2) scaled
//! by `font_scale`), a random vertical drop and its own color from the
//! [`ColorPolicy`], then is rasterized alone at that position. Layout is
//! sampled up front ([`GlyphRenderer::layout`]) so it can be inspected without
//! touching pixels.
//!
//! Rasterization goes through [`ab_glyph`]: the outline is scaled for the
//! configured DPI and its coverage is alpha-composited onto the canvas.
//! `ab_glyph` does not hint outlines, so glyph stems are not grid-fitted.

use super::calculations::{
    glyph_baseline, glyph_size, glyph_spacing, line_height_scale, pixels_per_em, random_below,
};
use super::canvas::Canvas;
use super::color::{Color, ColorPolicy};
use ab_glyph::{Font, PxScale, point};
use rand::Rng;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlyphError {
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
    #[error("font does not report units per em; cannot scale glyphs")]
    Unscalable,
}

/// Where and how one character is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    /// Left edge of the glyph origin.
    pub x: i64,
    pub baseline: i64,
    /// Font size in points.
    pub size: f64,
    pub color: Color,
}

/// Draws challenge text with a shared font.
pub struct GlyphRenderer<'f, F: Font> {
    font: &'f F,
    dpi: f64,
    font_scale: f64,
}

impl<'f, F: Font> GlyphRenderer<'f, F> {
    pub fn new(font: &'f F, dpi: f64, font_scale: f64) -> Self {
        Self {
            font,
            dpi,
            font_scale,
        }
    }

    /// Sample a placement for every character of `text`.
    pub fn layout<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        text: &str,
        width: u32,
        height: u32,
        policy: &ColorPolicy<'_>,
    ) -> Vec<GlyphPlacement> {
        let spacing = glyph_spacing(width, text.chars().count());
        let offset = random_below(rng, spacing / 2);

        text.chars()
            .enumerate()
            .map(|(idx, ch)| {
                let jitter = rng.random_range(0.8..1.2);
                let size = glyph_size(height, jitter, self.font_scale);
                let color = policy.pick(rng);
                let drop = random_below(rng, height / 3);
                GlyphPlacement {
                    ch,
                    x: i64::from(spacing) * idx as i64 + i64::from(offset),
                    baseline: glyph_baseline(height, drop, size),
                    size,
                    color,
                }
            })
            .collect()
    }

    /// Rasterize a single placed glyph. Characters without an outline
    /// (whitespace) draw nothing.
    pub fn draw(&self, canvas: &mut Canvas, placement: &GlyphPlacement) -> Result<(), GlyphError> {
        let id = self.font.glyph_id(placement.ch);
        if id.0 == 0 && !placement.ch.is_whitespace() {
            return Err(GlyphError::MissingGlyph(placement.ch));
        }

        let units_per_em = self.font.units_per_em().ok_or(GlyphError::Unscalable)?;
        let px_per_em = pixels_per_em(placement.size, self.dpi);
        let scale = PxScale::from(line_height_scale(
            px_per_em,
            units_per_em,
            self.font.height_unscaled(),
        ));
        let glyph = id.with_scale_and_position(
            scale,
            point(placement.x as f32, placement.baseline as f32),
        );

        let Some(outlined) = self.font.outline_glyph(glyph) else {
            trace!(ch = ?placement.ch, "glyph has no outline");
            return Ok(());
        };
        let bounds = outlined.px_bounds();
        let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
        outlined.draw(|gx, gy, coverage| {
            canvas.blend(
                left + i64::from(gx),
                top + i64::from(gy),
                placement.color,
                coverage,
            );
        });
        Ok(())
    }

    /// Lay out and draw `text`. The first failing glyph aborts the whole call.
    pub fn render<R: Rng + ?Sized>(
        &self,
        canvas: &mut Canvas,
        rng: &mut R,
        text: &str,
        policy: &ColorPolicy<'_>,
    ) -> Result<usize, GlyphError> {
        let placements = self.layout(rng, text, canvas.width(), canvas.height(), policy);
        for placement in &placements {
            self.draw(canvas, placement)?;
        }
        Ok(placements.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bundled_font, count_pixels_not, seeded_rng};

    fn placement(ch: char) -> GlyphPlacement {
        GlyphPlacement {
            ch,
            x: 10,
            baseline: 40,
            size: 40.0,
            color: Color::BLACK,
        }
    }

    #[test]
    fn layout_positions_follow_slots() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let mut rng = seeded_rng(41);

        for _ in 0..50 {
            let placements = renderer.layout(&mut rng, "abcd", 160, 60, &policy);
            assert_eq!(placements.len(), 4);
            let offset = placements[0].x;
            assert!((0..20).contains(&offset), "offset {offset}");
            for (i, p) in placements.iter().enumerate() {
                assert_eq!(p.x, 40 * i as i64 + offset);
                // 60 / 1.2 < size <= 60 / 0.8
                assert!(p.size > 50.0 && p.size <= 75.0, "size {}", p.size);
                // 10 + [0, 20) + size / 2
                let min = 10 + (p.size / 2.0) as i64;
                assert!((min..min + 20).contains(&p.baseline), "{p:?}");
            }
        }
    }

    #[test]
    fn layout_keeps_characters_in_order() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let mut rng = seeded_rng(42);
        let chars: String = renderer
            .layout(&mut rng, "3+5", 90, 30, &policy)
            .iter()
            .map(|p| p.ch)
            .collect();
        assert_eq!(chars, "3+5");
    }

    #[test]
    fn layout_samples_color_per_glyph_from_palette() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let palette = [Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)];
        let policy = ColorPolicy::new(Color::WHITE, &palette);
        let mut rng = seeded_rng(43);
        let placements = renderer.layout(&mut rng, "abcdefghijklmnop", 320, 40, &policy);
        assert!(placements.iter().all(|p| palette.contains(&p.color)));
        assert!(placements.iter().any(|p| p.color == palette[0]));
        assert!(placements.iter().any(|p| p.color == palette[1]));
    }

    #[test]
    fn font_scale_shrinks_glyphs() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 0.5);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let mut rng = seeded_rng(44);
        for p in renderer.layout(&mut rng, "xyz", 150, 50, &policy) {
            assert!(p.size <= 50.0 / 0.8 * 0.5);
        }
    }

    #[test]
    fn empty_text_has_no_placements() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let mut rng = seeded_rng(45);
        assert!(renderer.layout(&mut rng, "", 150, 50, &policy).is_empty());
    }

    #[test]
    fn draw_marks_pixels() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let mut canvas = Canvas::new(80, 60, Color::WHITE);
        renderer.draw(&mut canvas, &placement('W')).unwrap();
        assert!(count_pixels_not(&canvas, Color::WHITE) > 50);
    }

    #[test]
    fn higher_dpi_draws_larger_glyph() {
        let font = bundled_font();
        let small = GlyphRenderer::new(&font, 72.0, 1.0);
        let large = GlyphRenderer::new(&font, 144.0, 1.0);
        let mut a = Canvas::new(200, 120, Color::WHITE);
        let mut b = Canvas::new(200, 120, Color::WHITE);
        let p = GlyphPlacement {
            baseline: 100,
            ..placement('H')
        };
        small.draw(&mut a, &p).unwrap();
        large.draw(&mut b, &p).unwrap();
        assert!(count_pixels_not(&b, Color::WHITE) > count_pixels_not(&a, Color::WHITE) * 2);
    }

    #[test]
    fn whitespace_draws_nothing() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let mut canvas = Canvas::new(80, 60, Color::WHITE);
        renderer.draw(&mut canvas, &placement(' ')).unwrap();
        assert_eq!(count_pixels_not(&canvas, Color::WHITE), 0);
    }

    #[test]
    fn missing_glyph_is_an_error() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let mut canvas = Canvas::new(80, 60, Color::WHITE);
        let err = renderer
            .draw(&mut canvas, &placement('\u{10FFFD}'))
            .unwrap_err();
        assert_eq!(err, GlyphError::MissingGlyph('\u{10FFFD}'));
    }

    #[test]
    fn render_aborts_on_first_missing_glyph() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let policy = ColorPolicy::new(Color::WHITE, &[]);
        let mut canvas = Canvas::new(120, 40, Color::WHITE);
        let mut rng = seeded_rng(46);
        let result = renderer.render(&mut canvas, &mut rng, "ab\u{10FFFD}c", &policy);
        assert!(matches!(result, Err(GlyphError::MissingGlyph('\u{10FFFD}'))));
    }

    #[test]
    fn glyphs_overhanging_the_edge_are_clipped() {
        let font = bundled_font();
        let renderer = GlyphRenderer::new(&font, 72.0, 1.0);
        let mut canvas = Canvas::new(20, 20, Color::WHITE);
        let p = GlyphPlacement {
            x: 10,
            baseline: 30,
            size: 60.0,
            ..placement('M')
        };
        renderer.draw(&mut canvas, &p).unwrap();
    }
}
