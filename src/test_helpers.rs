//! Shared test utilities for the simple-captcha test suite.
//!
//! Provides deterministic randomness, the bundled font in the shapes the
//! pipeline consumes (`FontArc`, `FontStore`), and pixel inspection helpers
//! that work on a [`Canvas`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let mut rng = seeded_rng(7);
//! let mut canvas = Canvas::new(60, 20, Color::WHITE);
//! draw_noise(&mut canvas, &mut rng, 1.0);
//! assert!(count_pixels_not(&canvas, Color::WHITE) > 0);
//! ```

use ab_glyph::FontArc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::font::{BUNDLED_FONT, FontStore};
use crate::imaging::{Canvas, Color};

// =========================================================================
// Randomness
// =========================================================================

/// A reproducible generator. Use a distinct seed per test.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// =========================================================================
// Fonts
// =========================================================================

pub fn bundled_font() -> FontArc {
    FontArc::try_from_slice(BUNDLED_FONT).unwrap()
}

/// A private store holding the bundled font. Tests that replace or clear the
/// font use one of these instead of the process-wide default store.
pub fn bundled_store() -> FontStore {
    FontStore::new(bundled_font())
}

// =========================================================================
// Pixel inspection
// =========================================================================

/// Number of pixels whose color differs from `color`.
pub fn count_pixels_not(canvas: &Canvas, color: Color) -> usize {
    canvas
        .as_image()
        .pixels()
        .filter(|p| **p != color.to_rgba())
        .count()
}

/// Number of pixels in a finished image exactly equal to `color`.
pub fn count_pixels_eq(image: &image::RgbaImage, color: Color) -> usize {
    image.pixels().filter(|p| **p == color.to_rgba()).count()
}
