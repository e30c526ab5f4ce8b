//! Pure layout math for the drawing stages.
//!
//! Everything here is deterministic and testable without a canvas or a font.
//! The one exception is [`random_below`], the integer sampler every stage
//! shares so that degenerate ranges (tiny images) behave the same everywhere.

use rand::Rng;

/// Below this width, curves span the full image minus a 1px border instead of
/// getting random margins.
pub const NARROW_CURVE_WIDTH: u32 = 40;

/// One noise point per this many pixels at `noise_factor = 1.0`.
pub const PIXELS_PER_NOISE_POINT: f64 = 28.0;

/// Uniform draw from `[0, upper)`, or `0` when the range is empty.
pub fn random_below<R: Rng + ?Sized>(rng: &mut R, upper: u32) -> u32 {
    if upper == 0 { 0 } else { rng.random_range(0..upper) }
}

/// Number of noise points to scatter over a `width` × `height` image.
///
/// # Examples
/// ```
/// # use simple_captcha::imaging::calculations::noise_count;
/// // 150 × 50 = 7500 pixels, one point every 28 → 267
/// assert_eq!(noise_count(150, 50, 1.0), 267);
/// // Doubling the factor halves the spacing
/// assert_eq!(noise_count(150, 50, 2.0), 535);
/// ```
pub fn noise_count(width: u32, height: u32, noise_factor: f64) -> usize {
    let area = f64::from(width) * f64::from(height);
    (area / (PIXELS_PER_NOISE_POINT / noise_factor)).floor() as usize
}

/// Horizontal slot each glyph gets: the image width split evenly.
///
/// Returns `0` for an empty challenge so callers never divide by zero.
pub fn glyph_spacing(width: u32, glyph_count: usize) -> u32 {
    match u32::try_from(glyph_count) {
        Ok(0) => 0,
        Ok(n) => width / n,
        Err(_) => 0,
    }
}

/// Font size in points for one glyph.
///
/// # Arguments
/// * `height` - Image height in pixels
/// * `jitter` - Per-glyph random scale in `[0.8, 1.2)`
/// * `font_scale` - Configured global scale
pub fn glyph_size(height: u32, jitter: f64, font_scale: f64) -> f64 {
    f64::from(height) / jitter * font_scale
}

/// Baseline y for a glyph: the upper sixth, plus a random drop, plus half the
/// glyph size so the body sits inside the image.
pub fn glyph_baseline(height: u32, drop: u32, size: f64) -> i64 {
    i64::from(height / 6) + i64::from(drop) + (size / 2.0) as i64
}

/// Pixels per em for a point size at a given DPI (72 pt per inch).
pub fn pixels_per_em(size_pt: f64, dpi: f64) -> f32 {
    (size_pt * dpi / 72.0) as f32
}

/// Convert pixels-per-em into a line-height scale (ascent − descent), which
/// is the unit glyph rasterizers take.
///
/// # Examples
/// ```
/// # use simple_captcha::imaging::calculations::line_height_scale;
/// // 2048 units/em font whose ascent−descent is 2384 units
/// let scale = line_height_scale(50.0, 2048.0, 2384.0);
/// assert!((scale - 58.203).abs() < 0.01);
/// ```
pub fn line_height_scale(px_per_em: f32, units_per_em: f32, height_unscaled: f32) -> f32 {
    px_per_em * height_unscaled / units_per_em
}

/// The inclusive x-range a curve may occupy, given the random margins.
///
/// Narrow images ignore `margins` and keep a fixed 1px border.
pub fn curve_span(width: u32, margins: (u32, u32)) -> (i64, i64) {
    let width = i64::from(width);
    if width <= i64::from(NARROW_CURVE_WIDTH) {
        (1, width - 1)
    } else {
        let (left, right) = margins;
        (i64::from(left) + 1, width - i64::from(right) - 1)
    }
}

/// Upper bound (exclusive) for each random curve margin.
pub fn curve_margin_limit(width: u32) -> u32 {
    if width <= NARROW_CURVE_WIDTH {
        0
    } else {
        width / 10
    }
}
