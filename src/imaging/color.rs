//! Colors and the contrast policy.
//!
//! Every color the pipeline draws with comes from one of two places:
//!
//! - **Palette mode**: a non-empty [`Options::palette`](crate::config::Options::palette)
//!   is configured, and each pick is uniform over it. No contrast logic runs.
//! - **Contrast mode**: no palette. A random hue is chosen, and the HSV value is
//!   pushed 0.3–0.5 away from the background's [`lightness`] so the stroke
//!   stays readable on top of it.
//!
//! Pixel noise does *not* go through this policy; it uses [`random_opaque`].
//!
//! Colors appear in config files as strings: `"transparent"`, `"black"`,
//! `"white"`, `#rgb`, `#rrggbb` or `#rrggbbaa`.

use image::Rgba;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba<u8>);

impl Color {
    pub const TRANSPARENT: Color = Color(Rgba([0, 0, 0, 0]));
    pub const BLACK: Color = Color(Rgba([0, 0, 0, 255]));
    pub const WHITE: Color = Color(Rgba([255, 255, 255, 255]));

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgba([r, g, b, 255]))
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(Rgba([r, g, b, a]))
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        self.0
    }

    pub fn alpha(self) -> u8 {
        self.0.0[3]
    }
}

impl From<Rgba<u8>> for Color {
    fn from(value: Rgba<u8>) -> Self {
        Self(value)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(value: Color) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected transparent, black, white, #rgb, #rrggbb or #rrggbbaa")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "transparent" => return Ok(Self::TRANSPARENT),
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            _ => {}
        }

        let err = || ParseColorError(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| err())
        };
        let short = |i: usize| channel(i..i + 1).map(|v| v * 17);

        match hex.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0.0;
        if a == 0 {
            return write!(f, "transparent");
        }
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// A color in hue/saturation/value form, each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsva {
    pub h: f64,
    pub s: f64,
    pub v: f64,
    pub a: u8,
}

impl Hsva {
    /// Six-sector HSV → RGB conversion.
    pub fn to_color(self) -> Color {
        let h = self.h.clamp(0.0, 1.0);
        let s = self.s.clamp(0.0, 1.0);
        let v = self.v.clamp(0.0, 1.0);

        let i = (h * 6.0).floor();
        let f = h * 6.0 - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);

        let (r, g, b) = match (i as i64).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        let to_u8 = |c: f64| (c * 255.0) as u8;
        Color::rgba(to_u8(r), to_u8(g), to_u8(b), self.a)
    }
}

/// Perceived lightness in `[0, 1]` used for contrast decisions.
///
/// A fully transparent color counts as white-like (1.0): a transparent
/// captcha is usually shown on a light page.
pub fn lightness(color: Color) -> f64 {
    let [r, g, b, a] = color.0.0;
    if a == 0 {
        return 1.0;
    }
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    (f64::from(max) + f64::from(min)) / (2.0 * 255.0)
}

/// A random opaque color whose value sits well away from `background`.
pub fn contrasting_color<R: Rng + ?Sized>(rng: &mut R, background: Color) -> Color {
    let base = lightness(background);
    let value = if base >= 0.5 {
        base - 0.3 - rng.random_range(0.0..0.2)
    } else {
        base + 0.3 + rng.random_range(0.0..0.2)
    };

    Hsva {
        h: rng.random_range(0.0..1.0),
        s: rng.random_range(0.6..0.8),
        v: value,
        a: 255,
    }
    .to_color()
}

/// A uniformly random, fully opaque color. Used for noise pixels.
pub fn random_opaque<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::rgb(rng.random(), rng.random(), rng.random())
}

/// Picks foreground colors (curves, glyphs) for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct ColorPolicy<'a> {
    background: Color,
    palette: &'a [Color],
}

impl<'a> ColorPolicy<'a> {
    pub fn new(background: Color, palette: &'a [Color]) -> Self {
        Self {
            background,
            palette,
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Uniform palette pick when a palette is set, contrast color otherwise.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        match self.palette.choose(rng) {
            Some(color) => *color,
            None => contrasting_color(rng, self.background),
        }
    }
}
