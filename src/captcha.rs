//! The compositor and the public generation entry points.
//!
//! Every captcha goes through the same fixed pipeline:
//!
//! ```text
//! validate options → snapshot font → next challenge
//!   → background fill → noise → curves → glyphs → Captcha
//! ```
//!
//! There is no branching and no retry. The first failing stage aborts the
//! call and nothing partial is returned. What differs between plain text,
//! arithmetic and custom challenges is only the [`ChallengeSource`].
//!
//! [`Generator`] is the explicit form: the caller provides the font store and
//! the random generator, which makes output reproducible under a seeded RNG.
//! The free functions [`new`], [`new_math`] and [`new_custom`] use the
//! process-wide [default store](crate::font::default_store) and the
//! thread-local generator from [`rand::rng`].

use crate::challenge::{ChallengeSource, CustomChallenge, MathExpr, RandomText};
use crate::config::{ConfigError, Options};
use crate::font::{FontError, FontStore, default_store};
use crate::imaging::{
    Canvas, ColorPolicy, EncodeError, EncodeFormat, EncodeOptions, GifSpeed, GlyphError,
    GlyphRenderer, Quality, draw_curves, draw_noise, encode,
};
use image::RgbaImage;
use rand::Rng;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CaptchaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no font loaded")]
    FontUnavailable,
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("glyph rendering failed: {0}")]
    Glyph(#[from] GlyphError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A finished challenge image and its answer.
#[derive(Debug, Clone)]
pub struct Captcha {
    answer: String,
    challenge: String,
    image: RgbaImage,
}

impl Captcha {
    /// Ground truth to compare user input against.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// The text drawn into the image. Differs from the answer for arithmetic
    /// and most custom challenges.
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn encode<W: Write>(&self, writer: W, options: &EncodeOptions) -> Result<(), EncodeError> {
        encode(&self.image, writer, options)
    }

    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), EncodeError> {
        self.encode(writer, &EncodeOptions::new(EncodeFormat::Png))
    }

    pub fn write_jpeg<W: Write>(&self, writer: W, quality: Quality) -> Result<(), EncodeError> {
        let options = EncodeOptions {
            quality,
            ..EncodeOptions::new(EncodeFormat::Jpeg)
        };
        self.encode(writer, &options)
    }

    pub fn write_gif<W: Write>(&self, writer: W, speed: GifSpeed) -> Result<(), EncodeError> {
        let options = EncodeOptions {
            gif_speed: speed,
            ..EncodeOptions::new(EncodeFormat::Gif)
        };
        self.encode(writer, &options)
    }
}

/// Runs the pipeline against one font store.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'s> {
    store: &'s FontStore,
}

impl<'s> Generator<'s> {
    pub fn new(store: &'s FontStore) -> Self {
        Self { store }
    }

    /// Generate one captcha.
    ///
    /// The font is snapshotted once up front, so replacing the store's font
    /// while this runs has no effect on the result.
    pub fn generate<R: Rng>(
        &self,
        rng: &mut R,
        source: &mut dyn ChallengeSource,
        width: u32,
        height: u32,
        options: &Options,
    ) -> Result<Captcha, CaptchaError> {
        options.validate(width, height)?;
        let font = self.store.current().ok_or(CaptchaError::FontUnavailable)?;
        let challenge = source.next_challenge(rng);

        let policy = ColorPolicy::new(options.background_color, &options.palette);
        let mut canvas = Canvas::new(width, height, options.background_color);
        let noise = draw_noise(&mut canvas, rng, options.noise_factor);
        draw_curves(&mut canvas, rng, options.curve_count, &policy);
        let glyphs = GlyphRenderer::new(&font, options.font_dpi, options.font_scale).render(
            &mut canvas,
            rng,
            &challenge.text,
            &policy,
        )?;

        debug!(
            width,
            height,
            glyphs,
            noise,
            curves = options.curve_count,
            "captcha generated"
        );
        Ok(Captcha {
            answer: challenge.answer,
            challenge: challenge.text,
            image: canvas.into_image(),
        })
    }
}

/// A random-text captcha of `options.text_length` characters from
/// `options.character_set`.
///
/// ```
/// let captcha = simple_captcha::new(150, 50, &simple_captcha::Options::default()).unwrap();
/// assert_eq!(captcha.answer().chars().count(), 4);
/// assert_eq!((captcha.width(), captcha.height()), (150, 50));
/// ```
pub fn new(width: u32, height: u32, options: &Options) -> Result<Captcha, CaptchaError> {
    let mut source = RandomText::new(&options.character_set, options.text_length);
    Generator::new(default_store()).generate(&mut rand::rng(), &mut source, width, height, options)
}

/// An arithmetic captcha: the image shows `a+b`, the answer is the sum.
pub fn new_math(width: u32, height: u32, options: &Options) -> Result<Captcha, CaptchaError> {
    Generator::new(default_store()).generate(&mut rand::rng(), &mut MathExpr, width, height, options)
}

/// A captcha whose `(answer, challenge)` pair comes from `generator`, used
/// verbatim.
pub fn new_custom<F>(
    width: u32,
    height: u32,
    generator: F,
    options: &Options,
) -> Result<Captcha, CaptchaError>
where
    F: FnMut() -> (String, String),
{
    let mut source = CustomChallenge::new(generator);
    Generator::new(default_store()).generate(&mut rand::rng(), &mut source, width, height, options)
}
