//! # Simple Captcha
//!
//! Randomized challenge images that are easy for people to read and awkward
//! for machines: random text or single-digit sums, drawn glyph by glyph with
//! jittered size and position, over pixel noise and sine-curve strokes.
//!
//! ```
//! use simple_captcha::{Options, new};
//!
//! let captcha = new(150, 50, &Options::default()).unwrap();
//! let mut png = Vec::new();
//! captcha.write_png(&mut png).unwrap();
//! // store captcha.answer() server-side, serve `png` to the client
//! # assert_eq!(captcha.answer().chars().count(), 4);
//! ```
//!
//! # Architecture: One Fixed Pipeline
//!
//! Every captcha is produced by the same sequence of stages, each drawing on
//! a canvas owned by the call:
//!
//! ```text
//! challenge → background → noise → curves → glyphs → Captcha → encode
//! ```
//!
//! - **Challenge**: a [`ChallengeSource`](challenge::ChallengeSource) yields
//!   the text to draw and the answer to check. Text, math and custom modes
//!   differ only here.
//! - **Stages**: pure functions of `(canvas, rng, options)`. They never share
//!   state, so concurrent generation needs no locking.
//! - **Encode**: PNG, JPEG or GIF through the `image` crate, at the boundary.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`captcha`] | The compositor, [`Generator`], the [`new`]/[`new_math`]/[`new_custom`] entry points |
//! | [`challenge`] | Challenge strategies: random text, arithmetic, caller-supplied |
//! | [`font`] | The replaceable font store and the bundled default font |
//! | [`imaging`] | Canvas, colors, noise, curves, glyph rasterization, encoding |
//! | [`config`] | [`Options`] and `captcha.toml` loading, merging and validation |
//! | [`batch`] | Parallel generation of many captchas plus an answers manifest |
//! | [`types`] | Types serialized into `answers.json` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Injected Randomness
//!
//! Every stage takes `&mut impl Rng`. The convenience entry points use
//! [`rand::rng`], a thread-local generator, so calls on different threads
//! never contend. [`Generator::generate`] accepts any generator, which makes
//! a seeded `StdRng` produce byte-identical captchas in tests. Nothing here
//! aims at cryptographic unpredictability.
//!
//! ## Publish-On-Success Fonts
//!
//! The font lives in a [`FontStore`]. Loading parses first and swaps second,
//! so a malformed font returns an error and the previous font stays active.
//! Each generation call takes one snapshot of the font when it starts.
//!
//! ## Bundled Font
//!
//! DejaVu Sans Bold is compiled into the library, so generation works with
//! no files on disk. [`load_font`] replaces it process-wide.
//!
//! ## No Hinting
//!
//! Glyphs are rasterized by `ab_glyph`, which renders outlines with coverage
//! anti-aliasing but does not hint. At captcha sizes the difference is not
//! visible, and it keeps the whole stack pure Rust.

pub mod batch;
pub mod captcha;
pub mod challenge;
pub mod config;
pub mod font;
pub mod imaging;
pub mod output;
pub mod types;

pub use captcha::{Captcha, CaptchaError, Generator, new, new_custom, new_math};
pub use config::Options;
pub use font::{FontError, FontStore, load_font, load_font_from_reader};
pub use imaging::{EncodeFormat, EncodeOptions, GifSpeed, Quality, encode};

#[cfg(test)]
pub(crate) mod test_helpers;
