//! Pixel work, pure Rust and statically linked.
//!
//! | Stage | Module | Crate / function |
//! |---|---|---|
//! | **Background fill** | [`canvas`] | `image::RgbaImage::from_pixel` |
//! | **Noise** | [`noise`] | `rand` uniform coordinates + colors |
//! | **Curves** | [`distortion`] | single-pixel sine trace |
//! | **Text** | [`glyph`] | `ab_glyph` outline + coverage rasterizer |
//! | **Encode** | [`encode`] | `image` PNG / JPEG / GIF encoders |
//!
//! The module is split into:
//! - **Calculations**: pure layout math (unit testable)
//! - **Color**: the contrast policy and HSV conversion
//! - **Stages**: canvas, noise, distortion and glyph, each taking `&mut impl Rng`
//! - **Parameters + Encode**: codec selection at the boundary

pub mod calculations;
pub mod canvas;
pub mod color;
pub mod distortion;
pub mod encode;
pub mod glyph;
pub mod noise;
mod params;

pub use canvas::Canvas;
pub use color::{Color, ColorPolicy, Hsva, contrasting_color, lightness};
pub use distortion::{SineCurve, draw_curves};
pub use encode::{EncodeError, encode};
pub use glyph::{GlyphError, GlyphPlacement, GlyphRenderer};
pub use noise::draw_noise;
pub use params::{EncodeFormat, EncodeOptions, GifSpeed, Quality};
