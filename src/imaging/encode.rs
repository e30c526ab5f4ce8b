//! Final codec step: pixels → PNG / JPEG / GIF bytes.
//!
//! ## Crate mapping
//!
//! | Format | Encoder | Notes |
//! |---|---|---|
//! | PNG | `image::codecs::png::PngEncoder` | RGBA, transparency kept |
//! | JPEG | `image::codecs::jpeg::JpegEncoder` | flattened to RGB (alpha dropped), [`Quality`](super::Quality) |
//! | GIF | `image::codecs::gif::GifEncoder` | RGBA quantized to a palette, [`GifSpeed`](super::GifSpeed) |
//!
//! Codec errors are passed through unmodified as [`EncodeError::Image`].

use super::params::{EncodeFormat, EncodeOptions};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode `image` into `writer` according to `options`.
pub fn encode<W: Write>(
    image: &RgbaImage,
    writer: W,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    let (width, height) = image.dimensions();
    match options.format {
        EncodeFormat::Png => {
            PngEncoder::new(writer).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        EncodeFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(writer, options.quality.value()).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        EncodeFormat::Gif => {
            let mut encoder = GifEncoder::new_with_speed(writer, i32::from(options.gif_speed.value()));
            encoder.encode(image.as_raw(), width, height, ExtendedColorType::Rgba8)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{GifSpeed, Quality};
    use image::Rgba;

    fn sample_image() -> RgbaImage {
        RgbaImage::from_fn(24, 12, |x, y| Rgba([(x * 10) as u8, (y * 20) as u8, 128, 255]))
    }

    fn decode(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory(bytes).unwrap()
    }

    #[test]
    fn png_roundtrip_keeps_pixels() {
        let img = sample_image();
        let mut buf = Vec::new();
        encode(&img, &mut buf, &EncodeOptions::new(EncodeFormat::Png)).unwrap();
        assert!(buf.starts_with(b"\x89PNG"));
        assert_eq!(decode(&buf).to_rgba8(), img);
    }

    #[test]
    fn png_keeps_transparency() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let mut buf = Vec::new();
        encode(&img, &mut buf, &EncodeOptions::default()).unwrap();
        assert!(decode(&buf).to_rgba8().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn jpeg_roundtrip_keeps_dimensions() {
        let img = sample_image();
        let mut buf = Vec::new();
        let opts = EncodeOptions {
            format: EncodeFormat::Jpeg,
            quality: Quality::new(75),
            ..EncodeOptions::default()
        };
        encode(&img, &mut buf, &opts).unwrap();
        assert!(buf.starts_with(&[0xFF, 0xD8]));
        let decoded = decode(&buf);
        assert_eq!((decoded.width(), decoded.height()), (24, 12));
    }

    #[test]
    fn gif_roundtrip_keeps_dimensions() {
        let img = sample_image();
        let mut buf = Vec::new();
        let opts = EncodeOptions {
            format: EncodeFormat::Gif,
            gif_speed: GifSpeed::new(30),
            ..EncodeOptions::default()
        };
        encode(&img, &mut buf, &opts).unwrap();
        assert!(buf.starts_with(b"GIF8"));
        let decoded = decode(&buf);
        assert_eq!((decoded.width(), decoded.height()), (24, 12));
    }

    #[test]
    fn writer_failure_surfaces_as_encode_error() {
        struct FailingWriter;
        impl Write for FailingWriter {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let result = encode(&sample_image(), FailingWriter, &EncodeOptions::default());
        assert!(matches!(result, Err(EncodeError::Image(_))));
    }
}
