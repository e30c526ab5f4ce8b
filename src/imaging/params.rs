//! Parameter types for encoding a finished captcha.
//!
//! These describe *what* output to produce, not *how*: [`encode`](super::encode)
//! maps them onto the `image` crate's codecs.
//!
//! ## Types
//!
//! - [`EncodeFormat`]: PNG, JPEG or GIF. Parsed from names or file extensions.
//! - [`Quality`]: JPEG quality (1–100, default 90). Clamped on construction.
//! - [`GifSpeed`]: GIF palette quantization speed (1–30, default 10). Clamped on construction.
//! - [`EncodeOptions`]: all of the above together.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Gif,
}

impl EncodeFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }

    /// Infer the format from a path's extension, if it names one we encode.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for EncodeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            other => Err(format!("unsupported image format: {other} (expected png, jpeg or gif)")),
        }
    }
}

impl fmt::Display for EncodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        })
    }
}

/// Quality setting for lossy (JPEG) encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// GIF quantization speed: 1 is slowest / best palette, 30 is fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifSpeed(pub u8);

impl GifSpeed {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 30))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for GifSpeed {
    fn default() -> Self {
        Self(10)
    }
}

/// Everything [`encode`](super::encode::encode) needs besides the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub format: EncodeFormat,
    /// Only used for JPEG.
    pub quality: Quality,
    /// Only used for GIF.
    pub gif_speed: GifSpeed,
}

impl EncodeOptions {
    pub fn new(format: EncodeFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}
