//! Generation options and the `captcha.toml` config file.
//!
//! Two layers live here:
//!
//! - [`Options`]: the per-call generation settings every entry point takes.
//!   Library callers build one from [`Options::default`] with struct-update
//!   syntax and never touch TOML.
//! - [`Config`]: what the CLI reads from disk. Canvas size, an optional font
//!   path, an `[captcha]` table holding [`Options`], encoder settings and the
//!   worker pool size.
//!
//! ## Config File Location
//!
//! `simple-captcha` reads `captcha.toml` from the working directory, or the
//! file named by `--config`:
//!
//! ```text
//! project/
//! ├── captcha.toml     # picked up automatically
//! └── out/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! width = 150
//! height = 50
//! # font = "fonts/MyFont.ttf"   # defaults to the bundled DejaVu Sans Bold
//!
//! [captcha]
//! background_color = "transparent"
//! character_set = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"
//! text_length = 4
//! curve_count = 2
//! font_dpi = 72.0
//! font_scale = 1.0
//! noise_factor = 1.0
//! palette = []                 # empty = contrast-aware random colors
//!
//! [output]
//! format = "png"               # png, jpeg (jpg) or gif
//! quality = 90                 # JPEG quality (1-100)
//! gif_speed = 10               # GIF quantization speed (1-30)
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [captcha]
//! background_color = "#ffffff"
//! palette = ["#1d3557", "#e63946"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::challenge::ALPHANUMERIC;
use crate::imaging::{Color, EncodeFormat, EncodeOptions, GifSpeed, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "captcha.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

// =============================================================================
// Generation options
// =============================================================================

/// Settings for one generation call.
///
/// Immutable for the duration of the call. Override fields with struct-update
/// syntax:
///
/// ```
/// use simple_captcha::Options;
///
/// let opts = Options {
///     text_length: 6,
///     noise_factor: 2.0,
///     ..Options::default()
/// };
/// assert!(opts.validate(200, 60).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Fill color. Transparent by default; contrast logic treats that as light.
    pub background_color: Color,
    /// Symbols random challenges are drawn from, with replacement.
    pub character_set: String,
    /// Number of characters in a random challenge.
    pub text_length: usize,
    /// Number of sine-curve strokes.
    pub curve_count: usize,
    pub font_dpi: f64,
    /// Multiplier on the jittered glyph size.
    pub font_scale: f64,
    /// Noise density. `1.0` paints one random pixel per 28 pixels of area.
    pub noise_factor: f64,
    /// Foreground colors. Empty means contrast-aware random colors.
    pub palette: Vec<Color>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            background_color: Color::TRANSPARENT,
            character_set: ALPHANUMERIC.to_string(),
            text_length: 4,
            curve_count: 2,
            font_dpi: 72.0,
            font_scale: 1.0,
            noise_factor: 1.0,
            palette: Vec::new(),
        }
    }
}

impl Options {
    /// Check these options for a `width` × `height` canvas.
    ///
    /// `text_length` and `character_set` are checked even in arithmetic and
    /// custom mode, where they go unused.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::Validation(format!(
                "width and height must be positive (got {width}x{height})"
            )));
        }
        if self.text_length == 0 {
            return Err(ConfigError::Validation(
                "text_length must be at least 1".into(),
            ));
        }
        if self.character_set.is_empty() {
            return Err(ConfigError::Validation(
                "character_set must not be empty".into(),
            ));
        }
        if !(self.noise_factor.is_finite() && self.noise_factor > 0.0) {
            return Err(ConfigError::Validation(format!(
                "noise_factor must be a positive number (got {})",
                self.noise_factor
            )));
        }
        if !(self.font_dpi.is_finite() && self.font_dpi > 0.0) {
            return Err(ConfigError::Validation(format!(
                "font_dpi must be a positive number (got {})",
                self.font_dpi
            )));
        }
        if !(self.font_scale.is_finite() && self.font_scale > 0.0) {
            return Err(ConfigError::Validation(format!(
                "font_scale must be a positive number (got {})",
                self.font_scale
            )));
        }
        Ok(())
    }
}

// =============================================================================
// CLI config file
// =============================================================================

/// Everything `captcha.toml` can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    /// TrueType/OpenType font to load instead of the bundled one.
    pub font: Option<PathBuf>,
    pub captcha: Options,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 150,
            height: 50,
            font: None,
            captcha: Options::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.captcha.validate(self.width, self.height)?;
        self.output.validate()
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Used when the output path has no recognizable extension.
    pub format: EncodeFormat,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u8,
    /// GIF quantization speed (1 = best palette, 30 = fastest).
    pub gif_speed: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: EncodeFormat::default(),
            quality: Quality::default().value(),
            gif_speed: GifSpeed::default().value(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if !(1..=30).contains(&self.gif_speed) {
            return Err(ConfigError::Validation(
                "output.gif_speed must be 1-30".into(),
            ));
        }
        Ok(())
    }

    /// Encoder options for `format`, carrying this config's quality settings.
    pub fn encode_options(&self, format: EncodeFormat) -> EncodeOptions {
        EncodeOptions {
            format,
            quality: Quality::new(self.quality),
            gif_speed: GifSpeed::new(self.gif_speed),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel generation workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Err` if the file is missing or contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// `captcha.toml` in `dir`, if it exists.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Load config from `path`, or the stock defaults when `path` is `None`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A relative `font` path is resolved against
/// the config file's directory.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let Some(path) = path else {
        return resolve_config(base, None);
    };
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, Some(overlay))?;
    if let (Some(font), Some(dir)) = (config.font.as_mut(), path.parent()) {
        if font.is_relative() {
            *font = dir.join(&*font);
        }
    }
    Ok(config)
}

/// Returns a fully-commented stock `captcha.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-captcha Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# simple-captcha reads ./captcha.toml, or the file given with --config.
# Unknown keys will cause an error.

# Canvas size in pixels.
width = 150
height = 50

# TrueType/OpenType font used for the challenge text. Relative paths are
# resolved against this file's directory. Omit to use the bundled
# DejaVu Sans Bold.
# font = "fonts/MyFont.ttf"

# ---------------------------------------------------------------------------
# Generation
# ---------------------------------------------------------------------------
[captcha]
# Background fill: "transparent", "black", "white", "#rgb", "#rrggbb" or
# "#rrggbbaa". Transparent counts as light when picking contrast colors.
background_color = "transparent"

# Symbols random challenges are drawn from.
character_set = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"

# Characters per random challenge.
text_length = 4

# Sine-curve strokes drawn across the image.
curve_count = 2

# Resolution the glyph point size is rendered at.
font_dpi = 72.0

# Multiplier on the (randomly jittered) glyph size.
font_scale = 1.0

# Noise density: 1.0 paints one random pixel per 28 pixels of area.
noise_factor = 1.0

# Foreground colors for curves and glyphs. Leave empty for contrast-aware
# random colors, e.g. palette = ["#1d3557", "#e63946"].
palette = []

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# Format used when the output file name has no known extension:
# "png", "jpeg" (or "jpg") or "gif".
format = "png"

# JPEG quality (1 = worst, 100 = best).
quality = 90

# GIF palette quantization speed (1 = best palette, 30 = fastest).
gif_speed = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel generation workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
