//! CLI output formatting.
//!
//! # Streams
//!
//! Everything meant for a script goes to stdout. For `generate` that is
//! the answer and nothing else, so `ANSWER=$(simple-captcha generate -o c.png)`
//! works. Human-oriented progress and summaries also go to stdout for
//! `batch` and `check`. Diagnostics go through `tracing` to stderr.
//!
//! # Output Format
//!
//! ## Batch
//!
//! ```text
//! Generating 3 text captchas (150x50)
//!     0002 → 0002.png
//!     0001 → 0001.png
//!     0003 → 0003.png
//! Wrote 3 captchas to out/
//!     Answers: out/answers.json
//! ```
//!
//! ## Check
//!
//! ```text
//! Canvas: 150x50
//! Font: bundled (DejaVu Sans Bold)
//! Challenge: 4 characters from 62 symbols
//! Distortion: 2 curves, noise factor 1
//! Glyphs: 72 dpi, scale 1
//! Colors: background transparent, auto-contrast
//! Output: png (quality 90, gif speed 10)
//! Workers: 8
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, MANIFEST_FILE_NAME};
use crate::config::Config;
use crate::types::BatchManifest;
use std::path::Path;

/// Zero-padded position, matching batch file names.
fn format_index(pos: usize) -> String {
    format!("{:04}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            count,
            width,
            height,
            mode,
        } => vec![format!(
            "Generating {} ({}x{})",
            plural(*count, &format!("{mode} captcha"), &format!("{mode} captchas")),
            width,
            height
        )],
        BatchEvent::Generated { index, file } => vec![format!(
            "{}{} \u{2192} {}",
            indent(1),
            format_index(*index),
            file
        )],
    }
}

/// Summary printed after a batch completes.
pub fn format_batch_summary(manifest: &BatchManifest, out_dir: &Path) -> Vec<String> {
    vec![
        format!(
            "Wrote {} to {}",
            plural(manifest.entries.len(), "captcha", "captchas"),
            out_dir.display()
        ),
        format!(
            "{}Answers: {}",
            indent(1),
            out_dir.join(MANIFEST_FILE_NAME).display()
        ),
    ]
}

pub fn print_batch_summary(manifest: &BatchManifest, out_dir: &Path) {
    for line in format_batch_summary(manifest, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Effective settings after merging config, CLI flags and defaults.
///
/// `font` is the external font in use, `None` for the bundled one.
/// `workers` is the resolved batch pool size.
pub fn format_check_output(config: &Config, font: Option<&Path>, workers: usize) -> Vec<String> {
    let opts = &config.captcha;
    let colors = if opts.palette.is_empty() {
        "auto-contrast".to_string()
    } else {
        let palette: Vec<String> = opts.palette.iter().map(|c| c.to_string()).collect();
        format!("palette {}", palette.join(", "))
    };

    vec![
        format!("Canvas: {}x{}", config.width, config.height),
        match font {
            Some(path) => format!("Font: {}", path.display()),
            None => "Font: bundled (DejaVu Sans Bold)".to_string(),
        },
        format!(
            "Challenge: {} from {}",
            plural(opts.text_length, "character", "characters"),
            plural(opts.character_set.chars().count(), "symbol", "symbols")
        ),
        format!(
            "Distortion: {}, noise factor {}",
            plural(opts.curve_count, "curve", "curves"),
            opts.noise_factor
        ),
        format!("Glyphs: {} dpi, scale {}", opts.font_dpi, opts.font_scale),
        format!("Colors: background {}, {}", opts.background_color, colors),
        format!(
            "Output: {} (quality {}, gif speed {})",
            config.output.format, config.output.quality, config.output.gif_speed
        ),
        format!("Workers: {}", workers),
    ]
}

pub fn print_check_output(config: &Config, font: Option<&Path>, workers: usize) {
    for line in format_check_output(config, font, workers) {
        println!("{}", line);
    }
}
