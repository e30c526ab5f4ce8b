//! Parallel batch generation.
//!
//! Writes `count` captchas into a directory and records every answer in
//! `answers.json`:
//!
//! ```text
//! out/
//! ├── answers.json      # BatchManifest: size, mode, format, entries
//! ├── 0001.png
//! ├── 0002.png
//! └── ...
//! ```
//!
//! ## Parallel Processing
//!
//! Captchas are generated in parallel using [rayon](https://docs.rs/rayon).
//! Each item gets the worker's thread-local generator and a fresh challenge
//! source. All workers read the same [`FontStore`].
//! Progress is reported through an optional channel so the caller decides
//! how (and on which thread) to print it.

use crate::captcha::{CaptchaError, Generator};
use crate::challenge::ChallengeMode;
use crate::config::Options;
use crate::font::FontStore;
use crate::imaging::EncodeOptions;
use crate::types::{BatchEntry, BatchManifest};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

/// Name of the manifest written next to the images.
pub const MANIFEST_FILE_NAME: &str = "answers.json";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Captcha generation failed: {0}")]
    Captcha(#[from] CaptchaError),
}

/// What to generate.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub count: usize,
    pub mode: ChallengeMode,
    pub width: u32,
    pub height: u32,
    pub options: Options,
    pub encode: EncodeOptions,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        count: usize,
        width: u32,
        height: u32,
        mode: ChallengeMode,
    },
    /// Sent from worker threads, so arrives in completion order.
    Generated { index: usize, file: String },
}

/// `0001.png` style file name for the 1-based `index`.
pub fn batch_file_name(index: usize, extension: &str) -> String {
    format!("{index:04}.{extension}")
}

/// Generate the batch into `out_dir`, write the manifest, and return it.
///
/// The first failing captcha aborts the batch. Files written before the
/// failure are left in place; no manifest is written.
pub fn run_batch(
    store: &FontStore,
    out_dir: &Path,
    request: &BatchRequest,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchManifest, BatchError> {
    request
        .options
        .validate(request.width, request.height)
        .map_err(CaptchaError::from)?;
    fs::create_dir_all(out_dir)?;

    info!(
        count = request.count,
        mode = %request.mode,
        dir = %out_dir.display(),
        "batch started"
    );
    if let Some(tx) = &progress {
        tx.send(BatchEvent::Started {
            count: request.count,
            width: request.width,
            height: request.height,
            mode: request.mode,
        })
        .ok();
    }

    let generator = Generator::new(store);
    let extension = request.encode.format.extension();

    let entries = (0..request.count)
        .into_par_iter()
        .map_with(progress, |tx, i| -> Result<BatchEntry, BatchError> {
            let index = i + 1;
            let mut source = request
                .mode
                .source(&request.options.character_set, request.options.text_length);
            let captcha = generator.generate(
                &mut rand::rng(),
                source.as_mut(),
                request.width,
                request.height,
                &request.options,
            )?;

            let file = batch_file_name(index, extension);
            let mut writer = BufWriter::new(File::create(out_dir.join(&file))?);
            captcha
                .encode(&mut writer, &request.encode)
                .map_err(CaptchaError::from)?;
            writer.flush()?;
            debug!(index, file = %file, "batch item written");

            if let Some(tx) = tx {
                tx.send(BatchEvent::Generated {
                    index,
                    file: file.clone(),
                })
                .ok();
            }
            Ok(BatchEntry {
                index,
                file,
                answer: captcha.answer().to_string(),
                challenge: captcha.challenge().to_string(),
            })
        })
        .collect::<Result<Vec<_>, BatchError>>()?;

    let manifest = BatchManifest {
        width: request.width,
        height: request.height,
        mode: request.mode,
        format: request.encode.format,
        entries,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(out_dir.join(MANIFEST_FILE_NAME), json)?;
    info!(count = manifest.entries.len(), "batch finished");
    Ok(manifest)
}
