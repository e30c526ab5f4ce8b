//! Types serialized to `answers.json` by the `batch` command.
//!
//! The manifest is the contract between a batch run and whatever consumes
//! it (a test harness, a fixture loader). Keep field names stable.

use crate::challenge::ChallengeMode;
use crate::imaging::EncodeFormat;
use serde::{Deserialize, Serialize};

/// One generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// 1-based position in the batch; also the file name stem.
    pub index: usize,
    /// File name relative to the batch directory, e.g. `0001.png`.
    pub file: String,
    pub answer: String,
    /// Text drawn into the image. Only differs from `answer` in math mode.
    pub challenge: String,
}

/// Everything a batch run produced, in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub width: u32,
    pub height: u32,
    pub mode: ChallengeMode,
    pub format: EncodeFormat,
    pub entries: Vec<BatchEntry>,
}
