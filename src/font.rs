//! The shared font resource.
//!
//! A [`FontStore`] holds at most one parsed font. Generation calls take a
//! snapshot with [`FontStore::current`] when they start (a cheap `Arc` clone)
//! and render the whole challenge with it, so a concurrent [`FontStore::load`]
//! never changes the font under an in-flight call.
//!
//! ## Replacement policy
//!
//! Loading is publish-on-success: the new bytes are parsed *before* the lock
//! is taken, and the stored font is only swapped when parsing succeeded. A
//! malformed font returns [`FontError::Parse`] and leaves the previous font
//! active.
//!
//! ## Default store
//!
//! The crate-level entry points ([`crate::new`] and friends, [`load_font`],
//! [`load_font_from_reader`]) share one process-wide store, initialised on
//! first use from the bundled DejaVu Sans Bold.

use ab_glyph::{FontArc, InvalidFont};
use std::io::Read;
use std::sync::{LazyLock, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// DejaVu Sans Bold, embedded at compile time.
pub const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

#[derive(Error, Debug)]
pub enum FontError {
    #[error("invalid font data: {0}")]
    Parse(#[from] InvalidFont),
    #[error("failed to read font: {0}")]
    Io(#[from] std::io::Error),
}

/// A replaceable, shareable font slot.
#[derive(Debug, Default)]
pub struct FontStore {
    current: RwLock<Option<FontArc>>,
}

impl FontStore {
    /// A store with no font. Generation against it fails with
    /// [`CaptchaError::FontUnavailable`](crate::CaptchaError::FontUnavailable).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(font: FontArc) -> Self {
        Self {
            current: RwLock::new(Some(font)),
        }
    }

    /// A store holding the bundled font, or an empty one if it fails to parse.
    pub fn bundled() -> Self {
        match FontArc::try_from_slice(BUNDLED_FONT) {
            Ok(font) => Self::new(font),
            Err(err) => {
                warn!(%err, "bundled font failed to parse; starting without a font");
                Self::empty()
            }
        }
    }

    /// Snapshot of the active font.
    pub fn current(&self) -> Option<FontArc> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Parse `bytes` and make it the active font.
    ///
    /// On error the previously active font stays in place.
    pub fn load(&self, bytes: impl Into<Vec<u8>>) -> Result<(), FontError> {
        let bytes = bytes.into();
        let len = bytes.len();
        let font = FontArc::try_from_vec(bytes).inspect_err(|_| {
            warn!(len, "rejected font data; keeping previous font");
        })?;
        self.replace(font);
        info!(len, "font loaded");
        Ok(())
    }

    /// Read a font from `reader` to the end, then [`load`](Self::load) it.
    pub fn load_from_reader<R: Read>(&self, mut reader: R) -> Result<(), FontError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.load(bytes)
    }

    /// Swap in an already parsed font.
    pub fn replace(&self, font: FontArc) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(font);
    }

    /// Drop the active font.
    pub fn clear(&self) {
        debug!("font cleared");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

static DEFAULT_STORE: LazyLock<FontStore> = LazyLock::new(FontStore::bundled);

/// The process-wide store used by the crate-level entry points.
pub fn default_store() -> &'static FontStore {
    &DEFAULT_STORE
}

/// Replace the process-wide font. See [`FontStore::load`].
pub fn load_font(bytes: impl Into<Vec<u8>>) -> Result<(), FontError> {
    default_store().load(bytes)
}

/// Replace the process-wide font from a reader. See [`FontStore::load_from_reader`].
pub fn load_font_from_reader<R: Read>(reader: R) -> Result<(), FontError> {
    default_store().load_from_reader(reader)
}
