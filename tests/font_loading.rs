//! Replacing the process-wide font.
//!
//! Kept in its own test binary with a single test: it clears and reloads the
//! default store, which would race with any other test generating against it.

use simple_captcha::font::{BUNDLED_FONT, default_store};
use simple_captcha::{CaptchaError, FontError, Options, load_font, load_font_from_reader, new};
use std::io::{self, Read};

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"))
    }
}

#[test]
fn default_store_font_lifecycle() {
    let opts = Options::default();

    // Bundled font is available without any setup.
    assert!(new(150, 50, &opts).is_ok());

    // Malformed bytes are rejected and the working font is kept.
    let err = load_font(b"definitely not a font".as_slice()).unwrap_err();
    assert!(matches!(err, FontError::Parse(_)));
    assert!(new(150, 50, &opts).is_ok());

    // A failing reader is an IO error and also keeps the font.
    let err = load_font_from_reader(FailingReader).unwrap_err();
    assert!(matches!(err, FontError::Io(_)));
    assert!(new(150, 50, &opts).is_ok());

    // With no font at all, generation reports FontUnavailable...
    default_store().clear();
    assert!(matches!(
        new(150, 50, &opts),
        Err(CaptchaError::FontUnavailable)
    ));

    // ...and a rejected load does not change that.
    assert!(load_font(vec![0u8; 64]).is_err());
    assert!(matches!(
        new(150, 50, &opts),
        Err(CaptchaError::FontUnavailable)
    ));

    // After a valid load the next call succeeds.
    load_font_from_reader(io::Cursor::new(BUNDLED_FONT)).unwrap();
    let captcha = new(150, 50, &opts).unwrap();
    assert_eq!(captcha.answer().chars().count(), 4);

    load_font(BUNDLED_FONT).unwrap();
    assert!(new(150, 50, &opts).is_ok());
}
