//! Challenge strategies: what gets drawn, and what the user must type.
//!
//! A [`Challenge`] pairs the *text* rendered into the image with the *answer*
//! checked against user input. For plain text they are identical; for
//! arithmetic the image shows `3+5` and the answer is `8`.
//!
//! The compositor is agnostic to where a challenge comes from: it asks a
//! [`ChallengeSource`] for the next pair. Three sources ship with the crate:
//!
//! | Source | Text | Answer |
//! |---|---|---|
//! | [`RandomText`] | `length` chars drawn from a charset, with replacement | same as text |
//! | [`MathExpr`] | `"{a}+{b}"`, operands in `1..=9` | `a + b` in decimal |
//! | [`CustomChallenge`] | whatever the closure returns | whatever the closure returns |

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default character set: `A-Z`, `a-z`, `0-9`.
pub const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Smallest and largest operand of an arithmetic challenge.
pub const MATH_OPERAND_RANGE: std::ops::RangeInclusive<u32> = 1..=9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Ground truth compared against user input.
    pub answer: String,
    /// Rendered into the image.
    pub text: String,
}

impl Challenge {
    pub fn new(answer: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            text: text.into(),
        }
    }
}

/// Yields challenges for the compositor.
///
/// `rng` is the per-call generator, so sources that need randomness stay
/// reproducible under a seeded generator.
pub trait ChallengeSource {
    fn next_challenge(&mut self, rng: &mut dyn RngCore) -> Challenge;
}

/// Random characters from a fixed set.
#[derive(Debug, Clone)]
pub struct RandomText {
    charset: Vec<char>,
    length: usize,
}

impl RandomText {
    pub fn new(charset: &str, length: usize) -> Self {
        Self {
            charset: charset.chars().collect(),
            length,
        }
    }
}

impl ChallengeSource for RandomText {
    fn next_challenge(&mut self, rng: &mut dyn RngCore) -> Challenge {
        let text: String = (0..self.length)
            .filter_map(|_| self.charset.choose(rng).copied())
            .collect();
        Challenge::new(text.clone(), text)
    }
}

/// `a+b` with single-digit operands.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathExpr;

impl ChallengeSource for MathExpr {
    fn next_challenge(&mut self, rng: &mut dyn RngCore) -> Challenge {
        let a = rng.random_range(MATH_OPERAND_RANGE);
        let b = rng.random_range(MATH_OPERAND_RANGE);
        Challenge::new((a + b).to_string(), format!("{a}+{b}"))
    }
}

/// Caller-supplied `(answer, text)` pairs, used verbatim.
pub struct CustomChallenge<F> {
    generator: F,
}

impl<F> CustomChallenge<F>
where
    F: FnMut() -> (String, String),
{
    pub fn new(generator: F) -> Self {
        Self { generator }
    }
}

impl<F> ChallengeSource for CustomChallenge<F>
where
    F: FnMut() -> (String, String),
{
    fn next_challenge(&mut self, _rng: &mut dyn RngCore) -> Challenge {
        let (answer, text) = (self.generator)();
        Challenge { answer, text }
    }
}

/// The built-in, non-custom strategies. Selectable from the CLI and recorded
/// in batch manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeMode {
    #[default]
    Text,
    Math,
}

impl ChallengeMode {
    /// A fresh source for this mode. `charset` and `length` only apply to
    /// [`ChallengeMode::Text`].
    pub fn source(self, charset: &str, length: usize) -> Box<dyn ChallengeSource + Send> {
        match self {
            Self::Text => Box::new(RandomText::new(charset, length)),
            Self::Math => Box::new(MathExpr),
        }
    }
}

impl fmt::Display for ChallengeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Math => "math",
        })
    }
}
