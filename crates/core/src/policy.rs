use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Difficulty, MasteryScore, Question};

/// Coins awarded for a correct answer. Incorrect answers earn nothing.
pub const COINS_PER_CORRECT: u32 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("moving-average weight must be in (0, 1], got {provided}")]
    InvalidAlpha { provided: f64 },
    #[error("unknown mastery policy: {0} (expected `snap` or `ema:<alpha>`)")]
    Unknown(String),
}

//
// ─── TARGET DIFFICULTY ─────────────────────────────────────────────────────────
//

/// Maps a mastery score onto the difficulty band to ask next.
///
/// `clamp(floor(m * 5) + 1, 1, 5)`: `0.0 → 1`, `0.2 → 2`, `0.99 → 5`, `1.0 → 5`.
#[must_use]
pub fn target_difficulty(mastery: MasteryScore) -> Difficulty {
    // value() is within [0, 1], so the product floors to 0..=5.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let band = (mastery.value() * 5.0).floor() as u8;
    let level = band
        .saturating_add(1)
        .clamp(Difficulty::EASIEST.level(), Difficulty::HARDEST.level());
    Difficulty::new(level).unwrap_or(Difficulty::HARDEST)
}

//
// ─── QUESTION CHOICE ───────────────────────────────────────────────────────────
//

/// A question picked for the student plus whether the difficulty band was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub question: &'a Question,
    pub target: Difficulty,
    pub fell_back: bool,
}

/// Picks uniformly at random among `questions` at `target` difficulty.
///
/// When no question has that difficulty the whole slice becomes the candidate
/// set. Returns `None` only for an empty slice. Immediate repeats are possible.
pub fn choose_question<'a, R: Rng + ?Sized>(
    questions: &'a [Question],
    target: Difficulty,
    rng: &mut R,
) -> Option<Selection<'a>> {
    let matching: Vec<&Question> = questions
        .iter()
        .filter(|q| q.difficulty() == target)
        .collect();

    if let Some(question) = matching.choose(rng).copied() {
        return Some(Selection {
            question,
            target,
            fell_back: false,
        });
    }

    questions.choose(rng).map(|question| Selection {
        question,
        target,
        fell_back: true,
    })
}

//
// ─── MASTERY UPDATE ────────────────────────────────────────────────────────────
//

/// How a graded answer moves the stored mastery score.
///
/// `SnapToOutcome` is the default: mastery reflects only the latest answer, so
/// a single answer swings the next difficulty to an extreme. `MovingAverage`
/// blends the outcome into the previous score and must be chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MasteryPolicy {
    #[default]
    SnapToOutcome,
    MovingAverage { alpha: f64 },
}

impl MasteryPolicy {
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAlpha` unless `0 < alpha <= 1`.
    pub fn moving_average(alpha: f64) -> Result<Self, PolicyError> {
        if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
            Ok(Self::MovingAverage { alpha })
        } else {
            Err(PolicyError::InvalidAlpha { provided: alpha })
        }
    }

    /// New score after an answer. A missing record counts as `0.0`.
    #[must_use]
    pub fn apply(self, previous: Option<MasteryScore>, correct: bool) -> MasteryScore {
        let outcome = if correct {
            MasteryScore::FULL
        } else {
            MasteryScore::NONE
        };

        match self {
            MasteryPolicy::SnapToOutcome => outcome,
            MasteryPolicy::MovingAverage { alpha } => {
                let prev = previous.unwrap_or_default().value();
                let next = prev + alpha * (outcome.value() - prev);
                MasteryScore::new(next).unwrap_or(outcome)
            }
        }
    }
}

impl fmt::Display for MasteryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasteryPolicy::SnapToOutcome => write!(f, "snap"),
            MasteryPolicy::MovingAverage { alpha } => write!(f, "ema:{alpha}"),
        }
    }
}

impl FromStr for MasteryPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("snap") {
            return Ok(Self::SnapToOutcome);
        }
        match raw.split_once(':') {
            Some((kind, alpha)) if kind.eq_ignore_ascii_case("ema") => {
                let alpha: f64 = alpha
                    .trim()
                    .parse()
                    .map_err(|_| PolicyError::Unknown(raw.to_owned()))?;
                Self::moving_average(alpha)
            }
            _ => Err(PolicyError::Unknown(raw.to_owned())),
        }
    }
}

/// Coins for an answer.
#[must_use]
pub fn coins_for(correct: bool) -> u32 {
    if correct { COINS_PER_CORRECT } else { 0 }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
