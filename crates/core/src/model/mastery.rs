use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{StudentId, TopicId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MasteryError {
    #[error("mastery score must be a finite number, got {0}")]
    NotFinite(f64),
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// A mastery estimate, always inside `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MasteryScore(f64);

impl MasteryScore {
    pub const NONE: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);

    /// Clamps `value` into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `MasteryError::NotFinite` for NaN or infinities.
    pub fn new(value: f64) -> Result<Self, MasteryError> {
        if value.is_finite() {
            Ok(Self(value.clamp(0.0, 1.0)))
        } else {
            Err(MasteryError::NotFinite(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MasteryScore {
    type Error = MasteryError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MasteryScore> for f64 {
    fn from(value: MasteryScore) -> Self {
        value.0
    }
}

//
// ─── MASTERY RECORD ────────────────────────────────────────────────────────────
//

/// Per-(student, topic) mastery. Created on the first answer for the pair and
/// overwritten by every later one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mastery {
    pub student_id: StudentId,
    pub topic_id: TopicId,
    pub score: MasteryScore,
    pub updated_at: DateTime<Utc>,
}

impl Mastery {
    #[must_use]
    pub fn new(
        student_id: StudentId,
        topic_id: TopicId,
        score: MasteryScore,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            student_id,
            topic_id,
            score,
            updated_at,
        }
    }
}
