use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question content cannot be empty")]
    EmptyContent,

    #[error("correct answer cannot be empty")]
    EmptyAnswer,

    #[error("a question needs at least one distractor")]
    NoDistractors,

    #[error("difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Authored difficulty of a question, from 1 (easiest) to 5 (hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASIEST: Self = Self(1);
    pub const HARDEST: Self = Self(5);

    /// # Errors
    ///
    /// Returns `QuestionError::InvalidDifficulty` outside 1..=5.
    pub fn new(level: u8) -> Result<Self, QuestionError> {
        if (Self::EASIEST.0..=Self::HARDEST.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(QuestionError::InvalidDifficulty(level))
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = QuestionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question belonging to one topic.
///
/// The correct answer is expected to differ from every distractor; that is an
/// authoring rule and is not checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    topic_id: TopicId,
    content: String,
    correct_answer: String,
    distractors: Vec<String>,
    difficulty: Difficulty,
    explanation: Option<String>,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` for empty content/answer or an empty distractor list.
    pub fn new(
        id: QuestionId,
        topic_id: TopicId,
        content: impl Into<String>,
        correct_answer: impl Into<String>,
        distractors: Vec<String>,
        difficulty: Difficulty,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(QuestionError::EmptyContent);
        }

        let correct_answer = correct_answer.into();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        if distractors.is_empty() {
            return Err(QuestionError::NoDistractors);
        }

        let explanation = explanation.filter(|text| !text.trim().is_empty());

        Ok(Self {
            id,
            topic_id,
            content,
            correct_answer,
            distractors,
            difficulty,
            explanation,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn distractors(&self) -> &[String] {
        &self.distractors
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Exact, case-sensitive comparison against the correct answer.
    ///
    /// No trimming or normalization: `"Paris "` does not match `"Paris"`.
    #[must_use]
    pub fn is_correct(&self, submitted: &str) -> bool {
        submitted == self.correct_answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
