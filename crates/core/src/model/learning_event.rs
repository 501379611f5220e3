use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, StudentId};

/// Record of a single graded answer.
///
/// Events are append-only: never updated and never deleted. They are the
/// audit trail for analytics and retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningEvent {
    pub student_id: StudentId,
    pub question_id: QuestionId,
    pub correct: bool,
    pub time_taken_secs: u32,
    pub answered_at: DateTime<Utc>,
}

impl LearningEvent {
    #[must_use]
    pub fn new(
        student_id: StudentId,
        question_id: QuestionId,
        correct: bool,
        time_taken_secs: u32,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            student_id,
            question_id,
            correct,
            time_taken_secs,
            answered_at,
        }
    }
}
