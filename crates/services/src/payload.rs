//! JSON shapes exchanged between the quiz client and the server.

use chrono::{DateTime, Utc};
use quiz_core::model::{Mastery, Question, QuestionId, Topic, TopicId};
use serde::{Deserialize, Serialize};

/// A question as handed to the client.
///
/// `correct_answer` is included so the client can render the result screen
/// without another round trip. Any caller can therefore read the answer
/// before submitting; grading still happens on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub content: String,
    pub correct_answer: String,
    pub distractors: Vec<String>,
    pub difficulty: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionPayload {
    /// The correct answer followed by the distractors, unshuffled.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        std::iter::once(self.correct_answer.clone())
            .chain(self.distractors.iter().cloned())
            .collect()
    }
}

impl From<&Question> for QuestionPayload {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id(),
            topic_id: question.topic_id(),
            content: question.content().to_owned(),
            correct_answer: question.correct_answer().to_owned(),
            distractors: question.distractors().to_vec(),
            difficulty: question.difficulty().level(),
            explanation: question.explanation().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub answer: String,
    pub time_taken_seconds: u32,
}

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub coins_earned: u32,
    pub new_mastery: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPayload {
    pub id: TopicId,
    pub subject: String,
    pub name: String,
    pub slug: String,
    pub stage: String,
}

impl From<&Topic> for TopicPayload {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id(),
            subject: topic.subject().to_owned(),
            name: topic.name().to_owned(),
            slug: topic.slug().to_owned(),
            stage: topic.stage().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryPayload {
    pub topic_id: TopicId,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Mastery> for MasteryPayload {
    fn from(mastery: &Mastery) -> Self {
        Self {
            topic_id: mastery.topic_id,
            score: mastery.score.value(),
            updated_at: mastery.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, TopicError};

    #[test]
    fn question_payload_wire_shape() {
        let question = Question::new(
            QuestionId::new(4),
            TopicId::new(2),
            "3 x 4?",
            "12",
            vec!["7".into(), "34".into()],
            Difficulty::new(2).unwrap(),
            None,
        )
        .unwrap();

        let json = serde_json::to_value(QuestionPayload::from(&question)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 4,
                "topic_id": 2,
                "content": "3 x 4?",
                "correct_answer": "12",
                "distractors": ["7", "34"],
                "difficulty": 2,
            })
        );
    }

    #[test]
    fn topic_payload_wire_shape() {
        let topic = Topic::new(TopicId::new(3), " Maths ", "Times tables", "times-tables", "KS2")
            .unwrap();

        let json = serde_json::to_value(TopicPayload::from(&topic)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "subject": "Maths",
                "name": "Times tables",
                "slug": "times-tables",
                "stage": "KS2",
            })
        );

        // A payload carrying a bad slug stays a payload; it never becomes a `Topic`.
        let raw = r#"{"id": 3, "subject": "Maths", "name": "x", "slug": "Bad Slug", "stage": "KS2"}"#;
        let payload: TopicPayload = serde_json::from_str(raw).unwrap();
        let err = Topic::new(payload.id, payload.subject, payload.name, payload.slug, payload.stage)
            .unwrap_err();
        assert!(matches!(err, TopicError::InvalidSlug(_)));
    }

    #[test]
    fn submission_rejects_negative_time() {
        let raw = r#"{"question_id": 1, "answer": "x", "time_taken_seconds": -3}"#;
        assert!(serde_json::from_str::<AnswerSubmission>(raw).is_err());
    }
}
