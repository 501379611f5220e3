use chrono::{DateTime, Utc};
use quiz_core::model::{
    Difficulty, LearningEvent, Mastery, MasteryScore, Question, QuestionId, StudentId, Topic,
    TopicId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{LearningEventRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn encode_distractors(distractors: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(distractors).map_err(ser)
}

fn decode_distractors(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_topic_row(row: &SqliteRow) -> Result<Topic, StorageError> {
    Topic::new(
        TopicId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?),
        row.try_get::<String, _>("subject").map_err(ser)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("slug").map_err(ser)?,
        row.try_get::<String, _>("stage").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let difficulty_raw: i64 = row.try_get("difficulty").map_err(ser)?;
    let difficulty = u8::try_from(difficulty_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid difficulty: {difficulty_raw}")))
        .and_then(|level| Difficulty::new(level).map_err(ser))?;

    let distractors = decode_distractors(&row.try_get::<String, _>("distractors").map_err(ser)?)?;

    Question::new(
        QuestionId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?),
        TopicId::new(i64_to_u64("topic_id", row.try_get("topic_id").map_err(ser)?)?),
        row.try_get::<String, _>("content").map_err(ser)?,
        row.try_get::<String, _>("correct_answer").map_err(ser)?,
        distractors,
        difficulty,
        row.try_get::<Option<String>, _>("explanation").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_mastery_row(row: &SqliteRow) -> Result<Mastery, StorageError> {
    let score = MasteryScore::new(row.try_get::<f64, _>("score").map_err(ser)?).map_err(ser)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;

    Ok(Mastery::new(
        StudentId::new(i64_to_u64("student_id", row.try_get("student_id").map_err(ser)?)?),
        TopicId::new(i64_to_u64("topic_id", row.try_get("topic_id").map_err(ser)?)?),
        score,
        updated_at,
    ))
}

pub(crate) fn map_event_row(row: &SqliteRow) -> Result<LearningEventRecord, StorageError> {
    let secs_raw: i64 = row.try_get("time_taken_secs").map_err(ser)?;
    let time_taken_secs = u32::try_from(secs_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid time_taken_secs: {secs_raw}")))?;

    Ok(LearningEventRecord {
        id: row.try_get("id").map_err(ser)?,
        event: LearningEvent::new(
            StudentId::new(i64_to_u64("student_id", row.try_get("student_id").map_err(ser)?)?),
            QuestionId::new(i64_to_u64(
                "question_id",
                row.try_get("question_id").map_err(ser)?,
            )?),
            row.try_get::<bool, _>("correct").map_err(ser)?,
            time_taken_secs,
            row.try_get("answered_at").map_err(ser)?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distractors_encode_as_json_array() {
        let encoded = encode_distractors(&["a".into(), "b, c".into()]).unwrap();
        assert_eq!(encoded, r#"["a","b, c"]"#);
        assert_eq!(decode_distractors(&encoded).unwrap(), vec!["a", "b, c"]);
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(i64_to_u64("id", -1).is_err());
        assert!(id_to_i64("id", u64::MAX).is_err());
    }
}
