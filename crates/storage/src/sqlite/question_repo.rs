use quiz_core::model::{Question, QuestionId, TopicId};

use super::{
    SqliteRepository,
    mapping::{encode_distractors, id_to_i64, map_question_row},
};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO questions (
                id, topic_id, content, correct_answer, distractors, difficulty, explanation
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                topic_id = excluded.topic_id,
                content = excluded.content,
                correct_answer = excluded.correct_answer,
                distractors = excluded.distractors,
                difficulty = excluded.difficulty,
                explanation = excluded.explanation
            ",
        )
        .bind(id_to_i64("question_id", question.id().value())?)
        .bind(id_to_i64("topic_id", question.topic_id().value())?)
        .bind(question.content())
        .bind(question.correct_answer())
        .bind(encode_distractors(question.distractors())?)
        .bind(i64::from(question.difficulty().level()))
        .bind(question.explanation())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, topic_id, content, correct_answer, distractors, difficulty, explanation
                FROM questions
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_question_row(&row)
    }

    async fn questions_for_topic(
        &self,
        topic_id: TopicId,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, topic_id, content, correct_answer, distractors, difficulty, explanation
                FROM questions
                WHERE topic_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("topic_id", topic_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_question_row).collect()
    }
}
