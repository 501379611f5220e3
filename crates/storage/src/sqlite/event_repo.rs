use quiz_core::model::{LearningEvent, StudentId};

use super::{
    SqliteRepository,
    mapping::{id_to_i64, map_event_row},
};
use crate::repository::{LearningEventRecord, LearningEventRepository, StorageError};

#[async_trait::async_trait]
impl LearningEventRepository for SqliteRepository {
    async fn append_event(&self, event: &LearningEvent) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO learning_events (
                    student_id, question_id, correct, time_taken_secs, answered_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("student_id", event.student_id.value())?)
        .bind(id_to_i64("question_id", event.question_id.value())?)
        .bind(event.correct)
        .bind(i64::from(event.time_taken_secs))
        .bind(event.answered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn events_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<LearningEventRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, student_id, question_id, correct, time_taken_secs, answered_at
                FROM learning_events
                WHERE student_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("student_id", student_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_event_row).collect()
    }
}
