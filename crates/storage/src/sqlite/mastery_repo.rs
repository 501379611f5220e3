use quiz_core::model::{Mastery, StudentId, TopicId};

use super::{
    SqliteRepository,
    mapping::{id_to_i64, map_mastery_row},
};
use crate::repository::{MasteryRepository, StorageError};

#[async_trait::async_trait]
impl MasteryRepository for SqliteRepository {
    async fn get_mastery(
        &self,
        student_id: StudentId,
        topic_id: TopicId,
    ) -> Result<Option<Mastery>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT student_id, topic_id, score, updated_at
                FROM mastery
                WHERE student_id = ?1 AND topic_id = ?2
            ",
        )
        .bind(id_to_i64("student_id", student_id.value())?)
        .bind(id_to_i64("topic_id", topic_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_mastery_row).transpose()
    }

    async fn upsert_mastery(&self, mastery: &Mastery) -> Result<(), StorageError> {
        // No read-modify-write guard: concurrent answers for one pair race and the last write wins.
        sqlx::query(
            r"
            INSERT INTO mastery (student_id, topic_id, score, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(student_id, topic_id) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at
            ",
        )
        .bind(id_to_i64("student_id", mastery.student_id.value())?)
        .bind(id_to_i64("topic_id", mastery.topic_id.value())?)
        .bind(mastery.score.value())
        .bind(mastery.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn mastery_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Mastery>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT student_id, topic_id, score, updated_at
                FROM mastery
                WHERE student_id = ?1
                ORDER BY topic_id ASC
            ",
        )
        .bind(id_to_i64("student_id", student_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_mastery_row).collect()
    }
}
