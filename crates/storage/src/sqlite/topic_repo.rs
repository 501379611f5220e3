use quiz_core::model::{Topic, TopicId};

use super::{
    SqliteRepository,
    mapping::{id_to_i64, map_topic_row},
};
use crate::repository::{StorageError, TopicRepository};

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO topics (id, subject, name, slug, stage)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                subject = excluded.subject,
                name = excluded.name,
                slug = excluded.slug,
                stage = excluded.stage
            ",
        )
        .bind(id_to_i64("topic_id", topic.id().value())?)
        .bind(topic.subject())
        .bind(topic.name())
        .bind(topic.slug())
        .bind(topic.stage())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, subject, name, slug, stage
                FROM topics
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("topic_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_topic_row).transpose()
    }

    async fn list_topics(&self, stage: Option<&str>) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, subject, name, slug, stage
                FROM topics
                WHERE ?1 IS NULL OR stage = ?1
                ORDER BY subject ASC, name ASC, id ASC
            ",
        )
        .bind(stage)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_topic_row).collect()
    }
}
