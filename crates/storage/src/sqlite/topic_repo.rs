use quiz_core::model::{SubjectId, Topic, TopicId};

use super::{SqliteRepository, mapping::map_topic_row};
use crate::repository::{StorageError, TopicRepository};

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO topics (id, name, description, subject_id, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                subject_id = excluded.subject_id,
                image_url = excluded.image_url
            ",
        )
        .bind(topic.id().as_str())
        .bind(topic.name())
        .bind(topic.description())
        .bind(topic.subject_id().as_str())
        .bind(topic.image_url())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn topics_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, subject_id, image_url
            FROM topics
            WHERE subject_id = ?1
            ORDER BY name ASC, id ASC
            ",
        )
        .bind(subject_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(map_topic_row(&row)?);
        }
        Ok(topics)
    }

    async fn delete_topic(&self, id: &TopicId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
