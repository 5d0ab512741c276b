use quiz_core::model::{Quiz, QuizId, TopicId};

use super::{SqliteRepository, mapping::map_quiz_row};
use crate::repository::{QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quizzes (
                id, title, description, topic_id, subject_id,
                time_limit_minutes, passing_percentage
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                topic_id = excluded.topic_id,
                subject_id = excluded.subject_id,
                time_limit_minutes = excluded.time_limit_minutes,
                passing_percentage = excluded.passing_percentage
            ",
        )
        .bind(quiz.id().as_str())
        .bind(quiz.title())
        .bind(quiz.description())
        .bind(quiz.topic_id().as_str())
        .bind(quiz.subject_id().as_str())
        .bind(i64::from(quiz.time_limit_minutes()))
        .bind(i64::from(quiz.passing_percentage()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, topic_id, subject_id,
                   time_limit_minutes, passing_percentage
            FROM quizzes
            WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_quiz_row(&row)
    }

    async fn quizzes_by_topic(&self, topic_id: &TopicId) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, topic_id, subject_id,
                   time_limit_minutes, passing_percentage
            FROM quizzes
            WHERE topic_id = ?1
            ORDER BY title ASC, id ASC
            ",
        )
        .bind(topic_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut quizzes = Vec::with_capacity(rows.len());
        for row in rows {
            quizzes.push(map_quiz_row(&row)?);
        }
        Ok(quizzes)
    }

    async fn delete_quiz(&self, id: &QuizId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = ?1")
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
