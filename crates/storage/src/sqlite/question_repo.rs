use quiz_core::model::{Question, QuestionId, QuizId};

use super::{SqliteRepository, mapping::map_question_row, mapping::ser};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let options_json = serde_json::to_string(question.options()).map_err(ser)?;
        let correct = i64::try_from(question.correct_option_index())
            .map_err(|_| StorageError::Serialization("correct option index overflow".into()))?;

        sqlx::query(
            r"
            INSERT INTO questions (
                id, quiz_id, text, options, correct_option_index, explanation
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                quiz_id = excluded.quiz_id,
                text = excluded.text,
                options = excluded.options,
                correct_option_index = excluded.correct_option_index,
                explanation = excluded.explanation
            ",
        )
        .bind(question.id().as_str())
        .bind(question.quiz_id().as_str())
        .bind(question.text())
        .bind(options_json)
        .bind(correct)
        .bind(question.explanation())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn questions_by_quiz(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, quiz_id, text, options, correct_option_index, explanation
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(quiz_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn delete_question(&self, id: &QuestionId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?1")
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
