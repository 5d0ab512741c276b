use quiz_core::model::UserId;

use super::{SqliteRepository, mapping::map_profile_row};
use crate::repository::{ProfileRepository, StorageError, UserProfile};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profiles (
                user_id, username, email, photo_url,
                total_score, quizzes_taken, questions_answered, joined_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                photo_url = excluded.photo_url,
                total_score = excluded.total_score,
                quizzes_taken = excluded.quizzes_taken,
                questions_answered = excluded.questions_answered,
                joined_at = excluded.joined_at
            ",
        )
        .bind(profile.user_id.as_str())
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(profile.photo_url.as_deref())
        .bind(
            i64::try_from(profile.total_score)
                .map_err(|_| StorageError::Serialization("total_score overflow".into()))?,
        )
        .bind(i64::from(profile.quizzes_taken))
        .bind(
            i64::try_from(profile.questions_answered)
                .map_err(|_| StorageError::Serialization("questions_answered overflow".into()))?,
        )
        .bind(profile.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, username, email, photo_url,
                   total_score, quizzes_taken, questions_answered, joined_at
            FROM profiles
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_profile_row(&row)
    }

    async fn record_attempt(
        &self,
        user_id: &UserId,
        score: usize,
        total_questions: usize,
    ) -> Result<UserProfile, StorageError> {
        let score = i64::try_from(score)
            .map_err(|_| StorageError::Serialization("score overflow".into()))?;
        let total = i64::try_from(total_questions)
            .map_err(|_| StorageError::Serialization("total_questions overflow".into()))?;

        let result = sqlx::query(
            r"
            UPDATE profiles SET
                total_score = total_score + ?2,
                questions_answered = questions_answered + ?3,
                quizzes_taken = quizzes_taken + 1
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .bind(score)
        .bind(total)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.get_profile(user_id).await
    }
}
