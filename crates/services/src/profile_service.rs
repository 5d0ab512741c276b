use std::sync::Arc;

use quiz_core::model::UserId;
use quiz_core::Clock;
use storage::repository::{ProfileRepository, StorageError, UserProfile};

use crate::error::ProfileError;

/// Identity-store facade: registration plus profile reads and attempt
/// accumulation.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    clock: Clock,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>, clock: Clock) -> Self {
        Self { profiles, clock }
    }

    /// Register a user, or return the existing profile unchanged.
    ///
    /// Idempotent: a second sign-in with the same id never resets counters.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` on storage failures.
    pub async fn register(
        &self,
        user_id: UserId,
        username: impl Into<String> + Send,
        email: impl Into<String> + Send,
        photo_url: Option<String>,
    ) -> Result<UserProfile, ProfileError> {
        match self.profiles.get_profile(&user_id).await {
            Ok(existing) => Ok(existing),
            Err(StorageError::NotFound) => {
                let profile =
                    UserProfile::new(user_id, username, email, photo_url, self.clock.now());
                self.profiles.upsert_profile(&profile).await?;
                Ok(profile)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the profile is missing or storage fails.
    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, ProfileError> {
        Ok(self.profiles.get_profile(user_id).await?)
    }

    /// Accumulate one finished attempt into the profile counters.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the profile is missing or storage fails.
    pub async fn record_attempt(
        &self,
        user_id: &UserId,
        score: usize,
        total_questions: usize,
    ) -> Result<UserProfile, ProfileError> {
        Ok(self
            .profiles
            .record_attempt(user_id, score, total_questions)
            .await?)
    }
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service() -> ProfileService {
        ProfileService::new(Arc::new(InMemoryRepository::new()), Clock::fixed(fixed_now()))
    }

    #[tokio::test]
    async fn register_creates_zeroed_profile_stamped_by_clock() {
        let service = service();
        let profile = service
            .register(UserId::new("u1").unwrap(), "sam", "sam@example.com", None)
            .await
            .unwrap();

        assert_eq!(profile.total_score, 0);
        assert_eq!(profile.quizzes_taken, 0);
        assert_eq!(profile.questions_answered, 0);
        assert_eq!(profile.joined_at, fixed_now());
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let service = service();
        let user_id = UserId::new("u1").unwrap();

        service
            .register(user_id.clone(), "sam", "sam@example.com", None)
            .await
            .unwrap();
        service.record_attempt(&user_id, 4, 5).await.unwrap();

        // second sign-in must not wipe the counters
        let again = service
            .register(user_id.clone(), "sam", "other@example.com", None)
            .await
            .unwrap();
        assert_eq!(again.total_score, 4);
        assert_eq!(again.email, "sam@example.com");
    }

    #[tokio::test]
    async fn record_attempt_for_unknown_user_fails() {
        let service = service();
        let err = service
            .record_attempt(&UserId::new("ghost").unwrap(), 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::Storage(StorageError::NotFound)
        ));
    }
}
