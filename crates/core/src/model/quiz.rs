use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuizId, SubjectId, TopicId};

/// Default time limit when a quiz does not specify one.
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 10;

/// Default passing threshold when a quiz does not specify one.
pub const DEFAULT_PASSING_PERCENTAGE: u8 = 70;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("time limit must be a positive number of minutes")]
    InvalidTimeLimit,

    #[error("passing percentage must be between 0 and 100, got {0}")]
    InvalidPassingPercentage(u8),
}

/// Metadata for one quiz: where it lives in the hierarchy, its time limit,
/// and the score threshold needed to pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: Option<String>,
    topic_id: TopicId,
    subject_id: SubjectId,
    time_limit_minutes: u32,
    passing_percentage: u8,
}

impl Quiz {
    /// Creates a new quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` if the title is blank,
    /// `QuizError::InvalidTimeLimit` if the limit is zero, or
    /// `QuizError::InvalidPassingPercentage` if the threshold exceeds 100.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: Option<String>,
        topic_id: TopicId,
        subject_id: SubjectId,
        time_limit_minutes: u32,
        passing_percentage: u8,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if time_limit_minutes == 0 {
            return Err(QuizError::InvalidTimeLimit);
        }
        if passing_percentage > 100 {
            return Err(QuizError::InvalidPassingPercentage(passing_percentage));
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description,
            topic_id,
            subject_id,
            time_limit_minutes,
            passing_percentage,
        })
    }

    /// Creates a quiz with the default time limit and passing threshold.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` if the title is blank.
    pub fn with_defaults(
        id: QuizId,
        title: impl Into<String>,
        description: Option<String>,
        topic_id: TopicId,
        subject_id: SubjectId,
    ) -> Result<Self, QuizError> {
        Self::new(
            id,
            title,
            description,
            topic_id,
            subject_id,
            DEFAULT_TIME_LIMIT_MINUTES,
            DEFAULT_PASSING_PERCENTAGE,
        )
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    /// Time allowed for one attempt.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::minutes(i64::from(self.time_limit_minutes))
    }

    #[must_use]
    pub fn passing_percentage(&self) -> u8 {
        self.passing_percentage
    }

    /// Minimum number of correct answers needed to pass out of `total_questions`.
    ///
    /// Rounds up so a 70% threshold over 3 questions requires 3 correct, not 2.
    #[must_use]
    pub fn passing_score(&self, total_questions: usize) -> usize {
        let needed = total_questions * usize::from(self.passing_percentage);
        needed.div_ceil(100)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
