use std::sync::Arc;

use chrono::{DateTime, Utc};

use quiz_core::model::{Quiz, QuizId, UserId};
use quiz_core::session::{Advance, AnswerOutcome, QuizSession};
use quiz_core::Clock;
use storage::repository::{ProfileRepository, QuestionRepository, QuizRepository, UserProfile};

use crate::error::SessionRunError;
use super::snapshot::{AttemptOutcome, SessionSnapshot};

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Starts quiz attempts and records finished ones.
///
/// The runner fetches the quiz and its question list once at start time;
/// store-side pushes after that never reach an attempt in progress.
#[derive(Clone)]
pub struct SessionRunner {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl SessionRunner {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            questions,
            profiles,
        }
    }

    /// Start a fresh attempt at the given quiz.
    ///
    /// Re-entering a quiz goes through here again and replaces the prior
    /// attempt entirely; partial sessions are never resumed.
    ///
    /// # Errors
    ///
    /// Returns `SessionRunError::Storage` if the quiz or questions cannot be
    /// loaded, or `SessionRunError::Session` (`EmptyQuiz`) if the quiz has no
    /// questions — the presenter shows an empty state for that.
    pub async fn start(&self, quiz_id: &QuizId) -> Result<ActiveSession, SessionRunError> {
        let quiz = self.quizzes.get_quiz(quiz_id).await?;
        let questions = self.questions.questions_by_quiz(quiz_id).await?;
        let session = QuizSession::start(questions)?;

        let started_at = self.clock.now();
        let deadline = started_at + quiz.time_limit();
        Ok(ActiveSession {
            quiz,
            session,
            started_at,
            deadline,
            recorded: false,
        })
    }

    /// Record a finished attempt into the user's profile.
    ///
    /// A local guard keeps one runner from double-recording on the happy
    /// path; calling again after a storage failure retries the append
    /// (at-least-once at the store boundary is accepted).
    ///
    /// # Errors
    ///
    /// Returns `SessionRunError::NotFinished` if the session has not been
    /// finalized, or `SessionRunError::Storage` if the profile update fails.
    pub async fn finalize_attempt(
        &self,
        active: &mut ActiveSession,
        user_id: &UserId,
    ) -> Result<UserProfile, SessionRunError> {
        if !active.session.is_finished() {
            return Err(SessionRunError::NotFinished);
        }
        if active.recorded {
            return Ok(self.profiles.get_profile(user_id).await?);
        }

        let profile = self
            .profiles
            .record_attempt(
                user_id,
                active.session.final_score(),
                active.session.total_questions(),
            )
            .await?;
        active.recorded = true;
        Ok(profile)
    }
}

//
// ─── ACTIVE SESSION ────────────────────────────────────────────────────────────
//

/// One in-flight attempt: the engine plus quiz metadata and timer deadline.
///
/// Mutable shared state with no internal synchronization; a multi-threaded
/// presenter must put one lock around each attempt. In a single event loop
/// the timeout tick and user intents serialize naturally, and whichever
/// lands first wins — the loser sees a terminal-state rejection.
pub struct ActiveSession {
    quiz: Quiz,
    session: QuizSession,
    started_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    recorded: bool,
}

impl ActiveSession {
    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the attempt times out (start time plus the quiz time limit).
    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    #[must_use]
    pub fn recorded(&self) -> bool {
        self.recorded
    }

    /// Submit an answer for the current question.
    ///
    /// # Errors
    ///
    /// Propagates the engine's protocol errors; the attempt is unchanged on
    /// rejection.
    pub fn submit(&mut self, option_index: usize) -> Result<AnswerOutcome, SessionRunError> {
        Ok(self.session.submit_answer(option_index)?)
    }

    /// Advance past the revealed answer.
    ///
    /// # Errors
    ///
    /// Propagates the engine's protocol errors.
    pub fn advance(&mut self) -> Result<Advance, SessionRunError> {
        Ok(self.session.advance()?)
    }

    /// Timer tick: finalizes the attempt once `now` reaches the deadline.
    ///
    /// Returns true if this tick expired the attempt. Idempotent, and a
    /// no-op on an attempt that already finished by exhausting questions.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.session.is_finished() || now < self.deadline {
            return false;
        }
        self.session.force_finish();
        true
    }

    /// Remaining time on the countdown, zero once expired.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.deadline - now).max(chrono::Duration::zero())
    }

    /// Observable state for the presenter.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.session.current_index(),
            total: self.session.total_questions(),
            revealed: self.session.is_revealed(),
            score: self.session.score(),
            finished: self.session.is_finished(),
            progress: self.session.progress(),
        }
    }

    /// Final result against the quiz's passing threshold.
    ///
    /// Readable mid-attempt as a latest-score view; authoritative once
    /// finished.
    #[must_use]
    pub fn outcome(&self) -> AttemptOutcome {
        let score = self.session.final_score();
        let total = self.session.total_questions();
        let percentage = if total == 0 {
            0
        } else {
            u8::try_from(score * 100 / total).unwrap_or(100)
        };
        AttemptOutcome {
            score,
            total,
            percentage,
            passed: score >= self.quiz.passing_score(total),
        }
    }

    /// Restart this attempt over the same question list, discarding all
    /// progress and re-arming the timer from `now`.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.session = self.session.reset();
        self.started_at = now;
        self.deadline = now + self.quiz.time_limit();
        self.recorded = false;
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("quiz_id", &self.quiz.id())
            .field("session", &self.session)
            .field("started_at", &self.started_at)
            .field("deadline", &self.deadline)
            .field("recorded", &self.recorded)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
