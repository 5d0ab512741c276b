use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::model::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Protocol violations reported by the session engine.
///
/// None of these are retryable: they indicate presenter misuse (double
/// submit, advancing before revealing) and a rejected operation always
/// leaves the session unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot start a session with no questions")]
    EmptyQuiz,

    #[error("option index {index} is out of range for {option_count} options")]
    InvalidOption { index: usize, option_count: usize },

    #[error("answer for the current question was already revealed")]
    AlreadyRevealed,

    #[error("cannot advance before the current answer is revealed")]
    AnswerNotRevealed,

    #[error("session is already finished")]
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Outcome of a successful answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: usize,
    pub correct: bool,
    /// Running score including this answer.
    pub score: usize,
}

/// Result of advancing past a revealed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Next,
    /// The last question was completed; the session is now finished.
    Finished,
}

/// One attempt at a quiz's question sequence.
///
/// The session owns a fixed copy of the question list taken at start time
/// and steps through it forward-only. Each question slot moves from
/// unanswered to revealed on `submit_answer`; `advance` moves to the next
/// slot or finalizes the attempt; `force_finish` finalizes unconditionally
/// (timeout). Once finished, only reads and `reset` are permitted.
///
/// The score is never stored: it is recomputed from the recorded answers on
/// every read, so it cannot drift from the answer map.
#[derive(Clone, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<usize, usize>,
    revealed: bool,
    finished: bool,
}

impl QuizSession {
    /// Starts a session over the given question sequence.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuiz` if no questions are provided. The
    /// caller presents an empty state for that quiz instead of crashing.
    pub fn start(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }

        Ok(Self {
            questions,
            current: 0,
            answers: BTreeMap::new(),
            revealed: false,
            finished: false,
        })
    }

    /// The question currently presented.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Records the answer for the current question and reveals it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` if the session is finalized,
    /// `SessionError::AlreadyRevealed` if this question was already answered
    /// (the first submission stands; re-submitting after seeing correctness
    /// feedback is rejected, not overwritten), or
    /// `SessionError::InvalidOption` if the index does not point into the
    /// current question's options.
    pub fn submit_answer(&mut self, option_index: usize) -> Result<AnswerOutcome, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if self.revealed {
            return Err(SessionError::AlreadyRevealed);
        }

        let question = self
            .current_question()
            .ok_or(SessionError::EmptyQuiz)?;
        if option_index >= question.option_count() {
            return Err(SessionError::InvalidOption {
                index: option_index,
                option_count: question.option_count(),
            });
        }

        let correct = question.is_correct(option_index);
        self.answers.insert(self.current, option_index);
        self.revealed = true;

        Ok(AnswerOutcome {
            selected: option_index,
            correct,
            score: self.score(),
        })
    }

    /// Moves to the next question, or finalizes after the last one.
    ///
    /// On the last question the session becomes finished and the index stays
    /// put. A newly entered slot that already holds an answer is treated as
    /// revealed, so the existing answer cannot be replaced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` if already finalized, or
    /// `SessionError::AnswerNotRevealed` if the current question has not been
    /// answered yet.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if !self.revealed {
            return Err(SessionError::AnswerNotRevealed);
        }

        if self.is_last_question() {
            self.finished = true;
            return Ok(Advance::Finished);
        }

        self.current += 1;
        self.revealed = self.answers.contains_key(&self.current);
        Ok(Advance::Next)
    }

    /// Finalizes the session unconditionally, regardless of position or
    /// reveal state. Used by the timeout path. Idempotent.
    pub fn force_finish(&mut self) {
        self.finished = true;
    }

    /// Authoritative final score, recomputed from the recorded answers.
    ///
    /// Valid whether or not the session is finished; it never disagrees with
    /// the running score reported by `submit_answer`.
    #[must_use]
    pub fn final_score(&self) -> usize {
        self.score()
    }

    /// Number of recorded answers matching their question's correct option.
    #[must_use]
    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .filter(|(index, selected)| {
                self.questions
                    .get(**index)
                    .is_some_and(|q| q.is_correct(**selected))
            })
            .count()
    }

    /// Position through the quiz as `current / total`.
    ///
    /// Non-decreasing within a session. Reaches `(n - 1) / n` on the last
    /// question and never 1.0 for more than one question; completion is
    /// signaled by `is_finished`, not by progress.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.current as f32 / self.questions.len() as f32
    }

    #[must_use]
    pub fn is_first_question(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Recorded answers by question index.
    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    /// Whether the current question's answer has been revealed.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns a fresh session over the same questions, discarding all
    /// answers and progress.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self {
            questions: self.questions.clone(),
            current: 0,
            answers: BTreeMap::new(),
            revealed: false,
            finished: false,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("revealed", &self.revealed)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, QuizId};

    fn build_question(id: u64, correct: usize) -> Question {
        Question::new(
            QuestionId::new(format!("question-{id}")).unwrap(),
            format!("Question {id}?"),
            vec!["a".into(), "b".into(), "c".into()],
            correct,
            None,
            QuizId::new("quiz-1").unwrap(),
        )
        .unwrap()
    }

    fn two_question_session() -> QuizSession {
        // correct option indices [0, 1]
        QuizSession::start(vec![build_question(1, 0), build_question(2, 1)]).unwrap()
    }

    #[test]
    fn start_rejects_empty_question_list() {
        let err = QuizSession::start(Vec::new()).unwrap_err();
        assert_eq!(err, SessionError::EmptyQuiz);
    }

    #[test]
    fn start_initializes_at_first_question() {
        let session = two_question_session();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(!session.is_finished());
        assert!(!session.is_revealed());
        assert!(session.is_first_question());
        assert_eq!(
            session.current_question().map(Question::text),
            Some("Question 1?")
        );
    }

    #[test]
    fn submit_answer_records_and_reveals() {
        let mut session = two_question_session();
        let outcome = session.submit_answer(0).unwrap();

        assert!(outcome.correct);
        assert_eq!(outcome.score, 1);
        assert!(session.is_revealed());
        assert_eq!(session.answers().get(&0), Some(&0));
    }

    #[test]
    fn submit_answer_rejects_out_of_range_option() {
        let mut session = two_question_session();
        let err = session.submit_answer(3).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidOption {
                index: 3,
                option_count: 3
            }
        );
        // rejected operation leaves the session untouched
        assert!(!session.is_revealed());
        assert!(session.answers().is_empty());
    }

    #[test]
    fn resubmission_is_rejected_and_first_answer_stands() {
        let mut session = two_question_session();
        session.submit_answer(2).unwrap();

        let err = session.submit_answer(0).unwrap_err();
        assert_eq!(err, SessionError::AlreadyRevealed);
        assert_eq!(session.answers().get(&0), Some(&2));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn advance_requires_revealed_answer() {
        let mut session = two_question_session();
        let err = session.advance().unwrap_err();
        assert_eq!(err, SessionError::AnswerNotRevealed);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn advance_moves_forward_and_clears_reveal() {
        let mut session = two_question_session();
        session.submit_answer(0).unwrap();

        assert_eq!(session.advance().unwrap(), Advance::Next);
        assert_eq!(session.current_index(), 1);
        assert!(!session.is_revealed());
        assert!(session.is_last_question());
    }

    #[test]
    fn advance_on_last_question_finishes_in_place() {
        let mut session = two_question_session();
        session.submit_answer(0).unwrap();
        session.advance().unwrap();
        session.submit_answer(1).unwrap();

        assert_eq!(session.advance().unwrap(), Advance::Finished);
        assert!(session.is_finished());
        assert_eq!(session.current_index(), 1);

        let err = session.submit_answer(0).unwrap_err();
        assert_eq!(err, SessionError::Finished);
        let err = session.advance().unwrap_err();
        assert_eq!(err, SessionError::Finished);
    }

    #[test]
    fn full_run_scores_one_correct_one_wrong() {
        // spec scenario: correct indices [0, 1]; answer 0 (right) then 0 (wrong)
        let mut session = two_question_session();

        let first = session.submit_answer(0).unwrap();
        assert!(first.correct);
        assert_eq!(first.score, 1);
        session.advance().unwrap();

        let second = session.submit_answer(0).unwrap();
        assert!(!second.correct);
        assert_eq!(second.score, 1);
        session.advance().unwrap();

        assert!(session.is_finished());
        assert_eq!(session.final_score(), 1);
    }

    #[test]
    fn force_finish_freezes_with_zero_answers() {
        let mut session = two_question_session();
        session.force_finish();

        assert!(session.is_finished());
        assert_eq!(session.final_score(), 0);

        // idempotent: a second call is a no-op
        session.force_finish();
        assert!(session.is_finished());

        let err = session.submit_answer(0).unwrap_err();
        assert_eq!(err, SessionError::Finished);
    }

    #[test]
    fn force_finish_keeps_partial_score() {
        let mut session = two_question_session();
        session.submit_answer(0).unwrap();
        session.force_finish();

        assert_eq!(session.final_score(), 1);
    }

    #[test]
    fn score_matches_recount_at_every_step() {
        let questions: Vec<Question> = (0..5).map(|i| build_question(i, 1)).collect();
        let mut session = QuizSession::start(questions).unwrap();

        for pick in [1, 0, 1, 2, 1] {
            let outcome = session.submit_answer(pick).unwrap();
            let recount = session
                .answers()
                .iter()
                .filter(|(i, sel)| session.questions()[**i].is_correct(**sel))
                .count();
            assert_eq!(outcome.score, recount);
            assert_eq!(session.final_score(), recount);
            session.advance().unwrap();
        }

        assert!(session.is_finished());
        assert_eq!(session.final_score(), 3);
    }

    #[test]
    fn progress_is_monotonic_and_stays_below_one() {
        let questions: Vec<Question> = (0..4).map(|i| build_question(i, 0)).collect();
        let mut session = QuizSession::start(questions).unwrap();

        let mut last = session.progress();
        assert_eq!(last, 0.0);

        while !session.is_finished() {
            session.submit_answer(0).unwrap();
            session.advance().unwrap();
            let p = session.progress();
            assert!(p >= last);
            last = p;
        }

        // current stays at the last index, so progress tops out at (n-1)/n
        assert_eq!(last, 0.75);
    }

    #[test]
    fn reset_discards_answers_and_keeps_questions() {
        let mut session = two_question_session();
        session.submit_answer(0).unwrap();
        session.advance().unwrap();
        session.submit_answer(1).unwrap();
        session.advance().unwrap();

        let fresh = session.reset();
        assert_eq!(fresh.current_index(), 0);
        assert_eq!(fresh.score(), 0);
        assert!(fresh.answers().is_empty());
        assert!(!fresh.is_finished());
        assert!(!fresh.is_revealed());
        assert_eq!(fresh.questions(), session.questions());
    }

    #[test]
    fn single_question_quiz_is_first_and_last() {
        let mut session = QuizSession::start(vec![build_question(1, 0)]).unwrap();
        assert!(session.is_first_question());
        assert!(session.is_last_question());
        assert_eq!(session.progress(), 0.0);

        session.submit_answer(0).unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Finished);
        assert_eq!(session.final_score(), 1);
    }
}
