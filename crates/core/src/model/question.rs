use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must have at least one option")]
    NoOptions,

    #[error("correct option index {index} is out of range for {option_count} options")]
    CorrectIndexOutOfRange { index: usize, option_count: usize },
}

/// One multiple-choice question. Immutable once loaded into a session:
/// store-side edits after load never affect an attempt in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_option_index: usize,
    explanation: Option<String>,
    quiz_id: QuizId,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if the prompt is blank,
    /// `QuestionError::NoOptions` if the option list is empty, or
    /// `QuestionError::CorrectIndexOutOfRange` if the correct index does not
    /// point into the options.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
        explanation: Option<String>,
        quiz_id: QuizId,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if correct_option_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_option_index,
                option_count: options.len(),
            });
        }

        let explanation = explanation
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(Self {
            id,
            text: text.trim().to_owned(),
            options,
            correct_option_index,
            explanation,
            quiz_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_option_index(&self) -> usize {
        self.correct_option_index
    }

    /// Returns true if the given option index is the correct answer.
    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_option_index
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    #[test]
    fn question_rejects_empty_text() {
        let err = Question::new(
            QuestionId::generate(),
            "  ",
            opts(2),
            0,
            None,
            QuizId::new("q1").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn question_rejects_empty_options() {
        let err = Question::new(
            QuestionId::generate(),
            "2 + 2 = ?",
            Vec::new(),
            0,
            None,
            QuizId::new("q1").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::NoOptions);
    }

    #[test]
    fn question_rejects_out_of_range_correct_index() {
        let err = Question::new(
            QuestionId::generate(),
            "2 + 2 = ?",
            opts(3),
            3,
            None,
            QuizId::new("q1").unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectIndexOutOfRange {
                index: 3,
                option_count: 3
            }
        );
    }

    #[test]
    fn question_checks_correctness_by_index() {
        let question = Question::new(
            QuestionId::new("qq1").unwrap(),
            "2 + 2 = ?",
            vec!["3".into(), "4".into(), "5".into()],
            1,
            Some("basic addition".into()),
            QuizId::new("q1").unwrap(),
        )
        .unwrap();

        assert!(question.is_correct(1));
        assert!(!question.is_correct(0));
        assert_eq!(question.option_count(), 3);
        assert_eq!(question.explanation(), Some("basic addition"));
    }
}
