//! JSON content import.
//!
//! Accepts a bundle of subjects, topics, quizzes, and questions in one JSON
//! document, validates everything through the model constructors, and
//! upserts it into the store. Records without ids get freshly generated
//! ones, the way the hosted store mints keys on push.

use serde::Deserialize;

use quiz_core::model::{
    Question, QuestionId, Quiz, QuizId, Subject, SubjectId, Topic, TopicId,
    DEFAULT_PASSING_PERCENTAGE, DEFAULT_TIME_LIMIT_MINUTES,
};
use storage::repository::Storage;

use crate::error::ImportError;

//
// ─── BUNDLE FORMAT ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBundle {
    #[serde(default)]
    pub subjects: Vec<SubjectEntry>,
    #[serde(default)]
    pub topics: Vec<TopicEntry>,
    #[serde(default)]
    pub quizzes: Vec<QuizEntry>,
    #[serde(default)]
    pub questions: Vec<QuestionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectEntry {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicEntry {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subject_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizEntry {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub topic_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub passing_percentage: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionEntry {
    pub id: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
    pub quiz_id: String,
}

/// Counts of records written by one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub subjects: usize,
    pub topics: usize,
    pub quizzes: usize,
    pub questions: usize,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct ImportService {
    storage: Storage,
}

impl ImportService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Parse and import a JSON bundle.
    ///
    /// Validation happens before any write, so a malformed bundle leaves the
    /// store untouched.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` for malformed JSON, `ImportError::Id` /
    /// `ImportError::Invalid` for records the models reject, and
    /// `ImportError::Storage` if an upsert fails.
    pub async fn import_json(&self, json: &str) -> Result<ImportReport, ImportError> {
        let bundle: ContentBundle = serde_json::from_str(json)?;
        self.import_bundle(bundle).await
    }

    /// Import an already-parsed bundle.
    ///
    /// # Errors
    ///
    /// Same as [`ImportService::import_json`], minus the parse step.
    pub async fn import_bundle(&self, bundle: ContentBundle) -> Result<ImportReport, ImportError> {
        let subjects = bundle
            .subjects
            .into_iter()
            .map(build_subject)
            .collect::<Result<Vec<_>, _>>()?;
        let topics = bundle
            .topics
            .into_iter()
            .map(build_topic)
            .collect::<Result<Vec<_>, _>>()?;
        let quizzes = bundle
            .quizzes
            .into_iter()
            .map(build_quiz)
            .collect::<Result<Vec<_>, _>>()?;
        let questions = bundle
            .questions
            .into_iter()
            .map(build_question)
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = ImportReport::default();
        for subject in &subjects {
            self.storage.subjects.upsert_subject(subject).await?;
            report.subjects += 1;
        }
        for topic in &topics {
            self.storage.topics.upsert_topic(topic).await?;
            report.topics += 1;
        }
        for quiz in &quizzes {
            self.storage.quizzes.upsert_quiz(quiz).await?;
            report.quizzes += 1;
        }
        for question in &questions {
            self.storage.questions.upsert_question(question).await?;
            report.questions += 1;
        }

        Ok(report)
    }
}

fn build_subject(entry: SubjectEntry) -> Result<Subject, ImportError> {
    let id = match entry.id {
        Some(id) => SubjectId::new(id)?,
        None => SubjectId::generate(),
    };
    Ok(Subject::new(id, entry.name, entry.description, entry.image_url)
        .map_err(quiz_core::Error::from)?)
}

fn build_topic(entry: TopicEntry) -> Result<Topic, ImportError> {
    let id = match entry.id {
        Some(id) => TopicId::new(id)?,
        None => TopicId::generate(),
    };
    Ok(Topic::new(
        id,
        entry.name,
        entry.description,
        SubjectId::new(entry.subject_id)?,
        entry.image_url,
    )
    .map_err(quiz_core::Error::from)?)
}

fn build_quiz(entry: QuizEntry) -> Result<Quiz, ImportError> {
    let id = match entry.id {
        Some(id) => QuizId::new(id)?,
        None => QuizId::generate(),
    };
    Ok(Quiz::new(
        id,
        entry.title,
        entry.description,
        TopicId::new(entry.topic_id)?,
        SubjectId::new(entry.subject_id)?,
        entry.time_limit_minutes.unwrap_or(DEFAULT_TIME_LIMIT_MINUTES),
        entry
            .passing_percentage
            .unwrap_or(DEFAULT_PASSING_PERCENTAGE),
    )
    .map_err(quiz_core::Error::from)?)
}

fn build_question(entry: QuestionEntry) -> Result<Question, ImportError> {
    let id = match entry.id {
        Some(id) => QuestionId::new(id)?,
        None => QuestionId::generate(),
    };
    Ok(Question::new(
        id,
        entry.text,
        entry.options,
        entry.correct_option_index,
        entry.explanation,
        QuizId::new(entry.quiz_id)?,
    )
    .map_err(quiz_core::Error::from)?)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
