use quiz_core::model::{Question, QuestionId, Quiz, QuizId, Subject, SubjectId, Topic, TopicId};
use storage::repository::Storage;

use crate::error::ContentError;

/// Read/write surface over the content store.
///
/// Thin by design: each call is one repository round trip, and failures come
/// back as `ContentError` so the presenter can show a retryable load state.
/// The session layer consumes `questions` exactly once, at start time.
#[derive(Clone)]
pub struct ContentService {
    storage: Storage,
}

impl ContentService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All subjects, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn subjects(&self) -> Result<Vec<Subject>, ContentError> {
        Ok(self.storage.subjects.list_subjects().await?)
    }

    /// Topics under a subject, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn topics(&self, subject_id: &SubjectId) -> Result<Vec<Topic>, ContentError> {
        Ok(self.storage.topics.topics_by_subject(subject_id).await?)
    }

    /// Quizzes under a topic, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn quizzes(&self, topic_id: &TopicId) -> Result<Vec<Quiz>, ContentError> {
        Ok(self.storage.quizzes.quizzes_by_topic(topic_id).await?)
    }

    /// The ordered question sequence for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures. An empty list is a valid
    /// result; whether that is an error belongs to the session layer.
    pub async fn questions(&self, quiz_id: &QuizId) -> Result<Vec<Question>, ContentError> {
        Ok(self.storage.questions.questions_by_quiz(quiz_id).await?)
    }

    /// Persist or update a subject.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn save_subject(&self, subject: &Subject) -> Result<(), ContentError> {
        Ok(self.storage.subjects.upsert_subject(subject).await?)
    }

    /// Persist or update a topic.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn save_topic(&self, topic: &Topic) -> Result<(), ContentError> {
        Ok(self.storage.topics.upsert_topic(topic).await?)
    }

    /// Persist or update a quiz.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn save_quiz(&self, quiz: &Quiz) -> Result<(), ContentError> {
        Ok(self.storage.quizzes.upsert_quiz(quiz).await?)
    }

    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on storage failures.
    pub async fn save_question(&self, question: &Question) -> Result<(), ContentError> {
        Ok(self.storage.questions.upsert_question(question).await?)
    }

    /// Delete a subject.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the subject is missing or storage fails.
    pub async fn delete_subject(&self, subject_id: &SubjectId) -> Result<(), ContentError> {
        Ok(self.storage.subjects.delete_subject(subject_id).await?)
    }

    /// Delete a topic.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the topic is missing or storage fails.
    pub async fn delete_topic(&self, topic_id: &TopicId) -> Result<(), ContentError> {
        Ok(self.storage.topics.delete_topic(topic_id).await?)
    }

    /// Delete a quiz.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the quiz is missing or storage fails.
    pub async fn delete_quiz(&self, quiz_id: &QuizId) -> Result<(), ContentError> {
        Ok(self.storage.quizzes.delete_quiz(quiz_id).await?)
    }

    /// Delete a question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the question is missing or storage fails.
    pub async fn delete_question(&self, question_id: &QuestionId) -> Result<(), ContentError> {
        Ok(self.storage.questions.delete_question(question_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::Storage;

    fn seed() -> (ContentService, QuizId) {
        let storage = Storage::in_memory();
        (ContentService::new(storage), QuizId::new("z1").unwrap())
    }

    #[tokio::test]
    async fn questions_for_unknown_quiz_are_empty_not_an_error() {
        let (service, quiz_id) = seed();
        let questions = service.questions(&quiz_id).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn saved_questions_come_back_ordered() {
        let (service, quiz_id) = seed();
        for id in ["qb", "qa"] {
            let question = Question::new(
                QuestionId::new(id).unwrap(),
                format!("Prompt {id}?"),
                vec!["x".into(), "y".into()],
                0,
                None,
                quiz_id.clone(),
            )
            .unwrap();
            service.save_question(&question).await.unwrap();
        }

        let questions = service.questions(&quiz_id).await.unwrap();
        let ids: Vec<&str> = questions.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, ["qa", "qb"]);
    }
}
