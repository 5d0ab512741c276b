use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::{
    Question, QuestionId, Quiz, QuizId, Subject, SubjectId, Topic, TopicId, UserId,
};

use crate::live::{LiveTable, Snapshots};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a user account's quiz history.
///
/// The identity provider owns authentication; this record only carries the
/// profile fields the quiz flow reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub total_score: u64,
    pub quizzes_taken: u32,
    pub questions_answered: u64,
    pub joined_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile with zeroed counters.
    #[must_use]
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        photo_url: Option<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            email: email.into(),
            photo_url,
            total_score: 0,
            quizzes_taken: 0,
            questions_answered: 0,
            joined_at,
        }
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Persist or update a subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be stored.
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError>;

    /// Fetch a subject by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_subject(&self, id: &SubjectId) -> Result<Subject, StorageError>;

    /// List all subjects ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError>;

    /// Delete a subject and everything under it (topics, quizzes, questions).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_subject(&self, id: &SubjectId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Persist or update a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the topic cannot be stored.
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// List the topics under a subject, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn topics_by_subject(&self, subject_id: &SubjectId)
    -> Result<Vec<Topic>, StorageError>;

    /// Delete a topic and everything under it (quizzes, questions).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_topic(&self, id: &TopicId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or update a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// Fetch a quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz, StorageError>;

    /// List the quizzes under a topic, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn quizzes_by_topic(&self, topic_id: &TopicId) -> Result<Vec<Quiz>, StorageError>;

    /// Delete a quiz and its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_quiz(&self, id: &QuizId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// The ordered question sequence for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures. An empty quiz is not an
    /// error here; the session layer decides how to surface it.
    async fn questions_by_quiz(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError>;

    /// Delete a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_question(&self, id: &QuestionId)
    -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Persist or update a user profile, replacing the whole record.
    ///
    /// Callers that must keep an existing record (registration, counters)
    /// read before writing; see `ProfileService::register`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// Fetch a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, StorageError>;

    /// Accumulate one finished attempt into the profile counters.
    ///
    /// Adds `score` to the lifetime total, `total_questions` to the answered
    /// count, and bumps the attempt counter. At-least-once: a retried call
    /// records again, which the callers accept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the profile does not exist.
    async fn record_attempt(
        &self,
        user_id: &UserId,
        score: usize,
        total_questions: usize,
    ) -> Result<UserProfile, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// In-memory store standing in for the hosted realtime database.
///
/// Backs every repository trait and pushes live-query snapshots after each
/// mutation, the way the hosted store notifies its listeners.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    subjects: Arc<Mutex<HashMap<SubjectId, Subject>>>,
    topics: Arc<Mutex<HashMap<TopicId, Topic>>>,
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
    live_topics: Arc<LiveTable<SubjectId, Topic>>,
    live_quizzes: Arc<LiveTable<TopicId, Quiz>>,
    live_questions: Arc<LiveTable<QuizId, Question>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to live snapshots of a quiz's question list.
    ///
    /// The first `recv` yields the list currently in effect; dropping the
    /// handle unsubscribes.
    #[must_use]
    pub fn watch_questions(&self, quiz_id: &QuizId) -> Snapshots<Question> {
        self.live_questions
            .subscribe(quiz_id, self.questions_snapshot(quiz_id))
    }

    /// Subscribe to live snapshots of a subject's topic list.
    #[must_use]
    pub fn watch_topics(&self, subject_id: &SubjectId) -> Snapshots<Topic> {
        self.live_topics
            .subscribe(subject_id, self.topics_snapshot(subject_id))
    }

    /// Subscribe to live snapshots of a topic's quiz list.
    #[must_use]
    pub fn watch_quizzes(&self, topic_id: &TopicId) -> Snapshots<Quiz> {
        self.live_quizzes
            .subscribe(topic_id, self.quizzes_snapshot(topic_id))
    }

    fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StorageError> {
        m.lock().map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn topics_snapshot(&self, subject_id: &SubjectId) -> Vec<Topic> {
        let guard = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        let mut topics: Vec<Topic> = guard
            .values()
            .filter(|t| t.subject_id() == subject_id)
            .cloned()
            .collect();
        topics.sort_by(|a, b| a.name().cmp(b.name()));
        topics
    }

    fn quizzes_snapshot(&self, topic_id: &TopicId) -> Vec<Quiz> {
        let guard = self.quizzes.lock().unwrap_or_else(|e| e.into_inner());
        let mut quizzes: Vec<Quiz> = guard
            .values()
            .filter(|q| q.topic_id() == topic_id)
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| a.title().cmp(b.title()));
        quizzes
    }

    fn questions_snapshot(&self, quiz_id: &QuizId) -> Vec<Question> {
        let guard = self.questions.lock().unwrap_or_else(|e| e.into_inner());
        let mut questions: Vec<Question> = guard
            .values()
            .filter(|q| q.quiz_id() == quiz_id)
            .cloned()
            .collect();
        questions.sort_by(|a, b| a.id().cmp(b.id()));
        questions
    }

    fn remove_questions_of_quiz(&self, quiz_id: &QuizId) -> Result<(), StorageError> {
        {
            let mut guard = Self::lock(&self.questions)?;
            guard.retain(|_, q| q.quiz_id() != quiz_id);
        }
        self.live_questions.publish(quiz_id, Vec::new());
        Ok(())
    }

    fn remove_quizzes_of_topic(&self, topic_id: &TopicId) -> Result<(), StorageError> {
        let removed: Vec<Quiz> = {
            let mut guard = Self::lock(&self.quizzes)?;
            let ids: Vec<QuizId> = guard
                .values()
                .filter(|q| q.topic_id() == topic_id)
                .map(|q| q.id().clone())
                .collect();
            ids.iter().filter_map(|id| guard.remove(id)).collect()
        };
        self.live_quizzes.publish(topic_id, Vec::new());
        for quiz in &removed {
            self.remove_questions_of_quiz(quiz.id())?;
        }
        Ok(())
    }

    fn remove_topics_of_subject(&self, subject_id: &SubjectId) -> Result<(), StorageError> {
        let removed: Vec<Topic> = {
            let mut guard = Self::lock(&self.topics)?;
            let ids: Vec<TopicId> = guard
                .values()
                .filter(|t| t.subject_id() == subject_id)
                .map(|t| t.id().clone())
                .collect();
            ids.iter().filter_map(|id| guard.remove(id)).collect()
        };
        self.live_topics.publish(subject_id, Vec::new());
        for topic in &removed {
            self.remove_quizzes_of_topic(topic.id())?;
        }
        Ok(())
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.subjects)?;
        guard.insert(subject.id().clone(), subject.clone());
        Ok(())
    }

    async fn get_subject(&self, id: &SubjectId) -> Result<Subject, StorageError> {
        let guard = Self::lock(&self.subjects)?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let guard = Self::lock(&self.subjects)?;
        let mut subjects: Vec<Subject> = guard.values().cloned().collect();
        subjects.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(subjects)
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<(), StorageError> {
        {
            let mut guard = Self::lock(&self.subjects)?;
            guard.remove(id).ok_or(StorageError::NotFound)?;
        }
        self.remove_topics_of_subject(id)
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        {
            let mut guard = Self::lock(&self.topics)?;
            guard.insert(topic.id().clone(), topic.clone());
        }
        self.live_topics
            .publish(topic.subject_id(), self.topics_snapshot(topic.subject_id()));
        Ok(())
    }

    async fn topics_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<Topic>, StorageError> {
        Ok(self.topics_snapshot(subject_id))
    }

    async fn delete_topic(&self, id: &TopicId) -> Result<(), StorageError> {
        let removed = {
            let mut guard = Self::lock(&self.topics)?;
            guard.remove(id)
        };
        let topic = removed.ok_or(StorageError::NotFound)?;
        self.live_topics
            .publish(topic.subject_id(), self.topics_snapshot(topic.subject_id()));
        self.remove_quizzes_of_topic(id)
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        {
            let mut guard = Self::lock(&self.quizzes)?;
            guard.insert(quiz.id().clone(), quiz.clone());
        }
        self.live_quizzes
            .publish(quiz.topic_id(), self.quizzes_snapshot(quiz.topic_id()));
        Ok(())
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz, StorageError> {
        let guard = Self::lock(&self.quizzes)?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn quizzes_by_topic(&self, topic_id: &TopicId) -> Result<Vec<Quiz>, StorageError> {
        Ok(self.quizzes_snapshot(topic_id))
    }

    async fn delete_quiz(&self, id: &QuizId) -> Result<(), StorageError> {
        let removed = {
            let mut guard = Self::lock(&self.quizzes)?;
            guard.remove(id)
        };
        let quiz = removed.ok_or(StorageError::NotFound)?;
        self.live_quizzes
            .publish(quiz.topic_id(), self.quizzes_snapshot(quiz.topic_id()));
        self.remove_questions_of_quiz(id)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        {
            let mut guard = Self::lock(&self.questions)?;
            guard.insert(question.id().clone(), question.clone());
        }
        self.live_questions.publish(
            question.quiz_id(),
            self.questions_snapshot(question.quiz_id()),
        );
        Ok(())
    }

    async fn questions_by_quiz(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError> {
        Ok(self.questions_snapshot(quiz_id))
    }

    async fn delete_question(
        &self,
        id: &QuestionId,
    ) -> Result<(), StorageError> {
        let removed = {
            let mut guard = Self::lock(&self.questions)?;
            guard.remove(id)
        };
        let question = removed.ok_or(StorageError::NotFound)?;
        self.live_questions.publish(
            question.quiz_id(),
            self.questions_snapshot(question.quiz_id()),
        );
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.profiles)?;
        guard.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, StorageError> {
        let guard = Self::lock(&self.profiles)?;
        guard.get(user_id).cloned().ok_or(StorageError::NotFound)
    }

    async fn record_attempt(
        &self,
        user_id: &UserId,
        score: usize,
        total_questions: usize,
    ) -> Result<UserProfile, StorageError> {
        let mut guard = Self::lock(&self.profiles)?;
        let profile = guard.get_mut(user_id).ok_or(StorageError::NotFound)?;
        profile.total_score += score as u64;
        profile.questions_answered += total_questions as u64;
        profile.quizzes_taken += 1;
        Ok(profile.clone())
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the content and profile repositories behind trait objects so
/// backends can be swapped without touching the services layer.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self::from_in_memory(repo)
    }

    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        Self {
            subjects: Arc::new(repo.clone()),
            topics: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            profiles: Arc::new(repo),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn build_subject(id: &str, name: &str) -> Subject {
        Subject::new(SubjectId::new(id).unwrap(), name, None, None).unwrap()
    }

    fn build_question(id: &str, quiz: &QuizId) -> Question {
        Question::new(
            QuestionId::new(id).unwrap(),
            format!("Prompt {id}"),
            vec!["a".into(), "b".into()],
            0,
            None,
            quiz.clone(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn subjects_round_trip_sorted_by_name() {
        let repo = InMemoryRepository::new();
        repo.upsert_subject(&build_subject("s2", "Physics"))
            .await
            .unwrap();
        repo.upsert_subject(&build_subject("s1", "Biology"))
            .await
            .unwrap();

        let subjects = repo.list_subjects().await.unwrap();
        let names: Vec<&str> = subjects.iter().map(Subject::name).collect();
        assert_eq!(names, ["Biology", "Physics"]);
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_quiz(&QuizId::new("nope").unwrap()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn question_upsert_pushes_live_snapshot() {
        let repo = InMemoryRepository::new();
        let quiz_id = QuizId::new("quiz-1").unwrap();

        let mut sub = repo.watch_questions(&quiz_id);
        assert_eq!(sub.recv().await, Some(Vec::new()));

        repo.upsert_question(&build_question("qa", &quiz_id))
            .await
            .unwrap();
        let snapshot = sub.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id().as_str(), "qa");
    }

    #[tokio::test]
    async fn delete_question_pushes_updated_snapshot() {
        let repo = InMemoryRepository::new();
        let quiz_id = QuizId::new("quiz-1").unwrap();
        repo.upsert_question(&build_question("qa", &quiz_id))
            .await
            .unwrap();
        repo.upsert_question(&build_question("qb", &quiz_id))
            .await
            .unwrap();

        let mut sub = repo.watch_questions(&quiz_id);
        assert_eq!(sub.recv().await.unwrap().len(), 2);

        repo.delete_question(&QuestionId::new("qa").unwrap())
            .await
            .unwrap();
        let snapshot = sub.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id().as_str(), "qb");
    }

    async fn seed_hierarchy(repo: &InMemoryRepository) -> (SubjectId, TopicId, QuizId) {
        let subject = build_subject("s1", "Mathematics");
        let topic = Topic::new(
            TopicId::new("t1").unwrap(),
            "Algebra",
            None,
            subject.id().clone(),
            None,
        )
        .unwrap();
        let quiz = Quiz::new(
            QuizId::new("z1").unwrap(),
            "Linear equations",
            None,
            topic.id().clone(),
            subject.id().clone(),
            10,
            70,
        )
        .unwrap();

        repo.upsert_subject(&subject).await.unwrap();
        repo.upsert_topic(&topic).await.unwrap();
        repo.upsert_quiz(&quiz).await.unwrap();
        repo.upsert_question(&build_question("qa", quiz.id()))
            .await
            .unwrap();
        (
            subject.id().clone(),
            topic.id().clone(),
            quiz.id().clone(),
        )
    }

    #[tokio::test]
    async fn delete_quiz_removes_its_questions() {
        let repo = InMemoryRepository::new();
        let (_, topic_id, quiz_id) = seed_hierarchy(&repo).await;

        repo.delete_quiz(&quiz_id).await.unwrap();

        assert!(repo.questions_by_quiz(&quiz_id).await.unwrap().is_empty());
        assert!(repo.quizzes_by_topic(&topic_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_subject_cascades_through_hierarchy() {
        let repo = InMemoryRepository::new();
        let (subject_id, topic_id, quiz_id) = seed_hierarchy(&repo).await;

        let mut questions = repo.watch_questions(&quiz_id);
        assert_eq!(questions.recv().await.unwrap().len(), 1);

        repo.delete_subject(&subject_id).await.unwrap();

        assert!(repo.topics_by_subject(&subject_id).await.unwrap().is_empty());
        assert!(repo.quizzes_by_topic(&topic_id).await.unwrap().is_empty());
        assert!(repo.questions_by_quiz(&quiz_id).await.unwrap().is_empty());
        // subscribers see the emptied list, not a stale snapshot
        assert_eq!(questions.recv().await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn record_attempt_accumulates() {
        let repo = InMemoryRepository::new();
        let user_id = UserId::new("u1").unwrap();
        let profile = UserProfile::new(user_id.clone(), "sam", "s@x.io", None, fixed_now());
        repo.upsert_profile(&profile).await.unwrap();

        repo.record_attempt(&user_id, 3, 5).await.unwrap();
        let updated = repo.record_attempt(&user_id, 2, 4).await.unwrap();

        assert_eq!(updated.total_score, 5);
        assert_eq!(updated.quizzes_taken, 2);
        assert_eq!(updated.questions_answered, 9);
    }

    #[tokio::test]
    async fn record_attempt_requires_profile() {
        let repo = InMemoryRepository::new();
        let err = repo
            .record_attempt(&UserId::new("ghost").unwrap(), 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
