use sqlx::Row;

use quiz_core::model::{
    Question, QuestionId, Quiz, QuizId, Subject, SubjectId, Topic, TopicId, UserId,
};

use crate::repository::{StorageError, UserProfile};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn map_subject_row(row: &sqlx::sqlite::SqliteRow) -> Result<Subject, StorageError> {
    let id = SubjectId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    Subject::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        row.try_get::<Option<String>, _>("image_url").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_topic_row(row: &sqlx::sqlite::SqliteRow) -> Result<Topic, StorageError> {
    let id = TopicId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let subject_id =
        SubjectId::new(row.try_get::<String, _>("subject_id").map_err(ser)?).map_err(ser)?;
    Topic::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        subject_id,
        row.try_get::<Option<String>, _>("image_url").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_quiz_row(row: &sqlx::sqlite::SqliteRow) -> Result<Quiz, StorageError> {
    let id = QuizId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let topic_id =
        TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?).map_err(ser)?;
    let subject_id =
        SubjectId::new(row.try_get::<String, _>("subject_id").map_err(ser)?).map_err(ser)?;

    let time_limit_i64: i64 = row.try_get("time_limit_minutes").map_err(ser)?;
    let time_limit = u32::try_from(time_limit_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid time limit: {time_limit_i64}")))?;

    let passing_i64: i64 = row.try_get("passing_percentage").map_err(ser)?;
    let passing = u8::try_from(passing_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid passing percentage: {passing_i64}"))
    })?;

    Quiz::new(
        id,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        topic_id,
        subject_id,
        time_limit,
        passing,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let quiz_id = QuizId::new(row.try_get::<String, _>("quiz_id").map_err(ser)?).map_err(ser)?;

    // Options live in a JSON array column; the store has no native lists.
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;

    let correct_i64: i64 = row.try_get("correct_option_index").map_err(ser)?;
    let correct = usize::try_from(correct_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid correct option index: {correct_i64}"))
    })?;

    Question::new(
        id,
        row.try_get::<String, _>("text").map_err(ser)?,
        options,
        correct,
        row.try_get::<Option<String>, _>("explanation").map_err(ser)?,
        quiz_id,
    )
    .map_err(ser)
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, StorageError> {
    let user_id = UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?;

    let total_score_i64: i64 = row.try_get("total_score").map_err(ser)?;
    let total_score = u64::try_from(total_score_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid total score: {total_score_i64}")))?;

    let quizzes_taken_i64: i64 = row.try_get("quizzes_taken").map_err(ser)?;
    let quizzes_taken = u32::try_from(quizzes_taken_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid quizzes taken: {quizzes_taken_i64}"))
    })?;

    let answered_i64: i64 = row.try_get("questions_answered").map_err(ser)?;
    let questions_answered = u64::try_from(answered_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid questions answered: {answered_i64}"))
    })?;

    Ok(UserProfile {
        user_id,
        username: row.try_get("username").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
        photo_url: row.try_get("photo_url").map_err(ser)?,
        total_score,
        quizzes_taken,
        questions_answered,
        joined_at: row.try_get("joined_at").map_err(ser)?,
    })
}
