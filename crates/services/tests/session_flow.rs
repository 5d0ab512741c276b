use std::sync::Arc;

use quiz_core::model::{Question, QuestionId, Quiz, QuizId, SubjectId, TopicId, UserId};
use quiz_core::session::Advance;
use quiz_core::time::fixed_now;
use services::{Clock, ProfileService, SessionRunner};
use storage::repository::{InMemoryRepository, QuestionRepository, QuizRepository};

async fn seed(repo: &InMemoryRepository, quiz_id: &str, correct: &[usize]) -> QuizId {
    let quiz = Quiz::new(
        QuizId::new(quiz_id).unwrap(),
        "Smoke Quiz",
        None,
        TopicId::new("t1").unwrap(),
        SubjectId::new("s1").unwrap(),
        10,
        70,
    )
    .unwrap();
    repo.upsert_quiz(&quiz).await.unwrap();

    for (i, correct_index) in correct.iter().enumerate() {
        let question = Question::new(
            QuestionId::new(format!("q{i}")).unwrap(),
            format!("Prompt {i}?"),
            vec!["a".into(), "b".into(), "c".into()],
            *correct_index,
            None,
            quiz.id().clone(),
        )
        .unwrap();
        repo.upsert_question(&question).await.unwrap();
    }
    quiz.id().clone()
}

fn runner(repo: &InMemoryRepository) -> SessionRunner {
    SessionRunner::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

#[tokio::test]
async fn full_attempt_accumulates_into_profile() {
    let repo = InMemoryRepository::new();
    let quiz_id = seed(&repo, "z1", &[0, 1, 2]).await;

    let profiles = ProfileService::new(Arc::new(repo.clone()), Clock::fixed(fixed_now()));
    let user_id = UserId::new("u1").unwrap();
    profiles
        .register(user_id.clone(), "sam", "sam@example.com", None)
        .await
        .unwrap();

    let runner = runner(&repo);
    let mut active = runner.start(&quiz_id).await.unwrap();

    // answer every question correctly, walking the submit/advance protocol
    loop {
        let correct = active.session().current_question().unwrap().correct_option_index();
        let outcome = active.submit(correct).unwrap();
        assert!(outcome.correct);
        if active.advance().unwrap() == Advance::Finished {
            break;
        }
    }

    let outcome = active.outcome();
    assert_eq!(outcome.score, 3);
    assert_eq!(outcome.percentage, 100);
    assert!(outcome.passed);

    let profile = runner.finalize_attempt(&mut active, &user_id).await.unwrap();
    assert_eq!(profile.total_score, 3);
    assert_eq!(profile.quizzes_taken, 1);
    assert_eq!(profile.questions_answered, 3);

    // finalizing again reads the profile back instead of recording twice
    let again = runner.finalize_attempt(&mut active, &user_id).await.unwrap();
    assert_eq!(again.quizzes_taken, 1);
}

#[tokio::test]
async fn timed_out_attempt_records_partial_score() {
    let repo = InMemoryRepository::new();
    let quiz_id = seed(&repo, "z2", &[0, 0, 0, 0]).await;

    let profiles = ProfileService::new(Arc::new(repo.clone()), Clock::fixed(fixed_now()));
    let user_id = UserId::new("u2").unwrap();
    profiles
        .register(user_id.clone(), "kim", "kim@example.com", None)
        .await
        .unwrap();

    let runner = runner(&repo);
    let mut active = runner.start(&quiz_id).await.unwrap();

    // one correct answer, then the clock runs out
    active.submit(0).unwrap();
    active.advance().unwrap();
    assert!(active.tick(fixed_now() + chrono::Duration::minutes(10)));

    let profile = runner.finalize_attempt(&mut active, &user_id).await.unwrap();
    assert_eq!(profile.total_score, 1);
    assert_eq!(profile.quizzes_taken, 1);
    assert_eq!(profile.questions_answered, 4);
}
