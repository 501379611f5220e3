use quiz_core::model::{
    Difficulty, Mastery, MasteryScore, Question, QuestionId, StudentId, Topic, TopicId,
};
use quiz_core::policy::MasteryPolicy;
use quiz_core::time::fixed_now;
use services::{AnswerSubmission, AppServices, Clock, StudentContext};
use storage::repository::{
    InMemoryRepository, LearningEventRepository, MasteryRepository, QuestionRepository, Storage,
    TopicRepository,
};

async fn seeded() -> (InMemoryRepository, AppServices, TopicId) {
    let repo = InMemoryRepository::new();
    let topic_id = TopicId::new(1);
    repo.upsert_topic(&Topic::new(topic_id, "Maths", "Times tables", "times-tables", "KS2").unwrap())
        .await
        .unwrap();

    for (id, level, explanation) in [
        (1, 1, None),
        (2, 1, Some("6 x 7 is 42.")),
        (3, 3, Some("9 x 8 is 72.")),
        (4, 5, Some("12 x 12 is 144.")),
    ] {
        let question = Question::new(
            QuestionId::new(id),
            topic_id,
            format!("Question {id}"),
            format!("{}", id * 10),
            vec!["1".into(), "2".into(), "3".into()],
            Difficulty::new(level).unwrap(),
            explanation.map(str::to_owned),
        )
        .unwrap();
        repo.upsert_question(&question).await.unwrap();
    }

    let storage = Storage::from_repository(repo.clone());
    let services =
        AppServices::from_storage(&storage, Clock::fixed(fixed_now()), MasteryPolicy::default());
    (repo, services, topic_id)
}

#[tokio::test]
async fn new_student_answers_correctly_and_gains_mastery() {
    let (repo, services, topic_id) = seeded().await;
    let ctx = StudentContext::new(StudentId::new(100));
    let quiz = services.quiz();

    let question = quiz.select_next_question(&ctx, topic_id).await.unwrap();
    assert_eq!(question.difficulty(), Difficulty::EASIEST);

    let outcome = quiz
        .record_answer(
            &ctx,
            &AnswerSubmission {
                question_id: question.id(),
                answer: question.correct_answer().to_owned(),
                time_taken_seconds: 4,
            },
        )
        .await
        .unwrap();

    assert!(outcome.correct);
    assert_eq!(outcome.coins_earned, 10);
    assert_eq!(outcome.new_mastery, 1.0);

    let stored = repo.get_mastery(ctx.student_id(), topic_id).await.unwrap().unwrap();
    assert_eq!(stored.score, MasteryScore::FULL);

    // Full mastery moves the next pick to the hardest band.
    let next = quiz.select_next_question(&ctx, topic_id).await.unwrap();
    assert_eq!(next.difficulty(), Difficulty::HARDEST);
}

#[tokio::test]
async fn mastered_student_answers_wrong_and_drops_to_zero() {
    let (repo, services, topic_id) = seeded().await;
    let ctx = StudentContext::new(StudentId::new(200));
    repo.upsert_mastery(&Mastery::new(
        ctx.student_id(),
        topic_id,
        MasteryScore::FULL,
        fixed_now(),
    ))
    .await
    .unwrap();

    let outcome = services
        .quiz()
        .record_answer(
            &ctx,
            &AnswerSubmission {
                question_id: QuestionId::new(4),
                answer: "1".into(),
                time_taken_seconds: 9,
            },
        )
        .await
        .unwrap();

    assert!(!outcome.correct);
    assert_eq!(outcome.coins_earned, 0);
    assert_eq!(outcome.new_mastery, 0.0);
    assert_eq!(outcome.feedback, "12 x 12 is 144.");
    assert_eq!(outcome.correct_answer, "40");

    let progress = services.topics().progress(&ctx).await.unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].score, MasteryScore::NONE);
}

#[tokio::test]
async fn every_answer_appends_one_event() {
    let (repo, services, _topic_id) = seeded().await;
    let ctx = StudentContext::new(StudentId::new(300));
    let submission = AnswerSubmission {
        question_id: QuestionId::new(2),
        answer: "20".into(),
        time_taken_seconds: 5,
    };

    services.quiz().record_answer(&ctx, &submission).await.unwrap();
    services.quiz().record_answer(&ctx, &submission).await.unwrap();

    let events = repo.events_for_student(ctx.student_id()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|r| r.event.correct && r.event.time_taken_secs == 5));
    assert_eq!(events[0].event.answered_at, fixed_now());
}

#[tokio::test]
async fn students_do_not_share_mastery() {
    let (_repo, services, topic_id) = seeded().await;
    let alice = StudentContext::new(StudentId::new(1));
    let bob = StudentContext::new(StudentId::new(2));

    services
        .quiz()
        .record_answer(
            &alice,
            &AnswerSubmission {
                question_id: QuestionId::new(1),
                answer: "10".into(),
                time_taken_seconds: 1,
            },
        )
        .await
        .unwrap();

    let quiz = services.quiz();
    assert_eq!(
        quiz.current_mastery(&alice, topic_id).await.unwrap(),
        MasteryScore::FULL
    );
    assert_eq!(
        quiz.current_mastery(&bob, topic_id).await.unwrap(),
        MasteryScore::NONE
    );
}
