use chrono::Duration;
use quiz_core::model::{
    Difficulty, LearningEvent, Mastery, MasteryScore, Question, QuestionId, StudentId, Topic,
    TopicId,
};
use quiz_core::time::fixed_now;
use storage::repository::{
    LearningEventRepository, MasteryRepository, QuestionRepository, StorageError, TopicRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn topic(id: u64, name: &str, stage: &str) -> Topic {
    Topic::new(
        TopicId::new(id),
        "Maths",
        name,
        name.to_lowercase().replace(' ', "-"),
        stage,
    )
    .unwrap()
}

fn question(id: u64, topic_id: u64, level: u8, explanation: Option<&str>) -> Question {
    Question::new(
        QuestionId::new(id),
        TopicId::new(topic_id),
        format!("Question {id}"),
        "right",
        vec!["wrong".into(), "also, wrong".into()],
        Difficulty::new(level).unwrap(),
        explanation.map(str::to_owned),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_topics_and_questions() {
    let repo = connect("memdb_topics_questions").await;

    repo.upsert_topic(&topic(1, "Fractions", "KS2")).await.unwrap();
    repo.upsert_topic(&topic(2, "Algebra", "KS3")).await.unwrap();

    let ks2 = repo.list_topics(Some("KS2")).await.unwrap();
    assert_eq!(ks2.len(), 1);
    assert_eq!(ks2[0].slug(), "fractions");

    let all = repo.list_topics(None).await.unwrap();
    let names: Vec<_> = all.iter().map(Topic::name).collect();
    assert_eq!(names, vec!["Algebra", "Fractions"]);

    assert!(repo.get_topic(TopicId::new(9)).await.unwrap().is_none());

    let q = question(10, 1, 3, Some("Because."));
    repo.upsert_question(&q).await.unwrap();
    repo.upsert_question(&question(11, 1, 1, None)).await.unwrap();

    let fetched = repo.get_question(QuestionId::new(10)).await.unwrap();
    assert_eq!(fetched, q);
    assert_eq!(fetched.distractors(), ["wrong", "also, wrong"]);

    let for_topic = repo.questions_for_topic(TopicId::new(1)).await.unwrap();
    assert_eq!(for_topic.len(), 2);
    assert!(repo.questions_for_topic(TopicId::new(2)).await.unwrap().is_empty());

    assert!(matches!(
        repo.get_question(QuestionId::new(99)).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_mastery_upsert_is_last_write_wins() {
    let repo = connect("memdb_mastery").await;
    repo.upsert_topic(&topic(1, "Fractions", "KS2")).await.unwrap();

    let student = StudentId::new(7);
    let topic_id = TopicId::new(1);
    assert!(repo.get_mastery(student, topic_id).await.unwrap().is_none());

    let now = fixed_now();
    repo.upsert_mastery(&Mastery::new(student, topic_id, MasteryScore::FULL, now))
        .await
        .unwrap();
    let later = now + Duration::minutes(1);
    repo.upsert_mastery(&Mastery::new(student, topic_id, MasteryScore::NONE, later))
        .await
        .unwrap();

    let stored = repo.get_mastery(student, topic_id).await.unwrap().unwrap();
    assert_eq!(stored.score, MasteryScore::NONE);
    assert_eq!(stored.updated_at, later);

    let all = repo.mastery_for_student(student).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn sqlite_event_log_appends() {
    let repo = connect("memdb_events").await;
    repo.upsert_topic(&topic(1, "Fractions", "KS2")).await.unwrap();
    repo.upsert_question(&question(1, 1, 1, None)).await.unwrap();

    let student = StudentId::new(3);
    let event = LearningEvent::new(student, QuestionId::new(1), true, 12, fixed_now());
    let first = repo.append_event(&event).await.unwrap();
    let second = repo.append_event(&event).await.unwrap();
    assert!(second > first);

    let logged = repo.events_for_student(student).await.unwrap();
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].id, first);
    assert_eq!(logged[0].event, event);
}

#[tokio::test]
async fn sqlite_rejects_question_for_unknown_topic() {
    let repo = connect("memdb_fk").await;
    let err = repo
        .upsert_question(&question(1, 42, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Connection(_)));
}
