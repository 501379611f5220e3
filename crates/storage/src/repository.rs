use async_trait::async_trait;
use quiz_core::model::{
    LearningEvent, Mastery, Question, QuestionId, StudentId, Topic, TopicId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted learning event together with its log row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningEventRecord {
    pub id: i64,
    pub event: LearningEvent,
}

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Persist or update a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the topic cannot be stored.
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// Fetch a topic by ID, `None` when unknown.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError>;

    /// List topics, optionally restricted to one stage, ordered by subject then name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_topics(&self, stage: Option<&str>) -> Result<Vec<Topic>, StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Fetch a question by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError>;

    /// All questions of a topic, in id order. Empty for unknown topics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn questions_for_topic(&self, topic_id: TopicId)
    -> Result<Vec<Question>, StorageError>;
}

#[async_trait]
pub trait MasteryRepository: Send + Sync {
    /// Current mastery for the pair, `None` before the first answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_mastery(
        &self,
        student_id: StudentId,
        topic_id: TopicId,
    ) -> Result<Option<Mastery>, StorageError>;

    /// Insert or overwrite mastery for the pair. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_mastery(&self, mastery: &Mastery) -> Result<(), StorageError>;

    /// Every mastery record held for a student, ordered by topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn mastery_for_student(&self, student_id: StudentId)
    -> Result<Vec<Mastery>, StorageError>;
}

#[async_trait]
pub trait LearningEventRepository: Send + Sync {
    /// Append an event to the log and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the event cannot be stored.
    async fn append_event(&self, event: &LearningEvent) -> Result<i64, StorageError>;

    /// Events for a student in append order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn events_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<LearningEventRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    topics: Arc<Mutex<HashMap<TopicId, Topic>>>,
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    mastery: Arc<Mutex<HashMap<(StudentId, TopicId), Mastery>>>,
    events: Arc<Mutex<Vec<LearningEventRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut guard = self.topics.lock().map_err(poisoned)?;
        guard.insert(topic.id(), topic.clone());
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        let guard = self.topics.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_topics(&self, stage: Option<&str>) -> Result<Vec<Topic>, StorageError> {
        let guard = self.topics.lock().map_err(poisoned)?;
        let mut topics: Vec<Topic> = guard
            .values()
            .filter(|t| stage.is_none_or(|s| t.stage() == s))
            .cloned()
            .collect();
        topics.sort_by(|a, b| {
            a.subject()
                .cmp(b.subject())
                .then_with(|| a.name().cmp(b.name()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(topics)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(question.id(), question.clone());
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn questions_for_topic(
        &self,
        topic_id: TopicId,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        let mut found: Vec<Question> = guard
            .values()
            .filter(|q| q.topic_id() == topic_id)
            .cloned()
            .collect();
        found.sort_by_key(Question::id);
        Ok(found)
    }
}

#[async_trait]
impl MasteryRepository for InMemoryRepository {
    async fn get_mastery(
        &self,
        student_id: StudentId,
        topic_id: TopicId,
    ) -> Result<Option<Mastery>, StorageError> {
        let guard = self.mastery.lock().map_err(poisoned)?;
        Ok(guard.get(&(student_id, topic_id)).cloned())
    }

    async fn upsert_mastery(&self, mastery: &Mastery) -> Result<(), StorageError> {
        let mut guard = self.mastery.lock().map_err(poisoned)?;
        guard.insert((mastery.student_id, mastery.topic_id), mastery.clone());
        Ok(())
    }

    async fn mastery_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Mastery>, StorageError> {
        let guard = self.mastery.lock().map_err(poisoned)?;
        let mut found: Vec<Mastery> = guard
            .values()
            .filter(|m| m.student_id == student_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.topic_id);
        Ok(found)
    }
}

#[async_trait]
impl LearningEventRepository for InMemoryRepository {
    async fn append_event(&self, event: &LearningEvent) -> Result<i64, StorageError> {
        let mut guard = self.events.lock().map_err(poisoned)?;
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("event id overflow".into()))?;
        guard.push(LearningEventRecord {
            id,
            event: event.clone(),
        });
        Ok(id)
    }

    async fn events_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<LearningEventRecord>, StorageError> {
        let guard = self.events.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|r| r.event.student_id == student_id)
            .cloned()
            .collect())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub topics: Arc<dyn TopicRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub mastery: Arc<dyn MasteryRepository>,
    pub events: Arc<dyn LearningEventRepository>,
}

impl Storage {
    /// Share one repository value across all four roles.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: TopicRepository
            + QuestionRepository
            + MasteryRepository
            + LearningEventRepository
            + Clone
            + 'static,
    {
        Self {
            topics: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            mastery: Arc::new(repo.clone()),
            events: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, MasteryScore};
    use quiz_core::time::fixed_now;

    fn topic(id: u64, subject: &str, name: &str, stage: &str) -> Topic {
        Topic::new(TopicId::new(id), subject, name, format!("t-{id}"), stage).unwrap()
    }

    fn question(id: u64, topic_id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            TopicId::new(topic_id),
            format!("Q{id}"),
            "A",
            vec!["B".into()],
            Difficulty::EASIEST,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn list_topics_filters_and_orders() {
        let repo = InMemoryRepository::new();
        repo.upsert_topic(&topic(1, "Science", "Plants", "KS2")).await.unwrap();
        repo.upsert_topic(&topic(2, "Maths", "Fractions", "KS2")).await.unwrap();
        repo.upsert_topic(&topic(3, "Maths", "Algebra", "KS3")).await.unwrap();

        let all = repo.list_topics(None).await.unwrap();
        let names: Vec<_> = all.iter().map(Topic::name).collect();
        assert_eq!(names, vec!["Algebra", "Fractions", "Plants"]);

        let ks2 = repo.list_topics(Some("KS2")).await.unwrap();
        assert_eq!(ks2.len(), 2);
    }

    #[tokio::test]
    async fn questions_are_scoped_to_topic() {
        let repo = InMemoryRepository::new();
        repo.upsert_question(&question(2, 1)).await.unwrap();
        repo.upsert_question(&question(1, 1)).await.unwrap();
        repo.upsert_question(&question(3, 2)).await.unwrap();

        let found = repo.questions_for_topic(TopicId::new(1)).await.unwrap();
        let ids: Vec<_> = found.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);

        assert!(matches!(
            repo.get_question(QuestionId::new(9)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn mastery_upsert_overwrites() {
        let repo = InMemoryRepository::new();
        let student = StudentId::new(5);
        let topic_id = TopicId::new(1);
        assert!(repo.get_mastery(student, topic_id).await.unwrap().is_none());

        let first = Mastery::new(student, topic_id, MasteryScore::FULL, fixed_now());
        repo.upsert_mastery(&first).await.unwrap();
        let second = Mastery::new(student, topic_id, MasteryScore::NONE, fixed_now());
        repo.upsert_mastery(&second).await.unwrap();

        let stored = repo.get_mastery(student, topic_id).await.unwrap().unwrap();
        assert_eq!(stored.score, MasteryScore::NONE);
        assert_eq!(repo.mastery_for_student(student).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn events_append_without_dedup() {
        let repo = InMemoryRepository::new();
        let event = LearningEvent::new(StudentId::new(1), QuestionId::new(1), true, 4, fixed_now());
        let a = repo.append_event(&event).await.unwrap();
        let b = repo.append_event(&event).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(repo.events_for_student(StudentId::new(1)).await.unwrap().len(), 2);
        assert!(repo.events_for_student(StudentId::new(2)).await.unwrap().is_empty());
    }
}
