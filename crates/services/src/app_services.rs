use std::sync::Arc;

use quiz_core::policy::MasteryPolicy;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::quiz_service::QuizService;
use crate::topic_service::TopicService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    topics: Arc<TopicService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        policy: MasteryPolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, policy))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, policy: MasteryPolicy) -> Self {
        let quiz = Arc::new(
            QuizService::new(
                clock,
                Arc::clone(&storage.topics),
                Arc::clone(&storage.questions),
                Arc::clone(&storage.mastery),
                Arc::clone(&storage.events),
            )
            .with_policy(policy),
        );
        let topics = Arc::new(TopicService::new(
            Arc::clone(&storage.topics),
            Arc::clone(&storage.mastery),
        ));
        log::info!("quiz services ready (mastery policy: {policy})");

        Self { quiz, topics }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn topics(&self) -> Arc<TopicService> {
        Arc::clone(&self.topics)
    }
}
