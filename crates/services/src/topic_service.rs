use std::sync::Arc;

use quiz_core::model::{Mastery, Topic};
use storage::repository::{MasteryRepository, TopicRepository};

use crate::context::StudentContext;
use crate::error::QuizError;

/// Read-only views over topics and a student's progress.
#[derive(Clone)]
pub struct TopicService {
    topics: Arc<dyn TopicRepository>,
    mastery: Arc<dyn MasteryRepository>,
}

impl TopicService {
    #[must_use]
    pub fn new(topics: Arc<dyn TopicRepository>, mastery: Arc<dyn MasteryRepository>) -> Self {
        Self { topics, mastery }
    }

    /// Topics for a stage (grade band), or every topic when `stage` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for backend failures.
    pub async fn list_topics(&self, stage: Option<&str>) -> Result<Vec<Topic>, QuizError> {
        let stage = stage.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.topics.list_topics(stage).await?)
    }

    /// Mastery records the student has accumulated, one per answered topic.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for backend failures.
    pub async fn progress(&self, ctx: &StudentContext) -> Result<Vec<Mastery>, QuizError> {
        Ok(self.mastery.mastery_for_student(ctx.student_id()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{MasteryScore, StudentId, TopicId};
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn blank_stage_means_all_topics() {
        let repo = InMemoryRepository::new();
        for (id, stage) in [(1, "KS1"), (2, "KS2")] {
            let topic =
                Topic::new(TopicId::new(id), "Maths", format!("T{id}"), format!("t{id}"), stage)
                    .unwrap();
            repo.upsert_topic(&topic).await.unwrap();
        }
        let svc = TopicService::new(Arc::new(repo.clone()), Arc::new(repo));

        assert_eq!(svc.list_topics(Some("  ")).await.unwrap().len(), 2);
        assert_eq!(svc.list_topics(Some("KS1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn progress_is_per_student() {
        let repo = InMemoryRepository::new();
        let alice = StudentContext::new(StudentId::new(1));
        repo.upsert_mastery(&Mastery::new(
            alice.student_id(),
            TopicId::new(3),
            MasteryScore::FULL,
            fixed_now(),
        ))
        .await
        .unwrap();
        let svc = TopicService::new(Arc::new(repo.clone()), Arc::new(repo));

        assert_eq!(svc.progress(&alice).await.unwrap().len(), 1);
        let bob = StudentContext::new(StudentId::new(2));
        assert!(svc.progress(&bob).await.unwrap().is_empty());
    }
}
