//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionId, TopicId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService` and `TopicService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("topic {0} does not exist")]
    TopicNotFound(TopicId),
    #[error("topic {0} has no questions")]
    NoQuestions(TopicId),
    #[error("question {0} does not exist")]
    QuestionNotFound(QuestionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizError {
    /// True for the "unknown topic/question" family, which callers surface as not-found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QuizError::TopicNotFound(_)
                | QuizError::NoQuestions(_)
                | QuizError::QuestionNotFound(_)
                | QuizError::Storage(StorageError::NotFound)
        )
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
