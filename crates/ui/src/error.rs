use thiserror::Error;

/// Failures talking to the quiz backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("request rejected with status {0}")]
    Rejected(u16),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("service error: {0}")]
    Service(String),
}

/// Errors surfaced to the quiz screen.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ViewError {
    /// The action does not apply in the current phase.
    #[error("action not available right now")]
    NotReady,
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ViewError::Client(ClientError::NotFound) => "This topic has no questions yet.",
            ViewError::Client(ClientError::Unauthenticated) => "Please sign in again.",
            _ => "Something went wrong. Please try again.",
        }
    }
}
