#![forbid(unsafe_code)]

pub mod app_services;
pub mod context;
pub mod error;
pub mod payload;
pub mod quiz_service;
pub mod topic_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use context::{STUDENT_ID_HEADER, StudentContext};
pub use error::{AppServicesError, QuizError};
pub use payload::{AnswerOutcome, AnswerSubmission, MasteryPayload, QuestionPayload, TopicPayload};
pub use quiz_service::QuizService;
pub use topic_service::TopicService;
