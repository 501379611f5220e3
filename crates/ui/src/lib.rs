#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod session;
pub mod vm;

pub use api::{HttpQuizApi, LocalQuizApi, QuizApi};
pub use error::{ClientError, ViewError};
pub use session::{GameTimer, QuizSession};
