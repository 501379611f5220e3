mod ids;
mod learning_event;
mod mastery;
mod question;
mod topic;

pub use ids::{ParseIdError, QuestionId, StudentId, TopicId};

pub use learning_event::LearningEvent;
pub use mastery::{Mastery, MasteryError, MasteryScore};
pub use question::{Difficulty, Question, QuestionError};
pub use topic::{Topic, TopicError};
