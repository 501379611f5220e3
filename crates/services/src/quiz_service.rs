use std::sync::Arc;

use quiz_core::{
    model::{LearningEvent, Mastery, MasteryScore, Question, TopicId},
    policy::{MasteryPolicy, choose_question, coins_for, target_difficulty},
    time::Clock,
};
use storage::repository::{
    LearningEventRepository, MasteryRepository, QuestionRepository, StorageError, TopicRepository,
};

use crate::context::StudentContext;
use crate::error::QuizError;
use crate::payload::{AnswerOutcome, AnswerSubmission};

/// Feedback shown after a correct answer.
pub const CORRECT_FEEDBACK: &str = "Correct! Great job!";

/// Feedback shown after an incorrect answer to a question without an explanation.
pub const FALLBACK_FEEDBACK: &str = "Not quite. Have another look and try the next one.";

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Adaptive question selection and mastery tracking.
///
/// Each call is a single read-modify-write with no locking: two answers for
/// the same (student, topic) submitted at once may both read the old mastery,
/// and whichever upsert lands last wins.
///
/// `record_answer` appends the learning event before it touches mastery, and
/// the two writes share no transaction. If the mastery upsert fails the call
/// returns the error but the event stays logged.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    policy: MasteryPolicy,
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    mastery: Arc<dyn MasteryRepository>,
    events: Arc<dyn LearningEventRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
        mastery: Arc<dyn MasteryRepository>,
        events: Arc<dyn LearningEventRepository>,
    ) -> Self {
        Self {
            clock,
            policy: MasteryPolicy::default(),
            topics,
            questions,
            mastery,
            events,
        }
    }

    /// Override how answers move mastery (default: snap to the latest outcome).
    #[must_use]
    pub fn with_policy(mut self, policy: MasteryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current mastery for the student on a topic, `0.0` when never answered.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for backend failures.
    pub async fn current_mastery(
        &self,
        ctx: &StudentContext,
        topic_id: TopicId,
    ) -> Result<MasteryScore, QuizError> {
        Ok(self
            .mastery
            .get_mastery(ctx.student_id(), topic_id)
            .await?
            .map(|m| m.score)
            .unwrap_or_default())
    }

    /// Pick the next question for the student on `topic_id`.
    ///
    /// Targets the difficulty band matching current mastery; when that band is
    /// empty any question of the topic is eligible.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::TopicNotFound` for unknown topics and
    /// `QuizError::NoQuestions` when the topic has none.
    pub async fn select_next_question(
        &self,
        ctx: &StudentContext,
        topic_id: TopicId,
    ) -> Result<Question, QuizError> {
        if self.topics.get_topic(topic_id).await?.is_none() {
            return Err(QuizError::TopicNotFound(topic_id));
        }

        let mastery = self.current_mastery(ctx, topic_id).await?;
        let target = target_difficulty(mastery);
        let questions = self.questions.questions_for_topic(topic_id).await?;

        let picked = {
            let mut rng = rand::rng();
            choose_question(&questions, target, &mut rng)
                .map(|selection| (selection.question.clone(), selection.fell_back))
        };
        let Some((question, fell_back)) = picked else {
            return Err(QuizError::NoQuestions(topic_id));
        };

        if fell_back {
            log::warn!(
                "topic {topic_id} has no difficulty {} questions; picked {} from the whole topic",
                target.level(),
                question.id()
            );
        }
        log::debug!(
            "student {} topic {topic_id}: mastery {:.2} -> difficulty {} -> question {}",
            ctx.student_id(),
            mastery.value(),
            target.level(),
            question.id()
        );

        Ok(question)
    }

    /// Grade an answer, log it, and update mastery for the question's topic.
    ///
    /// Always appends exactly one learning event; repeated submissions are
    /// not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::QuestionNotFound` for unknown questions, or
    /// `QuizError::Storage` if the event or mastery cannot be written.
    pub async fn record_answer(
        &self,
        ctx: &StudentContext,
        submission: &AnswerSubmission,
    ) -> Result<AnswerOutcome, QuizError> {
        let question = match self.questions.get_question(submission.question_id).await {
            Ok(question) => question,
            Err(StorageError::NotFound) => {
                return Err(QuizError::QuestionNotFound(submission.question_id));
            }
            Err(err) => return Err(err.into()),
        };

        let correct = question.is_correct(&submission.answer);
        let now = self.clock.now();
        let student_id = ctx.student_id();

        self.events
            .append_event(&LearningEvent::new(
                student_id,
                question.id(),
                correct,
                submission.time_taken_seconds,
                now,
            ))
            .await?;

        let previous = self
            .mastery
            .get_mastery(student_id, question.topic_id())
            .await?
            .map(|m| m.score);
        let score = self.policy.apply(previous, correct);
        self.mastery
            .upsert_mastery(&Mastery::new(student_id, question.topic_id(), score, now))
            .await?;

        log::debug!(
            "student {student_id} answered question {} ({}): mastery now {:.2}",
            question.id(),
            if correct { "correct" } else { "incorrect" },
            score.value()
        );

        let feedback = if correct {
            CORRECT_FEEDBACK.to_owned()
        } else {
            question
                .explanation()
                .unwrap_or(FALLBACK_FEEDBACK)
                .to_owned()
        };

        Ok(AnswerOutcome {
            correct,
            correct_answer: question.correct_answer().to_owned(),
            coins_earned: coins_for(correct),
            new_mastery: score.value(),
            feedback,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
