use std::time::Duration;

use chrono::{DateTime, Utc};
use quiz_core::time::elapsed_whole_seconds;
use rand::Rng;
use rand::seq::SliceRandom;
use services::{AnswerOutcome, AnswerSubmission, QuestionPayload};

/// Every this many answered questions, `continue` opens the game interstitial.
pub const GAME_EVERY: u32 = 3;

/// Number of progress ticks in one interstitial.
pub const GAME_TICKS: u8 = 50;

/// Progress added per tick; `GAME_TICKS * GAME_STEP == 100`.
pub const GAME_STEP: u8 = 100 / GAME_TICKS;

/// Total length of one interstitial.
pub const GAME_DURATION: Duration = Duration::from_secs(5);

/// Delay between two interstitial ticks.
#[must_use]
pub fn game_tick_interval() -> Duration {
    GAME_DURATION / u32::from(GAME_TICKS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Question,
    Result,
    Game,
    Loading,
}

/// What the driver must do after `continue`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContinueAction {
    StartGame,
    FetchNext,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameTick {
    Progress(u8),
    /// Progress hit 100: the phase is back to `Question` and the next question must be fetched.
    Finished,
}

/// Question as displayed: the payload plus its options in presentation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub question: QuestionPayload,
    pub options: Vec<String>,
}

/// Client-side quiz state.
///
/// Score and streak are cosmetic and local to this value; mastery on the
/// server is what drives difficulty. Nothing here is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizVm {
    phase: QuizPhase,
    question: Option<QuestionVm>,
    shown_at: Option<DateTime<Utc>>,
    selected_answer: Option<String>,
    last_result: Option<AnswerOutcome>,
    score: u32,
    streak: u32,
    questions_answered: u32,
    game_progress: u8,
}

impl Default for QuizVm {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizVm {
    /// Starts in `Loading` until the first question arrives.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Loading,
            question: None,
            shown_at: None,
            selected_answer: None,
            last_result: None,
            score: 0,
            streak: 0,
            questions_answered: 0,
            game_progress: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn question(&self) -> Option<&QuestionVm> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&AnswerOutcome> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn game_progress(&self) -> u8 {
        self.game_progress
    }

    /// True when the UI should fetch a question: `Loading`, or `Question`
    /// right after an interstitial ended.
    #[must_use]
    pub fn awaiting_question(&self) -> bool {
        matches!(self.phase, QuizPhase::Loading | QuizPhase::Question) && self.question.is_none()
    }

    /// Show a freshly fetched question with shuffled options and start its timer.
    ///
    /// Ignored (returns `false`) unless a question is being awaited.
    pub fn question_loaded<R: Rng + ?Sized>(
        &mut self,
        question: QuestionPayload,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> bool {
        if !self.awaiting_question() {
            return false;
        }

        let mut options = question.options();
        options.shuffle(rng);

        self.question = Some(QuestionVm { question, options });
        self.shown_at = Some(now);
        self.selected_answer = None;
        self.last_result = None;
        self.phase = QuizPhase::Question;
        true
    }

    /// Select an answer. Only the first selection per question counts; anything
    /// outside `Question` returns `None`.
    ///
    /// Moves to `Result` immediately and returns the request to send.
    pub fn submit(&mut self, answer: &str, now: DateTime<Utc>) -> Option<AnswerSubmission> {
        if self.phase != QuizPhase::Question {
            return None;
        }
        let current = self.question.as_ref()?;

        let time_taken_seconds = self
            .shown_at
            .map_or(0, |shown_at| elapsed_whole_seconds(shown_at, now));
        let submission = AnswerSubmission {
            question_id: current.question.id,
            answer: answer.to_owned(),
            time_taken_seconds,
        };

        self.selected_answer = Some(answer.to_owned());
        self.questions_answered += 1;
        self.phase = QuizPhase::Result;
        Some(submission)
    }

    /// Record the server's verdict for the submitted answer.
    pub fn apply_outcome(&mut self, outcome: AnswerOutcome) -> bool {
        if self.phase != QuizPhase::Result || self.last_result.is_some() {
            return false;
        }

        self.score = self.score.saturating_add(outcome.coins_earned);
        self.streak = if outcome.correct { self.streak + 1 } else { 0 };
        self.last_result = Some(outcome);
        true
    }

    /// Leave the result screen.
    pub fn continue_(&mut self) -> Option<ContinueAction> {
        if self.phase != QuizPhase::Result {
            return None;
        }

        self.question = None;
        self.shown_at = None;

        if self.questions_answered > 0 && self.questions_answered % GAME_EVERY == 0 {
            self.game_progress = 0;
            self.phase = QuizPhase::Game;
            Some(ContinueAction::StartGame)
        } else {
            self.phase = QuizPhase::Loading;
            Some(ContinueAction::FetchNext)
        }
    }

    /// Advance the interstitial by one tick.
    pub fn tick_game(&mut self) -> Option<GameTick> {
        if self.phase != QuizPhase::Game {
            return None;
        }

        self.game_progress = self.game_progress.saturating_add(GAME_STEP).min(100);
        if self.game_progress < 100 {
            return Some(GameTick::Progress(self.game_progress));
        }

        self.game_progress = 0;
        self.phase = QuizPhase::Question;
        Some(GameTick::Finished)
    }

    /// Leave the interstitial early, waiting for the next question in `Loading`.
    pub fn abandon_game(&mut self) -> bool {
        if self.phase != QuizPhase::Game {
            return false;
        }

        self.game_progress = 0;
        self.phase = QuizPhase::Loading;
        true
    }
}
