use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quiz_core::Clock;
use quiz_core::model::TopicId;
use services::AnswerOutcome;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use crate::api::QuizApi;
use crate::error::ViewError;
use crate::vm::{ContinueAction, GameTick, QuizVm, game_tick_interval};

fn lock(vm: &Mutex<QuizVm>) -> MutexGuard<'_, QuizVm> {
    vm.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetch the next question and hand it to the view-model.
///
/// On failure the view-model is left untouched, so a `Loading` phase stays
/// `Loading` until someone calls `QuizSession::reload`.
async fn fetch_next(
    api: &dyn QuizApi,
    vm: &Mutex<QuizVm>,
    topic_id: TopicId,
    clock: Clock,
) -> Result<(), ViewError> {
    let question = match api.next_question(topic_id).await {
        Ok(question) => question,
        Err(err) => {
            log::warn!("fetching next question for topic {topic_id} failed: {err}");
            return Err(err.into());
        }
    };

    let question_id = question.id;
    let accepted = {
        let mut rng = rand::rng();
        lock(vm).question_loaded(question, clock.now(), &mut rng)
    };
    if !accepted {
        log::debug!("dropped question {question_id}: no longer awaiting one");
    }
    Ok(())
}

/// Ticks the interstitial progress bar on a background task.
///
/// Aborted by `cancel` or on drop. When the game finishes the task fetches the
/// next question itself.
#[derive(Debug)]
pub struct GameTimer {
    handle: JoinHandle<()>,
}

impl GameTimer {
    fn spawn(api: Arc<dyn QuizApi>, vm: Arc<Mutex<QuizVm>>, topic_id: TopicId, clock: Clock) -> Self {
        let period = game_tick_interval();
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                let tick = lock(&vm).tick_game();
                match tick {
                    Some(GameTick::Progress(_)) => {}
                    Some(GameTick::Finished) => {
                        // Failure is already logged; the phase stays awaiting a question.
                        let _ = fetch_next(api.as_ref(), &vm, topic_id, clock).await;
                        break;
                    }
                    None => break,
                }
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for GameTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Drives a `QuizVm` against a `QuizApi` for one topic.
///
/// The view-model lock is never held across an await.
pub struct QuizSession {
    api: Arc<dyn QuizApi>,
    topic_id: TopicId,
    clock: Clock,
    vm: Arc<Mutex<QuizVm>>,
    timer: Option<GameTimer>,
}

impl QuizSession {
    /// A session in `Loading`; call `reload` to fetch the first question.
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, topic_id: TopicId, clock: Clock) -> Self {
        Self {
            api,
            topic_id,
            clock,
            vm: Arc::new(Mutex::new(QuizVm::new())),
            timer: None,
        }
    }

    /// Creates a session and fetches its first question.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Client` when the first fetch fails.
    pub async fn start(
        api: Arc<dyn QuizApi>,
        topic_id: TopicId,
        clock: Clock,
    ) -> Result<Self, ViewError> {
        let session = Self::new(api, topic_id, clock);
        session.reload().await?;
        Ok(session)
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    /// Copy of the current view state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> QuizVm {
        lock(&self.vm).clone()
    }

    #[must_use]
    pub fn game_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Retry the question fetch while one is awaited.
    ///
    /// # Errors
    ///
    /// `ViewError::NotReady` when a question is already showing, or
    /// `ViewError::Client` when the fetch fails.
    pub async fn reload(&self) -> Result<(), ViewError> {
        if !lock(&self.vm).awaiting_question() {
            return Err(ViewError::NotReady);
        }
        fetch_next(self.api.as_ref(), &self.vm, self.topic_id, self.clock).await
    }

    /// Submit the selected option and apply the server's verdict.
    ///
    /// The phase moves to `Result` before the request is sent. If the request
    /// fails the result screen has no verdict, and `continue_to_next` still
    /// moves on.
    ///
    /// # Errors
    ///
    /// `ViewError::NotReady` outside the question phase or for a repeated
    /// submission, `ViewError::Client` when the request fails.
    pub async fn submit(&self, answer: &str) -> Result<AnswerOutcome, ViewError> {
        let submission = lock(&self.vm)
            .submit(answer, self.clock.now())
            .ok_or(ViewError::NotReady)?;

        let outcome = match self.api.submit_answer(&submission).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!(
                    "submitting answer for question {} failed: {err}",
                    submission.question_id
                );
                return Err(err.into());
            }
        };

        lock(&self.vm).apply_outcome(outcome.clone());
        Ok(outcome)
    }

    /// Leave the result screen: start the interstitial or fetch the next question.
    ///
    /// # Errors
    ///
    /// `ViewError::NotReady` outside the result phase. A failed fetch returns
    /// `ViewError::Client` and leaves the phase at `Loading`.
    pub async fn continue_to_next(&mut self) -> Result<ContinueAction, ViewError> {
        let action = lock(&self.vm).continue_().ok_or(ViewError::NotReady)?;

        match action {
            ContinueAction::StartGame => {
                log::debug!("starting interstitial game");
                self.timer = Some(GameTimer::spawn(
                    Arc::clone(&self.api),
                    Arc::clone(&self.vm),
                    self.topic_id,
                    self.clock,
                ));
            }
            ContinueAction::FetchNext => {
                fetch_next(self.api.as_ref(), &self.vm, self.topic_id, self.clock).await?;
            }
        }
        Ok(action)
    }

    /// Stop a running interstitial and move to `Loading`; call `reload` for
    /// the next question.
    pub fn cancel_game(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if lock(&self.vm).abandon_game() {
            log::debug!("interstitial game cancelled");
        }
    }
}
