mod quiz_vm;

pub use quiz_vm::{
    ContinueAction, GAME_DURATION, GAME_EVERY, GAME_STEP, GAME_TICKS, GameTick, QuestionVm,
    QuizPhase, QuizVm, game_tick_interval,
};
