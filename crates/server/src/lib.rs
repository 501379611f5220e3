//! Axum HTTP server for the adaptive quiz.
//!
//! Handlers are thin: they resolve the student, call into `services`, and
//! map `QuizError` onto HTTP statuses. State is the cloned `AppServices`.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/topics?stage=` | Topics, optionally for one stage |
//! | GET | `/progress` | Mastery records of the calling student |
//! | GET | `/questions/next?topic_id=` | Next question picked for the calling student |
//! | POST | `/answers` | Grade an answer, log it, update mastery |
//!
//! Every endpoint except `/health` and `/topics` requires the `x-student-id` header.

#![forbid(unsafe_code)]

pub mod error;
pub mod identity;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use quiz_core::model::TopicId;
use serde::Deserialize;
use services::{
    AnswerOutcome, AnswerSubmission, AppServices, MasteryPayload, QuestionPayload, TopicPayload,
};
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;
pub use identity::CurrentStudent;

pub fn create_router(services: AppServices) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/topics", get(handle_list_topics))
        .route("/progress", get(handle_progress))
        .route("/questions/next", get(handle_next_question))
        .route("/answers", post(handle_submit_answer))
        .layer(cors)
        .with_state(services)
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct TopicsQuery {
    stage: Option<String>,
}

#[derive(Deserialize)]
struct NextQuestionQuery {
    topic_id: TopicId,
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_list_topics(
    State(services): State<AppServices>,
    query: Result<Query<TopicsQuery>, QueryRejection>,
) -> Result<Json<Vec<TopicPayload>>, ApiError> {
    let Query(query) = query?;
    let topics = services.topics().list_topics(query.stage.as_deref()).await?;
    Ok(Json(topics.iter().map(TopicPayload::from).collect()))
}

async fn handle_progress(
    State(services): State<AppServices>,
    CurrentStudent(ctx): CurrentStudent,
) -> Result<Json<Vec<MasteryPayload>>, ApiError> {
    let records = services.topics().progress(&ctx).await?;
    Ok(Json(records.iter().map(MasteryPayload::from).collect()))
}

async fn handle_next_question(
    State(services): State<AppServices>,
    CurrentStudent(ctx): CurrentStudent,
    query: Result<Query<NextQuestionQuery>, QueryRejection>,
) -> Result<Json<QuestionPayload>, ApiError> {
    let Query(query) = query?;
    let question = services
        .quiz()
        .select_next_question(&ctx, query.topic_id)
        .await?;
    Ok(Json(QuestionPayload::from(&question)))
}

// ── POST handlers ───────────────────────────────────────────────────

async fn handle_submit_answer(
    State(services): State<AppServices>,
    CurrentStudent(ctx): CurrentStudent,
    body: Result<Json<AnswerSubmission>, JsonRejection>,
) -> Result<Json<AnswerOutcome>, ApiError> {
    let Json(submission) = body?;
    let outcome = services.quiz().record_answer(&ctx, &submission).await?;
    log::info!(
        "student {} answered question {}: correct={}",
        ctx.student_id(),
        submission.question_id,
        outcome.correct
    );
    Ok(Json(outcome))
}
