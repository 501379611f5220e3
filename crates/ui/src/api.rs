//! Backend access for the quiz client.
//!
//! `QuizApi` is the seam between the view-model driver and the server.
//! `HttpQuizApi` speaks JSON over HTTP; `LocalQuizApi` calls `QuizService`
//! in-process for embedding and tests.

use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::TopicId;
use reqwest::StatusCode;
use services::{
    AnswerOutcome, AnswerSubmission, QuestionPayload, QuizService, STUDENT_ID_HEADER,
    StudentContext,
};

use crate::error::ClientError;

#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn next_question(&self, topic_id: TopicId) -> Result<QuestionPayload, ClientError>;

    async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<AnswerOutcome, ClientError>;
}

//
// ─── HTTP ──────────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct HttpQuizApi {
    client: reqwest::Client,
    base_url: String,
    student: StudentContext,
}

impl HttpQuizApi {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:8080`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, student: StudentContext) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, student)
    }

    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        student: StudentContext,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client,
            base_url,
            student,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn student_header(&self) -> String {
        self.student.student_id().to_string()
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(ClientError::NotFound),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthenticated),
        status => Err(ClientError::Rejected(status.as_u16())),
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn next_question(&self, topic_id: TopicId) -> Result<QuestionPayload, ClientError> {
        let response = self
            .client
            .get(self.url("/questions/next"))
            .query(&[("topic_id", topic_id.value())])
            .header(STUDENT_ID_HEADER, self.student_header())
            .send()
            .await?;

        Ok(check_status(response)?.json().await?)
    }

    async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<AnswerOutcome, ClientError> {
        let response = self
            .client
            .post(self.url("/answers"))
            .header(STUDENT_ID_HEADER, self.student_header())
            .json(submission)
            .send()
            .await?;

        Ok(check_status(response)?.json().await?)
    }
}

//
// ─── IN-PROCESS ────────────────────────────────────────────────────────────────
//

/// Calls `QuizService` directly for one student.
#[derive(Clone)]
pub struct LocalQuizApi {
    quiz: Arc<QuizService>,
    student: StudentContext,
}

impl LocalQuizApi {
    #[must_use]
    pub fn new(quiz: Arc<QuizService>, student: StudentContext) -> Self {
        Self { quiz, student }
    }
}

fn map_quiz_error(err: &services::QuizError) -> ClientError {
    if err.is_not_found() {
        ClientError::NotFound
    } else {
        ClientError::Service(err.to_string())
    }
}

#[async_trait]
impl QuizApi for LocalQuizApi {
    async fn next_question(&self, topic_id: TopicId) -> Result<QuestionPayload, ClientError> {
        self.quiz
            .select_next_question(&self.student, topic_id)
            .await
            .map(|question| QuestionPayload::from(&question))
            .map_err(|err| map_quiz_error(&err))
    }

    async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<AnswerOutcome, ClientError> {
        self.quiz
            .record_answer(&self.student, submission)
            .await
            .map_err(|err| map_quiz_error(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionId, StudentId};

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = HttpQuizApi::new(
            "http://localhost:8080/",
            StudentContext::new(StudentId::new(4)),
        );
        assert_eq!(api.url("/answers"), "http://localhost:8080/answers");
        assert_eq!(api.student_header(), "4");
    }

    #[test]
    fn not_found_family_maps_to_not_found() {
        let err = services::QuizError::QuestionNotFound(QuestionId::new(3));
        assert!(matches!(map_quiz_error(&err), ClientError::NotFound));
    }
}
