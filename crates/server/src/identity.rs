use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use quiz_core::model::StudentId;
use services::{STUDENT_ID_HEADER, StudentContext};

use crate::error::ApiError;

/// The authenticated student, read from the `x-student-id` header that the
/// identity layer in front of this service sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentStudent(pub StudentContext);

impl<S> FromRequestParts<S> for CurrentStudent
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let student_id = parts
            .headers
            .get(STUDENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<StudentId>().ok())
            .ok_or(ApiError::Unauthenticated)?;

        Ok(Self(StudentContext::new(student_id)))
    }
}
