use thiserror::Error;

use crate::model::ids::TopicId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,

    #[error("topic slug cannot be empty")]
    EmptySlug,

    #[error("topic slug may only contain lowercase letters, digits and '-': {0}")]
    InvalidSlug(String),
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A unit of study questions are grouped under.
///
/// `subject` groups related topics (e.g. "Maths") and `stage` is the grade
/// band the topic targets (e.g. "KS2"). Topics are immutable once created.
///
/// Built only through `Topic::new`; the wire shape lives in the services crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    subject: String,
    name: String,
    slug: String,
    stage: String,
}

impl Topic {
    /// # Errors
    ///
    /// Returns `TopicError` if the name or slug is empty, or the slug is not
    /// lowercase kebab-case.
    pub fn new(
        id: TopicId,
        subject: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
        stage: impl Into<String>,
    ) -> Result<Self, TopicError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(TopicError::EmptyName);
        }

        let slug = slug.into().trim().to_owned();
        if slug.is_empty() {
            return Err(TopicError::EmptySlug);
        }
        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(TopicError::InvalidSlug(slug));
        }

        Ok(Self {
            id,
            subject: subject.into().trim().to_owned(),
            name,
            slug,
            stage: stage.into().trim().to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }
}
