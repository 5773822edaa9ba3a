use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FavoriteError {
    #[error("job title cannot be empty")]
    EmptyJobTitle,

    #[error("job title must be at most 255 characters")]
    JobTitleTooLong,
}

/// Title of a job a user bookmarked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobTitle(String);

impl JobTitle {
    /// # Errors
    ///
    /// Returns `FavoriteError` if the trimmed title is empty or too long.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FavoriteError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FavoriteError::EmptyJobTitle);
        }
        if trimmed.chars().count() > 255 {
            return Err(FavoriteError::JobTitleTooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteJob {
    pub user_id: UserId,
    pub job_title: JobTitle,
    pub created_at: DateTime<Utc>,
}
