use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::roadmap::CareerTitle;

/// How many recent views or searches are kept per user.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

const MAX_QUERY_LEN: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActivityError {
    #[error("search query cannot be empty")]
    EmptyQuery,

    #[error("search query must be at most 255 characters")]
    QueryTooLong,
}

/// A career search typed by a user, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// # Errors
    ///
    /// Returns `ActivityError` if the trimmed query is empty or too long.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ActivityError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ActivityError::EmptyQuery);
        }
        if trimmed.chars().count() > MAX_QUERY_LEN {
            return Err(ActivityError::QueryTooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A career detail page the user opened.
///
/// Recording a career that is already among the user's recent views is a
/// no-op; it keeps its original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewedCareer {
    pub user_id: UserId,
    pub career_title: CareerTitle,
    pub viewed_at: DateTime<Utc>,
}

/// A search the user ran. Same dedup rule as [`ViewedCareer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub user_id: UserId,
    pub query: SearchQuery,
    pub searched_at: DateTime<Utc>,
}
