use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::UserId;

const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepError {
    #[error("career title cannot be empty")]
    EmptyCareerTitle,

    #[error("career title must be at most 255 characters")]
    CareerTitleTooLong,

    #[error("step index must be a non-negative integer (got {0})")]
    InvalidStepIndex(i64),
}

/// Title of a career whose roadmap is being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CareerTitle(String);

impl CareerTitle {
    /// # Errors
    ///
    /// Returns `StepError` if the trimmed title is empty or too long.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, StepError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(StepError::EmptyCareerTitle);
        }
        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(StepError::CareerTitleTooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CareerTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zero-based position of a milestone inside a generated roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepIndex(u32);

impl StepIndex {
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// # Errors
    ///
    /// Returns `StepError::InvalidStepIndex` for negative or oversized values.
    pub fn from_i64(value: i64) -> Result<Self, StepError> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| StepError::InvalidStepIndex(value))
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// A roadmap milestone a user has marked as done.
///
/// Unique per (user, career, step); completing it again only refreshes
/// `completed_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStep {
    pub user_id: UserId,
    pub career_title: CareerTitle,
    pub step_index: StepIndex,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn career_title_rejects_blank() {
        assert_eq!(CareerTitle::new("  "), Err(StepError::EmptyCareerTitle));
        assert_eq!(CareerTitle::new(" Nurse ").unwrap().as_str(), "Nurse");
    }

    #[test]
    fn step_index_rejects_negative() {
        assert_eq!(StepIndex::from_i64(-1), Err(StepError::InvalidStepIndex(-1)));
        assert_eq!(StepIndex::from_i64(2).unwrap().value(), 2);
    }
}
