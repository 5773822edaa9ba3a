pub(crate) mod activity;
pub(crate) mod auth;
pub(crate) mod favorites;
pub(crate) mod health;
pub(crate) mod quiz;
pub(crate) mod roadmap;
pub(crate) mod user;

use axum::extract::FromRequest;
use career_core::model::{Grade, UserError};
use serde::Deserialize;

use crate::error::ApiError;

/// `axum::Json` with malformed bodies reported as our 400 JSON error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub T);

/// A grade as browsers send it: a number, or a string from a `<select>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum GradeInput {
    Number(i64),
    Text(String),
}

impl GradeInput {
    /// `Ok(None)` for a blank string.
    pub(crate) fn resolve(input: Option<Self>) -> Result<Option<Grade>, UserError> {
        match input {
            None => Ok(None),
            Some(Self::Number(n)) => Grade::from_number(n).map(Some),
            Some(Self::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Self::Text(s)) => Grade::parse(&s).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(json: &str) -> Result<Option<Grade>, UserError> {
        GradeInput::resolve(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn grade_accepts_numbers_and_strings() {
        assert_eq!(grade("10"), Ok(Some(Grade::Tenth)));
        assert_eq!(grade("\"12\""), Ok(Some(Grade::Twelfth)));
        assert_eq!(grade("\" \""), Ok(None));
        assert_eq!(grade("null"), Ok(None));
        assert!(grade("9").is_err());
    }
}
