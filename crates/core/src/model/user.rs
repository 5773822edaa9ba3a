use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::UserId;

const MAX_FIELD_LEN: usize = 255;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("name must be at most 255 characters")]
    NameTooLong,

    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("grade must be 10, 11 or 12 (got {0})")]
    InvalidGrade(String),
}

//
// ─── GRADE ─────────────────────────────────────────────────────────────────────
//

/// School grade of a student. Only the last three years are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    Tenth,
    Eleventh,
    Twelfth,
}

impl Grade {
    /// Converts a numeric grade (10-12) to a `Grade`.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidGrade` for any other value.
    pub fn from_number(value: i64) -> Result<Self, UserError> {
        match value {
            10 => Ok(Self::Tenth),
            11 => Ok(Self::Eleventh),
            12 => Ok(Self::Twelfth),
            other => Err(UserError::InvalidGrade(other.to_string())),
        }
    }

    /// Parses a grade sent as text, e.g. `"11"`.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidGrade` when the text is not 10, 11 or 12.
    pub fn parse(raw: &str) -> Result<Self, UserError> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| UserError::InvalidGrade(raw.to_string()))
            .and_then(Self::from_number)
    }

    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Grade::Tenth => 10,
            Grade::Eleventh => 11,
            Grade::Twelfth => 12,
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = UserError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(i64::from(value))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.number()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

//
// ─── NAME & EMAIL ──────────────────────────────────────────────────────────────
//

/// Display name of a user, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` or `UserError::NameTooLong`.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserError::EmptyName);
        }
        if trimmed.chars().count() > MAX_FIELD_LEN {
            return Err(UserError::NameTooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalized (trimmed, lower-cased) email address.
///
/// Uniqueness of users is enforced on this normalized form, so
/// `A@X.com` and `a@x.com` refer to the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// # Errors
    ///
    /// Returns `UserError::EmptyEmail` or `UserError::InvalidEmail`.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, UserError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(UserError::EmptyEmail);
        }
        let valid = normalized.len() <= MAX_FIELD_LEN
            && !normalized.chars().any(char::is_whitespace)
            && normalized
                .split_once('@')
                .is_some_and(|(local, domain)| {
                    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                });
        if !valid {
            return Err(UserError::InvalidEmail(normalized));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A registration that has passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: UserName,
    pub email: Email,
    /// Argon2 PHC string; never the raw password.
    pub password_hash: String,
    pub grade: Grade,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    #[must_use]
    pub fn assign_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            grade: self.grade,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: Email,
    password_hash: String,
    grade: Grade,
    created_at: DateTime<Utc>,
}

impl User {
    /// Rebuilds a user from storage.
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        name: UserName,
        email: Email,
        password_hash: String,
        grade: Grade,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            grade,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &UserName {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rename(&mut self, name: UserName) {
        self.name = name;
    }

    pub fn set_grade(&mut self, grade: Grade) {
        self.grade = grade;
    }
}
