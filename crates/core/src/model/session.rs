use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::UserId;
use crate::model::user::{Email, Grade, User, UserName};

/// Lifetime of a session after its last write.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Opaque server-side session key carried by the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session ids are bearer credentials; keep them out of debug output.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionId({prefix}…)")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Copy of the authenticated user's public fields held in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub grade: Grade,
}

impl SessionUser {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().clone(),
            email: user.email().clone(),
            grade: user.grade(),
        }
    }
}
