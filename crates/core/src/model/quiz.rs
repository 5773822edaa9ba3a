use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::ids::{QuizResultId, UserId};

/// A quiz submission ready to be appended to a user's history.
///
/// Answers and suggested careers are opaque JSON produced by the client; the
/// backend stores them verbatim and never interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuizResult {
    pub user_id: UserId,
    pub quiz_data: Value,
    pub suggested_careers: Value,
    pub created_at: DateTime<Utc>,
}

impl NewQuizResult {
    #[must_use]
    pub fn assign_id(self, id: QuizResultId) -> QuizResult {
        QuizResult {
            id,
            user_id: self.user_id,
            quiz_data: self.quiz_data,
            suggested_careers: self.suggested_careers,
            created_at: self.created_at,
        }
    }
}

/// Stored quiz submission. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub id: QuizResultId,
    pub user_id: UserId,
    pub quiz_data: Value,
    pub suggested_careers: Value,
    pub created_at: DateTime<Utc>,
}
