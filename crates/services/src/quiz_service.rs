use std::sync::Arc;

use career_core::model::{Email, Grade, NewQuizResult, QuizResult, QuizResultId, SessionUser};
use serde_json::Value;
use storage::repository::{QuizRepository, StorageError, UserRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::QuizServiceError;

/// Quiz submissions and their history.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        quizzes: Arc<dyn QuizRepository>,
    ) -> Self {
        Self {
            clock,
            users,
            quizzes,
        }
    }

    /// Append a submission to the user's history. Payloads are stored as-is.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the result cannot be stored.
    pub async fn save(
        &self,
        user: &SessionUser,
        quiz_data: Value,
        suggested_careers: Value,
    ) -> Result<QuizResultId, QuizServiceError> {
        let id = self
            .quizzes
            .append_result(NewQuizResult {
                user_id: user.id,
                quiz_data,
                suggested_careers,
                created_at: self.clock.now(),
            })
            .await?;
        debug!(user_id = %user.id, result_id = %id, "quiz result saved");
        Ok(id)
    }

    /// Whether the account behind `email` has at least one stored result.
    ///
    /// Unknown or malformed addresses report `false`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if a lookup fails.
    pub async fn has_completed(&self, email: &str) -> Result<bool, QuizServiceError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(false);
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(false);
        };
        Ok(self.quizzes.count_for_user(user.id()).await? > 0)
    }

    /// Results for the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the query fails.
    pub async fn history(&self, user: &SessionUser) -> Result<Vec<QuizResult>, QuizServiceError> {
        Ok(self.quizzes.results_for_user(user.id).await?)
    }

    /// Drop the user's history before a retake, optionally moving them to a
    /// new grade. Returns the session snapshot with the grade applied.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the delete or the grade update
    /// fails.
    pub async fn clear(
        &self,
        user: &SessionUser,
        grade: Option<Grade>,
    ) -> Result<SessionUser, QuizServiceError> {
        let removed = self.quizzes.clear_for_user(user.id).await?;
        info!(user_id = %user.id, removed, "quiz history cleared");

        let mut snapshot = user.clone();
        if let Some(grade) = grade {
            match self.users.get_user(user.id).await? {
                Some(mut stored) => {
                    stored.set_grade(grade);
                    match self.users.update_user(&stored).await {
                        Ok(()) | Err(StorageError::NotFound) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                // Accounts created before a backend switch are only known to
                // the session.
                None => debug!(user_id = %user.id, "grade change kept in session only"),
            }
            snapshot.grade = grade;
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_core::model::{NewUser, UserName};
    use career_core::time::{fixed_clock, fixed_now};
    use serde_json::json;
    use storage::repository::InMemoryRepository;

    async fn seeded() -> (QuizService, SessionUser, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let user = repo
            .insert_user(NewUser {
                name: UserName::new("A").unwrap(),
                email: Email::parse("a@x.com").unwrap(),
                password_hash: "hash".into(),
                grade: Grade::Tenth,
                created_at: fixed_now(),
            })
            .await
            .unwrap()
            .into_user();
        let service = QuizService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()));
        (service, SessionUser::from_user(&user), repo)
    }

    #[tokio::test]
    async fn saving_marks_quiz_completed() {
        let (service, user, _) = seeded().await;
        assert!(!service.has_completed("a@x.com").await.unwrap());
        service
            .save(&user, json!({ "q1": "b" }), json!(["Nurse"]))
            .await
            .unwrap();
        assert!(service.has_completed("A@x.com").await.unwrap());
        assert!(!service.has_completed("nobody@x.com").await.unwrap());
        assert!(!service.has_completed("not-an-email").await.unwrap());

        let history = service.history(&user).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].suggested_careers, json!(["Nurse"]));
    }

    #[tokio::test]
    async fn clear_with_grade_updates_user_and_snapshot() {
        let (service, user, repo) = seeded().await;
        service.save(&user, json!({}), json!([])).await.unwrap();

        let snapshot = service.clear(&user, Some(Grade::Twelfth)).await.unwrap();
        assert_eq!(snapshot.grade, Grade::Twelfth);
        assert!(service.history(&user).await.unwrap().is_empty());
        let stored = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.grade(), Grade::Twelfth);
    }

    #[tokio::test]
    async fn clear_without_grade_keeps_grade() {
        let (service, user, _) = seeded().await;
        let snapshot = service.clear(&user, None).await.unwrap();
        assert_eq!(snapshot.grade, Grade::Tenth);
    }
}
