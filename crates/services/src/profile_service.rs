use std::sync::Arc;

use career_core::model::{Grade, SessionUser, UserName};
use storage::repository::{StorageError, UserRepository};
use tracing::debug;

use crate::error::ProfileServiceError;

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub grade: Option<Grade>,
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Apply profile changes and return the updated session snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::NoFields` when nothing was supplied,
    /// `ProfileServiceError::InvalidUser` for an invalid name, and
    /// `ProfileServiceError::Storage` if persistence fails.
    pub async fn update(
        &self,
        current: &SessionUser,
        changes: ProfileChanges,
    ) -> Result<SessionUser, ProfileServiceError> {
        if changes.name.is_none() && changes.grade.is_none() {
            return Err(ProfileServiceError::NoFields);
        }
        let name = changes.name.map(UserName::new).transpose()?;

        let mut snapshot = current.clone();
        if let Some(name) = &name {
            snapshot.name = name.clone();
        }
        if let Some(grade) = changes.grade {
            snapshot.grade = grade;
        }

        let Some(mut stored) = self.users.get_user(current.id).await? else {
            debug!(user_id = %current.id, "profile change kept in session only");
            return Ok(snapshot);
        };
        if let Some(name) = name {
            stored.rename(name);
        }
        if let Some(grade) = changes.grade {
            stored.set_grade(grade);
        }
        match self.users.update_user(&stored).await {
            Ok(()) | Err(StorageError::NotFound) => Ok(snapshot),
            Err(e) => Err(e.into()),
        }
    }
}
