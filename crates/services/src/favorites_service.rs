use std::sync::Arc;

use career_core::model::{FavoriteJob, JobTitle, UserId};
use storage::repository::FavoriteRepository;

use crate::Clock;
use crate::error::FavoriteServiceError;

/// Jobs a user bookmarked from their suggestions.
#[derive(Clone)]
pub struct FavoritesService {
    clock: Clock,
    favorites: Arc<dyn FavoriteRepository>,
}

fn parse_title(raw: &str) -> Result<JobTitle, FavoriteServiceError> {
    if raw.trim().is_empty() {
        return Err(FavoriteServiceError::MissingTitle);
    }
    Ok(JobTitle::new(raw)?)
}

impl FavoritesService {
    #[must_use]
    pub fn new(clock: Clock, favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { clock, favorites }
    }

    /// # Errors
    ///
    /// Returns `FavoriteServiceError` for a blank title or a storage failure.
    pub async fn add(&self, user_id: UserId, job_title: &str) -> Result<(), FavoriteServiceError> {
        let job_title = parse_title(job_title)?;
        self.favorites
            .add_favorite(&FavoriteJob {
                user_id,
                job_title,
                created_at: self.clock.now(),
            })
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `FavoriteServiceError` for a blank title or a storage failure.
    pub async fn remove(
        &self,
        user_id: UserId,
        job_title: &str,
    ) -> Result<(), FavoriteServiceError> {
        let job_title = parse_title(job_title)?;
        self.favorites.remove_favorite(user_id, &job_title).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `FavoriteServiceError::Storage` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<String>, FavoriteServiceError> {
        let titles = self.favorites.favorites(user_id).await?;
        Ok(titles.into_iter().map(|t| t.as_str().to_owned()).collect())
    }
}
