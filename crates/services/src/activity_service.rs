use std::sync::Arc;

use career_core::model::{CareerTitle, SearchEntry, SearchQuery, UserId, ViewedCareer};
use storage::repository::ActivityRepository;
use tracing::debug;

use crate::Clock;
use crate::error::ActivityServiceError;

/// Recently viewed careers and recent searches, newest first.
#[derive(Clone)]
pub struct ActivityService {
    clock: Clock,
    activity: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    #[must_use]
    pub fn new(clock: Clock, activity: Arc<dyn ActivityRepository>) -> Self {
        Self { clock, activity }
    }

    /// Record that the user opened a career and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError` for a blank or oversized title, or a
    /// storage failure.
    pub async fn record_view(
        &self,
        user_id: UserId,
        career_title: &str,
    ) -> Result<Vec<String>, ActivityServiceError> {
        if career_title.trim().is_empty() {
            return Err(ActivityServiceError::MissingCareer);
        }
        let career_title = CareerTitle::new(career_title)?;
        let added = self
            .activity
            .record_view(&ViewedCareer {
                user_id,
                career_title,
                viewed_at: self.clock.now(),
            })
            .await?;
        if !added {
            debug!(%user_id, "career already among recent views");
        }
        self.viewed_careers(user_id).await
    }

    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` if the query fails.
    pub async fn viewed_careers(&self, user_id: UserId) -> Result<Vec<String>, ActivityServiceError> {
        let titles = self.activity.recent_views(user_id).await?;
        Ok(titles.into_iter().map(|t| t.as_str().to_owned()).collect())
    }

    /// Record a search and return the updated history.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError` for a blank or oversized query, or a
    /// storage failure.
    pub async fn record_search(
        &self,
        user_id: UserId,
        query: &str,
    ) -> Result<Vec<String>, ActivityServiceError> {
        if query.trim().is_empty() {
            return Err(ActivityServiceError::MissingQuery);
        }
        let query = SearchQuery::new(query)?;
        self.activity
            .record_search(&SearchEntry {
                user_id,
                query,
                searched_at: self.clock.now(),
            })
            .await?;
        self.search_history(user_id).await
    }

    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` if the query fails.
    pub async fn search_history(&self, user_id: UserId) -> Result<Vec<String>, ActivityServiceError> {
        let queries = self.activity.recent_searches(user_id).await?;
        Ok(queries.into_iter().map(|q| q.as_str().to_owned()).collect())
    }
}
