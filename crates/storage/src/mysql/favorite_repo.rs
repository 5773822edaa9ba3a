use career_core::model::{FavoriteJob, JobTitle, UserId};

use super::MySqlRepository;
use super::mapping::map_job_title;
use crate::repository::{FavoriteRepository, StorageError};

#[async_trait::async_trait]
impl FavoriteRepository for MySqlRepository {
    async fn add_favorite(&self, favorite: &FavoriteJob) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT IGNORE INTO favorite_jobs (user_id, job_title, created_at)
            VALUES (?, ?, ?)
            ",
        )
        .bind(favorite.user_id.value())
        .bind(favorite.job_title.as_str())
        .bind(favorite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        title: &JobTitle,
    ) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM favorite_jobs WHERE user_id = ? AND job_title = ?")
            .bind(user_id.value())
            .bind(title.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        Ok(res.rows_affected())
    }

    async fn favorites(&self, user_id: UserId) -> Result<Vec<JobTitle>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT job_title FROM favorite_jobs
            WHERE user_id = ?
            ORDER BY created_at ASC, job_title ASC
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;

        rows.iter().map(map_job_title).collect()
    }
}
