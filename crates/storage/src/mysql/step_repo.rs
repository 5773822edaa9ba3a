use career_core::model::{CareerTitle, CompletedStep, StepIndex, UserId};

use super::MySqlRepository;
use super::mapping::map_step_index;
use crate::repository::{StepRepository, StorageError};

#[async_trait::async_trait]
impl StepRepository for MySqlRepository {
    async fn mark_completed(&self, step: &CompletedStep) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO completed_steps (user_id, career_title, step_index, completed_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE completed_at = VALUES(completed_at)
            ",
        )
        .bind(step.user_id.value())
        .bind(step.career_title.as_str())
        .bind(step.step_index.value())
        .bind(step.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;
        Ok(())
    }

    async fn unmark_completed(
        &self,
        user_id: UserId,
        career: &CareerTitle,
        step: StepIndex,
    ) -> Result<u64, StorageError> {
        let res = sqlx::query(
            r"
            DELETE FROM completed_steps
            WHERE user_id = ? AND career_title = ? AND step_index = ?
            ",
        )
        .bind(user_id.value())
        .bind(career.as_str())
        .bind(step.value())
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;
        Ok(res.rows_affected())
    }

    async fn completed_steps(
        &self,
        user_id: UserId,
        career: &CareerTitle,
    ) -> Result<Vec<StepIndex>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT step_index FROM completed_steps
            WHERE user_id = ? AND career_title = ?
            ORDER BY step_index ASC
            ",
        )
        .bind(user_id.value())
        .bind(career.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;

        rows.iter().map(map_step_index).collect()
    }
}
