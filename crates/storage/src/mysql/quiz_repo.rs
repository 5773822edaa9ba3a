use career_core::model::{NewQuizResult, QuizResult, QuizResultId, UserId};
use sqlx::Row;

use super::MySqlRepository;
use super::mapping::{db_err, json_to_text, map_quiz_row};
use crate::repository::{QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for MySqlRepository {
    async fn append_result(&self, result: NewQuizResult) -> Result<QuizResultId, StorageError> {
        let quiz_data = json_to_text(&result.quiz_data)?;
        let suggested = json_to_text(&result.suggested_careers)?;
        let res = sqlx::query(
            r"
            INSERT INTO quiz_results (user_id, quiz_data, suggested_careers, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(result.user_id.value())
        .bind(quiz_data)
        .bind(suggested)
        .bind(result.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;
        Ok(QuizResultId::new(res.last_insert_id()))
    }

    async fn results_for_user(&self, user_id: UserId) -> Result<Vec<QuizResult>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, quiz_data, suggested_careers, created_at
            FROM quiz_results
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;

        rows.iter().map(map_quiz_row).collect()
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM quiz_results WHERE user_id = ?")
            .bind(user_id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        let total: i64 = row.try_get("total").map_err(db_err)?;
        u64::try_from(total).map_err(|_| StorageError::Serialization("negative count".into()))
    }

    async fn clear_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM quiz_results WHERE user_id = ?")
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        Ok(res.rows_affected())
    }
}
