use career_core::model::SessionId;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::MySqlRepository;
use super::mapping::{db_err, session_data, session_from_text};
use crate::repository::{SessionRecord, SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for MySqlRepository {
    async fn load_session(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT session_id, expires, data FROM sessions WHERE session_id = ? AND expires > ?",
        )
        .bind(id.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let data: String = row.try_get("data").map_err(db_err)?;
        let (user, store) = session_from_text(&data)?;
        Ok(Some(SessionRecord {
            id: SessionId::new(row.try_get::<String, _>("session_id").map_err(db_err)?),
            user,
            expires_at: row.try_get("expires").map_err(db_err)?,
            store,
        }))
    }

    async fn store_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let data = session_data(&record.user, record.store)?;
        sqlx::query(
            r"
            INSERT INTO sessions (session_id, expires, data)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE expires = VALUES(expires), data = VALUES(data)
            ",
        )
        .bind(record.id.as_str())
        .bind(record.expires_at)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;
        Ok(())
    }

    async fn destroy_session(&self, id: &SessionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        Ok(res.rows_affected())
    }
}
