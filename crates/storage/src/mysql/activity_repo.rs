use career_core::model::{
    CareerTitle, RECENT_ACTIVITY_LIMIT, SearchEntry, SearchQuery, UserId, ViewedCareer,
};
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;

use super::MySqlRepository;
use super::mapping::{map_career_title, map_search_query};
use crate::repository::{ActivityRepository, StorageError};

const KEEP: u64 = RECENT_ACTIVITY_LIMIT as u64;

/// Table layout shared by the recent-activity lists.
struct RecentTable {
    table: &'static str,
    value: &'static str,
    at: &'static str,
}

const VIEWED: RecentTable = RecentTable {
    table: "viewed_careers",
    value: "career_title",
    at: "viewed_at",
};

const SEARCHES: RecentTable = RecentTable {
    table: "search_history",
    value: "query",
    at: "searched_at",
};

impl MySqlRepository {
    /// Insert unless the user already has the value, then drop everything
    /// past the newest [`RECENT_ACTIVITY_LIMIT`] rows.
    async fn push_recent(
        &self,
        t: &RecentTable,
        user_id: UserId,
        value: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let inserted = sqlx::query(&format!(
            "INSERT IGNORE INTO {} (user_id, {}, {}) VALUES (?, ?, ?)",
            t.table, t.value, t.at
        ))
        .bind(user_id.value())
        .bind(value)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?
        .rows_affected()
            > 0;
        if !inserted {
            return Ok(false);
        }

        // MySQL refuses LIMIT directly inside IN; the derived table works.
        sqlx::query(&format!(
            r"
            DELETE FROM {table}
            WHERE user_id = ?
              AND id NOT IN (
                SELECT id FROM (
                    SELECT id FROM {table}
                    WHERE user_id = ?
                    ORDER BY {at} DESC, id DESC
                    LIMIT ?
                ) AS newest
              )
            ",
            table = t.table,
            at = t.at,
        ))
        .bind(user_id.value())
        .bind(user_id.value())
        .bind(KEEP)
        .execute(&self.pool)
        .await
        .map_err(|e| self.query_err(e))?;
        Ok(true)
    }

    async fn list_recent(
        &self,
        t: &RecentTable,
        user_id: UserId,
    ) -> Result<Vec<MySqlRow>, StorageError> {
        sqlx::query(&format!(
            "SELECT {} FROM {} WHERE user_id = ? ORDER BY {} DESC, id DESC LIMIT ?",
            t.value, t.table, t.at
        ))
        .bind(user_id.value())
        .bind(KEEP)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.query_err(e))
    }
}

#[async_trait::async_trait]
impl ActivityRepository for MySqlRepository {
    async fn record_view(&self, view: &ViewedCareer) -> Result<bool, StorageError> {
        self.push_recent(
            &VIEWED,
            view.user_id,
            view.career_title.as_str(),
            view.viewed_at,
        )
        .await
    }

    async fn recent_views(&self, user_id: UserId) -> Result<Vec<CareerTitle>, StorageError> {
        let rows = self.list_recent(&VIEWED, user_id).await?;
        rows.iter().map(map_career_title).collect()
    }

    async fn record_search(&self, search: &SearchEntry) -> Result<bool, StorageError> {
        self.push_recent(
            &SEARCHES,
            search.user_id,
            search.query.as_str(),
            search.searched_at,
        )
        .await
    }

    async fn recent_searches(&self, user_id: UserId) -> Result<Vec<SearchQuery>, StorageError> {
        let rows = self.list_recent(&SEARCHES, user_id).await?;
        rows.iter().map(map_search_query).collect()
    }
}
