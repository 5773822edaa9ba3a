use career_core::model::{
    CareerTitle, Email, Grade, JobTitle, QuizResult, QuizResultId, SearchQuery, SessionUser,
    StepIndex, User, UserId, UserName,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use crate::availability::StoreKind;
use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Classify a driver error.
///
/// Only a broken transport becomes `Connection`; the dispatcher treats that
/// variant as the signal to fall back to memory. A pool timeout is ambiguous
/// on its own, see `MySqlRepository::query_err`.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        sqlx::Error::Database(db) => StorageError::Query(db.message().to_string()),
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StorageError::Connection(e.to_string()),
        sqlx::Error::PoolTimedOut => StorageError::Timeout(e.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::Encode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => ser(&e),
        _ => StorageError::Query(e.to_string()),
    }
}

pub(crate) fn json_to_text(value: &Value) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn text_to_json(field: &'static str, raw: &str) -> Result<Value, StorageError> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("invalid {field}: {e}")))
}

pub(crate) fn map_user_row(row: &MySqlRow) -> Result<User, StorageError> {
    let grade: u8 = row.try_get("grade").map_err(ser)?;
    Ok(User::from_persisted(
        UserId::new(row.try_get::<u64, _>("id").map_err(ser)?),
        UserName::new(row.try_get::<String, _>("name").map_err(ser)?).map_err(ser)?,
        Email::parse(row.try_get::<String, _>("email").map_err(ser)?).map_err(ser)?,
        row.try_get("password").map_err(ser)?,
        Grade::from_number(i64::from(grade)).map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_quiz_row(row: &MySqlRow) -> Result<QuizResult, StorageError> {
    let quiz_data: String = row.try_get("quiz_data").map_err(ser)?;
    let suggested: String = row.try_get("suggested_careers").map_err(ser)?;
    Ok(QuizResult {
        id: QuizResultId::new(row.try_get::<u64, _>("id").map_err(ser)?),
        user_id: UserId::new(row.try_get::<u64, _>("user_id").map_err(ser)?),
        quiz_data: text_to_json("quiz_data", &quiz_data)?,
        suggested_careers: text_to_json("suggested_careers", &suggested)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_step_index(row: &MySqlRow) -> Result<StepIndex, StorageError> {
    Ok(StepIndex::new(
        row.try_get::<u32, _>("step_index").map_err(ser)?,
    ))
}

pub(crate) fn map_job_title(row: &MySqlRow) -> Result<JobTitle, StorageError> {
    JobTitle::new(row.try_get::<String, _>("job_title").map_err(ser)?).map_err(ser)
}

pub(crate) fn map_career_title(row: &MySqlRow) -> Result<CareerTitle, StorageError> {
    CareerTitle::new(row.try_get::<String, _>("career_title").map_err(ser)?).map_err(ser)
}

pub(crate) fn map_search_query(row: &MySqlRow) -> Result<SearchQuery, StorageError> {
    SearchQuery::new(row.try_get::<String, _>("query").map_err(ser)?).map_err(ser)
}

/// JSON kept in `sessions.data`. Rows written before sessions carried their
/// store have no `store` key and were all issued by the database.
#[derive(Serialize, Deserialize)]
struct SessionData {
    #[serde(flatten)]
    user: SessionUser,
    #[serde(default)]
    store: StoreKind,
}

pub(crate) fn session_data(user: &SessionUser, store: StoreKind) -> Result<String, StorageError> {
    serde_json::to_string(&SessionData {
        user: user.clone(),
        store,
    })
    .map_err(ser)
}

pub(crate) fn session_from_text(raw: &str) -> Result<(SessionUser, StoreKind), StorageError> {
    let data: SessionData = serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("session data: {e}")))?;
    Ok((data.user, data.store))
}
