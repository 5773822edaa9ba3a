use chrono::Utc;
use sqlx::MySqlPool;

use super::MySqlInitError;

/// Ordered schema versions. Each entry is applied once and recorded in
/// `schema_migrations`.
///
/// MySQL commits DDL implicitly, so versions are not wrapped in a
/// transaction; every statement is safe to rerun.
///
/// Text keys compared by the application use `utf8mb4_bin`, matching the
/// exact comparison of the in-memory store. The server default collation
/// would fold case and accents.
const MIGRATIONS: &[(i64, &[&str])] = &[
    (
        1,
        &[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password VARCHAR(255) NOT NULL,
                grade TINYINT UNSIGNED NOT NULL CHECK (grade BETWEEN 10 AND 12),
                created_at DATETIME(6) NOT NULL,
                UNIQUE KEY uq_users_email (email)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
            r"
            CREATE TABLE IF NOT EXISTS quiz_results (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT UNSIGNED NOT NULL,
                quiz_data LONGTEXT NOT NULL,
                suggested_careers LONGTEXT NOT NULL,
                created_at DATETIME(6) NOT NULL,
                KEY idx_quiz_results_user_created (user_id, created_at),
                CONSTRAINT fk_quiz_results_user FOREIGN KEY (user_id)
                    REFERENCES users(id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
            r"
            CREATE TABLE IF NOT EXISTS completed_steps (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT UNSIGNED NOT NULL,
                career_title VARCHAR(255) NOT NULL,
                step_index INT UNSIGNED NOT NULL,
                completed_at DATETIME(6) NOT NULL,
                UNIQUE KEY uq_completed_steps (user_id, career_title, step_index),
                CONSTRAINT fk_completed_steps_user FOREIGN KEY (user_id)
                    REFERENCES users(id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
        ],
    ),
    (
        2,
        &[
            r"
            CREATE TABLE IF NOT EXISTS favorite_jobs (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT UNSIGNED NOT NULL,
                job_title VARCHAR(255) NOT NULL,
                created_at DATETIME(6) NOT NULL,
                UNIQUE KEY uq_favorite_jobs (user_id, job_title),
                CONSTRAINT fk_favorite_jobs_user FOREIGN KEY (user_id)
                    REFERENCES users(id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                session_id VARCHAR(128) NOT NULL PRIMARY KEY,
                expires DATETIME(6) NOT NULL,
                data MEDIUMTEXT NOT NULL,
                KEY idx_sessions_expires (expires)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
        ],
    ),
    (
        3,
        &[
            r"
            ALTER TABLE users
                MODIFY email VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL
            ",
            r"
            ALTER TABLE completed_steps
                MODIFY career_title VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL
            ",
            r"
            ALTER TABLE favorite_jobs
                MODIFY job_title VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL
            ",
            r"
            ALTER TABLE sessions
                MODIFY session_id VARCHAR(128) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL
            ",
            r"
            CREATE TABLE IF NOT EXISTS viewed_careers (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT UNSIGNED NOT NULL,
                career_title VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                viewed_at DATETIME(6) NOT NULL,
                UNIQUE KEY uq_viewed_careers (user_id, career_title),
                KEY idx_viewed_careers_user_time (user_id, viewed_at),
                CONSTRAINT fk_viewed_careers_user FOREIGN KEY (user_id)
                    REFERENCES users(id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
            r"
            CREATE TABLE IF NOT EXISTS search_history (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT UNSIGNED NOT NULL,
                query VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                searched_at DATETIME(6) NOT NULL,
                UNIQUE KEY uq_search_history (user_id, query),
                KEY idx_search_history_user_time (user_id, searched_at),
                CONSTRAINT fk_search_history_user FOREIGN KEY (user_id)
                    REFERENCES users(id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            ",
        ],
    ),
];

pub async fn run_migrations(pool: &MySqlPool) -> Result<(), MySqlInitError> {
    async fn is_applied(pool: &MySqlPool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version BIGINT NOT NULL PRIMARY KEY,
                applied_at DATETIME(6) NOT NULL
            ) ENGINE=InnoDB
            ",
    )
    .execute(pool)
    .await?;

    for &(version, statements) in MIGRATIONS {
        if is_applied(pool, version).await? {
            continue;
        }
        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }
        sqlx::query("INSERT IGNORE INTO schema_migrations (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(Utc::now())
            .execute(pool)
            .await?;
        tracing::info!(version, "applied schema migration");
    }

    Ok(())
}
