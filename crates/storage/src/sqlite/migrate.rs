use chrono::Utc;
use sqlx::SqlitePool;
use vocab_core::model::Track;

use super::SqliteInitError;
use super::mapping::table_name;

/// Creates the schema: one card table per track plus the listing index.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: per-track card tables.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for track in Track::ALL {
            let table = table_name(track);
            sqlx::query(&format!(
                r"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    prompt TEXT NOT NULL,
                    answer TEXT NOT NULL,
                    pronunciation TEXT,
                    category TEXT NOT NULL DEFAULT 'General',
                    word_type TEXT NOT NULL DEFAULT 'Not specified',
                    level TEXT,
                    notes TEXT,
                    example TEXT,
                    created_at TEXT NOT NULL
                );
                "
            ))
            .execute(&mut *tx)
            .await?;

            sqlx::query(&format!(
                r"
                CREATE INDEX IF NOT EXISTS idx_{table}_category_answer
                    ON {table} (category, answer);
                "
            ))
            .execute(&mut *tx)
            .await?;

            sqlx::query(&format!(
                r"
                CREATE INDEX IF NOT EXISTS idx_{table}_level
                    ON {table} (level);
                "
            ))
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("applied schema migration v1");
    }

    Ok(())
}
