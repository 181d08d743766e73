use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{CardStore, Storage};

mod card_repo;
mod mapping;
mod migrate;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Card store over one `SQLite` database holding a table per track.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Parse `database_url` into connection options: WAL journal, busy timeout,
/// and the file created on first use.
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, SqliteInitError> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT))
}

impl SqliteRepository {
    /// Open a connection pool for `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the URL is malformed or no connection can
    /// be established.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = connect_options(database_url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;
        log::debug!("opened sqlite pool for {database_url}");
        Ok(Self { pool })
    }

    /// Create the per-track card tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Connect, migrate, and wrap the repository as the card store.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let cards: Arc<dyn CardStore> = Arc::new(repo);
        Ok(Self { cards })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn file_urls_keep_their_path() {
        let options = connect_options("sqlite://data/vocab.db").unwrap();
        assert_eq!(options.get_filename(), Path::new("data/vocab.db"));
    }

    #[test]
    fn bad_query_parameters_are_rejected() {
        let err = connect_options("sqlite:vocab.db?mode=sideways").unwrap_err();
        assert!(matches!(err, SqliteInitError::Sqlx(_)));
    }

    #[tokio::test]
    async fn migrations_can_run_twice() {
        let url = "sqlite:file:memdb_migrate_twice?mode=memory&cache=shared";
        let repo = SqliteRepository::connect(url).await.unwrap();
        repo.migrate().await.unwrap();
        repo.migrate().await.unwrap();

        let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'cards_%'",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(tables, 2);
    }
}
