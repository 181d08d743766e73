//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the study state machine and the pool cache.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error("operation is only valid while studying")]
    NotStudying,
    #[error("no track selected")]
    NoTrackSelected,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StudyError {
    /// True for errors the HTTP layer should answer with a plain redirect
    /// rather than a failure page.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StudyError::NotStudying | StudyError::NoTrackSelected)
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
