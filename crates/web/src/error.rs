use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use services::StudyError;
use storage::repository::StorageError;
use thiserror::Error;

/// Handler failures and how they reach the browser.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebError {
    #[error(transparent)]
    Study(#[from] StudyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("unknown track `{0}`")]
    UnknownTrack(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Study(err) if err.is_recoverable() => {
                log::debug!("ignoring out-of-place request: {err}");
                Redirect::to("/").into_response()
            }
            WebError::UnknownTrack(code) => {
                (StatusCode::NOT_FOUND, format!("unknown track `{code}`")).into_response()
            }
            other => {
                log::error!("request failed: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
