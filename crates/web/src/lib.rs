//! HTTP surface for the vocabulary trainer.
//!
//! Every mutating endpoint answers with a `303 See Other` back to `/`, which
//! renders the caller's session as JSON.

#![forbid(unsafe_code)]

mod context;
mod error;
mod handlers;
mod session;

use axum::Router;
use axum::routing::{get, post};

pub use context::AppState;
pub use error::WebError;
pub use session::{BrowserSession, SESSION_COOKIE};

/// Build the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/start_study", post(handlers::start_study))
        .route("/select_track/{lang}", post(handlers::select_track))
        .route("/submit_answer", post(handlers::submit_answer))
        .route("/next_card", post(handlers::next_card))
        .route("/flip", post(handlers::flip))
        .route("/get_hint", post(handlers::get_hint))
        .route("/reset_study", post(handlers::reset_study))
        .route("/go_to_start", post(handlers::go_to_start))
        .route("/debug/pools", get(handlers::debug_pools))
        .route("/cards/{lang}", get(handlers::list_cards))
        .with_state(state)
}
