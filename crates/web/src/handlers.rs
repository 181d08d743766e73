use axum::Json;
use axum::extract::{Form, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use storage::repository::{CardFilter, CardPage, CardStore as _, PageRequest};
use vocab_core::model::Track;

use crate::context::AppState;
use crate::error::WebError;
use crate::session::BrowserSession;

fn home() -> Redirect {
    Redirect::to("/")
}

// ─── Page ───────────────────────────────────────────────────────────────────

pub async fn index(State(app): State<AppState>, session: BrowserSession) -> Response {
    let result = async {
        let mut state = session.state().lock().await;
        Ok::<_, WebError>(Json(app.study.page(&mut state).await?))
    }
    .await;
    session.respond(result)
}

// ─── Study transitions ─────────────────────────────────────────────────────

pub async fn start_study(State(app): State<AppState>, session: BrowserSession) -> Response {
    let mut state = session.state().lock().await;
    app.study.begin(&mut state);
    drop(state);
    session.respond(home())
}

pub async fn select_track(
    State(app): State<AppState>,
    session: BrowserSession,
    Path(lang): Path<String>,
) -> Response {
    let Ok(track) = lang.parse::<Track>() else {
        log::debug!("ignoring selection of unknown track `{lang}`");
        return session.respond(home());
    };
    let result = async {
        let mut state = session.state().lock().await;
        app.study.select_track(&mut state, track).await?;
        Ok::<_, WebError>(home())
    }
    .await;
    session.respond(result)
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    pub user_input: String,
}

pub async fn submit_answer(
    State(app): State<AppState>,
    session: BrowserSession,
    Form(form): Form<AnswerForm>,
) -> Response {
    let result = async {
        let mut state = session.state().lock().await;
        app.study.submit_answer(&mut state, &form.user_input).await?;
        Ok::<_, WebError>(home())
    }
    .await;
    session.respond(result)
}

pub async fn next_card(State(app): State<AppState>, session: BrowserSession) -> Response {
    let result = async {
        let mut state = session.state().lock().await;
        app.study.advance(&mut state).await?;
        Ok::<_, WebError>(home())
    }
    .await;
    session.respond(result)
}

pub async fn flip(State(app): State<AppState>, session: BrowserSession) -> Response {
    let mut state = session.state().lock().await;
    let result = app.study.flip(&mut state).map(Json).map_err(WebError::from);
    drop(state);
    session.respond(result)
}

pub async fn get_hint(State(app): State<AppState>, session: BrowserSession) -> Response {
    let result = async {
        let mut state = session.state().lock().await;
        app.study.request_hint(&mut state).await?;
        Ok::<_, WebError>(home())
    }
    .await;
    session.respond(result)
}

pub async fn reset_study(State(app): State<AppState>, session: BrowserSession) -> Response {
    let result = async {
        let mut state = session.state().lock().await;
        app.study.reset_study(&mut state).await?;
        Ok::<_, WebError>(home())
    }
    .await;
    session.respond(result)
}

pub async fn go_to_start(State(app): State<AppState>, session: BrowserSession) -> Response {
    let mut state = session.state().lock().await;
    app.study.return_to_start(&mut state).await;
    drop(state);
    // A cleared session holds nothing worth keeping; the next request starts a new one.
    app.sessions.remove(&session.key());
    session.respond(home())
}

// ─── Diagnostics and listing ───────────────────────────────────────────────

pub async fn debug_pools(State(app): State<AppState>) -> Response {
    Json(app.study.pool_stats().await).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct CardsQuery {
    pub category: Option<String>,
    pub level: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CardsQuery {
    fn filter(&self) -> CardFilter {
        CardFilter {
            category: self.category.clone().filter(|c| !c.trim().is_empty()),
            level: self.level.clone().filter(|l| !l.trim().is_empty()),
        }
    }

    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .normalized()
    }
}

pub async fn list_cards(
    State(app): State<AppState>,
    Path(lang): Path<String>,
    Query(query): Query<CardsQuery>,
) -> Result<Json<CardPage>, WebError> {
    let track: Track = lang.parse().map_err(|_| WebError::UnknownTrack(lang))?;
    let page = app
        .cards
        .list_cards(track, &query.filter(), query.page_request())
        .await?;
    Ok(Json(page))
}
