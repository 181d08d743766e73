use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use services::SharedSession;
use vocab_core::model::SessionKey;

use crate::context::AppState;

pub const SESSION_COOKIE: &str = "vocab_session";

/// The caller's session, resolved from the `vocab_session` cookie.
///
/// Unknown, expired or malformed cookies start a fresh session; `respond`
/// then sets the new cookie on the way out.
pub struct BrowserSession {
    key: SessionKey,
    state: SharedSession,
    created: bool,
}

impl BrowserSession {
    #[must_use]
    pub fn key(&self) -> SessionKey {
        self.key
    }

    #[must_use]
    pub fn state(&self) -> &SharedSession {
        &self.state
    }

    /// Turn `body` into a response, attaching `Set-Cookie` for new sessions.
    pub fn respond(&self, body: impl IntoResponse) -> Response {
        if !self.created {
            return body.into_response();
        }
        let cookie = Cookie::build((SESSION_COOKIE, self.key.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .build();
        (CookieJar::new().add(cookie), body).into_response()
    }
}

impl FromRequestParts<AppState> for BrowserSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = session_key_from(&CookieJar::from_headers(&parts.headers));
        let (key, session, created) = state.sessions.get_or_create(presented);
        if created {
            log::debug!("started new browser session");
        }
        Ok(Self {
            key,
            state: session,
            created,
        })
    }
}

fn session_key_from(jar: &CookieJar) -> Option<SessionKey> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};

    fn jar(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let key = SessionKey::generate();
        let found = session_key_from(&jar(&format!("theme=dark; {SESSION_COOKIE}={key}")));
        assert_eq!(found, Some(key));
    }

    #[test]
    fn malformed_or_missing_cookie_is_ignored() {
        assert_eq!(session_key_from(&jar("vocab_session=not-a-uuid")), None);
        assert_eq!(session_key_from(&jar("other=1")), None);
        assert_eq!(session_key_from(&CookieJar::new()), None);
    }
}
