//! Cookie-backed client session for browser requests.
//!
//! The signed-in session travels in `sb-session` as URL-encoded JSON and is
//! checked against the backend before use. A one-shot `scout-notice` cookie
//! carries a notice across a redirect.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use std::convert::Infallible;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::AppState;
use crate::auth::Session;
use crate::backend::ScoutClient;
use crate::pages::{Notice, Route};

pub const SESSION_COOKIE: &str = "sb-session";
pub const NOTICE_COOKIE: &str = "scout-notice";

const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Per-request client, restored from cookies
pub struct WebSession {
    client: ScoutClient,
    /// Access token the request arrived with, valid or not
    arrived_with: Option<String>,
    flash: Option<Notice>,
    had_flash: bool,
    secure: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for WebSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let stored: Option<Session> = cookie(&parts.headers, SESSION_COOKIE).and_then(|raw| decode(&raw));
        let arrived_with = stored.as_ref().map(|s| s.access_token.clone());
        let session = match stored {
            Some(session) => restore(state, session).await,
            None => None,
        };

        let client = ScoutClient::new(state.backend.clone(), state.sign_up_redirect.clone()).with_session(session);
        let flash_cookie = cookie(&parts.headers, NOTICE_COOKIE);
        Ok(Self {
            client,
            arrived_with,
            had_flash: flash_cookie.is_some(),
            flash: flash_cookie.and_then(|raw| decode(&raw)),
            secure: state.secure_cookies,
        })
    }
}

/// Accept a cookie session only if the backend vouches for its token.
/// Expired sessions are passed through so the client can refresh them.
async fn restore(state: &AppState, session: Session) -> Option<Session> {
    if session.is_expired() {
        return Some(session);
    }
    match state.backend.verify_access_token(&session.access_token).await {
        Ok(user) if user.id == session.user.id => Some(session),
        Ok(user) => {
            warn!(cookie_user = %session.user.id, token_user = %user.id, "session cookie user mismatch");
            None
        }
        Err(e) => {
            debug!("discarding session cookie: {}", e);
            None
        }
    }
}

impl WebSession {
    pub fn client(&self) -> &ScoutClient {
        &self.client
    }

    /// Notice carried over from the previous response, if any
    pub fn take_flash(&mut self) -> Option<Notice> {
        self.flash.take()
    }

    pub fn page(&self, html: String) -> Response {
        self.finish(Html(html).into_response(), None)
    }

    pub fn redirect(&self, to: Route, notice: Option<&Notice>) -> Response {
        self.finish(Redirect::to(to.path()).into_response(), notice)
    }

    /// Write back session changes made while handling the request
    pub fn finish(&self, mut response: Response, notice: Option<&Notice>) -> Response {
        let headers = response.headers_mut();

        let current = self.client.current_session();
        let current_token = current.as_ref().map(|s| s.access_token.as_str());
        if current_token != self.arrived_with.as_deref() {
            match &current {
                Some(session) => match encode(session) {
                    Some(value) => append_cookie(headers, &self.cookie(SESSION_COOKIE, &value, SESSION_MAX_AGE_SECS)),
                    None => warn!("could not encode session cookie"),
                },
                None => append_cookie(headers, &self.cookie(SESSION_COOKIE, "", 0)),
            }
        }

        match notice.and_then(encode) {
            Some(value) => append_cookie(headers, &self.cookie(NOTICE_COOKIE, &value, 60)),
            // An untaken flash was not shown yet; leave it for the next page
            None if self.had_flash && self.flash.is_none() => {
                append_cookie(headers, &self.cookie(NOTICE_COOKIE, "", 0))
            }
            None => {}
        }
        response
    }

    fn cookie(&self, name: &str, value: &str, max_age: i64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
    }
}

fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("invalid Set-Cookie value: {}", e),
    }
}

/// Value of the named cookie from the request's `Cookie` headers
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn encode<T: Serialize>(value: &T) -> Option<String> {
    let json = serde_json::to_string(value).ok()?;
    Some(form_urlencoded::byte_serialize(json.as_bytes()).collect())
}

fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let json = form_urlencoded::parse(format!("v={raw}").as_bytes())
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())?;
    serde_json::from_str(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use uuid::Uuid;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; sb-session=abc%22; x=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("scout-notice=n1"));

        assert_eq!(cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc%22"));
        assert_eq!(cookie(&headers, NOTICE_COOKIE).as_deref(), Some("n1"));
        assert_eq!(cookie(&headers, "missing"), None);
    }

    #[test]
    fn session_survives_cookie_encoding() {
        let session = Session {
            access_token: "a.b.c".to_string(),
            refresh_token: "r t+=&;".to_string(),
            expires_at: 1_700_000_000,
            user: User {
                id: Uuid::new_v4(),
                email: Some("ana@example.com".to_string()),
            },
        };
        let encoded = encode(&session).unwrap();
        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
        assert_eq!(decode::<Session>(&encoded), Some(session));
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        assert_eq!(decode::<Session>("not-json"), None);
    }
}
