use tracing::{debug, info, warn};

use super::Backend;
use crate::auth::{AuthEvent, Session, SessionState, SignUp, Subscription};
use crate::error::Result;

/// One client instance: the shared backend handle plus this client's session.
///
/// Mirrors the hosted SDK's auth surface (`sign_up`, `sign_in`, `sign_out`,
/// `get_session`, `on_session_change`) and hands the current access token to
/// the repositories for data calls.
#[derive(Debug, Clone)]
pub struct ScoutClient {
    backend: Backend,
    state: SessionState,
    sign_up_redirect: String,
}

impl ScoutClient {
    pub fn new(backend: Backend, sign_up_redirect: impl Into<String>) -> Self {
        Self {
            backend,
            state: SessionState::new(None),
            sign_up_redirect: sign_up_redirect.into(),
        }
    }

    /// Resume a session persisted elsewhere (cookie, CLI state file)
    pub fn with_session(self, session: Option<Session>) -> Self {
        Self {
            state: SessionState::new(session),
            ..self
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp> {
        let sign_up = self
            .backend
            .auth()
            .sign_up(email.trim(), password, &self.sign_up_redirect)
            .await?;
        info!(user_id = %sign_up.user.id, confirmed = sign_up.session.is_some(), "user signed up");
        if let Some(session) = &sign_up.session {
            self.state.set(AuthEvent::SignedIn, Some(session.clone()));
        }
        Ok(sign_up)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.backend.auth().sign_in(email.trim(), password).await?;
        info!(user_id = %session.user.id, "user signed in");
        self.state.set(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Revoke the session remotely and forget it locally. The local session is
    /// cleared (and subscribers notified) even when the remote call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.state.current() else {
            debug!("sign out without a session");
            self.state.set(AuthEvent::SignedOut, None);
            return Ok(());
        };

        let remote = self.backend.auth().sign_out(&session.access_token).await;
        if let Err(e) = &remote {
            warn!(user_id = %session.user.id, "remote sign out failed: {}", e);
        }
        info!(user_id = %session.user.id, "user signed out");
        self.state.set(AuthEvent::SignedOut, None);
        remote
    }

    /// Current session, refreshed once if its access token has expired.
    /// A failed refresh signs the client out.
    pub async fn get_session(&self) -> Option<Session> {
        let session = self.state.current()?;
        if !session.is_expired() {
            return Some(session);
        }

        debug!(user_id = %session.user.id, "access token expired, refreshing");
        match self.backend.auth().refresh(&session.refresh_token).await {
            Ok(fresh) => {
                self.state.set(AuthEvent::TokenRefreshed, Some(fresh.clone()));
                Some(fresh)
            }
            Err(e) => {
                warn!(user_id = %session.user.id, "session refresh failed: {}", e);
                self.state.set(AuthEvent::SignedOut, None);
                None
            }
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state.current()
    }

    pub fn on_session_change(&self) -> Subscription {
        self.state.subscribe()
    }

    /// Bearer token for data calls; `None` falls back to the public key
    pub fn access_token(&self) -> Option<String> {
        self.state.current().map(|s| s.access_token)
    }
}
