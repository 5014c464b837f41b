use tracing::debug;
use uuid::Uuid;

use super::{Session, Subscription};
use crate::backend::ScoutClient;
use crate::pages::Route;

/// Outcome of entering a page that requires a session
#[derive(Debug)]
pub enum Gate<T = GatedSession> {
    /// No session: go here and do nothing else
    Redirect(Route),
    Admitted(T),
}

impl<T> Gate<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gate<U> {
        match self {
            Gate::Redirect(route) => Gate::Redirect(route),
            Gate::Admitted(value) => Gate::Admitted(f(value)),
        }
    }

    pub fn admitted(self) -> Option<T> {
        match self {
            Gate::Admitted(value) => Some(value),
            Gate::Redirect(_) => None,
        }
    }
}

/// The session a gated page was admitted with, plus the page's subscription
/// to session transitions. Dropping it (page teardown) unsubscribes.
#[derive(Debug)]
pub struct GatedSession {
    session: Session,
    subscription: Subscription,
}

impl GatedSession {
    pub fn user_id(&self) -> Uuid {
        self.session.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.session.email()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolves once the client signs out; the page should then go to login
    pub async fn signed_out(&mut self) -> Route {
        self.subscription.signed_out().await;
        Route::Login
    }

    /// `Some(Route::Login)` when a sign-out happened since the last check
    pub fn poll_signed_out(&mut self) -> Option<Route> {
        self.subscription.try_signed_out().then_some(Route::Login)
    }
}

pub struct SessionGate;

impl SessionGate {
    /// Query the current session once. Without one, redirect to login;
    /// with one, subscribe to transitions for the lifetime of the page.
    pub async fn enter(client: &ScoutClient) -> Gate {
        match client.get_session().await {
            None => {
                debug!("no session, redirecting to login");
                Gate::Redirect(Route::Login)
            }
            Some(session) => {
                debug!(user_id = %session.user.id, "session gate admitted");
                Gate::Admitted(GatedSession {
                    session,
                    subscription: client.on_session_change(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use std::sync::Arc;

    fn client() -> ScoutClient {
        ScoutClient::new(Backend::memory(Arc::new(MemoryBackend::new())), "/profile-setup")
    }

    #[tokio::test]
    async fn no_session_redirects_to_login() {
        let client = client();
        match SessionGate::enter(&client).await {
            Gate::Redirect(route) => assert_eq!(route, Route::Login),
            Gate::Admitted(_) => panic!("admitted without a session"),
        }
        assert_eq!(client.session_state().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn admitted_page_holds_subscription_until_dropped() {
        let client = client();
        let session = client.sign_up("lin@example.com", "s3cret!").await.unwrap().session.unwrap();

        let gated = SessionGate::enter(&client).await.admitted().unwrap();
        assert_eq!(gated.user_id(), session.user.id);
        assert_eq!(gated.email(), Some("lin@example.com"));
        assert_eq!(client.session_state().subscriber_count(), 1);

        drop(gated);
        assert_eq!(client.session_state().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn sign_out_routes_admitted_page_to_login() {
        let client = client();
        client.sign_up("lin@example.com", "s3cret!").await.unwrap();
        let mut gated = SessionGate::enter(&client).await.admitted().unwrap();
        assert_eq!(gated.poll_signed_out(), None);

        client.sign_out().await.unwrap();
        assert_eq!(gated.signed_out().await, Route::Login);
    }
}
