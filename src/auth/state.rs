use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use super::Session;

const EVENT_CAPACITY: usize = 16;

/// Session-state transitions observed by subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// The current session of one client instance plus its change feed.
///
/// Cloning shares the same state; every clone sees the same session and
/// reaches the same subscribers.
#[derive(Debug, Clone)]
pub struct SessionState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionState {
    pub fn new(initial: Option<Session>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                session: RwLock::new(initial),
                events,
            }),
        }
    }

    pub fn current(&self) -> Option<Session> {
        match self.inner.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the stored session and notify subscribers
    pub fn set(&self, event: AuthEvent, session: Option<Session>) {
        match self.inner.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
        // No receivers is fine: nobody is watching this client right now
        let _ = self.inner.events.send(event);
    }

    pub fn subscribe(&self) -> Subscription {
        debug!("session subscription acquired");
        Subscription {
            events: self.inner.events.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }
}

/// A page's handle on session transitions. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    events: broadcast::Receiver<AuthEvent>,
}

impl Subscription {
    /// Next transition, or `None` once the owning client is gone
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("session subscription skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Resolves when the session transitions to signed out
    pub async fn signed_out(&mut self) {
        loop {
            match self.next().await {
                Some(AuthEvent::SignedOut) => return,
                Some(_) => continue,
                // The client went away; nothing will ever sign it out
                None => return std::future::pending().await,
            }
        }
    }

    /// Non-blocking check for a pending sign-out
    pub fn try_signed_out(&mut self) -> bool {
        loop {
            match self.events.try_recv() {
                Ok(AuthEvent::SignedOut) => return true,
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return false,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("session subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: i64::MAX,
            user: User {
                id: Uuid::new_v4(),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn subscribers_see_sign_out() {
        let state = SessionState::new(Some(session()));
        let mut sub = state.subscribe();

        state.set(AuthEvent::TokenRefreshed, Some(session()));
        state.set(AuthEvent::SignedOut, None);

        sub.signed_out().await;
        assert!(state.current().is_none());
    }

    #[test]
    fn dropping_subscription_releases_it() {
        let state = SessionState::new(None);
        let first = state.subscribe();
        let second = state.subscribe();
        assert_eq!(state.subscriber_count(), 2);

        drop(first);
        assert_eq!(state.subscriber_count(), 1);
        drop(second);
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn try_signed_out_ignores_other_events() {
        let state = SessionState::new(None);
        let mut sub = state.subscribe();
        state.set(AuthEvent::SignedIn, Some(session()));
        assert!(!sub.try_signed_out());
        state.set(AuthEvent::SignedOut, None);
        assert!(sub.try_signed_out());
    }

    #[test]
    fn clones_share_state() {
        let state = SessionState::new(None);
        let other = state.clone();
        other.set(AuthEvent::SignedIn, Some(session()));
        assert!(state.current().is_some());
    }
}
