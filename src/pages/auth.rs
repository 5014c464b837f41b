use serde::Deserialize;
use tracing::warn;

use super::{Notice, Route, Transition};
use crate::backend::ScoutClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl AuthForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn incomplete(&self) -> Option<Transition> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Some(Transition::Stay(Notice::destructive(
                "Validation Error",
                "Please fill in all fields.",
            )));
        }
        None
    }
}

/// Login and register forms; neither is gated
pub struct AuthPage {
    client: ScoutClient,
}

impl AuthPage {
    pub fn new(client: ScoutClient) -> Self {
        Self { client }
    }

    /// Sign up, then continue to profile setup. When the auth service holds
    /// the account for email confirmation there is no session yet, so the
    /// user is sent to login instead.
    pub async fn register(&self, form: &AuthForm) -> Transition {
        if let Some(invalid) = form.incomplete() {
            return invalid;
        }

        match self.client.sign_up(&form.email, &form.password).await {
            Ok(sign_up) if sign_up.session.is_some() => Transition::navigate_with(
                Route::ProfileSetup,
                Notice::info("Account created!", "Let's set up your research profile."),
            ),
            Ok(_) => Transition::navigate_with(
                Route::Login,
                Notice::info(
                    "Check your email",
                    "Confirm your email address, then sign in to continue.",
                ),
            ),
            Err(e) => {
                warn!("registration failed: {}", e);
                Transition::Stay(Notice::destructive("Registration Failed", e.to_string()))
            }
        }
    }

    pub async fn login(&self, form: &AuthForm) -> Transition {
        if let Some(invalid) = form.incomplete() {
            return invalid;
        }

        match self.client.sign_in(&form.email, &form.password).await {
            Ok(_) => Transition::navigate_with(
                Route::Dashboard,
                Notice::info("Welcome back!", "You've successfully logged in."),
            ),
            Err(e) => {
                warn!("login failed: {}", e);
                Transition::Stay(Notice::destructive("Login Failed", e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use std::sync::Arc;

    fn page(store: MemoryBackend) -> (ScoutClient, AuthPage) {
        let client = ScoutClient::new(Backend::memory(Arc::new(store)), "/profile-setup");
        (client.clone(), AuthPage::new(client))
    }

    #[tokio::test]
    async fn register_goes_to_profile_setup() {
        let (client, page) = page(MemoryBackend::new());
        let outcome = page.register(&AuthForm::new("mo@example.com", "pa55word")).await;
        assert!(matches!(outcome, Transition::Navigate { to: Route::ProfileSetup, .. }));
        assert!(client.current_session().is_some());
    }

    #[tokio::test]
    async fn register_pending_confirmation_goes_to_login() {
        let (client, page) = page(MemoryBackend::new().requiring_email_confirmation());
        let outcome = page.register(&AuthForm::new("mo@example.com", "pa55word")).await;
        match outcome {
            Transition::Navigate { to, notice } => {
                assert_eq!(to, Route::Login);
                assert!(!notice.unwrap().is_destructive());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(client.current_session().is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_shows_backend_message() {
        let (_client, page) = page(MemoryBackend::new());
        page.register(&AuthForm::new("mo@example.com", "pa55word")).await;
        let outcome = page.register(&AuthForm::new("mo@example.com", "pa55word")).await;
        let notice = outcome.notice().unwrap();
        assert_eq!(notice.title, "Registration Failed");
        assert_eq!(notice.description, "User already registered");
    }

    #[tokio::test]
    async fn login_failure_stays_on_form() {
        let (_client, page) = page(MemoryBackend::new());
        page.register(&AuthForm::new("mo@example.com", "pa55word")).await;

        let outcome = page.login(&AuthForm::new("mo@example.com", "wrong")).await;
        assert_eq!(
            outcome,
            Transition::Stay(Notice::destructive("Login Failed", "Invalid login credentials"))
        );

        let outcome = page.login(&AuthForm::new("mo@example.com", "pa55word")).await;
        assert!(matches!(outcome, Transition::Navigate { to: Route::Dashboard, .. }));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_locally() {
        let (client, page) = page(MemoryBackend::new());

        let outcome = page.login(&AuthForm::new("  ", "secret")).await;
        assert_eq!(outcome.notice().unwrap().title, "Validation Error");

        let outcome = page.register(&AuthForm::new("mo@example.com", "")).await;
        assert_eq!(outcome.notice().unwrap().description, "Please fill in all fields.");
        assert!(client.current_session().is_none());
    }
}
