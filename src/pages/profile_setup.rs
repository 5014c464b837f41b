use serde::Deserialize;
use tracing::warn;

use super::{Notice, Route, Transition};
use crate::auth::{Gate, GatedSession, SessionGate};
use crate::backend::ScoutClient;
use crate::models::ExpertiseLevel;
use crate::repository::ProfileRepository;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub expertise_level: String,
    #[serde(default)]
    pub goal: String,
}

impl ProfileForm {
    pub fn new(domain: impl Into<String>, expertise_level: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            expertise_level: expertise_level.into(),
            goal: goal.into(),
        }
    }
}

/// One-time profile form shown right after registration
pub struct ProfileSetupPage {
    gate: GatedSession,
    profiles: ProfileRepository,
}

impl ProfileSetupPage {
    pub async fn enter(client: &ScoutClient) -> Gate<Self> {
        SessionGate::enter(client).await.map(|gate| Self {
            gate,
            profiles: ProfileRepository::new(client.clone()),
        })
    }

    /// Validate locally, then create the profile. Nothing is sent unless the
    /// session carries an email and every field is filled in.
    pub async fn submit(&self, form: &ProfileForm) -> Transition {
        let Some(email) = self.gate.email().filter(|e| !e.is_empty()) else {
            return Transition::Stay(Notice::destructive(
                "Error",
                "User session not found. Please log in again.",
            ));
        };

        let domain = form.domain.trim();
        let goal = form.goal.trim();
        if domain.is_empty() || form.expertise_level.trim().is_empty() || goal.is_empty() {
            return Transition::Stay(Notice::destructive("Validation Error", "Please fill in all fields."));
        }
        let expertise_level: ExpertiseLevel = match form.expertise_level.parse() {
            Ok(level) => level,
            Err(e) => return Transition::Stay(Notice::destructive("Validation Error", e.to_string())),
        };

        let user_id = self.gate.user_id();
        match self
            .profiles
            .create(user_id, email, domain, expertise_level, goal)
            .await
        {
            Ok(_) => Transition::navigate_with(
                Route::Dashboard,
                Notice::info("Profile Created!", "Your profile has been set up successfully."),
            ),
            Err(e) => {
                warn!(%user_id, "profile creation failed: {}", e);
                Transition::Stay(Notice::destructive("Profile Creation Failed", e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use crate::types::{Operation, Table};
    use std::sync::Arc;

    async fn signed_in() -> (Arc<MemoryBackend>, ScoutClient) {
        let store = Arc::new(MemoryBackend::new());
        let client = ScoutClient::new(Backend::memory(store.clone()), "/profile-setup");
        client.sign_up("ren@example.com", "secret1").await.unwrap();
        (store, client)
    }

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login() {
        let client = ScoutClient::new(Backend::memory(Arc::new(MemoryBackend::new())), "/");
        assert!(matches!(
            ProfileSetupPage::enter(&client).await,
            Gate::Redirect(Route::Login)
        ));
    }

    #[tokio::test]
    async fn complete_form_creates_profile_and_opens_dashboard() {
        let (store, client) = signed_in().await;
        let page = ProfileSetupPage::enter(&client).await.admitted().unwrap();

        let outcome = page.submit(&ProfileForm::new("AI", "Expert", "Research")).await;
        assert_eq!(outcome.notice().unwrap().title, "Profile Created!");
        assert!(matches!(outcome, Transition::Navigate { to: Route::Dashboard, .. }));

        let rows = store.rows(Table::Profiles).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], "ren@example.com");
        assert_eq!(rows[0]["expertise_level"], "Expert");
    }

    #[tokio::test]
    async fn missing_fields_block_the_network_call() {
        let (store, client) = signed_in().await;
        let page = ProfileSetupPage::enter(&client).await.admitted().unwrap();

        for form in [
            ProfileForm::new("", "Beginner", "Learning"),
            ProfileForm::new("AI", "", "Learning"),
            ProfileForm::new("AI", "Beginner", "   "),
        ] {
            let outcome = page.submit(&form).await;
            assert_eq!(
                outcome,
                Transition::Stay(Notice::destructive("Validation Error", "Please fill in all fields."))
            );
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_expertise_level_is_rejected() {
        let (store, client) = signed_in().await;
        let page = ProfileSetupPage::enter(&client).await.admitted().unwrap();

        let outcome = page.submit(&ProfileForm::new("AI", "Guru", "Learning")).await;
        assert_eq!(outcome.notice().unwrap().title, "Validation Error");
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn second_profile_shows_backend_message() {
        let (store, client) = signed_in().await;
        let page = ProfileSetupPage::enter(&client).await.admitted().unwrap();
        page.submit(&ProfileForm::new("AI", "Expert", "Research")).await;

        let outcome = page.submit(&ProfileForm::new("Physics", "Beginner", "Learning")).await;
        let notice = outcome.notice().unwrap();
        assert_eq!(notice.title, "Profile Creation Failed");
        assert!(notice.description.contains("duplicate key value"));
        assert!(matches!(outcome, Transition::Stay(_)));

        let rows = store.rows(Table::Profiles).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["domain"], "AI");
        assert_eq!(
            store.calls(),
            vec![(Operation::Insert, Table::Profiles), (Operation::Insert, Table::Profiles)]
        );
    }
}
