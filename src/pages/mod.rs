//! Presentation state for each surface, independent of how it is drawn.
//!
//! The web server renders these as HTML and the CLI as text; both drive the
//! same transitions and show the same notices.

pub mod auth;
pub mod dashboard;
pub mod landing;
pub mod profile_setup;

use serde::{Deserialize, Serialize};

pub use auth::{AuthForm, AuthPage};
pub use dashboard::{DashboardPage, DashboardState};
pub use landing::LANDING;
pub use profile_setup::{ProfileForm, ProfileSetupPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    Register,
    Login,
    ProfileSetup,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Register => "/register",
            Route::Login => "/login",
            Route::ProfileSetup => "/profile-setup",
            Route::Dashboard => "/dashboard",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Destructive,
}

/// A transient, user-visible message (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub tone: Tone,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: Tone::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: Tone::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.tone == Tone::Destructive
    }
}

/// What a form submission leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Navigate { to: Route, notice: Option<Notice> },
    /// Stay on the form and show the notice
    Stay(Notice),
}

impl Transition {
    pub fn navigate(to: Route) -> Self {
        Transition::Navigate { to, notice: None }
    }

    pub fn navigate_with(to: Route, notice: Notice) -> Self {
        Transition::Navigate {
            to,
            notice: Some(notice),
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Transition::Navigate { notice, .. } => notice.as_ref(),
            Transition::Stay(notice) => Some(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_map_to_paths() {
        assert_eq!(Route::Landing.path(), "/");
        assert_eq!(Route::ProfileSetup.to_string(), "/profile-setup");
        assert_eq!(Route::Dashboard.path(), "/dashboard");
    }

    #[test]
    fn transition_exposes_its_notice() {
        let stay = Transition::Stay(Notice::destructive("Error", "nope"));
        assert!(stay.notice().unwrap().is_destructive());
        assert_eq!(Transition::navigate(Route::Login).notice(), None);
    }
}
