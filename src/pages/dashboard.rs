use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Notice, Route};
use crate::auth::{Gate, GatedSession, SessionGate};
use crate::backend::ScoutClient;
use crate::models::{Paper, Profile};
use crate::repository::{FeedbackRepository, PaperRepository, ProfileRepository};
use crate::search;

pub const LOADING_MESSAGE: &str = "Loading your research dashboard...";
pub const NO_MATCHES_MESSAGE: &str = "No papers found matching your search.";

/// Notice shown after a feedback write
pub fn feedback_notice(recorded: bool) -> Notice {
    if recorded {
        Notice::info("Thank you!", "Your feedback has been recorded.")
    } else {
        Notice::destructive("Error", "Failed to submit feedback.")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    /// Terminal for the life of the page
    Ready,
}

pub struct DashboardPage {
    client: ScoutClient,
    gate: GatedSession,
    profiles: ProfileRepository,
    papers_repo: PaperRepository,
    feedback: FeedbackRepository,
    state: DashboardState,
    profile: Option<Profile>,
    papers: Vec<Paper>,
    query: String,
    /// Per-card selection; starts empty on every entry
    judgments: HashMap<Uuid, bool>,
}

impl DashboardPage {
    /// Pass the session gate. The page starts in `Loading`; call
    /// [`DashboardPage::load`] to fetch its working set.
    pub async fn enter(client: &ScoutClient) -> Gate<Self> {
        SessionGate::enter(client).await.map(|gate| Self {
            client: client.clone(),
            gate,
            profiles: ProfileRepository::new(client.clone()),
            papers_repo: PaperRepository::new(client.clone()),
            feedback: FeedbackRepository::new(client.clone()),
            state: DashboardState::Loading,
            profile: None,
            papers: Vec::new(),
            query: String::new(),
            judgments: HashMap::new(),
        })
    }

    /// Fetch profile and papers concurrently and move to `Ready` once both
    /// settle. A missing profile only hides the profile panel; a paper
    /// failure leaves the list empty and returns an error notice.
    pub async fn load(&mut self) -> Option<Notice> {
        if self.state == DashboardState::Ready {
            return None;
        }

        let user_id = self.gate.user_id();
        let (profile, papers) = futures::join!(self.profiles.read(user_id), self.papers_repo.list());

        self.profile = match profile {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!(%user_id, "no profile for dashboard: {}", e);
                None
            }
        };

        let notice = match papers {
            Ok(papers) => {
                debug!(%user_id, count = papers.len(), "dashboard papers loaded");
                self.papers = papers;
                None
            }
            Err(e) => {
                warn!(%user_id, "failed to load papers: {}", e);
                self.papers.clear();
                Some(Notice::destructive("Error Loading Papers", e.to_string()))
            }
        };

        self.state = DashboardState::Ready;
        notice
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Papers matching the current query, in list order
    pub fn visible(&self) -> Vec<&Paper> {
        search::filter(&self.papers, &self.query)
    }

    /// Placeholder text for an empty (or still loading) list
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.state {
            DashboardState::Loading => Some(LOADING_MESSAGE),
            DashboardState::Ready if self.visible().is_empty() => Some(NO_MATCHES_MESSAGE),
            DashboardState::Ready => None,
        }
    }

    pub fn judgment(&self, paper_id: Uuid) -> Option<bool> {
        self.judgments.get(&paper_id).copied()
    }

    pub fn find_paper(&self, paper_id: Uuid) -> Option<&Paper> {
        self.papers.iter().find(|p| p.id == paper_id)
    }

    /// Mark the card, then record the judgment. The card keeps its selection
    /// whether or not the write succeeds. Without a session nothing is sent.
    pub async fn submit_feedback(&mut self, paper_id: Uuid, is_helpful: bool) -> Option<Notice> {
        self.judgments.insert(paper_id, is_helpful);

        let session = self.client.get_session().await?;
        match self.feedback.submit(session.user.id, paper_id, is_helpful).await {
            Ok(_) => Some(feedback_notice(true)),
            Err(e) => {
                warn!(user_id = %session.user.id, %paper_id, "feedback failed: {}", e);
                Some(feedback_notice(false))
            }
        }
    }

    /// Sign out. The page's subscription then reports the transition, see
    /// [`DashboardPage::signed_out`].
    pub async fn logout(&mut self) -> Notice {
        if let Err(e) = self.client.sign_out().await {
            warn!("sign out reported an error: {}", e);
        }
        Notice::info("Logged out", "You've been successfully logged out.")
    }

    pub async fn signed_out(&mut self) -> Route {
        self.gate.signed_out().await
    }

    pub fn poll_signed_out(&mut self) -> Option<Route> {
        self.gate.poll_signed_out()
    }

    pub fn session(&self) -> &GatedSession {
        &self.gate
    }
}
