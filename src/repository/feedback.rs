use tracing::info;
use uuid::Uuid;

use super::{single, to_row};
use crate::backend::ScoutClient;
use crate::error::Result;
use crate::models::Feedback;
use crate::types::Table;

/// Composite key the backend upserts feedback on
pub const FEEDBACK_CONFLICT_KEY: [&str; 2] = ["user_id", "paper_id"];

/// Write-only access to `feedback`
#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    client: ScoutClient,
}

impl FeedbackRepository {
    pub fn new(client: ScoutClient) -> Self {
        Self { client }
    }

    /// Record a judgment; a later call for the same (user, paper) replaces it
    pub async fn submit(&self, user_id: Uuid, paper_id: Uuid, is_helpful: bool) -> Result<Feedback> {
        let row = to_row(&Feedback::new(user_id, paper_id, is_helpful))?;
        let token = self.client.access_token();
        let rows = self
            .client
            .backend()
            .data()
            .upsert(Table::Feedback, vec![row], &FEEDBACK_CONFLICT_KEY, token.as_deref())
            .await?;
        let feedback: Feedback = single(rows)?;
        info!(%user_id, %paper_id, is_helpful, "feedback recorded");
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use std::sync::Arc;

    #[tokio::test]
    async fn last_write_wins_for_same_pair() {
        let store = Arc::new(MemoryBackend::new());
        let client = ScoutClient::new(Backend::memory(store.clone()), "/");
        let repo = FeedbackRepository::new(client);
        let (user, paper) = (Uuid::new_v4(), Uuid::new_v4());

        repo.submit(user, paper, true).await.unwrap();
        let second = repo.submit(user, paper, false).await.unwrap();
        assert!(!second.is_helpful);

        let rows = store.rows(Table::Feedback).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["is_helpful"], false);
    }

    #[tokio::test]
    async fn different_papers_are_separate_judgments() {
        let store = Arc::new(MemoryBackend::new());
        let repo = FeedbackRepository::new(ScoutClient::new(Backend::memory(store.clone()), "/"));
        let user = Uuid::new_v4();

        repo.submit(user, Uuid::new_v4(), true).await.unwrap();
        repo.submit(user, Uuid::new_v4(), true).await.unwrap();
        assert_eq!(store.rows(Table::Feedback).await.len(), 2);
    }
}
