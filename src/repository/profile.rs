use tracing::info;
use uuid::Uuid;

use super::{single, to_row};
use crate::backend::{Query, ScoutClient};
use crate::error::{Result, ScoutError};
use crate::models::{ExpertiseLevel, NewProfile, Profile, ProfileUpdate};
use crate::types::Table;

/// Create-once, read, update-many access to `profiles`, keyed by user id
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    client: ScoutClient,
}

impl ProfileRepository {
    pub fn new(client: ScoutClient) -> Self {
        Self { client }
    }

    /// Insert the user's profile. A second profile for the same user is
    /// rejected by the backend's unique constraint, not checked here.
    pub async fn create(
        &self,
        user_id: Uuid,
        email: &str,
        domain: &str,
        expertise_level: ExpertiseLevel,
        goal: &str,
    ) -> Result<Profile> {
        let row = to_row(&NewProfile {
            user_id,
            email: email.to_string(),
            domain: domain.to_string(),
            expertise_level,
            goal: goal.to_string(),
        })?;
        let token = self.client.access_token();
        let rows = self
            .client
            .backend()
            .data()
            .insert(Table::Profiles, vec![row], token.as_deref())
            .await?;
        let profile: Profile = single(rows)?;
        info!(%user_id, "profile created");
        Ok(profile)
    }

    /// The user's profile; `ScoutError::NotFound` when none exists
    pub async fn read(&self, user_id: Uuid) -> Result<Profile> {
        let token = self.client.access_token();
        let rows = self
            .client
            .backend()
            .data()
            .select(Table::Profiles, &Query::all().eq("user_id", user_id.to_string()), token.as_deref())
            .await?;
        single(rows)
    }

    /// Apply a sparse change set and return the updated profile
    pub async fn update(&self, user_id: Uuid, changes: &ProfileUpdate) -> Result<Profile> {
        if changes.is_empty() {
            return Err(ScoutError::validation("Nothing to update"));
        }
        let token = self.client.access_token();
        let rows = self
            .client
            .backend()
            .data()
            .update(
                Table::Profiles,
                &Query::all().eq("user_id", user_id.to_string()),
                to_row(changes)?,
                token.as_deref(),
            )
            .await?;
        let profile: Profile = single(rows)?;
        info!(%user_id, "profile updated");
        Ok(profile)
    }
}
