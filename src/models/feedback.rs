use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's helpful / not-helpful judgment on one paper.
/// Keyed by (`user_id`, `paper_id`); a later write replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub paper_id: Uuid,
    pub is_helpful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Feedback {
    pub fn new(user_id: Uuid, paper_id: Uuid, is_helpful: bool) -> Self {
        Self {
            id: None,
            user_id,
            paper_id,
            is_helpful,
            created_at: None,
        }
    }
}
