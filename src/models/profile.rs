use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ScoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExpertiseLevel {
    pub const ALL: [ExpertiseLevel; 3] = [
        ExpertiseLevel::Beginner,
        ExpertiseLevel::Intermediate,
        ExpertiseLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => "Beginner",
            ExpertiseLevel::Intermediate => "Intermediate",
            ExpertiseLevel::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpertiseLevel {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Beginner" | "beginner" => Ok(ExpertiseLevel::Beginner),
            "Intermediate" | "intermediate" => Ok(ExpertiseLevel::Intermediate),
            "Expert" | "expert" => Ok(ExpertiseLevel::Expert),
            other => Err(ScoutError::validation(format!(
                "Expertise level must be Beginner, Intermediate or Expert (got '{}')",
                other
            ))),
        }
    }
}

/// Per-user preference record. At most one exists per user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub email: String,
    pub domain: String,
    pub expertise_level: ExpertiseLevel,
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `profiles` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub email: String,
    pub domain: String,
    pub expertise_level: ExpertiseLevel,
    pub goal: String,
}

/// Sparse profile change set. Email and user id are not updatable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise_level: Option<ExpertiseLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.expertise_level.is_none() && self.goal.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expertise_parses_the_three_levels() {
        for level in ExpertiseLevel::ALL {
            assert_eq!(level.as_str().parse::<ExpertiseLevel>().unwrap(), level);
        }
        assert!("Guru".parse::<ExpertiseLevel>().is_err());
        assert!("".parse::<ExpertiseLevel>().is_err());
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = ProfileUpdate {
            goal: Some("Teaching".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "goal": "Teaching" }));
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }
}
