/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Remote collections the client reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Profiles,
    Papers,
    Feedback,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Papers => "papers",
            Table::Feedback => "feedback",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Data operations supported by the backend wrapper
/// Used for logging and by the in-memory store's error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Upsert,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Upsert => "upsert",
        };
        f.write_str(name)
    }
}
