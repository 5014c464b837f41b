//! Narrow interface to the hosted backend: an auth service and a table API.
//!
//! Everything above this module talks to `AuthApi` / `DataApi` through a
//! `Backend` handle that is built once at startup and passed in explicitly.

pub mod client;
pub mod memory;
pub mod rest;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::auth::{Claims, Session, SignUp, User};
use crate::config::{BackendConfig, BackendKind};
use crate::error::{Result, ScoutError};
use crate::types::Table;

pub use client::ScoutClient;
pub use memory::MemoryBackend;
pub use rest::RestBackend;

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> Result<SignUp>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn refresh(&self, refresh_token: &str) -> Result<Session>;
    async fn sign_out(&self, access_token: &str) -> Result<()>;
    async fn get_user(&self, access_token: &str) -> Result<User>;
}

/// Generic row operations; every call returns the affected rows.
#[async_trait]
pub trait DataApi: Send + Sync {
    async fn select(&self, table: Table, query: &Query, token: Option<&str>) -> Result<Vec<Value>>;
    async fn insert(&self, table: Table, rows: Vec<Value>, token: Option<&str>) -> Result<Vec<Value>>;
    async fn update(&self, table: Table, query: &Query, changes: Value, token: Option<&str>) -> Result<Vec<Value>>;
    async fn upsert(
        &self,
        table: Table,
        rows: Vec<Value>,
        on_conflict: &[&str],
        token: Option<&str>,
    ) -> Result<Vec<Value>>;
}

/// Row selection: equality filters plus an optional single-column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order: Option<Order>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
    pub nulls_last: bool,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column).is_some_and(|v| v == value))
    }
}

impl Order {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
            nulls_last: false,
        }
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls_last = true;
        self
    }
}

/// Process-wide handle on the backend services
#[derive(Clone)]
pub struct Backend {
    auth: Arc<dyn AuthApi>,
    data: Arc<dyn DataApi>,
    jwt_secret: Option<String>,
}

impl Backend {
    pub fn new(auth: Arc<dyn AuthApi>, data: Arc<dyn DataApi>, jwt_secret: Option<String>) -> Self {
        Self { auth, data, jwt_secret }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        match config.kind {
            BackendKind::Rest => {
                let url = config.url.as_deref().ok_or(ScoutError::Config("SUPABASE_URL is not set"))?;
                if config.anon_key.is_empty() {
                    return Err(ScoutError::Config("SUPABASE_ANON_KEY is not set"));
                }
                let rest = Arc::new(RestBackend::new(url, &config.anon_key)?);
                Ok(Self::new(rest.clone(), rest, config.jwt_secret.clone()))
            }
            BackendKind::Memory => Ok(Self::memory(Arc::new(MemoryBackend::with_sample_papers()))),
        }
    }

    pub fn memory(store: Arc<MemoryBackend>) -> Self {
        let secret = store.jwt_secret().to_string();
        Self::new(store.clone(), store, Some(secret))
    }

    pub fn auth(&self) -> &dyn AuthApi {
        self.auth.as_ref()
    }

    pub fn data(&self) -> &dyn DataApi {
        self.data.as_ref()
    }

    pub fn verifies_tokens_locally(&self) -> bool {
        self.jwt_secret.is_some()
    }

    /// Resolve the user behind an access token: locally when the signing
    /// secret is known, otherwise by asking the auth service.
    pub async fn verify_access_token(&self, token: &str) -> Result<User> {
        match &self.jwt_secret {
            Some(secret) => Ok(Claims::verify(token, secret)?.user()),
            None => {
                debug!("no jwt secret configured, asking auth service for user");
                self.auth.get_user(token).await
            }
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("local_token_checks", &self.verifies_tokens_locally())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_matches_all_filters() {
        let query = Query::all().eq("user_id", "u1").eq("paper_id", "p1");
        assert!(query.matches(&json!({ "user_id": "u1", "paper_id": "p1", "is_helpful": true })));
        assert!(!query.matches(&json!({ "user_id": "u1", "paper_id": "p2" })));
        assert!(!query.matches(&json!({ "user_id": "u1" })));
        assert!(Query::all().matches(&json!({})));
    }

    #[test]
    fn rest_backend_requires_url_and_key() {
        let mut config = BackendConfig {
            kind: BackendKind::Rest,
            url: None,
            anon_key: "anon".to_string(),
            jwt_secret: None,
        };
        assert!(matches!(Backend::from_config(&config), Err(ScoutError::Config(_))));

        config.url = Some("https://project.example.co".to_string());
        config.anon_key.clear();
        assert!(matches!(Backend::from_config(&config), Err(ScoutError::Config(_))));

        config.anon_key = "anon".to_string();
        assert!(Backend::from_config(&config).is_ok());
    }
}
