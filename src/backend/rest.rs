//! `reqwest` client for the hosted backend's HTTP APIs:
//! the auth service under `/auth/v1` and the table API under `/rest/v1`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::{AuthApi, DataApi, Query};
use crate::auth::{Session, SignUp, User};
use crate::error::{Result, ScoutError};
use crate::types::{Operation, Table};

pub struct RestBackend {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
}

/// Token grant response from the auth service
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .unwrap_or_else(|| Utc::now().timestamp() + token.expires_in.unwrap_or(3600));
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        // A trailing slash keeps `join` from dropping the last path segment
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            anon_key: anon_key.to_string(),
        })
    }

    fn auth_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base.join("auth/v1/")?.join(endpoint)?)
    }

    fn table_url(&self, table: Table) -> Result<Url> {
        Ok(self.base.join("rest/v1/")?.join(table.name())?)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        read_body(response).await
    }

    async fn rows(&self, request: RequestBuilder, table: Table, op: Operation) -> Result<Vec<Value>> {
        debug!(%table, %op, "backend data call");
        match self.send(request).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

#[async_trait]
impl AuthApi for RestBackend {
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> Result<SignUp> {
        let mut url = self.auth_url("signup")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let body = self
            .send(self.request(Method::POST, url, None).json(&json!({
                "email": email,
                "password": password,
            })))
            .await?;

        // With auto-confirm the service answers with a full session,
        // otherwise with the bare (unconfirmed) user
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            let session = Session::from(token);
            return Ok(SignUp {
                user: session.user.clone(),
                session: Some(session),
            });
        }
        let user_value = body.get("user").cloned().unwrap_or(body);
        Ok(SignUp {
            user: serde_json::from_value(user_value)?,
            session: None,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let body = self
            .send(self.request(Method::POST, url, None).json(&json!({
                "email": email,
                "password": password,
            })))
            .await?;
        let token: TokenResponse = serde_json::from_value(body)?;
        Ok(token.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let body = self
            .send(
                self.request(Method::POST, url, None)
                    .json(&json!({ "refresh_token": refresh_token })),
            )
            .await?;
        let token: TokenResponse = serde_json::from_value(body)?;
        Ok(token.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = self.auth_url("logout")?;
        self.send(self.request(Method::POST, url, Some(access_token))).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User> {
        let url = self.auth_url("user")?;
        let body = self.send(self.request(Method::GET, url, Some(access_token))).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl DataApi for RestBackend {
    async fn select(&self, table: Table, query: &Query, token: Option<&str>) -> Result<Vec<Value>> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*");
        apply_query(&mut url, query);
        self.rows(self.request(Method::GET, url, token), table, Operation::Select)
            .await
    }

    async fn insert(&self, table: Table, rows: Vec<Value>, token: Option<&str>) -> Result<Vec<Value>> {
        let url = self.table_url(table)?;
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "return=representation")
            .json(&rows);
        self.rows(request, table, Operation::Insert).await
    }

    async fn update(&self, table: Table, query: &Query, changes: Value, token: Option<&str>) -> Result<Vec<Value>> {
        if query.filters.is_empty() {
            // The table API refuses unfiltered updates; fail before the round trip
            return Err(ScoutError::validation("Refusing to update every row of a table"));
        }
        let mut url = self.table_url(table)?;
        apply_query(&mut url, query);
        let request = self
            .request(Method::PATCH, url, token)
            .header("Prefer", "return=representation")
            .json(&changes);
        self.rows(request, table, Operation::Update).await
    }

    async fn upsert(
        &self,
        table: Table,
        rows: Vec<Value>,
        on_conflict: &[&str],
        token: Option<&str>,
    ) -> Result<Vec<Value>> {
        let mut url = self.table_url(table)?;
        if !on_conflict.is_empty() {
            url.query_pairs_mut().append_pair("on_conflict", &on_conflict.join(","));
        }
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows);
        self.rows(request, table, Operation::Upsert).await
    }
}

/// Encode equality filters and ordering as table API query parameters
fn apply_query(url: &mut Url, query: &Query) {
    let mut pairs = url.query_pairs_mut();
    for (column, value) in &query.filters {
        let literal = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.append_pair(column, &format!("eq.{}", literal));
    }
    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        let nulls = if order.nulls_last { "nullslast" } else { "nullsfirst" };
        pairs.append_pair("order", &format!("{}.{}.{}", order.column, direction, nulls));
    }
}

async fn read_body(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text)?);
    }

    let err = remote_error(status.as_u16(), &text);
    warn!(status = status.as_u16(), "backend call failed: {}", err);
    Err(err)
}

/// Build an error from a failure body. The table API reports `message`/`code`,
/// the auth service `msg`, `error_description` or `error` plus `error_code`.
fn remote_error(status: u16, body: &str) -> ScoutError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |names: &[&str]| -> Option<String> {
        let value = parsed.as_ref()?;
        names.iter().find_map(|name| match value.get(*name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };

    let message = field(&["message", "msg", "error_description", "error"])
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| format!("Backend request failed with status {}", status));
    let code = field(&["code", "error_code"]);

    ScoutError::remote(status, code, message)
}
