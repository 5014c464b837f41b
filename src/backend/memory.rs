//! In-process backend with the hosted service's observable behaviour:
//! password auth with signed access tokens and rotating refresh tokens,
//! unique constraints on `profiles.user_id` and `feedback(user_id, paper_id)`,
//! and `returning *` semantics for every write.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{AuthApi, DataApi, Order, Query};
use crate::auth::{Claims, Session, SignUp, User};
use crate::error::{Result, ScoutError};
use crate::types::{Operation, Table};

const ACCESS_TOKEN_TTL_SECS: i64 = 3600;
const MIN_PASSWORD_LEN: usize = 6;

const PROFILE_KEY: &[&str] = &["user_id"];
const FEEDBACK_KEY: &[&str] = &["user_id", "paper_id"];

/// Unique constraints enforced per table, by constraint name
fn unique_constraints(table: Table) -> &'static [(&'static str, &'static [&'static str])] {
    match table {
        Table::Profiles => &[("profiles_user_id_key", PROFILE_KEY)],
        Table::Feedback => &[("feedback_user_id_paper_id_key", FEEDBACK_KEY)],
        Table::Papers => &[],
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    salt: Uuid,
    password_hash: String,
}

pub struct MemoryBackend {
    jwt_secret: String,
    require_confirmation: bool,
    accounts: RwLock<HashMap<String, Account>>,
    refresh_tokens: RwLock<HashMap<String, Uuid>>,
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    failures: Mutex<HashMap<(Table, Operation), String>>,
    calls: Mutex<Vec<(Operation, Table)>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_tables(HashMap::new())
    }

    /// A store pre-loaded with a handful of papers for local runs
    pub fn with_sample_papers() -> Self {
        Self::with_tables(HashMap::from([(Table::Papers, sample_papers())]))
    }

    fn with_tables(tables: HashMap<Table, Vec<Value>>) -> Self {
        Self {
            jwt_secret: Uuid::new_v4().simple().to_string(),
            require_confirmation: false,
            accounts: RwLock::new(HashMap::new()),
            refresh_tokens: RwLock::new(HashMap::new()),
            tables: RwLock::new(tables),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sign-ups return no session until the (simulated) email is confirmed
    pub fn requiring_email_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn verify(&self, access_token: &str) -> Result<User> {
        Ok(Claims::verify(access_token, &self.jwt_secret)?.user())
    }

    /// Make every `op` on `table` fail with a 500 carrying `message`
    pub fn fail(&self, table: Table, op: Operation, message: impl Into<String>) {
        lock(&self.failures).insert((table, op), message.into());
    }

    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Data calls received so far, in order
    pub fn calls(&self) -> Vec<(Operation, Table)> {
        lock(&self.calls).clone()
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.read().await.get(&table).cloned().unwrap_or_default()
    }

    pub async fn seed(&self, table: Table, rows: Vec<Value>) {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();
        stored.extend(rows.into_iter().map(|row| with_defaults(table, row)));
    }

    fn record(&self, op: Operation, table: Table) -> Result<()> {
        lock(&self.calls).push((op, table));
        match lock(&self.failures).get(&(table, op)) {
            Some(message) => Err(ScoutError::remote(500, None, message.clone())),
            None => Ok(()),
        }
    }

    async fn issue_session(&self, user: User) -> Result<Session> {
        let claims = Claims::new(&user, Duration::seconds(ACCESS_TOKEN_TTL_SECS));
        let access_token = claims.encode(&self.jwt_secret)?;
        let refresh_token = Uuid::new_v4().simple().to_string();
        self.refresh_tokens.write().await.insert(refresh_token.clone(), user.id);

        Ok(Session {
            access_token,
            refresh_token,
            expires_at: claims.exp,
            user,
        })
    }
}

#[async_trait]
impl AuthApi for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> Result<SignUp> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ScoutError::remote(400, None, "Unable to validate email address: invalid format"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ScoutError::remote(
                422,
                Some("weak_password".to_string()),
                "Password should be at least 6 characters.",
            ));
        }

        let user = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&email) {
                return Err(ScoutError::remote(
                    422,
                    Some("user_already_exists".to_string()),
                    "User already registered",
                ));
            }
            let user = User {
                id: Uuid::new_v4(),
                email: Some(email.clone()),
            };
            let salt = Uuid::new_v4();
            accounts.insert(
                email,
                Account {
                    user: user.clone(),
                    salt,
                    password_hash: hash_password(&salt, password),
                },
            );
            user
        };
        debug!(user_id = %user.id, redirect_to, "memory backend registered user");

        let session = if self.require_confirmation {
            None
        } else {
            Some(self.issue_session(user.clone()).await?)
        };
        Ok(SignUp { user, session })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let account = self.accounts.read().await.get(&email).cloned();
        match account {
            Some(account) if account.password_hash == hash_password(&account.salt, password) => {
                self.issue_session(account.user).await
            }
            _ => Err(ScoutError::remote(
                400,
                Some("invalid_credentials".to_string()),
                "Invalid login credentials",
            )),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let user_id = self.refresh_tokens.write().await.remove(refresh_token);
        let Some(user_id) = user_id else {
            return Err(ScoutError::remote(
                400,
                Some("refresh_token_not_found".to_string()),
                "Invalid Refresh Token: Refresh Token Not Found",
            ));
        };
        let user = self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| ScoutError::remote(404, Some("user_not_found".to_string()), "User not found"))?;
        self.issue_session(user).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let user = self
            .verify(access_token)
            .map_err(|e| ScoutError::remote(401, Some("bad_jwt".to_string()), e.to_string()))?;
        self.refresh_tokens.write().await.retain(|_, id| *id != user.id);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User> {
        self.verify(access_token)
            .map_err(|e| ScoutError::remote(401, Some("bad_jwt".to_string()), e.to_string()))
    }
}

#[async_trait]
impl DataApi for MemoryBackend {
    async fn select(&self, table: Table, query: &Query, _token: Option<&str>) -> Result<Vec<Value>> {
        self.record(Operation::Select, table)?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| compare_rows(a, b, order));
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, rows: Vec<Value>, _token: Option<&str>) -> Result<Vec<Value>> {
        self.record(Operation::Insert, table)?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        let rows: Vec<Value> = rows.into_iter().map(|row| with_defaults(table, row)).collect();
        // All-or-nothing, like a single INSERT statement
        let mut pending: Vec<Value> = Vec::with_capacity(rows.len());
        for row in &rows {
            for existing in stored.iter().chain(pending.iter()) {
                check_unique(table, existing, row)?;
            }
            pending.push(row.clone());
        }
        stored.extend(pending);
        Ok(rows)
    }

    async fn update(&self, table: Table, query: &Query, changes: Value, _token: Option<&str>) -> Result<Vec<Value>> {
        self.record(Operation::Update, table)?;
        let Value::Object(changes) = changes else {
            return Err(ScoutError::remote(400, Some("PGRST102".to_string()), "Invalid body"));
        };

        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();
        let mut updated = Vec::new();
        for row in stored.iter_mut().filter(|row| query.matches(row)) {
            merge(row, &changes);
            if table == Table::Profiles {
                row["updated_at"] = json!(Utc::now());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: Table,
        rows: Vec<Value>,
        on_conflict: &[&str],
        _token: Option<&str>,
    ) -> Result<Vec<Value>> {
        self.record(Operation::Upsert, table)?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        let mut returned = Vec::with_capacity(rows.len());
        for row in rows {
            let conflict = stored
                .iter_mut()
                .find(|existing| on_conflict.iter().all(|col| existing.get(*col) == row.get(*col)));
            match conflict {
                Some(existing) => {
                    if let Value::Object(changes) = &row {
                        merge(existing, changes);
                    }
                    returned.push(existing.clone());
                }
                None => {
                    let row = with_defaults(table, row);
                    for existing in stored.iter() {
                        check_unique(table, existing, &row)?;
                    }
                    stored.push(row.clone());
                    returned.push(row);
                }
            }
        }
        Ok(returned)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Per-account salt, so equal passwords never share a digest
fn hash_password(salt: &Uuid, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn with_defaults(table: Table, mut row: Value) -> Value {
    if let Value::Object(map) = &mut row {
        map.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
        map.entry("created_at").or_insert_with(|| json!(Utc::now()));
        if table == Table::Profiles {
            map.entry("updated_at").or_insert_with(|| json!(Utc::now()));
        }
    }
    row
}

fn merge(row: &mut Value, changes: &Map<String, Value>) {
    if let Value::Object(map) = row {
        for (key, value) in changes {
            map.insert(key.clone(), value.clone());
        }
    }
}

fn check_unique(table: Table, existing: &Value, row: &Value) -> Result<()> {
    for (name, columns) in unique_constraints(table) {
        if columns.iter().all(|col| existing.get(*col) == row.get(*col)) {
            return Err(ScoutError::remote(
                409,
                Some("23505".to_string()),
                format!("duplicate key value violates unique constraint \"{}\"", name),
            ));
        }
    }
    Ok(())
}

fn compare_rows(a: &Value, b: &Value, order: &Order) -> Ordering {
    let left = a.get(&order.column).filter(|v| !v.is_null());
    let right = b.get(&order.column).filter(|v| !v.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => {
            if order.nulls_last { Ordering::Greater } else { Ordering::Less }
        }
        (Some(_), None) => {
            if order.nulls_last { Ordering::Less } else { Ordering::Greater }
        }
        (Some(l), Some(r)) => {
            let ord = compare_values(l, r);
            if order.descending { ord.reverse() } else { ord }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(l), Value::Number(r)) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(Ordering::Equal),
        // ISO-8601 dates and timestamps order correctly as text
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn sample_papers() -> Vec<Value> {
    let papers = [
        (
            "Attention Is All You Need",
            vec!["Ashish Vaswani", "Noam Shazeer", "Niki Parmar"],
            "The dominant sequence transduction models are based on complex recurrent or convolutional neural networks. We propose the Transformer, based solely on attention mechanisms.",
            Some("2017-06-12"),
            Some("NeurIPS"),
            Some("AI"),
        ),
        (
            "Deep Residual Learning for Image Recognition",
            vec!["Kaiming He", "Xiangyu Zhang", "Shaoqing Ren", "Jian Sun"],
            "We present a residual learning framework to ease the training of networks that are substantially deeper than those used previously.",
            Some("2015-12-10"),
            Some("CVPR"),
            Some("Computer Vision"),
        ),
        (
            "Quantum Supremacy Using a Programmable Superconducting Processor",
            vec!["Frank Arute", "Kunal Arya"],
            "We report the use of a processor with programmable superconducting qubits to create quantum states on 53 qubits.",
            Some("2019-10-23"),
            Some("Nature"),
            Some("Physics"),
        ),
        (
            "Highly Accurate Protein Structure Prediction with AlphaFold",
            vec!["John Jumper", "Richard Evans"],
            "We provide the first computational method that can regularly predict protein structures with atomic accuracy.",
            Some("2021-07-15"),
            Some("Nature"),
            Some("Healthcare"),
        ),
        (
            "A Survey of Reproducibility Practices",
            vec!["R. Patel"],
            "An overview of how research groups share code and data alongside publications.",
            None,
            None,
            None,
        ),
    ];

    papers
        .into_iter()
        .map(|(title, authors, summary, date, venue, domain)| {
            with_defaults(
                Table::Papers,
                json!({
                    "title": title,
                    "authors": authors,
                    "abstract": summary,
                    "publication_date": date,
                    "venue": venue,
                    "domain": domain,
                }),
            )
        })
        .collect()
}
