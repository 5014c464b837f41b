pub mod gate;
pub mod state;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use gate::{Gate, GatedSession, SessionGate};
pub use state::{AuthEvent, SessionState, Subscription};

/// Audience the auth service stamps on user access tokens
pub const AUDIENCE: &str = "authenticated";

/// Seconds before expiry at which a session is treated as expired
const EXPIRY_MARGIN_SECS: i64 = 10;

/// Identity of a signed-in user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated user context issued by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which `access_token` stops being accepted
    pub expires_at: i64,
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= Utc::now().timestamp()
    }
}

/// Result of a sign-up call. `session` is absent when the auth service
/// requires the user to confirm their email before signing in.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub user: User,
    pub session: Option<Session>,
}

/// Access token claims used by the hosted auth service (HS256)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: Some(AUDIENCE.to_string()),
            aud: AUDIENCE.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn user(&self) -> User {
        User {
            id: self.sub,
            email: self.email.clone(),
        }
    }

    pub fn encode(&self, secret: &str) -> Result<String> {
        let key = EncodingKey::from_secret(secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), self, &key)?)
    }

    /// Verify signature, audience and expiry of an access token
    pub fn verify(token: &str, secret: &str) -> Result<Self> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims)
    }
}
