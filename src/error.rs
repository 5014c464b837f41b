// Client and HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors produced by backend calls and the repositories built on them.
///
/// `Remote` carries whatever the backend reported; its message is shown to the
/// user verbatim, including constraint violations such as a duplicate profile.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("{message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("No rows returned")]
    NotFound,

    #[error("Expected a single row, got {0}")]
    MultipleRows(usize),

    #[error("{0}")]
    Validation(String),

    #[error("Backend is not configured: {0}")]
    Config(&'static str),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    pub fn remote(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        ScoutError::Remote {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ScoutError::Validation(message.into())
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized
    Unauthorized(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (backend service issues)
    BadGateway(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        })
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
