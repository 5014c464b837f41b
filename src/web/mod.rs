//! Browser surface: server-rendered pages backed by a cookie session, plus a
//! small JSON API used by the dashboard script.

pub mod api;
pub mod html;
pub mod pages;
pub mod response;
pub mod session;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tokio::io::AsyncRead;
use tracing::warn;

use crate::backend::Backend;
use crate::config::AppConfig;

/// Shared by every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub backend: Backend,
    pub sign_up_redirect: String,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(backend: Backend, config: &AppConfig) -> Self {
        Self {
            backend,
            sign_up_redirect: config.sign_up_redirect(),
            secure_cookies: config.security.secure_cookies,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .merge(page_routes())
        .merge(api_routes())
        .with_state(state)
        .layer(cors_layer(&config.security.cors_origins));

    if config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Resolves once `input` reaches EOF or fails; the bytes are discarded.
pub async fn input_closed<R: AsyncRead + Unpin>(mut input: R) {
    if let Err(e) = tokio::io::copy(&mut input, &mut tokio::io::sink()).await {
        warn!("treating unreadable input as closed: {}", e);
    }
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::landing))
        .route("/register", get(pages::register_form).post(pages::register_submit))
        .route("/login", get(pages::login_form).post(pages::login_submit))
        .route("/profile-setup", get(pages::profile_setup_form).post(pages::profile_setup_submit))
        .route("/dashboard", get(pages::dashboard))
        .route("/logout", post(pages::logout))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/papers", get(api::papers))
        .route("/api/feedback", post(api::feedback))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
