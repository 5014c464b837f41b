use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted auth + data REST APIs
    Rest,
    /// In-process store seeded with sample papers
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub url: Option<String>,
    pub anon_key: String,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub site_url: String,
    pub enable_request_logging: bool,
    /// Stop serving once stdin reaches EOF, so a parent that dies takes the server with it
    #[serde(default)]
    pub exit_on_stdin_close: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Backend overrides
        if let Ok(v) = env::var("SUPABASE_URL") {
            let v = v.trim().trim_end_matches('/').to_string();
            self.backend.url = (!v.is_empty()).then_some(v);
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY") {
            self.backend.anon_key = v.trim().to_string();
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.backend.jwt_secret = (!v.trim().is_empty()).then(|| v.trim().to_string());
        }
        self.backend.kind = match env::var("PAPER_SCOUT_BACKEND").as_deref() {
            Ok("memory") => BackendKind::Memory,
            Ok("rest") => BackendKind::Rest,
            // Without a backend URL a development build falls back to the in-process store
            _ if self.backend.url.is_none() && self.environment == Environment::Development => {
                BackendKind::Memory
            }
            _ => self.backend.kind,
        };

        // Server overrides
        if let Some(port) = env::var("PAPER_SCOUT_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        self.server.site_url = match env::var("PAPER_SCOUT_SITE_URL") {
            Ok(v) if !v.trim().is_empty() => v.trim().trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.server.port),
        };
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        if let Ok(v) = env::var("PAPER_SCOUT_EXIT_ON_STDIN_CLOSE") {
            self.server.exit_on_stdin_close = v.parse().unwrap_or(self.server.exit_on_stdin_close);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                kind: BackendKind::Rest,
                url: None,
                anon_key: String::new(),
                jwt_secret: None,
            },
            server: ServerConfig {
                port: 8080,
                site_url: "http://localhost:8080".to_string(),
                enable_request_logging: true,
                exit_on_stdin_close: false,
            },
            security: SecurityConfig {
                secure_cookies: false,
                cors_origins: vec!["http://localhost:8080".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            backend: BackendConfig {
                kind: BackendKind::Rest,
                url: None,
                anon_key: String::new(),
                jwt_secret: None,
            },
            server: ServerConfig {
                port: 8080,
                site_url: "https://staging.paperscout.app".to_string(),
                enable_request_logging: true,
                exit_on_stdin_close: false,
            },
            security: SecurityConfig {
                secure_cookies: true,
                cors_origins: vec!["https://staging.paperscout.app".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                kind: BackendKind::Rest,
                url: None,
                anon_key: String::new(),
                jwt_secret: None,
            },
            server: ServerConfig {
                port: 8080,
                site_url: "https://paperscout.app".to_string(),
                enable_request_logging: false,
                exit_on_stdin_close: false,
            },
            security: SecurityConfig {
                secure_cookies: true,
                cors_origins: vec!["https://paperscout.app".to_string()],
            },
        }
    }

    /// Where the auth service sends a freshly registered user after confirming their email
    pub fn sign_up_redirect(&self) -> String {
        format!("{}/profile-setup", self.server.site_url)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
