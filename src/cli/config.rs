use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::auth::Session;
use crate::backend::{Backend, ScoutClient};
use crate::config::{config, BackendKind};

const SESSION_FILE: &str = "session.json";

/// What the CLI remembers between invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub session: Option<Session>,
    pub saved_at: Option<DateTime<Utc>>,
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("SCOUT_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("paper-scout").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session_file() -> anyhow::Result<SessionFile> {
    let session_file = get_config_dir()?.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(SessionFile::default());
    }

    let content = fs::read_to_string(session_file)?;
    let file: SessionFile = serde_json::from_str(&content)?;
    Ok(file)
}

pub fn save_session_file(file: &SessionFile) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join(SESSION_FILE);

    let content = serde_json::to_string_pretty(file)?;
    fs::write(session_file, content)?;
    Ok(())
}

/// Build a client for the configured backend, resuming the saved session
pub fn connect() -> anyhow::Result<ScoutClient> {
    let app_config = config();
    if app_config.backend.kind == BackendKind::Memory {
        warn!("CLI is using the in-memory backend; nothing outlives this process");
    }

    let backend = Backend::from_config(&app_config.backend)?;
    let saved = load_session_file()?;
    debug!(resumed = saved.session.is_some(), "connecting CLI client");

    Ok(ScoutClient::new(backend, app_config.sign_up_redirect()).with_session(saved.session))
}

/// Write the client's current session (or its absence) back to disk
pub fn persist(client: &ScoutClient) -> anyhow::Result<()> {
    let session = client.current_session();
    let saved_at = session.as_ref().map(|_| Utc::now());
    save_session_file(&SessionFile { session, saved_at })
}
