use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paper_scout::backend::Backend;
use paper_scout::config::config;
use paper_scout::web::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, SUPABASE_ANON_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paper_scout=info,tower_http=info")),
        )
        .init();

    let config = config();
    info!("Starting PaperScout in {:?} mode", config.environment);

    let backend = Backend::from_config(&config.backend)?;
    info!(backend = ?config.backend.kind, "backend ready");
    if paper_scout::is_development!() && !backend.verifies_tokens_locally() {
        warn!("SUPABASE_JWT_SECRET is not set; session cookies are checked against the auth service");
    }

    let app = web::app(AppState::new(backend, config), config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    info!("PaperScout listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.exit_on_stdin_close))
        .await?;
    info!("PaperScout stopped");
    Ok(())
}

async fn shutdown_signal(exit_on_stdin_close: bool) {
    let stdin_closed = async {
        if exit_on_stdin_close {
            web::input_closed(tokio::io::stdin()).await;
            info!("stdin closed");
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
        _ = stdin_closed => {}
    }
}
