#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // The in-process backend keeps the suite independent of any hosted project
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_paper-scout"));
        cmd.env("PAPER_SCOUT_PORT", port.to_string())
            .env("PAPER_SCOUT_BACKEND", "memory")
            .env("APP_ENV", "development")
            .env("SECURITY_SECURE_COOKIES", "false")
            .env("PAPER_SCOUT_SITE_URL", &base_url)
            // The pipe closes when this test binary exits, however it exits
            .env("PAPER_SCOUT_EXIT_ON_STDIN_CLOSE", "true")
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A client that keeps cookies and follows redirects, like a browser tab
pub fn browser() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().cookie_store(true).build()?)
}

/// Fresh address per test so runs never collide in the shared server
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

/// Register through the form and return the signed-in browser
pub async fn registered(server: &TestServer, email: &str) -> Result<reqwest::Client> {
    let browser = browser()?;
    let res = browser
        .post(server.url("/register"))
        .form(&[("email", email), ("password", "secret1")])
        .send()
        .await?;
    anyhow::ensure!(
        res.url().path() == "/profile-setup",
        "registration landed on {}",
        res.url()
    );
    Ok(browser)
}
