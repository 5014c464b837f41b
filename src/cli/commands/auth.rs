use clap::Subcommand;
use serde_json::json;

use super::{follow, prompt};
use crate::cli::config::{connect, persist};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::pages::{AuthForm, AuthPage};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account and sign in")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "Show the saved session")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { email, password } => {
            let client = connect()?;
            let form = AuthForm::new(email, password_or_prompt(password)?);
            let outcome = AuthPage::new(client.clone()).register(&form).await;
            persist(&client)?;
            follow(&output_format, outcome)
        }
        AuthCommands::Login { email, password } => {
            let client = connect()?;
            let form = AuthForm::new(email, password_or_prompt(password)?);
            let outcome = AuthPage::new(client.clone()).login(&form).await;
            persist(&client)?;
            follow(&output_format, outcome)
        }
        AuthCommands::Logout => {
            let client = connect()?;
            let result = client.sign_out().await;
            // The local session is gone either way
            persist(&client)?;
            if let Err(e) = result {
                tracing::warn!("remote sign out failed: {}", e);
            }
            output_success(&output_format, "Logged out: You've been successfully logged out.", None)
        }
        AuthCommands::Status => {
            let client = connect()?;
            let session = client.get_session().await;
            persist(&client)?;
            match session {
                Some(session) => output_success(
                    &output_format,
                    &format!("Signed in as {}", session.email().unwrap_or("(no email)")),
                    Some(json!({
                        "user_id": session.user_id(),
                        "email": session.email(),
                        "expires_at": session.expires_at,
                    })),
                ),
                None => output_success(&output_format, "Not signed in", Some(json!({ "user_id": null }))),
            }
        }
    }
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt("Password"),
    }
}
