use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use super::not_signed_in;
use crate::auth::Gate;
use crate::cli::config::{connect, persist};
use crate::cli::utils::{notice_line, output_notice};
use crate::cli::OutputFormat;
use crate::pages::DashboardPage;

#[derive(Subcommand)]
pub enum FeedbackCommands {
    #[command(about = "Thumbs up: this paper was helpful")]
    Helpful {
        #[arg(help = "Paper id (see `scout papers list`)")]
        paper_id: Uuid,
    },

    #[command(about = "Thumbs down: this paper was not helpful")]
    NotHelpful {
        #[arg(help = "Paper id (see `scout papers list`)")]
        paper_id: Uuid,
    },
}

pub async fn handle(cmd: FeedbackCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (paper_id, is_helpful) = match cmd {
        FeedbackCommands::Helpful { paper_id } => (paper_id, true),
        FeedbackCommands::NotHelpful { paper_id } => (paper_id, false),
    };

    let client = connect()?;
    let result = async {
        let mut page = match DashboardPage::enter(&client).await {
            Gate::Redirect(route) => return Err(not_signed_in(route)),
            Gate::Admitted(page) => page,
        };

        match page.submit_feedback(paper_id, is_helpful).await {
            Some(notice) if notice.is_destructive() => Err(anyhow::anyhow!(notice_line(&notice))),
            Some(notice) => output_notice(
                &output_format,
                &notice,
                Some(json!({ "paper_id": paper_id, "is_helpful": is_helpful })),
            ),
            // The session lapsed between the gate and the write
            None => Err(not_signed_in(crate::pages::Route::Login)),
        }
    }
    .await;

    persist(&client)?;
    result
}
