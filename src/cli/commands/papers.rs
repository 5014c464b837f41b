use clap::Subcommand;

use super::not_signed_in;
use crate::auth::Gate;
use crate::cli::config::{connect, persist};
use crate::cli::utils::{output_empty_collection, output_error, output_papers};
use crate::cli::OutputFormat;
use crate::pages::dashboard::NO_MATCHES_MESSAGE;
use crate::pages::DashboardPage;

#[derive(Subcommand)]
pub enum PapersCommands {
    #[command(about = "List papers, newest first")]
    List {
        #[arg(long, short, help = "Only papers whose title, authors or domain contain this text")]
        search: Option<String>,
    },
}

pub async fn handle(cmd: PapersCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect()?;

    let PapersCommands::List { search } = cmd;
    let result = async {
        let mut page = match DashboardPage::enter(&client).await {
            Gate::Redirect(route) => return Err(not_signed_in(route)),
            Gate::Admitted(page) => page,
        };

        if let Some(notice) = page.load().await {
            output_error(&output_format, &notice.description, Some(&notice.title))?;
            return Err(anyhow::anyhow!("{}", notice.title));
        }
        page.set_query(search.unwrap_or_default());

        let visible = page.visible();
        if visible.is_empty() {
            return output_empty_collection(&output_format, "papers", NO_MATCHES_MESSAGE);
        }
        output_papers(&output_format, &visible)
    }
    .await;

    persist(&client)?;
    result
}
