pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "PaperScout CLI - discover research papers from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Register, log in and out, show the saved session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Research profile setup and maintenance")]
    Profile {
        #[command(subcommand)]
        cmd: commands::profile::ProfileCommands,
    },

    #[command(about = "List and search papers")]
    Papers {
        #[command(subcommand)]
        cmd: commands::papers::PapersCommands,
    },

    #[command(about = "Mark a paper as helpful or not helpful")]
    Feedback {
        #[command(subcommand)]
        cmd: commands::feedback::FeedbackCommands,
    },

    #[command(about = "Interactive dashboard: search, give feedback, log out")]
    Browse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Profile { cmd } => commands::profile::handle(cmd, output_format).await,
        Commands::Papers { cmd } => commands::papers::handle(cmd, output_format).await,
        Commands::Feedback { cmd } => commands::feedback::handle(cmd, output_format).await,
        Commands::Browse => commands::browse::handle(output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["scout", "papers", "list", "--search", "ai", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Papers {
                cmd: commands::papers::PapersCommands::List { search },
            } => assert_eq!(search.as_deref(), Some("ai")),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn feedback_requires_paper_id() {
        assert!(Cli::try_parse_from(["scout", "feedback", "helpful"]).is_err());
    }
}
