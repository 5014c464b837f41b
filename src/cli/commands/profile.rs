use clap::Subcommand;

use super::{follow, not_signed_in};
use crate::auth::{Gate, SessionGate};
use crate::backend::ScoutClient;
use crate::cli::config::{connect, persist};
use crate::cli::utils::{output_profile, output_success};
use crate::cli::OutputFormat;
use crate::error::ScoutError;
use crate::models::{ExpertiseLevel, ProfileUpdate};
use crate::pages::{ProfileForm, ProfileSetupPage};
use crate::repository::ProfileRepository;

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Create your research profile (once per account)")]
    Setup {
        #[arg(long, help = "Research domain, e.g. Machine Learning")]
        domain: String,
        #[arg(long, help = "Beginner, Intermediate or Expert")]
        expertise: String,
        #[arg(long, help = "What you want to get out of the papers")]
        goal: String,
    },

    #[command(about = "Show your profile")]
    Show,

    #[command(about = "Change fields of your profile")]
    Update {
        #[arg(long, help = "New research domain")]
        domain: Option<String>,
        #[arg(long, help = "New expertise level")]
        expertise: Option<ExpertiseLevel>,
        #[arg(long, help = "New goal")]
        goal: Option<String>,
    },
}

pub async fn handle(cmd: ProfileCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect()?;
    let result = dispatch(cmd, &client, &output_format).await;
    persist(&client)?;
    result
}

async fn dispatch(cmd: ProfileCommands, client: &ScoutClient, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProfileCommands::Setup { domain, expertise, goal } => {
            let page = match ProfileSetupPage::enter(client).await {
                Gate::Redirect(route) => Err(not_signed_in(route)),
                Gate::Admitted(page) => Ok(page),
            }?;
            let outcome = page.submit(&ProfileForm::new(domain, expertise, goal)).await;
            follow(output_format, outcome)
        }
        ProfileCommands::Show => {
            let gated = match SessionGate::enter(client).await {
                Gate::Redirect(route) => Err(not_signed_in(route)),
                Gate::Admitted(gated) => Ok(gated),
            }?;
            match ProfileRepository::new(client.clone()).read(gated.user_id()).await {
                Ok(profile) => output_profile(output_format, &profile),
                Err(ScoutError::NotFound) => Err(anyhow::anyhow!(
                    "No profile yet. Run `{}`",
                    super::next_step(crate::pages::Route::ProfileSetup)
                )),
                Err(e) => Err(e.into()),
            }
        }
        ProfileCommands::Update { domain, expertise, goal } => {
            let gated = match SessionGate::enter(client).await {
                Gate::Redirect(route) => Err(not_signed_in(route)),
                Gate::Admitted(gated) => Ok(gated),
            }?;
            let changes = ProfileUpdate {
                domain,
                expertise_level: expertise,
                goal,
            };
            let profile = ProfileRepository::new(client.clone())
                .update(gated.user_id(), &changes)
                .await?;
            output_success(output_format, "Profile updated", None)?;
            output_profile(output_format, &profile)
        }
    }
}
