pub mod auth;
pub mod browse;
pub mod feedback;
pub mod papers;
pub mod profile;

use std::io::Write;

use serde_json::json;

use crate::cli::utils::{notice_line, output_notice};
use crate::cli::OutputFormat;
use crate::pages::{Route, Transition};

/// Command that continues the flow a page navigated to
pub fn next_step(route: Route) -> &'static str {
    match route {
        Route::Landing | Route::Register => "scout auth register <email>",
        Route::Login => "scout auth login <email>",
        Route::ProfileSetup => "scout profile setup --domain <domain> --expertise <level> --goal <goal>",
        Route::Dashboard => "scout browse",
    }
}

/// Report a page transition. Staying on the form is a failed command.
pub fn follow(output_format: &OutputFormat, outcome: Transition) -> anyhow::Result<()> {
    match outcome {
        Transition::Navigate { to, notice } => {
            let data = json!({ "next": to, "command": next_step(to) });
            match notice {
                Some(notice) => output_notice(output_format, &notice, Some(data))?,
                None => crate::cli::utils::output_success(output_format, "Done", Some(data))?,
            }
            if let OutputFormat::Text = output_format {
                println!("  next: {}", next_step(to));
            }
            Ok(())
        }
        Transition::Stay(notice) => Err(anyhow::anyhow!(notice_line(&notice))),
    }
}

/// Ask for a value on the terminal when it was not given as a flag
pub fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Error for a command that hit the session gate
pub fn not_signed_in(route: Route) -> anyhow::Error {
    anyhow::anyhow!("Not signed in. Run `{}` first", next_step(route))
}
