//! Interactive dashboard in the terminal.
//!
//! Type to search, `+N` / `-N` to judge the N-th listed paper, `logout` to
//! sign out. The loop also ends when the session is signed out underneath it
//! (for instance a failed token refresh).

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{next_step, not_signed_in};
use crate::auth::Gate;
use crate::cli::config::{connect, persist};
use crate::cli::utils::{notice_line, paper_block};
use crate::cli::OutputFormat;
use crate::pages::dashboard::LOADING_MESSAGE;
use crate::pages::{DashboardPage, Route};

const HELP: &str = "Commands: <text> or `s <text>` search, `clear`, `+N` helpful, `-N` not helpful, `list`, `logout`, `quit`";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Search(String),
    Helpful(usize),
    NotHelpful(usize),
    List,
    Logout,
    Quit,
    Help,
}

/// Interpret one input line. Anything that is not a command is a search.
pub fn parse(line: &str) -> Intent {
    let line = line.trim();
    if let Some(n) = line.strip_prefix('+').and_then(|rest| rest.trim().parse().ok()) {
        return Intent::Helpful(n);
    }
    if let Some(n) = line.strip_prefix('-').and_then(|rest| rest.trim().parse().ok()) {
        return Intent::NotHelpful(n);
    }

    match line {
        "" | "list" | "l" => Intent::List,
        "clear" => Intent::Search(String::new()),
        "logout" => Intent::Logout,
        "quit" | "exit" | "q" => Intent::Quit,
        "help" | "?" => Intent::Help,
        _ => match line.split_once(' ') {
            Some(("s" | "search", query)) => Intent::Search(query.to_string()),
            _ => Intent::Search(line.to_string()),
        },
    }
}

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        warn!("browse is interactive; --json is ignored");
    }

    let client = connect()?;
    let result = async {
        let mut page = match DashboardPage::enter(&client).await {
            Gate::Redirect(route) => return Err(not_signed_in(route)),
            Gate::Admitted(page) => page,
        };
        let stdin = BufReader::new(tokio::io::stdin());
        browse(&mut page, stdin, &mut std::io::stdout()).await?;
        Ok(())
    }
    .await;

    persist(&client)?;
    result
}

/// Run the dashboard loop until input ends, the user quits, or the session
/// is signed out. Returns the route the user ends up on.
pub async fn browse<R, W>(page: &mut DashboardPage, input: R, out: &mut W) -> anyhow::Result<Route>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", LOADING_MESSAGE)?;
    if let Some(notice) = page.load().await {
        writeln!(out, "! {}", notice_line(&notice))?;
    }
    match page.profile() {
        Some(profile) => writeln!(out, "{} · {} · {}", profile.email, profile.domain, profile.expertise_level)?,
        None => writeln!(out, "{}", page.session().email().unwrap_or("(no email)"))?,
    }
    render(page, out)?;
    writeln!(out, "{}", HELP)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        tokio::select! {
            biased;
            route = page.signed_out() => {
                writeln!(out, "Signed out. Next: {}", next_step(route))?;
                return Ok(route);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    writeln!(out)?;
                    return Ok(Route::Dashboard);
                };
                match parse(&line) {
                    Intent::Search(query) => {
                        page.set_query(query);
                        render(page, out)?;
                    }
                    Intent::Helpful(n) => judge(page, n, true, out).await?,
                    Intent::NotHelpful(n) => judge(page, n, false, out).await?,
                    Intent::List => render(page, out)?,
                    Intent::Logout => {
                        let notice = page.logout().await;
                        writeln!(out, "{}", notice_line(&notice))?;
                    }
                    Intent::Quit => return Ok(Route::Dashboard),
                    Intent::Help => writeln!(out, "{}", HELP)?,
                }
            }
        }
    }
}

fn render<W: Write>(page: &DashboardPage, out: &mut W) -> anyhow::Result<()> {
    if !page.query().trim().is_empty() {
        writeln!(out, "Search: {}", page.query())?;
    }
    if let Some(placeholder) = page.placeholder() {
        writeln!(out, "{}", placeholder)?;
        return Ok(());
    }
    for (index, paper) in page.visible().into_iter().enumerate() {
        write!(out, "{}", paper_block(index + 1, paper, page.judgment(paper.id)))?;
    }
    Ok(())
}

/// Feedback on the n-th visible paper (1-based)
async fn judge<W: Write>(page: &mut DashboardPage, n: usize, is_helpful: bool, out: &mut W) -> anyhow::Result<()> {
    let Some(paper_id) = n.checked_sub(1).and_then(|i| page.visible().get(i).map(|p| p.id)) else {
        writeln!(out, "No paper #{} in the current list", n)?;
        return Ok(());
    };

    if let Some(notice) = page.submit_feedback(paper_id, is_helpful).await {
        let marker = if notice.is_destructive() { "!" } else { "✓" };
        writeln!(out, "{} {}", marker, notice_line(&notice))?;
    }
    if let Some(paper) = page.find_paper(paper_id) {
        write!(out, "{}", paper_block(n, paper, page.judgment(paper_id)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend, ScoutClient};
    use crate::types::Table;
    use std::sync::Arc;

    async fn signed_in(store: &Arc<MemoryBackend>) -> ScoutClient {
        let client = ScoutClient::new(Backend::memory(store.clone()), "/profile-setup");
        client.sign_up("ivy@example.com", "secret1").await.unwrap();
        client
    }

    async fn run(client: &ScoutClient, script: &str) -> (Route, String) {
        let mut page = DashboardPage::enter(client).await.admitted().unwrap();
        let mut out = Vec::new();
        let route = browse(&mut page, script.as_bytes(), &mut out).await.unwrap();
        (route, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_commands_and_falls_back_to_search() {
        assert_eq!(parse("+2"), Intent::Helpful(2));
        assert_eq!(parse(" - 3 "), Intent::NotHelpful(3));
        assert_eq!(parse("s deep learning"), Intent::Search("deep learning".to_string()));
        assert_eq!(parse("quantum"), Intent::Search("quantum".to_string()));
        assert_eq!(parse("clear"), Intent::Search(String::new()));
        assert_eq!(parse(""), Intent::List);
        assert_eq!(parse("logout"), Intent::Logout);
        assert_eq!(parse("q"), Intent::Quit);
    }

    #[test]
    fn dash_without_number_is_a_search() {
        assert_eq!(parse("-x"), Intent::Search("-x".to_string()));
    }

    #[tokio::test]
    async fn search_then_feedback_records_for_listed_paper() {
        let store = Arc::new(MemoryBackend::with_sample_papers());
        let client = signed_in(&store).await;

        let (route, out) = run(&client, "quantum\n+1\nquit\n").await;

        assert_eq!(route, Route::Dashboard);
        assert!(out.contains(LOADING_MESSAGE));
        assert!(out.contains("Search: quantum"));
        assert!(out.contains("✓ Thank you!: Your feedback has been recorded."));
        assert!(out.contains(" 1. Quantum Supremacy Using a Programmable Superconducting Processor  [Physics]  (+ helpful)"));

        let rows = store.rows(Table::Feedback).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["is_helpful"], true);
    }

    #[tokio::test]
    async fn out_of_range_feedback_sends_nothing() {
        let store = Arc::new(MemoryBackend::with_sample_papers());
        let client = signed_in(&store).await;

        let (_, out) = run(&client, "quantum\n-2\n").await;

        assert!(out.contains("No paper #2 in the current list"));
        assert!(store.rows(Table::Feedback).await.is_empty());
    }

    #[tokio::test]
    async fn logout_ends_the_loop_at_login() {
        let store = Arc::new(MemoryBackend::with_sample_papers());
        let client = signed_in(&store).await;

        let (route, out) = run(&client, "logout\nlist\n").await;

        assert_eq!(route, Route::Login);
        assert!(out.contains("Logged out: You've been successfully logged out."));
        assert!(out.contains("Signed out. Next: scout auth login <email>"));
        assert!(client.current_session().is_none());
    }

    #[tokio::test]
    async fn unmatched_search_shows_placeholder() {
        let store = Arc::new(MemoryBackend::with_sample_papers());
        let client = signed_in(&store).await;

        let (_, out) = run(&client, "zzz-nothing\n").await;

        assert!(out.contains("No papers found matching your search."));
    }
}
