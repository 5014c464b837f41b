use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::models::{Paper, Profile};
use crate::pages::Notice;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Value::Object(target)) = (data, &mut response) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Report a page notice: destructive ones as errors, the rest as success
pub fn output_notice(output_format: &OutputFormat, notice: &Notice, data: Option<Value>) -> anyhow::Result<()> {
    if notice.is_destructive() {
        output_error(output_format, &notice_line(notice), Some(&notice.title))
    } else {
        output_success(output_format, &notice_line(notice), data)
    }
}

pub fn notice_line(notice: &Notice) -> String {
    format!("{}: {}", notice.title, notice.description)
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_papers(output_format: &OutputFormat, papers: &[&Paper]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "papers": papers }))?);
        }
        OutputFormat::Text => {
            for (index, paper) in papers.iter().enumerate() {
                print!("{}", paper_block(index + 1, paper, None));
            }
        }
    }
    Ok(())
}

/// Text rendering of one paper card. `judgment` marks a thumbs selection.
pub fn paper_block(number: usize, paper: &Paper, judgment: Option<bool>) -> String {
    let mut block = format!("{:>2}. {}", number, paper.title);
    if let Some(domain) = &paper.domain {
        block.push_str(&format!("  [{}]", domain));
    }
    match judgment {
        Some(true) => block.push_str("  (+ helpful)"),
        Some(false) => block.push_str("  (- not helpful)"),
        None => {}
    }
    block.push('\n');

    if !paper.authors.is_empty() {
        block.push_str(&format!("    {}\n", paper.author_line()));
    }
    let meta: Vec<String> = paper
        .venue
        .iter()
        .cloned()
        .chain(paper.published_label())
        .collect();
    if !meta.is_empty() {
        block.push_str(&format!("    {}\n", meta.join(" · ")));
    }
    block.push_str(&format!("    id: {}\n", paper.id));
    block
}

pub fn output_profile(output_format: &OutputFormat, profile: &Profile) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "profile": profile }))?);
        }
        OutputFormat::Text => {
            println!("Email: {}", profile.email);
            println!("Domain: {}", profile.domain);
            println!("Expertise: {}", profile.expertise_level);
            println!("Goal: {}", profile.goal);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn paper() -> Paper {
        Paper {
            id: Uuid::nil(),
            title: "Attention Is All You Need".to_string(),
            authors: vec!["A. Vaswani".to_string(), "N. Shazeer".to_string()],
            r#abstract: None,
            publication_date: NaiveDate::from_ymd_opt(2017, 6, 12),
            venue: Some("NeurIPS".to_string()),
            domain: Some("AI".to_string()),
        }
    }

    #[test]
    fn paper_block_shows_card_fields() {
        let block = paper_block(1, &paper(), Some(true));
        assert!(block.starts_with(" 1. Attention Is All You Need  [AI]  (+ helpful)\n"));
        assert!(block.contains("    A. Vaswani, N. Shazeer\n"));
        assert!(block.contains("    NeurIPS · Jun 2017\n"));
    }

    #[test]
    fn paper_block_skips_missing_metadata() {
        let mut bare = paper();
        bare.venue = None;
        bare.publication_date = None;
        bare.domain = None;
        bare.authors.clear();
        let block = paper_block(3, &bare, None);
        assert_eq!(block, format!(" 3. Attention Is All You Need\n    id: {}\n", Uuid::nil()));
    }
}
