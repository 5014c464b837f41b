use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A research paper as stored in the `papers` table. Read-only for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default, deserialize_with = "date_or_timestamp")]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl Paper {
    /// Authors as shown on a paper card
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Publication date as abbreviated month and year, e.g. "Mar 2024"
    pub fn published_label(&self) -> Option<String> {
        self.publication_date.map(|d| d.format("%b %Y").to_string())
    }
}

/// `date` columns arrive as `YYYY-MM-DD`, `timestamptz` ones as RFC 3339.
fn date_or_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid publication_date '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_row_with_missing_optionals() {
        let row = json!({
            "id": "5f0c6a8e-3f57-4a43-9d8e-0d1f3c1b2a10",
            "title": "Quantum Circuits",
            "authors": ["B. Kim"],
            "abstract": null,
            "publication_date": null,
            "created_at": "2024-01-01T00:00:00Z"
        });
        let paper: Paper = serde_json::from_value(row).unwrap();
        assert_eq!(paper.title, "Quantum Circuits");
        assert!(paper.domain.is_none());
        assert!(paper.published_label().is_none());
    }

    #[test]
    fn formats_card_fields() {
        let paper = Paper {
            id: Uuid::new_v4(),
            title: "Attention".to_string(),
            authors: vec!["A. Vaswani".to_string(), "N. Shazeer".to_string()],
            r#abstract: None,
            publication_date: NaiveDate::from_ymd_opt(2017, 6, 12),
            venue: Some("NeurIPS".to_string()),
            domain: Some("AI".to_string()),
        };
        assert_eq!(paper.author_line(), "A. Vaswani, N. Shazeer");
        assert_eq!(paper.published_label().as_deref(), Some("Jun 2017"));
    }

    #[test]
    fn accepts_plain_dates_and_timestamps() {
        let row = |date: &str| {
            json!({
                "id": "5f0c6a8e-3f57-4a43-9d8e-0d1f3c1b2a10",
                "title": "Dated",
                "publication_date": date,
            })
        };

        let plain: Paper = serde_json::from_value(row("2023-01-15")).unwrap();
        assert_eq!(plain.publication_date, NaiveDate::from_ymd_opt(2023, 1, 15));

        let stamped: Paper = serde_json::from_value(row("2024-03-01T00:00:00+00:00")).unwrap();
        assert_eq!(stamped.publication_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(stamped.published_label().as_deref(), Some("Mar 2024"));

        assert!(serde_json::from_value::<Paper>(row("spring 2024")).is_err());
    }
}
