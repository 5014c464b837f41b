use crate::models::Paper;

/// Case-insensitive substring search over title, authors and domain tag.
///
/// A query that is empty after trimming returns every paper. Matching
/// lower-cases both sides without locale rules and keeps input order.
pub fn filter<'a>(papers: &'a [Paper], query: &str) -> Vec<&'a Paper> {
    if query.trim().is_empty() {
        return papers.iter().collect();
    }
    let needle = query.to_lowercase();
    papers.iter().filter(|paper| matches(paper, &needle)).collect()
}

/// `needle` must already be lower-cased
fn matches(paper: &Paper, needle: &str) -> bool {
    paper.title.to_lowercase().contains(needle)
        || paper.authors.iter().any(|a| a.to_lowercase().contains(needle))
        || paper
            .domain
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn paper(title: &str, authors: &[&str], domain: Option<&str>) -> Paper {
        Paper {
            id: Uuid::new_v4(),
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            r#abstract: None,
            publication_date: None,
            venue: None,
            domain: domain.map(str::to_string),
        }
    }

    fn titles<'a>(papers: &[&'a Paper]) -> Vec<&'a str> {
        papers.iter().map(|p| p.title.as_str()).collect()
    }

    fn library() -> Vec<Paper> {
        vec![
            paper("Deep Learning Basics", &["A. Lee"], Some("AI")),
            paper("Quantum Circuits", &["B. Kim"], Some("Physics")),
        ]
    }

    #[test]
    fn domain_match_is_case_insensitive() {
        let papers = library();
        assert_eq!(titles(&filter(&papers, "ai")), vec!["Deep Learning Basics"]);
        assert_eq!(titles(&filter(&papers, "AI")), vec!["Deep Learning Basics"]);
    }

    #[test]
    fn empty_or_blank_query_returns_everything_in_order() {
        let papers = library();
        assert_eq!(filter(&papers, "").len(), 2);
        assert_eq!(titles(&filter(&papers, "   ")), vec!["Deep Learning Basics", "Quantum Circuits"]);
        assert!(filter(&[], "").is_empty());
    }

    #[test]
    fn matches_titles_and_any_author() {
        let papers = vec![
            paper("Graph Networks", &["C. Diaz", "D. Evans"], None),
            paper("Protein Folding", &["E. Fox"], Some("Biology")),
            paper("Evans Functions", &[], None),
        ];
        assert_eq!(titles(&filter(&papers, "evans")), vec!["Graph Networks", "Evans Functions"]);
        assert_eq!(titles(&filter(&papers, "FOLD")), vec!["Protein Folding"]);
    }

    #[test]
    fn absent_domain_never_matches() {
        let papers = vec![paper("Untitled", &[], None)];
        assert!(filter(&papers, "physics").is_empty());
    }

    #[test]
    fn result_is_order_preserving_subsequence() {
        let papers = vec![
            paper("alpha", &[], Some("x")),
            paper("beta", &[], Some("target")),
            paper("gamma target", &[], None),
            paper("delta", &["Tar Get"], None),
            paper("epsilon", &["targeted"], None),
        ];
        let found = filter(&papers, "Target");
        assert_eq!(titles(&found), vec!["beta", "gamma target", "epsilon"]);

        let mut cursor = papers.iter();
        for hit in &found {
            assert!(cursor.any(|p| std::ptr::eq(p, *hit)), "out of order: {}", hit.title);
        }
    }

    #[test]
    fn query_is_matched_as_typed_apart_from_case() {
        let papers = library();
        // Surrounding whitespace is significant once the query is non-blank
        assert!(filter(&papers, " ai").is_empty());
        assert_eq!(filter(&papers, "quantum circuits").len(), 1);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let papers = library();
        assert_eq!(filter(&papers, "b"), filter(&papers, "b"));
    }
}
