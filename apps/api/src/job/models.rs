use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Optional title/company/location supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobOverrides {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

/// The target role. Immutable once built; keywords are an opaque ranked list
/// produced by a `KeywordExtractor` or supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub text: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub keywords: Vec<String>,
}

impl JobPosting {
    pub fn new(text: impl Into<String>, overrides: JobOverrides, keywords: Vec<String>) -> Self {
        Self {
            text: text.into(),
            title: non_blank(overrides.title),
            company: non_blank(overrides.company),
            location: non_blank(overrides.location),
            keywords: dedup_preserving_order(keywords),
        }
    }

    /// Full text for the semantic pass, `None` when there is nothing to compare.
    pub fn text_for_scoring(&self) -> Option<&str> {
        Some(self.text.as_str()).filter(|t| !t.trim().is_empty())
    }
}

/// Exact-match dedup keeping the first occurrence.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_deduplicated_in_insertion_order() {
        let job = JobPosting::new(
            "text",
            JobOverrides::default(),
            vec!["rust".into(), "aws".into(), "rust".into(), "sql".into(), "aws".into()],
        );
        assert_eq!(job.keywords, vec!["rust", "aws", "sql"]);
    }

    #[test]
    fn test_blank_overrides_become_none() {
        let job = JobPosting::new(
            "text",
            JobOverrides {
                title: Some("  ".into()),
                company: Some(" Acme ".into()),
                location: None,
            },
            vec![],
        );
        assert!(job.title.is_none());
        assert_eq!(job.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_blank_text_is_not_scored() {
        let job = JobPosting::new(" \n ", JobOverrides::default(), vec![]);
        assert!(job.text_for_scoring().is_none());
    }
}
