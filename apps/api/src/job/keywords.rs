//! Keyword extraction: turns raw job text into the ranked keyword list the
//! selector consumes.
//!
//! `KeywordExtractor` is the seam; `FrequencyKeywordExtractor` is the default
//! pure-Rust backend (deterministic, no LLM call).

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_TOP_K: usize = 40;

const STOPWORDS: &[&str] = &[
    "the", "and", "to", "of", "in", "a", "for", "with", "on", "is", "as", "by", "or", "at", "an",
    "be", "are", "from", "that", "this", "will", "we", "our", "your", "you", "us", "it", "into",
    "across", "using", "use", "team", "work", "role", "company", "llc", "inc", "co", "corp",
];

/// Substrings that mark a token as a tool or domain term worth a small boost.
const TECH_HINTS: &[&str] = &[
    "sql", "aws", "azure", "gcp", "etl", "crm", "erp", "sap", "python", "java", "excel", "saas",
    "api", "ml", "ai", "pm",
];

/// Produces an ordered, deduplicated keyword list from raw job text.
/// Implementations must be deterministic for identical input.
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Frequency-ranked extractor.
///
/// Algorithm:
/// 1. Tokenise on runs of `[A-Za-z0-9+#./-]`, lower-cased
/// 2. Drop stop-words and single characters, trim `.-/` from both ends
/// 3. Count occurrences; tech-hint tokens get +1
/// 4. Rank by count descending, first occurrence breaking ties
#[derive(Debug, Clone)]
pub struct FrequencyKeywordExtractor {
    pub top_k: usize,
}

impl Default for FrequencyKeywordExtractor {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl KeywordExtractor for FrequencyKeywordExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        // token -> (count, first position)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

        let tokens = keyword_pattern()
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|t| t.chars().count() > 1 && !STOPWORDS.contains(&t.as_str()))
            .map(|t| t.trim_matches(|c| matches!(c, '.' | '-' | '/')).to_string())
            .filter(|t| !t.is_empty());

        for (position, token) in tokens.enumerate() {
            counts.entry(token).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(token, (count, first))| {
                let boost = usize::from(TECH_HINTS.iter().any(|hint| token.contains(hint)));
                (token, count + boost, first)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(self.top_k);
        ranked.into_iter().map(|(token, _, _)| token).collect()
    }
}

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z0-9+#./-]+").expect("keyword pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = r#"
        Senior Data Engineer
        We are looking for a data engineer to build ETL pipelines on AWS.
        Required: Python, SQL, Airflow. You will own data pipelines and data quality.
        Nice to have: Spark, dbt. Work with the analytics team.
    "#;

    #[test]
    fn test_most_frequent_terms_rank_first() {
        let keywords = FrequencyKeywordExtractor::default().extract(JD);
        assert_eq!(keywords[0], "data", "got {keywords:?}");
        assert!(keywords.contains(&"python".to_string()));
        assert!(keywords.contains(&"aws".to_string()));
    }

    #[test]
    fn test_stopwords_and_single_chars_removed() {
        let keywords = FrequencyKeywordExtractor::default().extract("the team and a C we use Go");
        assert_eq!(keywords, vec!["go"]);
    }

    #[test]
    fn test_tech_hints_boost_ties() {
        // "widgets" appears first, but "sql" gets the tech boost
        let keywords = FrequencyKeywordExtractor::default().extract("widgets sql");
        assert_eq!(keywords, vec!["sql", "widgets"]);
    }

    #[test]
    fn test_ties_broken_by_first_occurrence() {
        let keywords = FrequencyKeywordExtractor::default().extract("zebra yak xylophone");
        assert_eq!(keywords, vec!["zebra", "yak", "xylophone"]);
    }

    #[test]
    fn test_punctuation_trimmed_and_symbols_kept() {
        let keywords = FrequencyKeywordExtractor::default().extract("C++ and C# -- node.js/ ci/cd.");
        assert_eq!(keywords, vec!["c++", "c#", "node.js", "ci/cd"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let keywords = FrequencyKeywordExtractor { top_k: 2 }.extract(JD);
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let extractor = FrequencyKeywordExtractor::default();
        assert_eq!(extractor.extract(JD), extractor.extract(JD));
    }

    #[test]
    fn test_empty_text_yields_no_keywords() {
        assert!(FrequencyKeywordExtractor::default().extract("").is_empty());
    }
}
