//! Token normalisation shared by keyword scoring and the similarity fallback.

use std::collections::HashSet;

const EDGE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Lower-cases and strips surrounding whitespace and sentence punctuation.
pub fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .trim()
        .trim_matches(EDGE_PUNCTUATION)
        .to_string()
}

/// Whitespace-delimited, normalised token set. Tokens that normalise to
/// nothing (a lone comma, say) are dropped.
pub fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(normalize_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Keywords normalised the same way as bullet tokens.
pub fn keyword_set(keywords: &[String]) -> HashSet<String> {
    keywords
        .iter()
        .map(|k| normalize_token(k))
        .filter(|k| !k.is_empty())
        .collect()
}
