//! Numeric guardrail for rewritten bullets.
//!
//! A rewrite may rephrase but must not introduce numbers the original did not
//! contain. Rewrites that do, or that come back blank, are reverted.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").expect("number pattern is valid"))
}

pub fn numeric_tokens(text: &str) -> HashSet<&str> {
    number_pattern().find_iter(text).map(|m| m.as_str()).collect()
}

/// True when the rewrite is non-blank and every number in it already appears
/// in the original.
pub fn is_safe_rewrite(original: &str, rewritten: &str) -> bool {
    if rewritten.trim().is_empty() {
        return false;
    }
    let allowed = numeric_tokens(original);
    numeric_tokens(rewritten).is_subset(&allowed)
}

/// Applies the guardrail to one role. The result always has exactly as many
/// entries as `originals`: missing rewrites keep the original, extras are
/// dropped.
pub fn guard_role(originals: &[String], rewritten: &[String]) -> Vec<String> {
    originals
        .iter()
        .enumerate()
        .map(|(i, original)| match rewritten.get(i) {
            Some(candidate) if is_safe_rewrite(original, candidate) => candidate.trim().to_string(),
            _ => original.clone(),
        })
        .collect()
}
