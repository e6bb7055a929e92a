//! Post-assembly evaluation: how much of the job vocabulary the tailored
//! resume covers, plus plain-language suggestions.

use std::collections::HashSet;

use serde::Serialize;

use crate::assembly::resume::ResumeContext;

const LOW_COVERAGE: f64 = 0.35;
const MAX_MISSING: usize = 15;

const EVAL_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}'];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCoverage {
    /// Covered / total, rounded to 3 decimals. 0 when there are no keywords.
    pub coverage: f64,
    pub covered: Vec<String>,
    /// First `MAX_MISSING` uncovered keywords, in keyword order.
    pub missing: Vec<String>,
    pub total_keywords: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub keyword_coverage: KeywordCoverage,
    /// Bullets typed in by the user rather than selected from a source.
    pub user_added_bullets: usize,
    pub suggestions: Vec<String>,
}

fn normalize(term: &str) -> String {
    term.to_lowercase().trim().trim_matches(EVAL_PUNCTUATION).to_string()
}

/// Matches keywords against the words of the current bullet texts and the
/// skills list.
pub fn keyword_coverage(keywords: &[String], resume: &ResumeContext) -> KeywordCoverage {
    let mut vocabulary: HashSet<String> = resume
        .bullet_texts()
        .flat_map(str::split_whitespace)
        .map(normalize)
        .collect();
    vocabulary.extend(resume.skills.iter().map(|s| normalize(s)));

    let normalized: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| normalize(k))
        .collect();

    let (covered, missing): (Vec<String>, Vec<String>) = normalized
        .iter()
        .cloned()
        .partition(|k| vocabulary.contains(k));

    let coverage = if normalized.is_empty() {
        0.0
    } else {
        round3(covered.len() as f64 / normalized.len() as f64)
    };

    KeywordCoverage {
        coverage,
        covered,
        missing: missing.into_iter().take(MAX_MISSING).collect(),
        total_keywords: normalized.len(),
    }
}

pub fn summarize_evaluation(keywords: &[String], resume: &ResumeContext) -> EvaluationReport {
    let keyword_coverage = keyword_coverage(keywords, resume);

    let mut suggestions = Vec::new();
    if keyword_coverage.coverage < LOW_COVERAGE {
        suggestions.push(
            "Low keyword coverage; consider adding relevant bullets or skills.".to_string(),
        );
    }
    if !resume.experiences().is_empty() && resume.total_bullets() == 0 {
        suggestions.push("No bullets selected; ensure candidate bullets are provided.".to_string());
    }
    if resume.skills.is_empty() {
        suggestions
            .push("Skills section empty; include key tools and domains from the job posting.".to_string());
    }

    let user_added_bullets = resume
        .experiences()
        .iter()
        .flat_map(|block| block.bullets())
        .filter(|bullet| bullet.is_user_added())
        .count();

    EvaluationReport {
        keyword_coverage,
        user_added_bullets,
        suggestions,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
