//! Semantic similarity between bullets and the job text.
//!
//! `SimilarityBackend` is the seam. `TfIdfSimilarity` is the primary backend and
//! may decline to answer; `JaccardSimilarity` is the fallback and always
//! answers. `SimilarityEngine` wires the two together at construction time so
//! the scorer never branches on failures.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::selection::text::token_set;

pub trait SimilarityBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// One similarity per bullet, in bullet order. `None` means the backend
    /// cannot answer for this input.
    fn similarities(&self, job_text: &str, bullets: &[&str]) -> Option<Vec<f64>>;
}

// ────────────────────────────────────────────────────────────────────────────
// TF-IDF cosine (primary)
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity in a TF-IDF space built over the job text and one role's
/// bullets. A fresh space is built per call, so vocabulary never leaks between
/// roles.
pub struct TfIdfSimilarity;

impl SimilarityBackend for TfIdfSimilarity {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn similarities(&self, job_text: &str, bullets: &[&str]) -> Option<Vec<f64>> {
        if job_text.trim().is_empty() {
            return None;
        }

        let mut builder = TfIdfBuilder::new();
        builder.add(job_text);
        for bullet in bullets {
            builder.add(bullet);
        }
        let model = builder.build()?;

        Some((1..=bullets.len()).map(|i| model.cosine(0, i)).collect())
    }
}

/// Collects documents, then fits the vocabulary and weights in `build`.
///
/// Weighting: raw term counts over unigrams and bigrams of `\b\w\w+\b` tokens,
/// smoothed idf `ln((1 + n) / (1 + df)) + 1`, rows L2-normalised.
#[derive(Debug, Default)]
pub struct TfIdfBuilder {
    documents: Vec<Vec<String>>,
}

impl TfIdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str) {
        self.documents.push(ngrams(text));
    }

    /// Returns `None` when no document produced a single term.
    pub fn build(self) -> Option<TfIdfModel> {
        let n = self.documents.len() as f64;

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        let counts: Vec<BTreeMap<&str, usize>> = self
            .documents
            .iter()
            .map(|terms| {
                let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
                for term in terms {
                    *tf.entry(term.as_str()).or_insert(0) += 1;
                }
                for &term in tf.keys() {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        if doc_freq.is_empty() {
            return None;
        }

        let idf: BTreeMap<String, f64> = doc_freq
            .iter()
            .map(|(term, &df)| (term.to_string(), ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0))
            .collect();

        let vectors = counts
            .into_iter()
            .map(|tf| weigh(tf, &idf))
            .collect();

        Some(TfIdfModel { idf, vectors })
    }
}

/// Fitted, normalised document vectors in insertion order, plus the idf table
/// used to project new text into the same space.
#[derive(Debug)]
pub struct TfIdfModel {
    idf: BTreeMap<String, f64>,
    vectors: Vec<BTreeMap<String, f64>>,
}

impl TfIdfModel {
    /// Cosine similarity between documents `a` and `b`; rows are already unit
    /// length, so this is their dot product. Zero vectors score 0.
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(left), Some(right)) => dot(left, right),
            _ => 0.0,
        }
    }

    /// Projects `text` onto the fitted vocabulary. Terms never seen at fit
    /// time carry no weight.
    pub fn transform(&self, text: &str) -> BTreeMap<String, f64> {
        let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
        let terms = ngrams(text);
        for term in &terms {
            if self.idf.contains_key(term.as_str()) {
                *tf.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        weigh(tf, &self.idf)
    }

    /// Cosine similarity between document `index` and a transformed query.
    pub fn similarity_to(&self, index: usize, query: &BTreeMap<String, f64>) -> f64 {
        self.vectors.get(index).map_or(0.0, |doc| dot(doc, query))
    }
}

/// Raw counts times idf, L2-normalised.
fn weigh(tf: BTreeMap<&str, usize>, idf: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut weights: BTreeMap<String, f64> = tf
        .into_iter()
        .map(|(term, count)| {
            let idf = idf.get(term).copied().unwrap_or(1.0);
            (term.to_string(), count as f64 * idf)
        })
        .collect();
    let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in weights.values_mut() {
            *w /= norm;
        }
    }
    weights
}

fn dot(left: &BTreeMap<String, f64>, right: &BTreeMap<String, f64>) -> f64 {
    left.iter()
        .filter_map(|(term, w)| right.get(term).map(|v| w * v))
        .sum()
}

fn ngrams(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let unigrams: Vec<&str> = word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();
    let bigrams = unigrams.windows(2).map(|pair| pair.join(" "));

    unigrams
        .iter()
        .map(|t| t.to_string())
        .chain(bigrams)
        .collect()
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("word pattern is valid"))
}

// ────────────────────────────────────────────────────────────────────────────
// Token Jaccard (fallback)
// ────────────────────────────────────────────────────────────────────────────

/// `|bullet ∩ job| / |bullet ∪ job|` over normalised whitespace tokens.
/// Never declines; an empty union scores 0.
pub struct JaccardSimilarity;

impl SimilarityBackend for JaccardSimilarity {
    fn name(&self) -> &'static str {
        "jaccard"
    }

    fn similarities(&self, job_text: &str, bullets: &[&str]) -> Option<Vec<f64>> {
        Some(Self::scores(job_text, bullets))
    }
}

impl JaccardSimilarity {
    pub fn scores(job_text: &str, bullets: &[&str]) -> Vec<f64> {
        let job_tokens = token_set(job_text);
        bullets
            .iter()
            .map(|bullet| {
                let tokens = token_set(bullet);
                let inter = tokens.intersection(&job_tokens).count();
                let union = tokens.union(&job_tokens).count().max(1);
                inter as f64 / union as f64
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Primary backend with a guaranteed fallback.
pub struct SimilarityEngine {
    primary: Option<Box<dyn SimilarityBackend>>,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(Some(Box::new(TfIdfSimilarity)))
    }
}

impl SimilarityEngine {
    pub fn new(primary: Option<Box<dyn SimilarityBackend>>) -> Self {
        Self { primary }
    }

    /// Fallback only; used when no vector backend is wanted.
    pub fn jaccard_only() -> Self {
        Self::new(None)
    }

    /// Name of the backend tried first.
    pub fn name(&self) -> &'static str {
        self.primary.as_ref().map_or("jaccard", |primary| primary.name())
    }

    /// Similarity of each bullet to the job text. Missing job text degrades to
    /// the fallback, which scores every bullet 0.
    pub fn scores(&self, job_text: Option<&str>, bullets: &[&str]) -> Vec<f64> {
        if bullets.is_empty() {
            return Vec::new();
        }
        let job_text = job_text.unwrap_or("");

        if let Some(primary) = &self.primary {
            match primary.similarities(job_text, bullets) {
                Some(scores) if scores.len() == bullets.len() => return scores,
                _ => debug!(
                    "Similarity backend '{}' unavailable, falling back to jaccard",
                    primary.name()
                ),
            }
        }
        JaccardSimilarity::scores(job_text, bullets)
    }
}
