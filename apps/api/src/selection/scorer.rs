//! Relevance scoring for one bullet against a job.
//!
//! total = semantic_weight * semantic + keyword_weight * keyword + skill_boost
//!
//! The semantic term comes from `SimilarityEngine`; the keyword term is a blend
//! of coverage and density; the skill boost rewards roles whose listed skills
//! overlap the job keywords and is shared by every bullet of that role.

use std::collections::HashSet;

use serde::Serialize;

use crate::profile::models::Experience;
use crate::selection::similarity::SimilarityEngine;
use crate::selection::text::{keyword_set, token_set};

/// Blend weights. The defaults are part of the observable ranking behaviour.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub keyword: f64,
    /// Added per overlapping role skill.
    pub skill_boost_per_match: f64,
    /// Keyword score = base * coverage + density * density.
    pub keyword_base: f64,
    pub keyword_density: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            keyword: 0.4,
            skill_boost_per_match: 0.05,
            keyword_base: 0.7,
            keyword_density: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BulletScore {
    pub semantic: f64,
    pub keyword: f64,
    pub skill_boost: f64,
    pub total: f64,
}

pub struct RelevanceScorer {
    engine: SimilarityEngine,
    weights: ScoringWeights,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(SimilarityEngine::default(), ScoringWeights::default())
    }
}

impl RelevanceScorer {
    pub fn new(engine: SimilarityEngine, weights: ScoringWeights) -> Self {
        Self { engine, weights }
    }

    pub fn similarity_backend(&self) -> &'static str {
        self.engine.name()
    }

    /// Scores every bullet of `role`, in bullet order. Semantic similarity is
    /// computed in one space built from the job text and this role's bullets.
    pub fn score_role(
        &self,
        role: &Experience,
        job_text: Option<&str>,
        keywords: &[String],
    ) -> Vec<BulletScore> {
        let texts: Vec<&str> = role.bullets.iter().map(|b| b.text.as_str()).collect();
        let semantic = self.engine.scores(job_text, &texts);
        let keyword_tokens = keyword_set(keywords);
        let boost = self.skill_boost(&role.skills, &keyword_tokens);

        texts
            .iter()
            .zip(semantic)
            .map(|(text, sem)| self.combine(sem, self.keyword_score(text, &keyword_tokens), boost))
            .collect()
    }

    /// `base * |tokens ∩ keywords| / |keywords| + density * |tokens ∩ keywords| / |tokens|`.
    /// 0 when either side is empty.
    fn keyword_score(&self, bullet_text: &str, keyword_tokens: &HashSet<String>) -> f64 {
        let tokens = token_set(bullet_text);
        if tokens.is_empty() || keyword_tokens.is_empty() {
            return 0.0;
        }
        let hits = tokens.intersection(keyword_tokens).count() as f64;
        let coverage = hits / keyword_tokens.len() as f64;
        let density = hits / tokens.len() as f64;
        self.weights.keyword_base * coverage + self.weights.keyword_density * density
    }

    fn skill_boost(&self, skills: &[String], keyword_tokens: &HashSet<String>) -> f64 {
        let matches = keyword_set(skills).intersection(keyword_tokens).count();
        self.weights.skill_boost_per_match * matches as f64
    }

    fn combine(&self, semantic: f64, keyword: f64, skill_boost: f64) -> BulletScore {
        BulletScore {
            semantic,
            keyword,
            skill_boost,
            total: self.weights.semantic * semantic + self.weights.keyword * keyword + skill_boost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::Bullet;

    fn kw(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn keyword_score(text: &str, keywords: &[&str]) -> f64 {
        RelevanceScorer::default().keyword_score(text, &keyword_set(&kw(keywords)))
    }

    fn make_role(bullets: &[&str], skills: &[&str]) -> Experience {
        Experience {
            company: "Acme".into(),
            role: "Engineer".into(),
            bullets: bullets.iter().map(|t| Bullet::new(*t, vec!["cv".into()])).collect(),
            skills: kw(skills),
            ..Experience::default()
        }
    }

    #[test]
    fn test_keyword_score_blend() {
        // tokens {led, aws, migration}, keywords {aws, python}: hits 1
        // 0.7 * 1/2 + 0.3 * 1/3 = 0.45
        let score = keyword_score("Led AWS migration.", &["AWS", "Python"]);
        assert!((score - 0.45).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn test_keyword_score_full_coverage_in_long_bullet() {
        // 7 tokens, all 3 keywords present: 0.7 * 3/3 + 0.3 * 3/7
        let score = keyword_score("Led migration to AWS, reducing cost 20%", &["aws", "cost", "migration"]);
        assert!((score - (0.7 + 0.3 * 3.0 / 7.0)).abs() < 1e-12, "got {score}");
        assert!(score > 0.5);
    }

    #[test]
    fn test_keyword_score_empty_inputs() {
        assert_eq!(keyword_score("", &["aws"]), 0.0);
        assert_eq!(keyword_score("aws", &[]), 0.0);
        assert_eq!(keyword_score("aws", &["..."]), 0.0);
    }

    #[test]
    fn test_skill_boost_counts_normalised_overlap() {
        let role = make_role(&["Wrote documentation"], &["Python", "AWS.", "Excel"]);
        let scores = RelevanceScorer::default().score_role(&role, None, &kw(&["python", "aws", "sql"]));
        assert!((scores[0].skill_boost - 0.10).abs() < 1e-12);
        assert!((scores[0].total - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_total_is_weighted_sum() {
        let role = make_role(&["python aws"], &[]);
        let scores = RelevanceScorer::default().score_role(&role, Some("python aws"), &kw(&["python"]));
        let score = scores[0];
        let expected = 0.6 * score.semantic + 0.4 * score.keyword + score.skill_boost;
        assert!((score.total - expected).abs() < 1e-12);
        assert!((score.semantic - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_role_shares_skill_boost() {
        let role = make_role(&["Built Python tooling", "Ran standups"], &["python"]);
        let scores = RelevanceScorer::default().score_role(&role, Some("python tooling"), &kw(&["python"]));
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].skill_boost, scores[1].skill_boost);
        assert!(scores[0].total > scores[1].total);
    }
}
