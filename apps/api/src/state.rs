use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::{Config, SimilarityMode};
use crate::job::keywords::{FrequencyKeywordExtractor, KeywordExtractor};
use crate::llm_client::LlmClient;
use crate::refinement::llm::{LlmBulletRefiner, LlmLetterWriter};
use crate::refinement::{BulletRefiner, LetterWriter, PassthroughRefiner, SkeletonLetterWriter};
use crate::selection::scorer::{RelevanceScorer, ScoringWeights};
use crate::selection::similarity::SimilarityEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: Arc<dyn KeywordExtractor>,
    pub scorer: Arc<RelevanceScorer>,
    /// LLM-backed when an API key is configured, passthrough otherwise.
    pub refiner: Arc<dyn BulletRefiner>,
    pub letter_writer: Arc<dyn LetterWriter>,
}

impl AppState {
    /// Picks every collaborator once, from config.
    pub fn from_config(config: Config) -> Result<Self> {
        let extractor = Arc::new(FrequencyKeywordExtractor {
            top_k: config.keyword_top_k,
        });

        let engine = match config.similarity {
            SimilarityMode::TfIdf => SimilarityEngine::default(),
            SimilarityMode::Jaccard => SimilarityEngine::jaccard_only(),
        };

        let (refiner, letter_writer): (Arc<dyn BulletRefiner>, Arc<dyn LetterWriter>) =
            match config.anthropic_api_key.as_deref() {
                Some(key) if config.llm_enabled() => {
                    let llm = LlmClient::new(key, config.llm_model.clone())?;
                    info!("LLM collaborators enabled (model: {})", llm.model());
                    (
                        Arc::new(LlmBulletRefiner::new(llm.clone(), config.llm_temperature)),
                        Arc::new(LlmLetterWriter::new(llm, config.llm_temperature)),
                    )
                }
                _ => {
                    info!("No ANTHROPIC_API_KEY; using deterministic collaborators");
                    (Arc::new(PassthroughRefiner), Arc::new(SkeletonLetterWriter))
                }
            };

        Ok(Self {
            config,
            extractor,
            scorer: Arc::new(RelevanceScorer::new(engine, ScoringWeights::default())),
            refiner,
            letter_writer,
        })
    }
}
