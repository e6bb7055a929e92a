use anyhow::{bail, Context, Result};

use crate::job::keywords::DEFAULT_TOP_K;
use crate::llm_client::DEFAULT_MODEL;

/// Which semantic similarity the scorer uses. `Jaccard` skips the TF-IDF
/// space entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    TfIdf,
    Jaccard,
}

impl SimilarityMode {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "tfidf" => Ok(Self::TfIdf),
            "jaccard" => Ok(Self::Jaccard),
            other => bail!("SIMILARITY_BACKEND must be 'tfidf' or 'jaccard', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Nothing is required; invalid numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables the LLM-backed collaborators when set.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub keyword_top_k: usize,
    pub similarity: SimilarityMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            llm_model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_temperature: var("LLM_TEMPERATURE")
                .map(|v| v.parse::<f32>())
                .transpose()
                .context("LLM_TEMPERATURE must be a number")?
                .unwrap_or(0.4),
            keyword_top_k: var("KEYWORD_TOP_K")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("KEYWORD_TOP_K must be a positive integer")?
                .unwrap_or(DEFAULT_TOP_K),
            similarity: var("SIMILARITY_BACKEND")
                .map(|v| SimilarityMode::parse(&v))
                .transpose()?
                .unwrap_or(SimilarityMode::TfIdf),
        })
    }

    pub fn llm_enabled(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(!config.llm_enabled());
        assert_eq!(config.llm_model, "claude-sonnet-4-5");
        assert_eq!(config.llm_temperature, 0.4);
        assert_eq!(config.keyword_top_k, 40);
        assert_eq!(config.similarity, SimilarityMode::TfIdf);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("LLM_TEMPERATURE", "0.7"),
            ("KEYWORD_TOP_K", "25"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.llm_enabled());
        assert_eq!(config.llm_temperature, 0.7);
        assert_eq!(config.keyword_top_k, 25);
    }

    #[test]
    fn test_blank_api_key_disables_llm() {
        assert!(!config_from(&[("ANTHROPIC_API_KEY", "  ")]).unwrap().llm_enabled());
    }

    #[test]
    fn test_invalid_numbers_fail() {
        let err = config_from(&[("PORT", "99999")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("LLM_TEMPERATURE", "warm")]).is_err());
        assert!(config_from(&[("KEYWORD_TOP_K", "-1")]).is_err());
    }

    #[test]
    fn test_similarity_backend() {
        let config = config_from(&[("SIMILARITY_BACKEND", "Jaccard")]).unwrap();
        assert_eq!(config.similarity, SimilarityMode::Jaccard);

        let err = config_from(&[("SIMILARITY_BACKEND", "bert")]).unwrap_err();
        assert!(err.to_string().contains("SIMILARITY_BACKEND"));
    }
}
