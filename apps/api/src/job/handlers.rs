//! Axum route handlers for the Job API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::job::keywords::{FrequencyKeywordExtractor, KeywordExtractor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractKeywordsRequest {
    pub text: String,
    /// Overrides the configured keyword count for this call.
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ExtractKeywordsResponse {
    pub keywords: Vec<String>,
}

/// POST /api/v1/jobs/keywords
///
/// Previews the keyword list a tailoring run would use for this job text.
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(request): Json<ExtractKeywordsRequest>,
) -> Result<Json<ExtractKeywordsResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let keywords = match request.top_k {
        Some(0) => return Err(AppError::Validation("top_k must be at least 1".to_string())),
        Some(top_k) => FrequencyKeywordExtractor { top_k }.extract(&request.text),
        None => state.extractor.extract(&request.text),
    };

    Ok(Json(ExtractKeywordsResponse { keywords }))
}
