//! Axum route handlers for the Profile API.

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::profile::merge::{merge_profiles, MergeOptions, SourcedProfile};
use crate::profile::models::Candidate;
use crate::profile::sources::SourceKind;

#[derive(Debug, Deserialize)]
pub struct ProfileSourceInput {
    pub source_id: String,
    pub kind: SourceKind,
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
pub struct MergeProfilesRequest {
    pub sources: Vec<ProfileSourceInput>,
    #[serde(default)]
    pub options: MergeOptions,
}

#[derive(Debug, Serialize)]
pub struct MergeProfilesResponse {
    pub candidate: Candidate,
}

/// POST /api/v1/profiles/merge
///
/// Parses each source with its format's parser and merges them into one candidate.
pub async fn handle_merge_profiles(
    Json(request): Json<MergeProfilesRequest>,
) -> Result<Json<MergeProfilesResponse>, AppError> {
    if request.sources.is_empty() {
        return Err(AppError::Validation(
            "At least one profile source is required".to_string(),
        ));
    }

    let mut pieces = Vec::with_capacity(request.sources.len());
    for source in request.sources {
        if source.source_id.trim().is_empty() {
            return Err(AppError::Validation("source_id cannot be empty".to_string()));
        }
        let profile = source.kind.parser().parse(&source.payload)?;
        pieces.push(SourcedProfile {
            source_id: source.source_id,
            kind: source.kind,
            profile,
        });
    }

    let candidate = merge_profiles(pieces, &request.options);
    info!(
        "Merged profile with {} roles for '{}'",
        candidate.work_experience.len(),
        candidate.identity.name
    );

    Ok(Json(MergeProfilesResponse { candidate }))
}
