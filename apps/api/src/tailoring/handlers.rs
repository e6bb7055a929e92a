//! Axum route handlers for the Tailoring API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::pipeline::{run_tailoring, Collaborators, TailorRequest, TailoringRun};

/// POST /api/v1/resumes/tailor
///
/// Runs the full pipeline: selection, resume and letter assembly, optional
/// refinement and evaluation.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailoringRun>, AppError> {
    let collaborators = Collaborators {
        extractor: state.extractor.as_ref(),
        scorer: state.scorer.clone(),
        refiner: state.refiner.as_ref(),
        letter_writer: state.letter_writer.as_ref(),
    };
    let run = run_tailoring(collaborators, request).await?;
    Ok(Json(run))
}
