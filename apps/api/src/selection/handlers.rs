//! Axum route handlers for the Selection API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::profile::models::Candidate;
use crate::selection::selector::{
    select_bullets, Budgets, SelectionOptions, SelectionResult, ZeroSignalPolicy,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectBulletsRequest {
    pub candidate: Candidate,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub job_text: Option<String>,
    pub budgets: Option<Budgets>,
    #[serde(default)]
    pub one_page: bool,
    #[serde(default)]
    pub zero_signal: ZeroSignalPolicy,
}

#[derive(Debug, Serialize)]
pub struct SelectBulletsResponse {
    pub selection: SelectionResult,
}

/// Explicit budgets win over `one_page`.
pub fn resolve_budgets(budgets: Option<Budgets>, one_page: bool) -> Budgets {
    match (budgets, one_page) {
        (Some(budgets), _) => budgets,
        (None, true) => Budgets::one_page(),
        (None, false) => Budgets::default(),
    }
}

/// POST /api/v1/selections
///
/// Runs bullet selection alone, without assembling a resume.
pub async fn handle_select_bullets(
    State(state): State<AppState>,
    Json(request): Json<SelectBulletsRequest>,
) -> Result<Json<SelectBulletsResponse>, AppError> {
    let options = SelectionOptions {
        budgets: resolve_budgets(request.budgets, request.one_page),
        zero_signal: request.zero_signal,
    };

    let scorer = state.scorer.clone();
    let selection = tokio::task::spawn_blocking(move || {
        select_bullets(
            &request.candidate,
            &request.keywords,
            request.job_text.as_deref(),
            &scorer,
            options,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Selection task failed: {e}")))?;

    info!("Selected {} bullets", selection.total_selected());

    Ok(Json(SelectBulletsResponse { selection }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_budgets_override_one_page() {
        let custom = Budgets { latest: 9, previous: 9, older: 9 };
        assert_eq!(resolve_budgets(Some(custom), true), custom);
        assert_eq!(resolve_budgets(None, true), Budgets::one_page());
        assert_eq!(resolve_budgets(None, false), Budgets::default());
    }
}
