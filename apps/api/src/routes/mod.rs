pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{job, profile, selection, tailoring};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Inputs
        .route(
            "/api/v1/profiles/merge",
            post(profile::handlers::handle_merge_profiles),
        )
        .route(
            "/api/v1/jobs/keywords",
            post(job::handlers::handle_extract_keywords),
        )
        // Core
        .route(
            "/api/v1/selections",
            post(selection::handlers::handle_select_bullets),
        )
        .route(
            "/api/v1/resumes/tailor",
            post(tailoring::handlers::handle_tailor),
        )
        .with_state(state)
}
