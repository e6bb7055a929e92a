//! Tailoring: orchestrates one full run.
//!
//! Flow: keywords → select_bullets (blocking pool) → build_resume_context +
//!       build_cover_letter → optional refinement → evaluation.
//!
//! Collaborator failures never fail a run; the deterministic resume and
//! letter are kept.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assembly::evaluation::{summarize_evaluation, EvaluationReport};
use crate::assembly::letter::{build_cover_letter, CoverLetter, LetterRequest, MAX_WRITER_HIGHLIGHTS};
use crate::assembly::resume::{build_resume_context, ResumeContext};
use crate::errors::AppError;
use crate::job::keywords::KeywordExtractor;
use crate::job::models::{JobOverrides, JobPosting};
use crate::profile::models::Candidate;
use crate::refinement::{refine_resume, BulletRefiner, LetterWriter};
use crate::selection::handlers::resolve_budgets;
use crate::selection::retrieval::{Chunk, ChunkIndex, DEFAULT_RETRIEVAL_TOP_K};
use crate::selection::scorer::RelevanceScorer;
use crate::selection::selector::{
    select_bullets, Budgets, SelectionOptions, SelectionResult, ZeroSignalPolicy,
};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub text: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    /// When present and non-empty, used instead of extracting from `text`.
    pub keywords: Option<Vec<String>>,
}

/// A bullet the user typed in for one role. Appended after refinement, tagged
/// as user-added.
#[derive(Debug, Clone, Deserialize)]
pub struct AddedBullet {
    pub role_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TailorRequest {
    pub candidate: Candidate,
    pub job: JobInput,
    pub budgets: Option<Budgets>,
    #[serde(default)]
    pub one_page: bool,
    #[serde(default)]
    pub zero_signal: ZeroSignalPolicy,
    pub personal_notes: Option<String>,
    /// Run the prose collaborators. Defaults to true.
    #[serde(default = "default_refine")]
    pub refine: bool,
    /// Search the whole profile with the job text and offer the hits to the
    /// letter writer after the selected bullets.
    #[serde(default)]
    pub retrieval: bool,
    #[serde(default)]
    pub added_bullets: Vec<AddedBullet>,
}

fn default_refine() -> bool {
    true
}

/// Which collaborators shaped the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorReport {
    /// Refiner name, or "skipped".
    pub refiner: String,
    pub bullets_rewritten: usize,
    /// Writer name when it replaced the letter, otherwise "skeleton".
    pub letter_writer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TailoringRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub job_keywords: Vec<String>,
    pub selection: SelectionResult,
    /// Profile chunks offered to the letter writer; empty unless requested.
    pub retrieved: Vec<Chunk>,
    pub resume: ResumeContext,
    pub letter: CoverLetter,
    pub evaluation: EvaluationReport,
    pub collaborators: CollaboratorReport,
}

/// Everything a run needs besides the request.
pub struct Collaborators<'a> {
    pub extractor: &'a dyn KeywordExtractor,
    pub scorer: Arc<RelevanceScorer>,
    pub refiner: &'a dyn BulletRefiner,
    pub letter_writer: &'a dyn LetterWriter,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the tailoring pipeline.
///
/// Steps:
/// 1. Validate: job text and supplied keywords cannot both be empty
/// 2. Keywords: supplied list, else extracted from the job text
/// 3. select_bullets() on the blocking pool
/// 4. build_resume_context() + build_cover_letter()
/// 5. If `refine`: bullet refiner, then letter writer over the refined highlights;
///    user-added bullets are appended afterwards
/// 6. summarize_evaluation()
pub async fn run_tailoring(
    collaborators: Collaborators<'_>,
    request: TailorRequest,
) -> Result<TailoringRun, AppError> {
    let supplied_keywords = request
        .job
        .keywords
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>();

    // Step 1: Validate
    if request.job.text.trim().is_empty() && supplied_keywords.is_empty() {
        return Err(AppError::Validation(
            "Provide job text or a keyword list".to_string(),
        ));
    }
    let roles = request.candidate.work_experience.len();
    if let Some(bad) = request
        .added_bullets
        .iter()
        .find(|b| b.role_index >= roles || b.text.trim().is_empty())
    {
        return Err(AppError::Validation(format!(
            "Added bullet for role {} is blank or names no existing role",
            bad.role_index
        )));
    }

    // Step 2: Keywords
    let keywords = if supplied_keywords.is_empty() {
        collaborators.extractor.extract(&request.job.text)
    } else {
        supplied_keywords
    };
    let job = JobPosting::new(
        request.job.text,
        JobOverrides {
            title: request.job.title,
            company: request.job.company,
            location: request.job.location,
        },
        keywords,
    );
    info!(
        "Tailoring for '{}' with {} keywords",
        job.title.as_deref().unwrap_or("untitled role"),
        job.keywords.len()
    );

    // Step 3: Selection
    let options = SelectionOptions {
        budgets: resolve_budgets(request.budgets, request.one_page),
        zero_signal: request.zero_signal,
    };
    let candidate = Arc::new(request.candidate);
    let job = Arc::new(job);
    let (selection, retrieved) = {
        let candidate = Arc::clone(&candidate);
        let job = Arc::clone(&job);
        let scorer = Arc::clone(&collaborators.scorer);
        let retrieval = request.retrieval && request.refine;
        tokio::task::spawn_blocking(move || {
            let selection = select_bullets(
                &candidate,
                &job.keywords,
                job.text_for_scoring(),
                &scorer,
                options,
            );
            let retrieved: Vec<Chunk> = if retrieval {
                ChunkIndex::from_candidate(&candidate)
                    .search(&job.text, DEFAULT_RETRIEVAL_TOP_K)
                    .into_iter()
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };
            (selection, retrieved)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Selection task failed: {e}")))?
    };
    info!(
        "Selected {} bullets across {} roles",
        selection.total_selected(),
        selection.selected_by_role.len()
    );

    // Step 4: Assembly
    let mut resume = build_resume_context(&candidate, &job, &selection);
    let mut letter = build_cover_letter(
        &candidate,
        &job,
        &selection,
        request.personal_notes.as_deref(),
    );

    // Step 5: Optional collaborators
    let mut report = CollaboratorReport {
        refiner: "skipped".to_string(),
        bullets_rewritten: 0,
        letter_writer: "skeleton".to_string(),
    };
    if request.refine {
        report.refiner = collaborators.refiner.name().to_string();
        report.bullets_rewritten =
            refine_resume(&mut resume, collaborators.refiner, &job.keywords).await;

        let highlights = merge_highlights(resume.bullet_texts(), &retrieved);
        let letter_request = LetterRequest::new(
            &candidate,
            &job,
            highlights,
            request.personal_notes.as_deref(),
        );
        if let Some(drafted) = collaborators.letter_writer.write(&letter_request).await {
            letter = drafted;
            report.letter_writer = collaborators.letter_writer.name().to_string();
        }
    }

    for added in &request.added_bullets {
        resume.add_user_bullet(added.role_index, &added.text);
    }

    // Step 6: Evaluation
    let evaluation = summarize_evaluation(&job.keywords, &resume);
    info!(
        "Keyword coverage {:.3} ({} suggestions)",
        evaluation.keyword_coverage.coverage,
        evaluation.suggestions.len()
    );

    Ok(TailoringRun {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        job_keywords: job.keywords.clone(),
        selection,
        retrieved,
        resume,
        letter,
        evaluation,
        collaborators: report,
    })
}

/// Selected bullets first, then retrieved chunks not already present, capped
/// at what the letter writer accepts.
fn merge_highlights<'a>(bullets: impl Iterator<Item = &'a str>, retrieved: &'a [Chunk]) -> Vec<String> {
    let mut highlights: Vec<String> = Vec::new();
    for text in bullets.chain(retrieved.iter().map(|chunk| chunk.text.as_str())) {
        if highlights.len() == MAX_WRITER_HIGHLIGHTS {
            break;
        }
        if !highlights.iter().any(|h| h == text) {
            highlights.push(text.to_string());
        }
    }
    highlights
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
