//! Optional prose collaborators.
//!
//! Each capability has a guaranteed fallback chosen at startup:
//! `PassthroughRefiner` keeps bullet text as selected and
//! `SkeletonLetterWriter` keeps the deterministic letter. LLM-backed
//! implementations live in `llm` and report failure as `None`, never as an
//! error.

use async_trait::async_trait;
use tracing::info;

use crate::assembly::letter::{CoverLetter, LetterRequest};
use crate::assembly::resume::ResumeContext;

pub mod guardrail;
pub mod llm;
pub mod prompts;

/// Rewrites bullet text, one list per role in role order.
///
/// Contract: implementations must not introduce numeric tokens absent from the
/// original bullet (see `guardrail`). `None` means unavailable.
#[async_trait]
pub trait BulletRefiner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn refine(&self, bullets_by_role: &[Vec<String>], keywords: &[String]) -> Option<Vec<Vec<String>>>;
}

/// Replaces the letter skeleton wholesale, or `None` to keep it.
#[async_trait]
pub trait LetterWriter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, request: &LetterRequest) -> Option<CoverLetter>;
}

pub struct PassthroughRefiner;

#[async_trait]
impl BulletRefiner for PassthroughRefiner {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    async fn refine(&self, bullets_by_role: &[Vec<String>], _keywords: &[String]) -> Option<Vec<Vec<String>>> {
        Some(bullets_by_role.to_vec())
    }
}

pub struct SkeletonLetterWriter;

#[async_trait]
impl LetterWriter for SkeletonLetterWriter {
    fn name(&self) -> &'static str {
        "skeleton"
    }

    async fn write(&self, _request: &LetterRequest) -> Option<CoverLetter> {
        None
    }
}

/// Runs `refiner` over the resume and writes changed texts back through the
/// resume's setter. Provenance and scores are untouched. Returns the number of
/// bullets whose text changed.
pub async fn refine_resume(
    resume: &mut ResumeContext,
    refiner: &dyn BulletRefiner,
    keywords: &[String],
) -> usize {
    let originals = resume.bullet_texts_by_role();
    if originals.iter().all(Vec::is_empty) {
        return 0;
    }

    let Some(refined) = refiner.refine(&originals, keywords).await else {
        info!("Bullet refiner '{}' unavailable; keeping selected text", refiner.name());
        return 0;
    };

    let mut changed = 0;
    for (role_index, (before, after)) in originals.iter().zip(&refined).enumerate() {
        for (position, (old, new)) in before.iter().zip(after).enumerate() {
            if old != new && resume.rewrite_bullet(role_index, position, new.as_str()) {
                changed += 1;
            }
        }
    }

    info!("Bullet refiner '{}' rewrote {} bullets", refiner.name(), changed);
    changed
}
