//! Bullet Selector: ranks and budgets bullets per role.
//!
//! Roles are handled independently: no cross-role comparison, no budget
//! borrowing. The candidate is only read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::job::models::dedup_preserving_order;
use crate::profile::models::Candidate;
use crate::selection::scorer::RelevanceScorer;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Maximum bullets kept per role, by position in the role list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    pub latest: usize,
    pub previous: usize,
    pub older: usize,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            latest: 6,
            previous: 4,
            older: 2,
        }
    }
}

impl Budgets {
    /// Tighter budgets for a one-page resume.
    pub fn one_page() -> Self {
        Self {
            latest: 5,
            previous: 3,
            older: 1,
        }
    }

    pub fn for_role(&self, role_index: usize) -> usize {
        match role_index {
            0 => self.latest,
            1 => self.previous,
            _ => self.older,
        }
    }
}

/// What to do when no bullet in any role has a positive score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSignalPolicy {
    /// Select nothing. Relevance is never guessed.
    #[default]
    Exclude,
    /// Fill each role's budget in original bullet order, scored 0.
    OriginalOrder,
}

/// A snapshot of one chosen bullet. `text` is copied, so later edits to the
/// source bullet do not reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedBullet {
    pub role_index: usize,
    /// Position in the role's original, unsorted bullet list.
    pub bullet_index: usize,
    pub text: String,
    pub source_ids: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Every role index is present; roles with nothing eligible map to `[]`.
    pub selected_by_role: BTreeMap<usize, Vec<SelectedBullet>>,
    pub keywords: Vec<String>,
}

impl SelectionResult {
    pub fn for_role(&self, role_index: usize) -> &[SelectedBullet] {
        self.selected_by_role
            .get(&role_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All selected bullets, role order then rank order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedBullet> {
        self.selected_by_role.values().flatten()
    }

    pub fn total_selected(&self) -> usize {
        self.selected_by_role.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionOptions {
    pub budgets: Budgets,
    pub zero_signal: ZeroSignalPolicy,
}

// ────────────────────────────────────────────────────────────────────────────
// Selection algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Selects the most relevant bullets for every role.
///
/// Algorithm, per role:
/// 1. Score every bullet (one semantic space per role)
/// 2. Drop bullets scoring <= 0
/// 3. Stable sort by score descending, original order breaking ties
/// 4. Truncate to the role's budget
///
/// Never fails: missing job text or keywords only push scores toward zero.
pub fn select_bullets(
    candidate: &Candidate,
    keywords: &[String],
    job_text: Option<&str>,
    scorer: &RelevanceScorer,
    options: SelectionOptions,
) -> SelectionResult {
    let keywords = dedup_preserving_order(keywords.to_vec());
    let job_text = job_text.filter(|t| !t.trim().is_empty());

    let mut selected_by_role = BTreeMap::new();
    let mut any_signal = false;

    for (role_index, role) in candidate.work_experience.iter().enumerate() {
        let scores = scorer.score_role(role, job_text, &keywords);

        let mut ranked: Vec<SelectedBullet> = role
            .bullets
            .iter()
            .zip(scores)
            .enumerate()
            .filter(|(_, (_, score))| score.total > 0.0)
            .map(|(bullet_index, (bullet, score))| SelectedBullet {
                role_index,
                bullet_index,
                text: bullet.text.clone(),
                source_ids: bullet.source_ids.clone(),
                score: score.total,
            })
            .collect();

        any_signal |= !ranked.is_empty();

        // sort_by is stable, so equal scores keep original bullet order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(options.budgets.for_role(role_index));

        debug!(
            "Role {} ('{}'): kept {} of {} bullets",
            role_index,
            role.role,
            ranked.len(),
            role.bullets.len()
        );
        selected_by_role.insert(role_index, ranked);
    }

    if !any_signal && options.zero_signal == ZeroSignalPolicy::OriginalOrder {
        debug!("No bullet scored above zero; filling budgets in original order");
        selected_by_role = fill_in_original_order(candidate, options.budgets);
    }

    SelectionResult {
        selected_by_role,
        keywords,
    }
}

fn fill_in_original_order(
    candidate: &Candidate,
    budgets: Budgets,
) -> BTreeMap<usize, Vec<SelectedBullet>> {
    candidate
        .work_experience
        .iter()
        .enumerate()
        .map(|(role_index, role)| {
            let bullets = role
                .bullets
                .iter()
                .take(budgets.for_role(role_index))
                .enumerate()
                .map(|(bullet_index, bullet)| SelectedBullet {
                    role_index,
                    bullet_index,
                    text: bullet.text.clone(),
                    source_ids: bullet.source_ids.clone(),
                    score: 0.0,
                })
                .collect();
            (role_index, bullets)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
