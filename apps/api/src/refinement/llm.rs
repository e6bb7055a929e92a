//! LLM-backed collaborators. Any `LlmError` or malformed reply is logged and
//! reported as unavailable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assembly::letter::{CoverLetter, LetterRequest};
use crate::llm_client::prompts::compose_system;
use crate::llm_client::LlmClient;
use crate::refinement::guardrail::guard_role;
use crate::refinement::prompts::{
    LETTER_PROMPT_TEMPLATE, LETTER_SYSTEM, REFINE_PROMPT_TEMPLATE, REFINE_SYSTEM,
};
use crate::refinement::{BulletRefiner, LetterWriter};

/// Keywords included in the refinement prompt.
const PROMPT_KEYWORDS: usize = 40;
/// Letter drafting never runs colder than this.
const MIN_LETTER_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Serialize, Deserialize)]
struct RolesPayload {
    roles: Vec<RoleBullets>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RoleBullets {
    role_index: usize,
    bullets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LetterDraft {
    greeting: Option<String>,
    #[serde(default)]
    paragraphs: Vec<String>,
    closing: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Bullet refinement
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmBulletRefiner {
    llm: LlmClient,
    temperature: f32,
}

impl LlmBulletRefiner {
    pub fn new(llm: LlmClient, temperature: f32) -> Self {
        Self { llm, temperature }
    }
}

#[async_trait]
impl BulletRefiner for LlmBulletRefiner {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn refine(&self, bullets_by_role: &[Vec<String>], keywords: &[String]) -> Option<Vec<Vec<String>>> {
        let prompt = build_refine_prompt(bullets_by_role, keywords)?;
        let system = compose_system(REFINE_SYSTEM);

        match self
            .llm
            .call_json::<RolesPayload>(&prompt, &system, self.temperature)
            .await
        {
            Ok(payload) => Some(apply_guardrail(bullets_by_role, payload)),
            Err(e) => {
                warn!("Bullet refinement unavailable: {e}");
                None
            }
        }
    }
}

fn build_refine_prompt(bullets_by_role: &[Vec<String>], keywords: &[String]) -> Option<String> {
    let payload = RolesPayload {
        roles: bullets_by_role
            .iter()
            .enumerate()
            .filter(|(_, bullets)| !bullets.is_empty())
            .map(|(role_index, bullets)| RoleBullets {
                role_index,
                bullets: bullets.clone(),
            })
            .collect(),
    };
    let roles_json = match serde_json::to_string_pretty(&payload) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize refinement payload: {e}");
            return None;
        }
    };
    let keywords = keywords
        .iter()
        .take(PROMPT_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    Some(
        REFINE_PROMPT_TEMPLATE
            .replace("{keywords}", &keywords)
            .replace("{roles_json}", &roles_json),
    )
}

/// Maps the model's roles back onto the input shape. Roles the model skipped
/// or invented are ignored; every rewrite passes the numeric guardrail.
fn apply_guardrail(originals: &[Vec<String>], payload: RolesPayload) -> Vec<Vec<String>> {
    let mut refined = originals.to_vec();
    for role in payload.roles {
        if let Some(slot) = refined.get_mut(role.role_index) {
            *slot = guard_role(&originals[role.role_index], &role.bullets);
        }
    }
    refined
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmLetterWriter {
    llm: LlmClient,
    temperature: f32,
}

impl LlmLetterWriter {
    pub fn new(llm: LlmClient, temperature: f32) -> Self {
        Self {
            llm,
            temperature: temperature.max(MIN_LETTER_TEMPERATURE),
        }
    }
}

#[async_trait]
impl LetterWriter for LlmLetterWriter {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn write(&self, request: &LetterRequest) -> Option<CoverLetter> {
        let payload_json = match serde_json::to_string_pretty(request) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize letter request: {e}");
                return None;
            }
        };
        let prompt = LETTER_PROMPT_TEMPLATE.replace("{payload_json}", &payload_json);
        let system = compose_system(LETTER_SYSTEM);

        match self
            .llm
            .call_json::<LetterDraft>(&prompt, &system, self.temperature)
            .await
        {
            Ok(draft) => {
                let letter = letter_from_draft(draft, &request.candidate_name);
                if letter.is_none() {
                    warn!("Letter draft had fewer than three paragraphs; keeping skeleton");
                }
                letter
            }
            Err(e) => {
                warn!("Letter drafting unavailable: {e}");
                None
            }
        }
    }
}

/// Keeps the first three non-blank paragraphs. Fewer than three means the
/// draft does not fit the letter shape.
fn letter_from_draft(draft: LetterDraft, candidate_name: &str) -> Option<CoverLetter> {
    let mut paragraphs = draft
        .paragraphs
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let paragraphs = [paragraphs.next()?, paragraphs.next()?, paragraphs.next()?];

    let greeting = draft
        .greeting
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| "Hello,".to_string());
    let sign_off = draft
        .closing
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| CoverLetter::sign_off_for(candidate_name));

    Some(CoverLetter {
        greeting,
        paragraphs,
        sign_off,
    })
}
