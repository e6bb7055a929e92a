//! Cover-letter skeleton. Deterministic and model-free; an optional
//! `LetterWriter` may replace it wholesale with the same three-paragraph shape.

use serde::{Deserialize, Serialize};

use crate::job::models::JobPosting;
use crate::profile::models::Candidate;
use crate::selection::selector::SelectionResult;

const DEFAULT_TITLE: &str = "role";
const DEFAULT_COMPANY: &str = "your team";
const GREETING: &str = "Hello,";
const NO_HIGHLIGHTS: &str = "I'm glad to share examples of recent projects on request.";
const CLOSING: &str = "If the team is exploring solutions in this area, I'd value a conversation \
                       to compare notes and see where I can help.";

const MAX_LEAD_SKILLS: usize = 3;
const MAX_SOFT_SKILLS: usize = 2;
const MAX_HIGHLIGHTS: usize = 3;
/// Highlights handed to a letter writer.
pub const MAX_WRITER_HIGHLIGHTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub greeting: String,
    /// Opening, highlights, call to action.
    pub paragraphs: [String; 3],
    pub sign_off: String,
}

impl CoverLetter {
    pub fn sign_off_for(name: &str) -> String {
        format!("Best regards,\n{name}")
    }
}

/// Builds the three-paragraph skeleton from the selection.
pub fn build_cover_letter(
    candidate: &Candidate,
    job: &JobPosting,
    selection: &SelectionResult,
    personal_notes: Option<&str>,
) -> CoverLetter {
    let title = job.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let company = job.company.as_deref().unwrap_or(DEFAULT_COMPANY);

    let lead: Vec<&str> = candidate
        .skills
        .hard
        .iter()
        .take(MAX_LEAD_SKILLS)
        .map(String::as_str)
        .collect();
    let soft: Vec<&str> = candidate
        .skills
        .soft
        .iter()
        .take(MAX_SOFT_SKILLS)
        .map(String::as_str)
        .collect();

    let mut intro = format!("I'm reaching out about the {title} at {company}. ");
    if lead.is_empty() {
        intro.push_str("My recent work lines up closely with this role");
    } else {
        intro.push_str(&format!("My recent work has centered on {}", lead.join(", ")));
    }
    if soft.is_empty() {
        intro.push('.');
    } else {
        intro.push_str(&format!(
            " and I tend to bring {} to cross-functional work.",
            soft.join(", ")
        ));
    }

    let highlights: Vec<&str> = selection
        .iter()
        .take(MAX_HIGHLIGHTS)
        .map(|sb| sb.text.as_str())
        .collect();

    let mut middle = if highlights.is_empty() {
        NO_HIGHLIGHTS.to_string()
    } else {
        format!("A few examples of the kind of work I do: {}.", highlights.join("; "))
    };
    if let Some(notes) = personal_notes.map(str::trim).filter(|n| !n.is_empty()) {
        middle.push(' ');
        middle.push_str(notes);
    }

    CoverLetter {
        greeting: GREETING.to_string(),
        paragraphs: [intro, middle, CLOSING.to_string()],
        sign_off: CoverLetter::sign_off_for(&candidate.identity.name),
    }
}

/// Everything a letter writer may see. Nothing else from the profile is
/// shared, so a writer cannot draw on facts outside the highlights and notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterRequest {
    pub candidate_name: String,
    pub candidate_location: Option<String>,
    pub candidate_links: Vec<String>,
    pub job_title: Option<String>,
    pub job_company: Option<String>,
    pub job_location: Option<String>,
    pub highlights: Vec<String>,
    pub personal_notes: Option<String>,
}

impl LetterRequest {
    /// Keeps at most `MAX_WRITER_HIGHLIGHTS` highlights.
    pub fn new(
        candidate: &Candidate,
        job: &JobPosting,
        highlights: impl IntoIterator<Item = String>,
        personal_notes: Option<&str>,
    ) -> Self {
        Self {
            candidate_name: candidate.identity.name.clone(),
            candidate_location: candidate.identity.location.clone(),
            candidate_links: candidate.identity.links.clone(),
            job_title: job.title.clone(),
            job_company: job.company.clone(),
            job_location: job.location.clone(),
            highlights: highlights.into_iter().take(MAX_WRITER_HIGHLIGHTS).collect(),
            personal_notes: personal_notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}
