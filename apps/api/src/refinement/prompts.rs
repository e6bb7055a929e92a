// Prompt constants for the refinement collaborators.

pub const REFINE_SYSTEM: &str = "You are refining resume bullets for ATS and human readability. \
    Only paraphrase each bullet you are given, keeping all original facts intact. \
    Keep bullets concise (at most about 28 words), action-first, without fluff. \
    Use US spelling. No first person. No emojis.";

/// Replace `{keywords}` and `{roles_json}` before sending.
pub const REFINE_PROMPT_TEMPLATE: &str = r#"Job keywords: {keywords}

Rewrite the bullets with light improvements and natural phrasing.
Return JSON strictly in this schema:
{
  "roles": [ { "role_index": 0, "bullets": ["..."] } ]
}
Keep the same number of bullets per role, in the same order.

Input bullets by role:
{roles_json}"#;

pub const LETTER_SYSTEM: &str = "Draft a concise, human-sounding cover letter in exactly 3 short paragraphs. \
    Tone: natural, specific, confident but not salesy. No first-person plural. \
    Use only the provided highlights and personal notes.";

/// Replace `{payload_json}` before sending.
pub const LETTER_PROMPT_TEMPLATE: &str = r#"Write the letter and return JSON with keys:
{
  "greeting": "...",
  "paragraphs": ["opening", "highlights", "call to action"],
  "closing": "..."
}

Input:
{payload_json}"#;
