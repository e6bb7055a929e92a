// Shared prompt fragments. Each collaborator that calls the LLM keeps its own
// prompts.rs alongside it and composes these in.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prose-editing prompt.
pub const NO_NEW_FACTS_INSTRUCTION: &str = "\
    CRITICAL: Do not invent facts, employers, titles, dates, metrics or numbers. \
    Use only the material provided. If something is not supported by the input, leave it out.";

/// Joins a collaborator's system prompt with the shared fragments.
pub fn compose_system(task: &str) -> String {
    format!("{task} {NO_NEW_FACTS_INSTRUCTION} {JSON_ONLY_SYSTEM}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_system_keeps_task_first() {
        let system = compose_system("Rewrite bullets.");
        assert!(system.starts_with("Rewrite bullets. CRITICAL"));
        assert!(system.ends_with("explanations or apologies."));
    }
}
