// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds cross-cutting pieces only.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminder appended to prompts that ask for numeric estimates.
pub const ESTIMATE_INSTRUCTION: &str = "\
    When data is uncertain, give your best conservative estimate and lower \
    `confidence` accordingly. Never leave a required field out.";
