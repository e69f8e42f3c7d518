// All LLM prompt constants for the Comparison module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Role half of the comparison system prompt; the JSON-only rules from
/// `llm_client::prompts::JSON_ONLY_SYSTEM` are appended at call time.
pub const COMPARISON_SYSTEM: &str = "You are a career transition analyst. \
    You compare two careers against a person's current skills and project how \
    those skills could develop over time.";

/// Comparison prompt template.
/// Replace: {career1}, {career2}, {timeline_years}, {resolution_months},
///          {skills_json}, {market_data_section}, {schema_json}, {estimate_instruction}
pub const COMPARISON_PROMPT_TEMPLATE: &str = r#"Compare these two careers for a person planning a transition.

CAREER 1: {career1}
CAREER 2: {career2}
PLANNING HORIZON: {timeline_years} year(s), projected up to month {resolution_months}

USER SKILLS (self-assessed, 0-100):
{skills_json}
{market_data_section}
Return a JSON object with this EXACT schema (no extra fields):
{schema_json}

Rules:
1. `skill_overlap` lists user skills useful in BOTH careers; `skill_gap_career1` / `skill_gap_career2` list skills each career needs that the user lacks
2. `demand_score` values and `confidence` are between 0 and 1
3. `salary` values are annual figures in the stated currency
4. Each `projected_skill_timeline` array is ordered by ascending month, starts at month 0 and ends at month {resolution_months}; scores are 0-100
5. `transition_roadmap` contains EXACTLY 3 steps ordered by month, each with a concrete action and an hour estimate

{estimate_instruction}"#;

/// Inserted when the caller supplies market data. Replace: {market_data_json}
pub const MARKET_DATA_SECTION_TEMPLATE: &str = r#"
CALLER-SUPPLIED MARKET DATA (prefer these figures over your own estimates):
{market_data_json}
"#;
