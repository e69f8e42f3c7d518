//! Career comparison: orchestrates the cached, fallback-protected LLM call.
//!
//! Flow: cache key → cache lookup → (no provider ⇒ fallback) →
//!       build prompt → provider call → parse → tag + cache → return.
//!
//! `compare` never fails. Provider and parse errors are logged and replaced
//! by the deterministic fallback, which is cached too so a broken provider is
//! not hammered on every request.
//!
//! Memoization is best-effort: two concurrent misses on the same key both
//! call the provider, and the later write wins.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::comparison::fallback::generate_fallback;
use crate::comparison::models::{ComparisonRequest, ComparisonResult, OptionalData, UserSkill};
use crate::comparison::parser::{parse_response, MalformedResponse};
use crate::comparison::prompts::{
    COMPARISON_PROMPT_TEMPLATE, COMPARISON_SYSTEM, MARKET_DATA_SECTION_TEMPLATE,
};
use crate::llm_client::prompts::{ESTIMATE_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{CompletionProvider, LlmError};

/// Why a live comparison was abandoned in favour of the fallback.
#[derive(Debug, Error)]
enum LiveComparisonError {
    #[error("external service error: {0}")]
    External(#[from] LlmError),

    #[error("malformed response: {0}")]
    Malformed(#[from] MalformedResponse),
}

pub type ComparisonCache = TtlCache<ComparisonResult>;

pub struct CareerComparer {
    provider: Arc<dyn CompletionProvider>,
    cache: Arc<ComparisonCache>,
    fallback_ttl: Duration,
}

impl CareerComparer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        cache: Arc<ComparisonCache>,
        fallback_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            fallback_ttl,
        }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Produces a comparison for an already-validated request.
    pub async fn compare(&self, request: &ComparisonRequest) -> ComparisonResult {
        let cache_key = request_cache_key(request);

        if let Some(cached) = self.cache.get(&cache_key) {
            let short = cache_key.get(..12).unwrap_or(&cache_key);
            debug!(key = %short, "Comparison cache hit");
            return cached;
        }

        if !self.provider.is_configured() {
            info!("No LLM provider configured, serving deterministic fallback");
            return self.fallback(request, &cache_key);
        }

        match self.compare_live(request).await {
            Ok(mut result) => {
                result.sources = vec![self.provider.source_tag().to_string()];
                self.cache.set(cache_key, result.clone());
                info!(
                    "Live comparison: {} vs {} (confidence {:.2})",
                    request.career1, request.career2, result.confidence
                );
                result
            }
            Err(e) => {
                warn!(
                    "Live comparison of {} vs {} failed, using fallback: {e}",
                    request.career1, request.career2
                );
                self.fallback(request, &cache_key)
            }
        }
    }

    async fn compare_live(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonResult, LiveComparisonError> {
        let prompt = build_prompt(
            &request.career1,
            &request.career2,
            request.timeline_years,
            request.resolution_months,
            &request.user_skills,
            request.optional_data.as_ref(),
        );
        let system = format!("{COMPARISON_SYSTEM} {JSON_ONLY_SYSTEM}");
        let raw = self.provider.complete(&prompt, &system).await?;
        Ok(parse_response(&raw)?)
    }

    fn fallback(&self, request: &ComparisonRequest, cache_key: &str) -> ComparisonResult {
        let result = generate_fallback(
            &request.career1,
            &request.career2,
            request.timeline_years,
            request.resolution_months,
            &request.user_skills,
        );
        self.cache
            .set_with_ttl(cache_key, result.clone(), self.fallback_ttl);
        result
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cache key
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic cache key for a comparison.
///
/// Career names and location are trimmed and lower-cased so cosmetic
/// differences share an entry. Skill order is significant.
pub fn generate_cache_key(
    career1: &str,
    career2: &str,
    location: Option<&str>,
    timeline_years: u32,
    user_skills: &[UserSkill],
) -> String {
    let canonical = json!([
        normalize(career1),
        normalize(career2),
        location.map(normalize),
        timeline_years,
        user_skills
            .iter()
            .map(|s| json!([s.name, s.score]))
            .collect::<Vec<_>>(),
    ]);

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Key used by `compare`. Scoped by resolution and by any caller-supplied
/// market data, since both change the prompt.
fn request_cache_key(request: &ComparisonRequest) -> String {
    let base = generate_cache_key(
        &request.career1,
        &request.career2,
        request.location.as_deref(),
        request.timeline_years,
        &request.user_skills,
    );
    let mut key = format!("{base}:r{}", request.resolution_months);
    if let Some(data) = &request.optional_data {
        // BTreeMap serializes in key order, so equal data hashes equally.
        let digest = Sha256::digest(json!(data).to_string().as_bytes());
        key.push_str(&format!(":d{digest:x}"));
    }
    key
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt
// ────────────────────────────────────────────────────────────────────────────

/// Builds the comparison prompt.
///
/// The schema example is compact JSON, so the horizon appears verbatim as
/// `"month":<resolution_months>`. The market-data section, keyed
/// `optional_data`, is present only when data is supplied.
pub fn build_prompt(
    career1: &str,
    career2: &str,
    timeline_years: u32,
    resolution_months: u32,
    user_skills: &[UserSkill],
    optional_data: Option<&OptionalData>,
) -> String {
    let skills_json = json!(user_skills).to_string();

    let market_data_section = optional_data
        .map(|data| {
            MARKET_DATA_SECTION_TEMPLATE.replace(
                "{market_data_json}",
                &json!({ "optional_data": data }).to_string(),
            )
        })
        .unwrap_or_default();

    let timeline_example = json!([
        {"month": 0, "score": 55},
        {"month": resolution_months, "score": 80}
    ]);
    let schema_json = json!({
        "skill_overlap": ["skill useful in both careers"],
        "skill_gap_career1": ["skill career 1 needs that the user lacks"],
        "skill_gap_career2": ["skill career 2 needs that the user lacks"],
        "demand_score": {"career1": 0.7, "career2": 0.6},
        "salary": {"career1": 95000, "career2": 110000, "currency": "USD"},
        "projected_skill_timeline": {
            "career1": timeline_example,
            "career2": timeline_example
        },
        "transition_roadmap": [
            {"month": 3, "action": "first concrete step", "estimateHours": 40},
            {"month": 9, "action": "second concrete step", "estimateHours": 60},
            {"month": resolution_months, "action": "final step", "estimateHours": 30}
        ],
        "confidence": 0.75
    })
    .to_string();

    fill_template(
        COMPARISON_PROMPT_TEMPLATE,
        &[
            ("career1", career1),
            ("career2", career2),
            ("timeline_years", timeline_years.to_string().as_str()),
            ("resolution_months", resolution_months.to_string().as_str()),
            ("skills_json", skills_json.as_str()),
            ("market_data_section", market_data_section.as_str()),
            ("schema_json", schema_json.as_str()),
            ("estimate_instruction", ESTIMATE_INSTRUCTION),
        ],
    )
}

/// Replaces each `{name}` placeholder in a single left-to-right pass.
/// Substituted text is never rescanned, so caller input that happens to
/// contain `{career1}` stays literal. Unknown `{...}` spans are kept as is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substitution = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });

        match substitution {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
