//! Defensive parsing of free-form model output into a `ComparisonResult`.
//!
//! Model replies are often wrapped in prose or ```json fences. Parsing tries
//! the whole text first, then the span from the first `{` to the last `}`.

use serde_json::Value;
use thiserror::Error;

use crate::comparison::models::ComparisonResult;

/// Top-level keys a usable reply must carry.
pub const REQUIRED_KEYS: &[&str] = &[
    "skill_overlap",
    "demand_score",
    "salary",
    "projected_skill_timeline",
    "transition_roadmap",
    "confidence",
];

#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("response contains no parseable JSON object")]
    NotJson,

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("response is missing required keys: {0:?}")]
    MissingKeys(Vec<&'static str>),

    #[error("response has an invalid shape: {0}")]
    InvalidShape(#[from] serde_json::Error),
}

/// Parses raw model text into a `ComparisonResult`.
///
/// `confidence` and demand scores are clamped into [0, 1]; `sources` is left
/// for the caller to tag.
pub fn parse_response(raw: &str) -> Result<ComparisonResult, MalformedResponse> {
    let value = parse_json_value(raw).ok_or(MalformedResponse::NotJson)?;

    let object = value.as_object().ok_or(MalformedResponse::NotAnObject)?;
    let missing: Vec<&'static str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(MalformedResponse::MissingKeys(missing));
    }

    let mut result: ComparisonResult = serde_json::from_value(value)?;
    result.confidence = result.confidence.clamp(0.0, 1.0);
    result.demand_score.career1 = result.demand_score.career1.clamp(0.0, 1.0);
    result.demand_score.career2 = result.demand_score.career2.clamp(0.0, 1.0);
    for timeline in [
        &mut result.projected_skill_timeline.career1,
        &mut result.projected_skill_timeline.career2,
    ] {
        timeline.sort_by_key(|p| p.month);
    }
    Ok(result)
}

/// Direct parse, then the greedy first-`{`-to-last-`}` substring.
fn parse_json_value(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
        return Some(value);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&raw[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "skill_overlap": ["SQL"],
        "skill_gap_career1": ["TypeScript"],
        "skill_gap_career2": ["Statistics", "Python"],
        "demand_score": {"career1": 0.8, "career2": 0.7},
        "salary": {"career1": 95000, "career2": 115000, "currency": "USD"},
        "projected_skill_timeline": {
            "career1": [{"month": 0, "score": 70}, {"month": 24, "score": 85}],
            "career2": [{"month": 0, "score": 45}, {"month": 24, "score": 75}]
        },
        "transition_roadmap": [
            {"month": 4, "action": "Complete a statistics course", "estimateHours": 60},
            {"month": 12, "action": "Ship a Python analysis project", "estimateHours": 80},
            {"month": 24, "action": "Apply for junior data roles", "estimateHours": 30}
        ],
        "confidence": 0.82
    }"#;

    #[test]
    fn test_strict_json_parses() {
        let result = parse_response(VALID).unwrap();
        assert_eq!(result.skill_overlap, vec!["SQL"]);
        assert!((result.confidence - 0.82).abs() < f64::EPSILON);
        assert!(result.projected_skill_timeline.career1.len() >= 2);
        assert_eq!(result.transition_roadmap[1].estimate_hours, 80);
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_markdown_fenced_json_parses() {
        let fenced = format!("```json\n{VALID}\n```");
        let result = parse_response(&fenced).unwrap();
        assert_eq!(result.skill_overlap, vec!["SQL"]);
        assert_eq!(result.projected_skill_timeline.career2.len(), 2);
    }

    #[test]
    fn test_json_wrapped_in_prose_parses() {
        let wrapped = format!("Sure! Here is the comparison you asked for:\n{VALID}\nLet me know if you need more.");
        assert!(parse_response(&wrapped).is_ok());
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_response("I cannot help with that.").unwrap_err();
        assert!(matches!(err, MalformedResponse::NotJson));
    }

    #[test]
    fn test_reversed_braces_are_malformed() {
        let err = parse_response("} nothing here {").unwrap_err();
        assert!(matches!(err, MalformedResponse::NotJson));
    }

    #[test]
    fn test_missing_required_keys_are_reported() {
        let err = parse_response(r#"{"skill_overlap": [], "confidence": 0.5}"#).unwrap_err();
        match err {
            MalformedResponse::MissingKeys(keys) => {
                assert!(keys.contains(&"demand_score"));
                assert!(keys.contains(&"transition_roadmap"));
                assert!(!keys.contains(&"confidence"));
            }
            other => panic!("expected MissingKeys, got {other:?}"),
        }
    }

    #[test]
    fn test_array_root_is_not_an_object() {
        let err = parse_response("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, MalformedResponse::NotAnObject));
    }

    #[test]
    fn test_wrong_nested_type_is_invalid_shape() {
        let bad = VALID.replace(r#""confidence": 0.82"#, r#""confidence": "high""#);
        let err = parse_response(&bad).unwrap_err();
        assert!(matches!(err, MalformedResponse::InvalidShape(_)));
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let loud = VALID
            .replace(r#""confidence": 0.82"#, r#""confidence": 1.7"#)
            .replace(r#""career1": 0.8"#, r#""career1": -0.2"#);
        let result = parse_response(&loud).unwrap();
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.demand_score.career1, 0.0);
    }

    #[test]
    fn test_unordered_timeline_is_sorted_by_month() {
        let shuffled = VALID.replace(
            r#"[{"month": 0, "score": 70}, {"month": 24, "score": 85}]"#,
            r#"[{"month": 24, "score": 85}, {"month": 0, "score": 70}]"#,
        );
        let result = parse_response(&shuffled).unwrap();
        assert_eq!(result.projected_skill_timeline.career1[0].month, 0);
    }
}
