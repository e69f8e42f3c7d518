//! Request and result types for career comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const MAX_TIMELINE_YEARS: u32 = 30;
const MAX_RESOLUTION_MONTHS: u32 = MAX_TIMELINE_YEARS * 12;
const MAX_CAREER_NAME_LEN: usize = 200;

/// A self-assessed skill. `score` is 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSkill {
    pub name: String,
    pub score: f64,
}

/// Caller-supplied market data for one career.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerMarketData {
    pub salary: Option<f64>,
    pub demand: Option<f64>,
}

/// Keyed by career name. A `BTreeMap` keeps prompt text deterministic.
pub type OptionalData = BTreeMap<String, CareerMarketData>;

/// Request body for a comparison. Wire format is camelCase to match the dashboard.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub career1: String,
    pub career2: String,
    pub timeline_years: u32,
    pub resolution_months: u32,
    #[serde(default)]
    pub user_skills: Vec<UserSkill>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub optional_data: Option<OptionalData>,
}

impl ComparisonRequest {
    /// Rejects requests the comparison service cannot meaningfully answer.
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [("career1", &self.career1), ("career2", &self.career2)] {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
            if trimmed.len() > MAX_CAREER_NAME_LEN {
                return Err(AppError::Validation(format!(
                    "{field} must be at most {MAX_CAREER_NAME_LEN} characters"
                )));
            }
        }

        if self.timeline_years == 0 || self.timeline_years > MAX_TIMELINE_YEARS {
            return Err(AppError::Validation(format!(
                "timelineYears must be between 1 and {MAX_TIMELINE_YEARS}"
            )));
        }

        if self.resolution_months == 0 || self.resolution_months > MAX_RESOLUTION_MONTHS {
            return Err(AppError::Validation(format!(
                "resolutionMonths must be between 1 and {MAX_RESOLUTION_MONTHS}"
            )));
        }

        for skill in &self.user_skills {
            if skill.name.trim().is_empty() {
                return Err(AppError::Validation(
                    "userSkills entries need a non-empty name".to_string(),
                ));
            }
            if !(0.0..=100.0).contains(&skill.score) {
                return Err(AppError::Validation(format!(
                    "score for skill '{}' must be between 0 and 100",
                    skill.name
                )));
            }
        }

        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Result
// ────────────────────────────────────────────────────────────────────────────

/// A pair of values, one per compared career.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerPair<T> {
    pub career1: T,
    pub career2: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryComparison {
    pub career1: f64,
    pub career2: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month: u32,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub month: u32,
    pub action: String,
    #[serde(rename = "estimateHours")]
    pub estimate_hours: u32,
}

/// Output of a comparison, from the live model or the fallback. This is also
/// the cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub skill_overlap: Vec<String>,
    #[serde(default)]
    pub skill_gap_career1: Vec<String>,
    #[serde(default)]
    pub skill_gap_career2: Vec<String>,
    /// 0.0 – 1.0 per career
    pub demand_score: CareerPair<f64>,
    pub salary: SalaryComparison,
    pub projected_skill_timeline: CareerPair<Vec<TimelinePoint>>,
    pub transition_roadmap: Vec<RoadmapStep>,
    /// 0.0 – 1.0
    pub confidence: f64,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ComparisonRequest {
        ComparisonRequest {
            career1: "Frontend Engineer".to_string(),
            career2: "Data Scientist".to_string(),
            timeline_years: 2,
            resolution_months: 24,
            user_skills: vec![UserSkill {
                name: "SQL".to_string(),
                score: 60.0,
            }],
            location: None,
            optional_data: None,
        }
    }

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let json = r#"{
            "career1": "Frontend Engineer",
            "career2": "Data Scientist",
            "timelineYears": 2,
            "resolutionMonths": 24,
            "userSkills": [{"name": "JavaScript", "score": 80}],
            "optionalData": {"Data Scientist": {"salary": 120000, "demand": 0.8}}
        }"#;
        let req: ComparisonRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.timeline_years, 2);
        assert_eq!(req.resolution_months, 24);
        assert_eq!(req.user_skills[0].score, 80.0);
        assert!(req.location.is_none());
        let data = req.optional_data.unwrap();
        assert_eq!(data["Data Scientist"].salary, Some(120000.0));
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_blank_career_is_rejected() {
        let mut req = request();
        req.career1 = "   ".to_string();
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("career1"));
    }

    #[test]
    fn test_zero_timeline_or_resolution_is_rejected() {
        let mut req = request();
        req.timeline_years = 0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.resolution_months = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_out_of_range_skill_score_is_rejected() {
        let mut req = request();
        req.user_skills[0].score = 101.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_roadmap_step_uses_camel_case_hours() {
        let step = RoadmapStep {
            month: 8,
            action: "Build a portfolio project".to_string(),
            estimate_hours: 40,
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["estimateHours"], 40);
    }

    #[test]
    fn test_salary_currency_defaults_to_usd() {
        let salary: SalaryComparison =
            serde_json::from_str(r#"{"career1": 90000, "career2": 110000}"#).unwrap();
        assert_eq!(salary.currency, "USD");
    }
}
