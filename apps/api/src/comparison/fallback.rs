//! Deterministic, network-free comparison used whenever the live model is
//! unavailable or its output is unusable.
//!
//! Same inputs always produce the same result. Scalars the dashboard keys on
//! are fixed: confidence 0.3, demand 0.5 for both careers.

use crate::comparison::models::{
    CareerPair, ComparisonResult, RoadmapStep, SalaryComparison, TimelinePoint, UserSkill,
};

pub const FALLBACK_SOURCE: &str = "fallback-deterministic";
pub const FALLBACK_CONFIDENCE: f64 = 0.3;
pub const FALLBACK_DEMAND: f64 = 0.5;

/// Starting score when the user lists no skills.
const DEFAULT_BASELINE: f64 = 40.0;
/// Skills at or above this score count as transferable.
const STRONG_SKILL_THRESHOLD: f64 = 60.0;
/// Career 2 starts lower: fewer of the user's skills are assumed to transfer.
const CAREER2_TRANSFER_FACTOR: f64 = 0.85;
const GROWTH_PER_YEAR: f64 = 10.0;
const SCORE_CEILING: f64 = 95.0;
const ROADMAP_STEPS: u32 = 3;

/// Builds the fallback comparison.
///
/// Timelines run from month 0 to `resolution_months` in `2 × timeline_years`
/// even steps (never more steps than months). Scores start at the average
/// user skill score and grow linearly.
pub fn generate_fallback(
    career1: &str,
    career2: &str,
    timeline_years: u32,
    resolution_months: u32,
    user_skills: &[UserSkill],
) -> ComparisonResult {
    let baseline = average_score(user_skills);

    let (strong, weak): (Vec<&UserSkill>, Vec<&UserSkill>) = user_skills
        .iter()
        .partition(|s| s.score >= STRONG_SKILL_THRESHOLD);
    let weak_names: Vec<String> = weak.iter().map(|s| s.name.clone()).collect();

    let growth = GROWTH_PER_YEAR * f64::from(timeline_years);
    let start2 = baseline * CAREER2_TRANSFER_FACTOR;

    ComparisonResult {
        skill_overlap: strong.iter().map(|s| s.name.clone()).collect(),
        skill_gap_career1: weak_names.clone(),
        skill_gap_career2: weak_names,
        demand_score: CareerPair {
            career1: FALLBACK_DEMAND,
            career2: FALLBACK_DEMAND,
        },
        salary: SalaryComparison {
            career1: 0.0,
            career2: 0.0,
            currency: "USD".to_string(),
        },
        projected_skill_timeline: CareerPair {
            career1: project_timeline(baseline, growth, timeline_years, resolution_months),
            career2: project_timeline(start2, growth, timeline_years, resolution_months),
        },
        transition_roadmap: build_roadmap(career1, career2, resolution_months, &weak),
        confidence: FALLBACK_CONFIDENCE,
        sources: vec![FALLBACK_SOURCE.to_string()],
    }
}

fn average_score(skills: &[UserSkill]) -> f64 {
    if skills.is_empty() {
        return DEFAULT_BASELINE;
    }
    skills.iter().map(|s| s.score).sum::<f64>() / skills.len() as f64
}

/// Evenly spaced months from 0 to `horizon` inclusive. Integer division keeps
/// months strictly increasing because `steps <= horizon`.
fn timeline_months(timeline_years: u32, horizon: u32) -> Vec<u32> {
    if horizon == 0 {
        return vec![0];
    }
    let steps = timeline_years.saturating_mul(2).clamp(1, horizon);
    (0..=steps)
        .map(|i| (u64::from(i) * u64::from(horizon) / u64::from(steps)) as u32)
        .collect()
}

fn project_timeline(
    start: f64,
    growth: f64,
    timeline_years: u32,
    horizon: u32,
) -> Vec<TimelinePoint> {
    let end = (start + growth).min(SCORE_CEILING).max(start);
    timeline_months(timeline_years, horizon)
        .into_iter()
        .map(|month| {
            let progress = if horizon == 0 {
                0.0
            } else {
                f64::from(month) / f64::from(horizon)
            };
            TimelinePoint {
                month,
                score: round1(start + (end - start) * progress),
            }
        })
        .collect()
}

fn build_roadmap(
    career1: &str,
    career2: &str,
    horizon: u32,
    weak: &[&UserSkill],
) -> Vec<RoadmapStep> {
    let focus = weak
        .iter()
        .min_by(|a, b| a.score.total_cmp(&b.score))
        .map(|s| s.name.as_str())
        .unwrap_or("core skills");
    let month_for = |step: u32| {
        (u64::from(horizon) * u64::from(step)).div_ceil(u64::from(ROADMAP_STEPS)) as u32
    };
    let study_hours = (10 + 5 * weak.len() as u32).min(60);

    vec![
        RoadmapStep {
            month: month_for(1),
            action: format!(
                "Map the skill gap between {career1} and {career2} and enrol in one structured course"
            ),
            estimate_hours: study_hours,
        },
        RoadmapStep {
            month: month_for(2),
            action: format!("Build a portfolio project applying {focus} to {career2} work"),
            estimate_hours: 60,
        },
        RoadmapStep {
            month: month_for(3),
            action: format!("Connect with {career2} practitioners and apply for transition roles"),
            estimate_hours: 30,
        },
    ]
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills() -> Vec<UserSkill> {
        vec![
            UserSkill {
                name: "JavaScript".to_string(),
                score: 80.0,
            },
            UserSkill {
                name: "React".to_string(),
                score: 70.0,
            },
            UserSkill {
                name: "SQL".to_string(),
                score: 60.0,
            },
            UserSkill {
                name: "Statistics".to_string(),
                score: 30.0,
            },
        ]
    }

    fn assert_fallback_invariants(result: &ComparisonResult, horizon: u32) {
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.demand_score.career1, 0.5);
        assert_eq!(result.demand_score.career2, 0.5);
        assert!(result.sources.iter().any(|s| s == FALLBACK_SOURCE));
        assert_eq!(result.transition_roadmap.len(), 3);
        for timeline in [
            &result.projected_skill_timeline.career1,
            &result.projected_skill_timeline.career2,
        ] {
            assert_eq!(timeline.first().unwrap().month, 0);
            assert_eq!(timeline.last().unwrap().month, horizon);
            assert!(timeline.windows(2).all(|w| w[0].month < w[1].month));
        }
    }

    #[test]
    fn test_fixed_scalars_and_shape() {
        let result = generate_fallback("Engineer", "Scientist", 2, 24, &skills());
        assert_fallback_invariants(&result, 24);
    }

    #[test]
    fn test_same_inputs_give_identical_results() {
        let a = generate_fallback("Engineer", "Scientist", 3, 36, &skills());
        let b = generate_fallback("Engineer", "Scientist", 3, 36, &skills());
        assert_eq!(a, b);
    }

    #[test]
    fn test_timeline_points_are_evenly_spaced() {
        let result = generate_fallback("A", "B", 2, 24, &skills());
        let months: Vec<u32> = result
            .projected_skill_timeline
            .career1
            .iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec![0, 6, 12, 18, 24]);
    }

    #[test]
    fn test_non_dividing_horizon_still_ends_at_resolution() {
        let result = generate_fallback("A", "B", 2, 7, &skills());
        assert_fallback_invariants(&result, 7);
    }

    #[test]
    fn test_short_horizon_never_repeats_months() {
        let result = generate_fallback("A", "B", 5, 2, &[]);
        let months: Vec<u32> = result
            .projected_skill_timeline
            .career2
            .iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec![0, 1, 2]);
    }

    #[test]
    fn test_timeline_starts_at_average_skill_score() {
        let result = generate_fallback("A", "B", 2, 24, &skills());
        // (80 + 70 + 60 + 30) / 4 = 60
        assert_eq!(result.projected_skill_timeline.career1[0].score, 60.0);
        assert_eq!(result.projected_skill_timeline.career2[0].score, 51.0);
        let last = result.projected_skill_timeline.career1.last().unwrap();
        assert_eq!(last.score, 80.0);
    }

    #[test]
    fn test_scores_never_exceed_ceiling() {
        let expert = vec![UserSkill {
            name: "Rust".to_string(),
            score: 100.0,
        }];
        let result = generate_fallback("A", "B", 10, 120, &expert);
        let last = result.projected_skill_timeline.career1.last().unwrap();
        assert_eq!(last.score, 100.0, "start above ceiling is kept flat, not lowered");
        let last2 = result.projected_skill_timeline.career2.last().unwrap();
        assert_eq!(last2.score, SCORE_CEILING);
    }

    #[test]
    fn test_skills_split_into_overlap_and_gaps() {
        let result = generate_fallback("A", "B", 1, 12, &skills());
        assert_eq!(result.skill_overlap, vec!["JavaScript", "React", "SQL"]);
        assert_eq!(result.skill_gap_career1, vec!["Statistics"]);
        assert_eq!(result.skill_gap_career2, vec!["Statistics"]);
    }

    #[test]
    fn test_roadmap_months_end_at_horizon_and_name_weakest_skill() {
        let result = generate_fallback("Frontend Engineer", "Data Scientist", 2, 24, &skills());
        let months: Vec<u32> = result.transition_roadmap.iter().map(|s| s.month).collect();
        assert_eq!(months, vec![8, 16, 24]);
        assert!(result.transition_roadmap[0].action.contains("Frontend Engineer"));
        assert!(result.transition_roadmap[1].action.contains("Statistics"));
    }

    #[test]
    fn test_empty_skills_use_default_baseline() {
        let result = generate_fallback("A", "B", 1, 12, &[]);
        assert_fallback_invariants(&result, 12);
        assert_eq!(result.projected_skill_timeline.career1[0].score, DEFAULT_BASELINE);
        assert!(result.skill_overlap.is_empty());
        assert!(result.transition_roadmap[1].action.contains("core skills"));
    }
}
