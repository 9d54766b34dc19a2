use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, Grade};
use super::policy::ScoringPolicy;

/// Scoring factors feeding the SOHO grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    CreditScore,
    DebtRatio,
    BusinessAge,
    Technology,
}

impl ScoreFactor {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreFactor::CreditScore => "credit score",
            ScoreFactor::DebtRatio => "debt-to-revenue ratio",
            ScoreFactor::BusinessAge => "business age",
            ScoreFactor::Technology => "technology certification",
        }
    }
}

/// Discrete contribution to the grade, kept for audits and the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: f64,
    pub max_points: f64,
    pub notes: String,
}

impl ScoreComponent {
    /// Share of the attainable points this factor earned, in `[0, 1]`.
    pub fn attainment(&self) -> f64 {
        if self.max_points > 0.0 {
            (self.points / self.max_points).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeAssessment {
    pub grade: Grade,
    /// Total rounded to one decimal. The grade is bucketed from this value.
    pub points: f64,
    pub components: Vec<ScoreComponent>,
}

/// Weighted point score over credit, leverage, business age and technology.
pub fn assess_grade(profile: &ApplicantProfile, policy: &ScoringPolicy) -> GradeAssessment {
    let mut components = Vec::with_capacity(4);

    let credit_component = match profile.combined_credit_score() {
        Some(score) => {
            let span = policy.credit_ceiling - policy.credit_floor;
            let normalized = ((score - policy.credit_floor) / span).clamp(0.0, 1.0);
            ScoreComponent {
                factor: ScoreFactor::CreditScore,
                points: normalized * policy.credit_weight,
                max_points: policy.credit_weight,
                notes: format!(
                    "credit score {score:.0} sits at {:.0}% of the {:.0}-{:.0} scale",
                    normalized * 100.0,
                    policy.credit_floor,
                    policy.credit_ceiling
                ),
            }
        }
        None => ScoreComponent {
            factor: ScoreFactor::CreditScore,
            points: 0.0,
            max_points: policy.credit_weight,
            notes: "no bureau score on file; scored at the lowest tier".to_string(),
        },
    };
    components.push(credit_component);

    let ratio_max = policy
        .debt_ratio_bands
        .iter()
        .map(|band| band.points)
        .fold(0.0, f64::max);
    let ratio_component = if profile.revenue() == 0 {
        ScoreComponent {
            factor: ScoreFactor::DebtRatio,
            points: 0.0,
            max_points: ratio_max,
            notes: "no reported revenue to service debt".to_string(),
        }
    } else {
        let ratio = profile.debt_ratio(policy.debt_ratio_ceiling);
        ScoreComponent {
            factor: ScoreFactor::DebtRatio,
            points: policy.debt_ratio_points(ratio),
            max_points: ratio_max,
            notes: format!("debt is {:.0}% of annual revenue", ratio * 100.0),
        }
    };
    components.push(ratio_component);

    let age_max = policy
        .business_age_bands
        .iter()
        .map(|band| band.points)
        .fold(0.0, f64::max);
    let years = profile.business_age_years;
    components.push(ScoreComponent {
        factor: ScoreFactor::BusinessAge,
        points: policy.business_age_points(years),
        max_points: age_max,
        notes: format!("{years} year(s) in operation"),
    });

    if profile.has_technology_certification {
        components.push(ScoreComponent {
            factor: ScoreFactor::Technology,
            points: policy.technology_bonus,
            max_points: policy.technology_bonus,
            notes: "certified technology holder".to_string(),
        });
    } else {
        components.push(ScoreComponent {
            factor: ScoreFactor::Technology,
            points: 0.0,
            max_points: policy.technology_bonus,
            notes: "no technology certification".to_string(),
        });
    }

    let points: f64 = components.iter().map(|component| component.points).sum();
    let points = if points.is_finite() { points.max(0.0) } else { 0.0 };
    // Grade from the one-decimal total callers see.
    let points = (points * 10.0).round() / 10.0;

    GradeAssessment {
        grade: policy.grade_for(points),
        points,
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::domain::DebtBreakdown;

    fn profile(nice: Option<i32>, revenue: i64, debt: i64, years: u32, tech: bool) -> ApplicantProfile {
        ApplicantProfile {
            credit_score_nice: nice,
            credit_score_kcb: None,
            annual_revenue: revenue,
            total_debt: debt,
            debt_breakdown: DebtBreakdown::default(),
            has_technology_certification: tech,
            business_age_years: years,
            industry: None,
            employee_count: None,
        }
    }

    #[test]
    fn strong_technology_applicant_reaches_top_grade() {
        let policy = ScoringPolicy::default();
        let assessment = assess_grade(
            &profile(Some(850), 100_000_000, 20_000_000, 5, true),
            &policy,
        );

        assert!(matches!(assessment.grade, Grade::S | Grade::A));
        assert_eq!(assessment.components.len(), 4);
        assert!(assessment.points > 80.0);
    }

    #[test]
    fn missing_scores_fall_to_lowest_tier() {
        let policy = ScoringPolicy::default();
        let assessment = assess_grade(&profile(None, 0, 0, 0, false), &policy);

        assert_eq!(assessment.grade, Grade::D);
        assert_eq!(assessment.points, 0.0);
        let credit = assessment
            .components
            .iter()
            .find(|component| component.factor == ScoreFactor::CreditScore)
            .expect("credit component");
        assert!(credit.notes.contains("lowest tier"));
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let policy = ScoringPolicy::default();
        let high = assess_grade(&profile(Some(5_000), 0, 0, 0, false), &policy);
        let low = assess_grade(&profile(Some(-40), 0, 0, 0, false), &policy);

        assert_eq!(high.components[0].points, policy.credit_weight);
        assert_eq!(low.components[0].points, 0.0);
    }

    #[test]
    fn extreme_debt_earns_no_ratio_points() {
        let policy = ScoringPolicy::default();
        let assessment = assess_grade(&profile(Some(700), 1_000_000, i64::MAX, 2, false), &policy);

        let ratio = &assessment.components[1];
        assert_eq!(ratio.factor, ScoreFactor::DebtRatio);
        assert_eq!(ratio.points, 0.0);
        assert!(assessment.points.is_finite());
    }

    #[test]
    fn higher_credit_never_lowers_grade() {
        let policy = ScoringPolicy::default();
        let mut previous = Grade::D;
        for score in (300..=1000).step_by(25) {
            let grade = assess_grade(
                &profile(Some(score), 80_000_000, 30_000_000, 4, false),
                &policy,
            )
            .grade;
            assert!(grade <= previous, "score {score} dropped to {grade}");
            previous = grade;
        }
    }

    #[test]
    fn grade_follows_the_reported_total_at_a_cutoff() {
        let policy = ScoringPolicy::default();
        let mut applicant = profile(Some(845), 100_000_000, 20_000_000, 5, true);
        applicant.credit_score_kcb = Some(846);

        let assessment = assess_grade(&applicant, &policy);

        assert_eq!(assessment.points, 85.0);
        assert_eq!(assessment.grade, Grade::S);
        assert_eq!(assessment.grade, policy.grade_for(assessment.points));
    }
}
