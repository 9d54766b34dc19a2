use serde::{Deserialize, Serialize};

use super::catalog::{EligibilityRule, ProgramCatalog, ProgramCategory, ProgramDefinition};
use super::domain::{ApplicantProfile, Grade};
use super::policy::ScoringPolicy;

const AMOUNT_WEIGHT: f64 = 60.0;
const MARGIN_WEIGHT: f64 = 40.0;

/// One audited threshold check, displayed verbatim to the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionCheck {
    pub label: String,
    pub required_threshold: String,
    pub actual_value: String,
    pub passed: bool,
    /// How comfortably the threshold was cleared, in `[0, 1]`. Zero when failed.
    pub margin: f64,
}

/// Evaluation of one catalog program against an applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEvaluation {
    pub program_name: String,
    pub category: ProgramCategory,
    pub max_amount: u64,
    pub interest_rate_label: String,
    pub requirements_text: String,
    pub conditions: Vec<ConditionCheck>,
    pub eligible: bool,
    pub pass_count: usize,
    pub total_count: usize,
    pub suitability: f64,
}

impl ProgramEvaluation {
    pub fn failed_conditions(&self) -> impl Iterator<Item = &ConditionCheck> {
        self.conditions.iter().filter(|condition| !condition.passed)
    }
}

/// Inputs every rule may consult.
pub(crate) struct RuleContext<'a> {
    pub profile: &'a ApplicantProfile,
    pub grade: Grade,
    pub policy: &'a ScoringPolicy,
}

/// Evaluate every catalog program and rank them.
///
/// Eligible programs come first, then higher suitability; ties keep catalog order.
pub fn match_programs(
    profile: &ApplicantProfile,
    grade: Grade,
    catalog: &ProgramCatalog,
    policy: &ScoringPolicy,
) -> Vec<ProgramEvaluation> {
    let context = RuleContext {
        profile,
        grade,
        policy,
    };
    let largest = catalog.largest_max_amount();

    let mut evaluations: Vec<ProgramEvaluation> = catalog
        .programs()
        .iter()
        .map(|program| evaluate_program(program, &context, largest))
        .collect();

    evaluations.sort_by(|left, right| {
        right.eligible.cmp(&left.eligible).then_with(|| {
            right
                .suitability
                .partial_cmp(&left.suitability)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    evaluations
}

pub(crate) fn evaluate_program(
    program: &ProgramDefinition,
    context: &RuleContext<'_>,
    largest_max_amount: u64,
) -> ProgramEvaluation {
    let conditions: Vec<ConditionCheck> = program
        .rules
        .iter()
        .map(|rule| check_rule(rule, context))
        .collect();

    let pass_count = conditions.iter().filter(|condition| condition.passed).count();
    let total_count = conditions.len();
    let eligible = pass_count == total_count;

    let amount_share = if largest_max_amount > 0 {
        program.max_amount as f64 / largest_max_amount as f64
    } else {
        0.0
    };
    let mean_margin = if total_count > 0 {
        conditions.iter().map(|condition| condition.margin).sum::<f64>() / total_count as f64
    } else {
        1.0
    };
    let suitability = round_to_tenth(AMOUNT_WEIGHT * amount_share + MARGIN_WEIGHT * mean_margin);

    ProgramEvaluation {
        program_name: program.name.clone(),
        category: program.category,
        max_amount: program.max_amount,
        interest_rate_label: program.interest_rate_label.clone(),
        requirements_text: program.requirements_text.clone(),
        conditions,
        eligible,
        pass_count,
        total_count,
        suitability,
    }
}

fn round_to_tenth(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10.0).round() / 10.0
    } else {
        0.0
    }
}

/// Relative headroom above a minimum, in `[0, 1]`.
fn headroom_above(actual: f64, required: f64) -> f64 {
    if actual < required {
        return 0.0;
    }
    if required <= 0.0 {
        return 1.0;
    }
    ((actual - required) / required).clamp(0.0, 1.0)
}

/// Relative headroom below a maximum, in `[0, 1]`.
fn headroom_below(actual: f64, limit: f64) -> f64 {
    if actual > limit {
        return 0.0;
    }
    if limit <= 0.0 {
        return 1.0;
    }
    ((limit - actual) / limit).clamp(0.0, 1.0)
}

fn condition(label: &str, required: String, actual: String, passed: bool, margin: f64) -> ConditionCheck {
    ConditionCheck {
        label: label.to_string(),
        required_threshold: required,
        actual_value: actual,
        passed,
        margin: if passed { round_to_tenth(margin * 100.0) / 100.0 } else { 0.0 },
    }
}

pub(crate) fn check_rule(rule: &EligibilityRule, context: &RuleContext<'_>) -> ConditionCheck {
    let profile = context.profile;
    match rule {
        EligibilityRule::MinCreditScore { min } => match profile.combined_credit_score() {
            Some(score) => {
                let required = f64::from(*min);
                condition(
                    "credit score",
                    format!(">= {min}"),
                    format!("{score:.0}"),
                    score >= required,
                    headroom_above(score, required),
                )
            }
            None => condition(
                "credit score",
                format!(">= {min}"),
                "not on file".to_string(),
                false,
                0.0,
            ),
        },
        EligibilityRule::MinBusinessAge { years } => {
            let actual = profile.business_age_years;
            condition(
                "business age",
                format!(">= {years} year(s)"),
                format!("{actual} year(s)"),
                actual >= *years,
                headroom_above(f64::from(actual), f64::from(*years)),
            )
        }
        EligibilityRule::MaxBusinessAge { years } => {
            let actual = profile.business_age_years;
            condition(
                "business age",
                format!("< {years} year(s)"),
                format!("{actual} year(s)"),
                actual < *years,
                headroom_below(f64::from(actual), f64::from(*years)),
            )
        }
        EligibilityRule::RevenueRange { min, max } => {
            let revenue = profile.revenue();
            let above_min = min.map_or(true, |floor| revenue >= floor);
            let below_max = max.map_or(true, |ceiling| revenue <= ceiling);
            let margin = match (min, max) {
                (Some(floor), Some(ceiling)) => headroom_above(revenue as f64, *floor as f64)
                    .min(headroom_below(revenue as f64, *ceiling as f64)),
                (Some(floor), None) => headroom_above(revenue as f64, *floor as f64),
                (None, Some(ceiling)) => headroom_below(revenue as f64, *ceiling as f64),
                (None, None) => 1.0,
            };
            let required = match (min, max) {
                (Some(floor), Some(ceiling)) => {
                    format!("{} - {} KRW", format_krw(*floor), format_krw(*ceiling))
                }
                (Some(floor), None) => format!(">= {} KRW", format_krw(*floor)),
                (None, Some(ceiling)) => format!("<= {} KRW", format_krw(*ceiling)),
                (None, None) => "any".to_string(),
            };
            condition(
                "annual revenue",
                required,
                format!("{} KRW", format_krw(revenue)),
                above_min && below_max,
                margin,
            )
        }
        EligibilityRule::TechnologyRequired => {
            let certified = profile.has_technology_certification;
            condition(
                "technology certification",
                "required".to_string(),
                if certified { "certified" } else { "none" }.to_string(),
                certified,
                1.0,
            )
        }
        EligibilityRule::MaxDebtRatio { max } => {
            let ceiling = context.policy.debt_ratio_ceiling;
            let ratio = profile.debt_ratio(ceiling);
            let actual = if ratio >= ceiling {
                format!(">= {:.0}%", ceiling * 100.0)
            } else {
                format!("{:.0}%", ratio * 100.0)
            };
            condition(
                "debt-to-revenue ratio",
                format!("<= {:.0}%", max * 100.0),
                actual,
                ratio <= *max,
                headroom_below(ratio, *max),
            )
        }
        EligibilityRule::MinGrade { grade } => {
            let steps = (*grade as i32 - context.grade as i32).max(0);
            condition(
                "SOHO grade",
                format!("{grade} or better"),
                context.grade.to_string(),
                context.grade.at_least(*grade),
                f64::from(steps) / 4.0,
            )
        }
        EligibilityRule::ExcludedIndustries { industries } => {
            let excluded = industries
                .iter()
                .map(|industry| industry.label())
                .collect::<Vec<_>>()
                .join(", ");
            let (actual, passed) = match profile.industry {
                Some(industry) => (industry.label().to_string(), !industries.contains(&industry)),
                None => ("unspecified".to_string(), true),
            };
            condition(
                "industry",
                format!("not {excluded}"),
                actual,
                passed,
                1.0,
            )
        }
    }
}

/// Thousands-separated KRW amount, e.g. `100,000,000`.
pub fn format_krw(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
