use super::domain::{ApplicantProfile, Grade};
use super::policy::ScoringPolicy;

/// Maximum loan ceiling for a profile at a given grade, in KRW.
///
/// `base(grade) * revenue multiplier * debt penalty * technology bonus`, rounded down to
/// the policy unit and bounded to `[0, max_loan_cap]`.
pub fn max_loan_limit(profile: &ApplicantProfile, grade: Grade, policy: &ScoringPolicy) -> u64 {
    let limit = &policy.limit;
    let base = limit.base_for(grade) as f64;

    let revenue_multiplier = (profile.revenue() as f64 / limit.revenue_reference as f64)
        .clamp(0.0, limit.max_revenue_multiplier);

    let ratio = profile.debt_ratio(policy.debt_ratio_ceiling);
    let debt_penalty = (1.0 - limit.debt_penalty_slope * ratio).clamp(0.0, 1.0);

    let technology = if profile.has_technology_certification {
        limit.technology_multiplier
    } else {
        1.0
    };

    let raw = base * revenue_multiplier * debt_penalty * technology;
    let cap = limit.max_loan_cap as f64;
    let bounded = if raw.is_finite() {
        raw.clamp(0.0, cap)
    } else {
        0.0
    };

    let amount = bounded.floor() as u64;
    let amount = match limit.rounding_unit {
        0 => amount,
        unit => amount - amount % unit,
    };
    amount.min(limit.max_loan_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::domain::DebtBreakdown;

    fn profile(revenue: i64, debt: i64, tech: bool) -> ApplicantProfile {
        ApplicantProfile {
            credit_score_nice: Some(750),
            credit_score_kcb: None,
            annual_revenue: revenue,
            total_debt: debt,
            debt_breakdown: DebtBreakdown::default(),
            has_technology_certification: tech,
            business_age_years: 3,
            industry: None,
            employee_count: None,
        }
    }

    #[test]
    fn grade_s_never_below_grade_d() {
        let policy = ScoringPolicy::default();
        let cases = [
            profile(0, 0, false),
            profile(50_000_000, 10_000_000, false),
            profile(300_000_000, 0, true),
            profile(i64::MAX, 0, true),
            profile(10_000_000, 900_000_000, false),
        ];
        for case in &cases {
            let best = max_loan_limit(case, Grade::S, &policy);
            let worst = max_loan_limit(case, Grade::D, &policy);
            assert!(best >= worst, "{case:?}");
            let mut previous = u64::MAX;
            for grade in Grade::ordered() {
                let amount = max_loan_limit(case, grade, &policy);
                assert!(amount <= previous);
                previous = amount;
            }
        }
    }

    #[test]
    fn limit_scales_with_revenue_and_rounds_down() {
        let policy = ScoringPolicy::default();
        // B base 100M * 0.5 revenue multiplier * (1 - 0.5 * 0.2) penalty
        let amount = max_loan_limit(&profile(50_000_000, 10_000_000, false), Grade::B, &policy);
        assert_eq!(amount, 45_000_000);
        assert_eq!(amount % policy.limit.rounding_unit, 0);
    }

    #[test]
    fn technology_bonus_lifts_limit() {
        let policy = ScoringPolicy::default();
        let plain = max_loan_limit(&profile(100_000_000, 0, false), Grade::A, &policy);
        let certified = max_loan_limit(&profile(100_000_000, 0, true), Grade::A, &policy);
        assert_eq!(plain, 200_000_000);
        assert_eq!(certified, 240_000_000);
    }

    #[test]
    fn adversarial_inputs_stay_within_bounds() {
        let policy = ScoringPolicy::default();
        let cap = policy.limit.max_loan_cap;
        let cases = [
            profile(0, i64::MAX, true),
            profile(i64::MAX, 0, true),
            profile(-1_000, -1_000, false),
            profile(1_000_000, 1_000_000 * 150, false),
        ];
        for case in &cases {
            for grade in Grade::ordered() {
                let amount = max_loan_limit(case, grade, &policy);
                assert!(amount <= cap);
            }
        }
        assert_eq!(max_loan_limit(&profile(i64::MAX, 0, true), Grade::S, &policy), cap);
        assert_eq!(max_loan_limit(&profile(1_000_000, 150_000_000, false), Grade::S, &policy), 0);
    }

    #[test]
    fn zero_revenue_yields_zero_limit() {
        let policy = ScoringPolicy::default();
        assert_eq!(max_loan_limit(&profile(0, 0, true), Grade::S, &policy), 0);
    }
}
