use serde::{Deserialize, Serialize};

use super::domain::ApplicantProfile;
use super::matcher::format_krw;

const RATIO_CEILING: f64 = 100.0;
const HIGH_COST_SHARE_LIMIT: f64 = 0.3;
const POLICY_FUND_SHARE_HEALTHY: f64 = 0.5;

/// Solvency bucket derived from leverage and operating history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityLevel {
    Stable,
    Moderate,
    Vulnerable,
}

impl StabilityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            StabilityLevel::Stable => "stable",
            StabilityLevel::Moderate => "moderate",
            StabilityLevel::Vulnerable => "vulnerable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Startup,
    Growth,
    Mature,
}

impl GrowthStage {
    pub fn for_years(years: u32) -> Self {
        match years {
            0..=2 => GrowthStage::Startup,
            3..=6 => GrowthStage::Growth,
            _ => GrowthStage::Mature,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GrowthStage::Startup => "startup",
            GrowthStage::Growth => "growth",
            GrowthStage::Mature => "mature",
        }
    }
}

/// Share of total debt per lender type, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtComposition {
    pub policy_fund: f64,
    pub credit_loan: f64,
    pub secondary_loan: f64,
    pub card_loan: f64,
}

/// Financial health snapshot of the applicant's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    pub financial_health_score: u8,
    pub debt_ratio: f64,
    pub debt_composition: Option<DebtComposition>,
    pub revenue_per_employee: Option<i64>,
    pub stability: StabilityLevel,
    pub growth_stage: GrowthStage,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

pub fn analyze_company(profile: &ApplicantProfile) -> CompanyAnalysis {
    let debt_ratio = profile.debt_ratio(RATIO_CEILING);
    let growth_stage = GrowthStage::for_years(profile.business_age_years);

    let breakdown = profile.debt_breakdown;
    let breakdown_total = breakdown.total();
    let debt_composition = (breakdown_total > 0).then(|| {
        let share = |part: i64| part.max(0) as f64 / breakdown_total as f64;
        DebtComposition {
            policy_fund: share(breakdown.policy_fund),
            credit_loan: share(breakdown.credit_loan),
            secondary_loan: share(breakdown.secondary_loan),
            card_loan: share(breakdown.card_loan),
        }
    });

    let revenue_per_employee = profile
        .employee_count
        .filter(|count| *count > 0)
        .map(|count| profile.revenue() / i64::from(count));

    let mut strengths = Vec::new();
    let mut risks = Vec::new();
    let mut score: f64 = 50.0;

    if profile.revenue() == 0 {
        risks.push("no reported revenue".to_string());
        score -= 20.0;
    } else if debt_ratio <= 0.5 {
        strengths.push(format!("debt is a modest {:.0}% of revenue", debt_ratio * 100.0));
        score += 20.0;
    } else if debt_ratio <= 1.0 {
        score += 5.0;
    } else {
        risks.push(format!("debt is {:.1}x annual revenue", debt_ratio));
        score -= 20.0;
    }

    if let Some(composition) = debt_composition {
        let high_cost = composition.card_loan + composition.secondary_loan;
        if high_cost > HIGH_COST_SHARE_LIMIT {
            risks.push(format!(
                "{:.0}% of debt sits in card or secondary-lender loans",
                high_cost * 100.0
            ));
            score -= 10.0;
        }
        if composition.policy_fund >= POLICY_FUND_SHARE_HEALTHY {
            strengths.push("most debt is low-rate policy funding".to_string());
            score += 5.0;
        }
    }

    match growth_stage {
        GrowthStage::Startup => {
            risks.push("limited operating history".to_string());
            score -= 5.0;
        }
        GrowthStage::Growth => score += 5.0,
        GrowthStage::Mature => {
            strengths.push(format!(
                "{} years of operating history",
                profile.business_age_years
            ));
            score += 10.0;
        }
    }

    if profile.has_technology_certification {
        strengths.push("certified technology eligible for guarantee programs".to_string());
        score += 10.0;
    }

    if let Some(per_head) = revenue_per_employee {
        strengths.push(format!(
            "revenue of {} KRW per employee",
            format_krw(per_head)
        ));
    }

    let financial_health_score = score.clamp(0.0, 100.0).round() as u8;

    let stability = if profile.revenue() > 0 && debt_ratio <= 0.5 && growth_stage != GrowthStage::Startup {
        StabilityLevel::Stable
    } else if profile.revenue() > 0 && debt_ratio <= 1.5 {
        StabilityLevel::Moderate
    } else {
        StabilityLevel::Vulnerable
    };

    CompanyAnalysis {
        financial_health_score,
        debt_ratio: (debt_ratio * 1000.0).round() / 1000.0,
        debt_composition,
        revenue_per_employee,
        stability,
        growth_stage,
        strengths,
        risks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::domain::DebtBreakdown;

    fn profile() -> ApplicantProfile {
        ApplicantProfile {
            credit_score_nice: Some(780),
            credit_score_kcb: Some(760),
            annual_revenue: 400_000_000,
            total_debt: 100_000_000,
            debt_breakdown: DebtBreakdown {
                policy_fund: 60_000_000,
                credit_loan: 30_000_000,
                secondary_loan: 0,
                card_loan: 10_000_000,
            },
            has_technology_certification: true,
            business_age_years: 8,
            industry: None,
            employee_count: Some(4),
        }
    }

    #[test]
    fn healthy_mature_business_scores_well() {
        let analysis = analyze_company(&profile());

        assert_eq!(analysis.stability, StabilityLevel::Stable);
        assert_eq!(analysis.growth_stage, GrowthStage::Mature);
        assert_eq!(analysis.revenue_per_employee, Some(100_000_000));
        assert_eq!(analysis.financial_health_score, 95);
        assert!(analysis.risks.is_empty());
        let composition = analysis.debt_composition.expect("breakdown present");
        assert!((composition.policy_fund - 0.6).abs() < 1e-9);
    }

    #[test]
    fn high_cost_debt_is_flagged() {
        let mut applicant = profile();
        applicant.debt_breakdown = DebtBreakdown {
            policy_fund: 0,
            credit_loan: 20_000_000,
            secondary_loan: 40_000_000,
            card_loan: 40_000_000,
        };

        let analysis = analyze_company(&applicant);

        assert!(analysis
            .risks
            .iter()
            .any(|risk| risk.contains("card or secondary-lender")));
    }

    #[test]
    fn empty_business_is_vulnerable_without_panicking() {
        let applicant = ApplicantProfile {
            credit_score_nice: None,
            credit_score_kcb: None,
            annual_revenue: 0,
            total_debt: 0,
            debt_breakdown: DebtBreakdown::default(),
            has_technology_certification: false,
            business_age_years: 0,
            industry: None,
            employee_count: Some(0),
        };

        let analysis = analyze_company(&applicant);

        assert_eq!(analysis.stability, StabilityLevel::Vulnerable);
        assert_eq!(analysis.growth_stage, GrowthStage::Startup);
        assert_eq!(analysis.revenue_per_employee, None);
        assert_eq!(analysis.financial_health_score, 25);
        assert!(analysis.debt_composition.is_none());
    }
}
