use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::diagnosis::catalog::{EligibilityRule, ProgramCatalog, ProgramCategory, ProgramDefinition};
use crate::diagnosis::domain::{ApplicantProfile, ApplicantSubmission, DebtBreakdown, Industry};
use crate::diagnosis::{diagnosis_router, DiagnosisService};

pub(super) fn strong_profile() -> ApplicantProfile {
    ApplicantProfile {
        credit_score_nice: Some(850),
        credit_score_kcb: None,
        annual_revenue: 100_000_000,
        total_debt: 20_000_000,
        debt_breakdown: DebtBreakdown {
            policy_fund: 10_000_000,
            credit_loan: 10_000_000,
            secondary_loan: 0,
            card_loan: 0,
        },
        has_technology_certification: true,
        business_age_years: 5,
        industry: Some(Industry::Manufacturing),
        employee_count: Some(6),
    }
}

pub(super) fn empty_profile() -> ApplicantProfile {
    ApplicantProfile {
        credit_score_nice: Some(0),
        credit_score_kcb: Some(0),
        annual_revenue: 0,
        total_debt: 0,
        debt_breakdown: DebtBreakdown::default(),
        has_technology_certification: false,
        business_age_years: 0,
        industry: None,
        employee_count: None,
    }
}

pub(super) fn profile_with(nice: Option<i32>, revenue: i64, debt: i64) -> ApplicantProfile {
    ApplicantProfile {
        credit_score_nice: nice,
        credit_score_kcb: None,
        annual_revenue: revenue,
        total_debt: debt,
        debt_breakdown: DebtBreakdown::default(),
        has_technology_certification: false,
        business_age_years: 4,
        industry: Some(Industry::Retail),
        employee_count: None,
    }
}

pub(super) fn submission() -> ApplicantSubmission {
    ApplicantSubmission {
        credit_score_nice: Some(820),
        credit_score_kcb: Some(780),
        annual_revenue: Some(250_000_000),
        total_debt: Some(60_000_000),
        debt_breakdown: Some(DebtBreakdown {
            policy_fund: 30_000_000,
            credit_loan: 20_000_000,
            secondary_loan: 5_000_000,
            card_loan: 5_000_000,
        }),
        has_technology_certification: Some(true),
        business_age_years: Some(6),
        industry: Some(Industry::InformationTechnology),
        employee_count: Some(9),
        ..ApplicantSubmission::default()
    }
}

/// Two programs with identical size and rules, so only declaration order separates them.
pub(super) fn twin_catalog() -> ProgramCatalog {
    let program = |name: &str| ProgramDefinition {
        name: name.to_string(),
        category: ProgramCategory::PolicyLoan,
        max_amount: 50_000_000,
        interest_rate_label: "2.0%".to_string(),
        requirements_text: "credit score 500 or higher".to_string(),
        rules: vec![EligibilityRule::MinCreditScore { min: 500 }],
    };

    ProgramCatalog::new(
        "twins",
        vec![
            program("First Declared Loan"),
            program("Second Declared Loan"),
        ],
    )
    .expect("twin catalog valid")
}

pub(super) fn service() -> Arc<DiagnosisService> {
    Arc::new(DiagnosisService::default())
}

pub(super) fn router() -> axum::Router {
    diagnosis_router(service())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
