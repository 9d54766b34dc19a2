use super::common::submission;
use crate::diagnosis::domain::{ApplicantSubmission, DebtBreakdown, Industry};
use crate::diagnosis::intake::{profile_from_submission, IntakeError};

#[test]
fn absent_profile_is_fatal() {
    assert_eq!(
        profile_from_submission(None),
        Err(IntakeError::MissingProfile)
    );
}

#[test]
fn missing_revenue_is_reported_by_name() {
    let submission = ApplicantSubmission {
        annual_revenue: None,
        ..submission()
    };

    assert_eq!(
        profile_from_submission(Some(submission)),
        Err(IntakeError::MissingField("annual_revenue"))
    );
}

#[test]
fn missing_debt_without_breakdown_is_fatal() {
    let submission = ApplicantSubmission {
        total_debt: None,
        debt_breakdown: None,
        ..submission()
    };

    assert_eq!(
        profile_from_submission(Some(submission)),
        Err(IntakeError::MissingField("total_debt"))
    );
}

#[test]
fn breakdown_overrides_declared_total() {
    let submission = ApplicantSubmission {
        total_debt: Some(1),
        ..submission()
    };

    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert_eq!(profile.total_debt, 60_000_000);
    assert_eq!(profile.debt_breakdown.high_cost(), 10_000_000);
}

#[test]
fn zeroed_breakdown_without_total_means_no_debt() {
    let submission = ApplicantSubmission {
        total_debt: None,
        debt_breakdown: Some(DebtBreakdown::default()),
        ..submission()
    };

    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert_eq!(profile.total_debt, 0);
}

#[test]
fn optional_fields_default_conservatively() {
    let submission = ApplicantSubmission {
        annual_revenue: Some(10_000_000),
        total_debt: Some(0),
        ..ApplicantSubmission::default()
    };

    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert!(!profile.has_technology_certification);
    assert_eq!(profile.business_age_years, 0);
    assert_eq!(profile.combined_credit_score(), None);
}

#[test]
fn legacy_field_spellings_are_accepted() {
    let raw = r#"{
        "niceScore": 710,
        "kcb_score": 690,
        "annualRevenue": 120000000,
        "debt": 30000000,
        "hasTechnology": true,
        "business_years": 4,
        "industry": "information_technology",
        "employeeCount": 3
    }"#;

    let submission: ApplicantSubmission = serde_json::from_str(raw).expect("parse");
    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert_eq!(profile.combined_credit_score(), Some(700.0));
    assert_eq!(profile.total_debt, 30_000_000);
    assert!(profile.has_technology_certification);
    assert_eq!(profile.business_age_years, 4);
    assert_eq!(profile.industry, Some(Industry::InformationTechnology));
    assert_eq!(profile.employee_count, Some(3));
}

#[test]
fn stored_client_row_is_diagnosable() {
    let raw = r#"{
        "nice_score": 780,
        "kcb_score": 760,
        "annual_revenue": 200000000,
        "debt": 40000000,
        "total_debt": 40000000,
        "debt_policy_fund": 20000000,
        "debt_credit_loan": 10000000,
        "debt_secondary_loan": 6000000,
        "debt_card_loan": 4000000,
        "has_technology": 1,
        "business_years": 5,
        "employee_count": 4
    }"#;

    let submission: ApplicantSubmission = serde_json::from_str(raw).expect("stored row parses");
    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert!(profile.has_technology_certification);
    assert_eq!(profile.total_debt, 40_000_000);
    assert_eq!(profile.debt_breakdown.total(), profile.total_debt);
    assert_eq!(profile.debt_breakdown.high_cost(), 10_000_000);
}

#[test]
fn flat_breakdown_without_totals_sets_debt() {
    let submission: ApplicantSubmission = serde_json::from_str(
        r#"{"annual_revenue":100000000,"debt_policy_fund":5000000,"debt_card_loan":15000000}"#,
    )
    .expect("parse");

    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert_eq!(profile.total_debt, 20_000_000);
    assert_eq!(profile.debt_breakdown.total(), profile.total_debt);
}

#[test]
fn total_debt_wins_over_legacy_debt_column() {
    let submission = ApplicantSubmission {
        total_debt: Some(25_000_000),
        debt: Some(10_000_000),
        debt_breakdown: None,
        ..submission()
    };

    let profile = profile_from_submission(Some(submission)).expect("valid submission");

    assert_eq!(profile.total_debt, 25_000_000);
}
