use tracing::debug;

use super::domain::{ApplicantProfile, ApplicantSubmission};

/// Structural problems that make a submission impossible to diagnose.
///
/// These indicate a caller bug, not an applicant edge case, so they are surfaced
/// instead of defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("applicant profile is missing")]
    MissingProfile,
    #[error("applicant profile is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Normalize a raw client record into the canonical profile.
///
/// A non-empty debt breakdown (nested or flat columns) is authoritative for the total;
/// otherwise the declared total is kept, preferring `total_debt` over the legacy `debt`.
pub fn profile_from_submission(
    submission: Option<ApplicantSubmission>,
) -> Result<ApplicantProfile, IntakeError> {
    let submission = submission.ok_or(IntakeError::MissingProfile)?;

    let annual_revenue = submission
        .annual_revenue
        .ok_or(IntakeError::MissingField("annual_revenue"))?;

    let supplied = submission.breakdown();
    let breakdown = supplied.unwrap_or_default();
    let declared = submission.declared_debt();
    let total_debt = match (declared, breakdown.is_empty()) {
        (declared, false) => {
            let summed = breakdown.total();
            if let Some(declared) = declared {
                if declared != summed {
                    debug!(
                        declared,
                        summed, "debt breakdown disagrees with declared total; using breakdown"
                    );
                }
            }
            summed
        }
        (Some(declared), true) => declared,
        (None, true) if supplied.is_some() => 0,
        (None, true) => return Err(IntakeError::MissingField("total_debt")),
    };

    Ok(ApplicantProfile {
        credit_score_nice: submission.credit_score_nice,
        credit_score_kcb: submission.credit_score_kcb,
        annual_revenue,
        total_debt,
        debt_breakdown: breakdown,
        has_technology_certification: submission.has_technology_certification.unwrap_or(false),
        business_age_years: submission.business_age_years.unwrap_or(0),
        industry: submission.industry,
        employee_count: submission.employee_count,
    })
}
