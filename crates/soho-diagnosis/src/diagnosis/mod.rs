//! SOHO grading, loan-limit estimation and policy-fund matching.
//!
//! [`diagnose`] is the single entry point: grade, then limit, then program matching,
//! then narrative. It is a pure function of the profile, the catalog and the scoring
//! policy, so repeated calls with the same inputs return identical results.

pub mod analysis;
pub mod catalog;
pub mod domain;
pub mod grade;
pub mod import;
pub mod intake;
pub mod limit;
pub mod matcher;
mod narrative;
pub mod policy;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use analysis::{analyze_company, CompanyAnalysis, GrowthStage, StabilityLevel};
pub use catalog::{CatalogError, EligibilityRule, ProgramCatalog, ProgramCategory, ProgramDefinition};
pub use domain::{ApplicantProfile, ApplicantSubmission, DebtBreakdown, Grade, Industry};
pub use grade::{assess_grade, GradeAssessment, ScoreComponent, ScoreFactor};
pub use import::{import_submissions, ImportError, ImportedSubmission};
pub use intake::{profile_from_submission, IntakeError};
pub use limit::max_loan_limit;
pub use matcher::{match_programs, ConditionCheck, ProgramEvaluation};
pub use policy::{PolicyError, ScoringPolicy};
pub use router::diagnosis_router;
pub use service::DiagnosisService;

use narrative::NarrativeInput;
use serde::{Deserialize, Serialize};

/// Full diagnosis handed back to the caller for display and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub grade: Grade,
    pub score: f64,
    pub score_components: Vec<ScoreComponent>,
    pub max_loan_limit: u64,
    /// Every catalog program, eligible ones first.
    pub eligible_programs: Vec<ProgramEvaluation>,
    /// Names of the eligible programs in ranked order.
    pub recommended_funds: Vec<String>,
    pub narrative: String,
}

impl DiagnosisResult {
    pub fn eligible(&self) -> impl Iterator<Item = &ProgramEvaluation> {
        self.eligible_programs
            .iter()
            .filter(|program| program.eligible)
    }
}

/// Stateless engine applying a scoring policy to applicant profiles.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisEngine {
    policy: ScoringPolicy,
}

impl DiagnosisEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn diagnose(&self, profile: &ApplicantProfile, catalog: &ProgramCatalog) -> DiagnosisResult {
        let assessment = assess_grade(profile, &self.policy);
        let limit = max_loan_limit(profile, assessment.grade, &self.policy);
        let programs = match_programs(profile, assessment.grade, catalog, &self.policy);

        let narrative = narrative::compose(&NarrativeInput {
            grade: assessment.grade,
            points: assessment.points,
            max_points: self.policy.max_points(),
            max_loan_limit: limit,
            components: &assessment.components,
            programs: &programs,
        });

        let recommended_funds = programs
            .iter()
            .filter(|program| program.eligible)
            .map(|program| program.program_name.clone())
            .collect();

        DiagnosisResult {
            grade: assessment.grade,
            score: assessment.points,
            score_components: assessment.components,
            max_loan_limit: limit,
            eligible_programs: programs,
            recommended_funds,
            narrative,
        }
    }
}

/// Diagnose with the default scoring policy.
pub fn diagnose(profile: &ApplicantProfile, catalog: &ProgramCatalog) -> DiagnosisResult {
    DiagnosisEngine::default().diagnose(profile, catalog)
}
