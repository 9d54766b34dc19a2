use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::analysis::{analyze_company, CompanyAnalysis};
use super::catalog::ProgramCatalog;
use super::domain::ApplicantSubmission;
use super::intake::{profile_from_submission, IntakeError};
use super::policy::ScoringPolicy;
use super::{DiagnosisEngine, DiagnosisResult};

/// Service composing intake, the engine and the shared program catalog.
///
/// The catalog is held as an `Arc` snapshot. [`DiagnosisService::replace_catalog`] swaps
/// it wholesale; calls already running keep the snapshot they started with.
pub struct DiagnosisService {
    engine: Arc<DiagnosisEngine>,
    catalog: RwLock<Arc<ProgramCatalog>>,
}

impl DiagnosisService {
    pub fn new(policy: ScoringPolicy, catalog: ProgramCatalog) -> Self {
        Self {
            engine: Arc::new(DiagnosisEngine::new(policy)),
            catalog: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn engine(&self) -> &DiagnosisEngine {
        &self.engine
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<ProgramCatalog> {
        match self.catalog.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace_catalog(&self, catalog: ProgramCatalog) {
        let version = catalog.version.clone();
        let programs = catalog.len();
        let replacement = Arc::new(catalog);
        match self.catalog.write() {
            Ok(mut guard) => *guard = replacement,
            Err(poisoned) => *poisoned.into_inner() = replacement,
        }
        info!(%version, programs, "program catalog replaced");
    }

    /// Validate a raw submission and run the full diagnosis.
    pub fn diagnose(
        &self,
        submission: Option<ApplicantSubmission>,
    ) -> Result<DiagnosisResult, IntakeError> {
        let profile = profile_from_submission(submission)?;
        let catalog = self.catalog();
        let result = self.engine.diagnose(&profile, &catalog);

        debug!(
            grade = %result.grade,
            score = result.score,
            max_loan_limit = result.max_loan_limit,
            eligible = result.recommended_funds.len(),
            catalog_version = %catalog.version,
            "diagnosis complete"
        );

        Ok(result)
    }

    pub fn analyze(
        &self,
        submission: Option<ApplicantSubmission>,
    ) -> Result<CompanyAnalysis, IntakeError> {
        let profile = profile_from_submission(submission)?;
        Ok(analyze_company(&profile))
    }
}

impl Default for DiagnosisService {
    fn default() -> Self {
        Self::new(ScoringPolicy::default(), ProgramCatalog::standard())
    }
}
