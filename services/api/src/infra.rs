use metrics_exporter_prometheus::PrometheusHandle;
use soho_diagnosis::config::DiagnosisConfig;
use soho_diagnosis::diagnosis::{ApplicantSubmission, DiagnosisService, ProgramCatalog, ScoringPolicy};
use soho_diagnosis::error::AppError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the service from configured overrides, falling back to the built-in tables.
pub(crate) fn load_service(config: &DiagnosisConfig) -> Result<DiagnosisService, AppError> {
    let policy = match &config.policy_path {
        Some(path) => {
            info!(path = %path.display(), "loading scoring policy");
            ScoringPolicy::from_path(path)?
        }
        None => ScoringPolicy::default(),
    };

    let catalog = match &config.catalog_path {
        Some(path) => {
            info!(path = %path.display(), "loading program catalog");
            ProgramCatalog::from_path(path)?
        }
        None => ProgramCatalog::standard(),
    };

    Ok(DiagnosisService::new(policy, catalog))
}

pub(crate) fn read_submission(path: &Path) -> Result<Option<ApplicantSubmission>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
