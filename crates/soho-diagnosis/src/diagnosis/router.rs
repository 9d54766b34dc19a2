use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::analysis::CompanyAnalysis;
use super::catalog::ProgramCatalog;
use super::domain::ApplicantSubmission;
use super::service::DiagnosisService;
use super::DiagnosisResult;
use crate::error::AppError;

/// Router builder exposing the diagnosis engine over HTTP.
pub fn diagnosis_router(service: Arc<DiagnosisService>) -> Router {
    Router::new()
        .route("/api/v1/diagnosis", post(diagnosis_handler))
        .route("/api/v1/company-analysis", post(company_analysis_handler))
        .route("/api/v1/programs", get(programs_handler))
        .with_state(service)
}

pub(crate) async fn diagnosis_handler(
    State(service): State<Arc<DiagnosisService>>,
    Json(submission): Json<Option<ApplicantSubmission>>,
) -> Result<Json<DiagnosisResult>, AppError> {
    Ok(Json(service.diagnose(submission)?))
}

pub(crate) async fn company_analysis_handler(
    State(service): State<Arc<DiagnosisService>>,
    Json(submission): Json<Option<ApplicantSubmission>>,
) -> Result<Json<CompanyAnalysis>, AppError> {
    Ok(Json(service.analyze(submission)?))
}

pub(crate) async fn programs_handler(
    State(service): State<Arc<DiagnosisService>>,
) -> Json<ProgramCatalog> {
    Json(service.catalog().as_ref().clone())
}
