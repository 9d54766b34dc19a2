use super::common::{submission, twin_catalog};
use crate::diagnosis::catalog::ProgramCatalog;
use crate::diagnosis::policy::ScoringPolicy;
use crate::diagnosis::service::DiagnosisService;

#[test]
fn replacing_catalog_leaves_held_snapshot_untouched() {
    let service = DiagnosisService::default();
    let before = service.catalog();

    service.replace_catalog(twin_catalog());

    assert_eq!(before.len(), ProgramCatalog::standard().len());
    assert_eq!(service.catalog().version, "twins");
}

#[test]
fn diagnosis_uses_current_catalog() {
    let service = DiagnosisService::new(ScoringPolicy::default(), ProgramCatalog::empty());
    let empty = service.diagnose(Some(submission())).expect("diagnosis");
    assert!(empty.eligible_programs.is_empty());

    service.replace_catalog(twin_catalog());
    let result = service.diagnose(Some(submission())).expect("diagnosis");

    assert_eq!(result.eligible_programs.len(), 2);
}

#[test]
fn analysis_and_diagnosis_share_intake() {
    let service = DiagnosisService::default();

    assert!(service.diagnose(None).is_err());
    assert!(service.analyze(None).is_err());

    let analysis = service.analyze(Some(submission())).expect("analysis");
    assert!(analysis.debt_composition.is_some());
}
