use crate::infra::{load_service, read_submission};
use clap::Args;
use serde::Serialize;
use soho_diagnosis::config::AppConfig;
use soho_diagnosis::diagnosis::import::import_submissions_from_path;
use soho_diagnosis::diagnosis::matcher::format_krw;
use soho_diagnosis::diagnosis::{DiagnosisResult, ProgramCatalog};
use soho_diagnosis::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DiagnoseArgs {
    /// JSON file holding one applicant record
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export of client records
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Emit one JSON document covering every row
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct BatchRow {
    client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<DiagnosisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(crate) fn run_diagnose(args: DiagnoseArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config.diagnosis)?;
    let submission = read_submission(&args.profile)?;
    let result = service.diagnose(submission)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config.diagnosis)?;
    let imported = import_submissions_from_path(&args.input)?;

    let rows: Vec<BatchRow> = imported
        .into_iter()
        .map(|row| match service.diagnose(Some(row.submission)) {
            Ok(result) => BatchRow {
                client_id: row.client_id,
                result: Some(result),
                error: None,
            },
            Err(err) => BatchRow {
                client_id: row.client_id,
                result: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_batch(&rows));
    }
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config.diagnosis)?;
    let catalog = service.catalog();

    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog.as_ref())?);
    } else {
        print!("{}", render_catalog(&catalog));
    }
    Ok(())
}

fn krw(amount: u64) -> String {
    format_krw(i64::try_from(amount).unwrap_or(i64::MAX))
}

fn render_result(result: &DiagnosisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "SOHO grade {} | score {:.1} | max loan limit {} KRW\n",
        result.grade,
        result.score,
        krw(result.max_loan_limit)
    ));

    out.push_str("Score breakdown:\n");
    for component in &result.score_components {
        out.push_str(&format!(
            "  - {}: {:.1}/{:.0} ({})\n",
            component.factor.label(),
            component.points,
            component.max_points,
            component.notes
        ));
    }

    out.push_str("Programs:\n");
    if result.eligible_programs.is_empty() {
        out.push_str("  (catalog is empty)\n");
    }
    for program in &result.eligible_programs {
        let marker = if program.eligible { "eligible" } else { "not eligible" };
        out.push_str(&format!(
            "  - {} [{}] {}/{} conditions | up to {} KRW | suitability {:.1}\n",
            program.program_name,
            marker,
            program.pass_count,
            program.total_count,
            krw(program.max_amount),
            program.suitability
        ));
        for condition in program.failed_conditions() {
            out.push_str(&format!(
                "      missing {}: need {}, have {}\n",
                condition.label, condition.required_threshold, condition.actual_value
            ));
        }
    }

    out.push_str(&format!("\n{}\n", result.narrative));
    out
}

fn render_batch(rows: &[BatchRow]) -> String {
    let mut out = format!("Diagnosed {} client record(s)\n", rows.len());
    for row in rows {
        match (&row.result, &row.error) {
            (Some(result), _) => out.push_str(&format!(
                "  {}: grade {} | limit {} KRW | {} eligible program(s)\n",
                row.client_id,
                result.grade,
                krw(result.max_loan_limit),
                result.recommended_funds.len()
            )),
            (None, Some(error)) => {
                out.push_str(&format!("  {}: skipped ({})\n", row.client_id, error))
            }
            (None, None) => {}
        }
    }
    out
}

fn render_catalog(catalog: &ProgramCatalog) -> String {
    let mut out = format!(
        "Program catalog {} ({} programs)\n",
        catalog.version,
        catalog.len()
    );
    for program in catalog.programs() {
        out.push_str(&format!(
            "  - {} [{}] up to {} KRW, {}\n      {}\n",
            program.name,
            program.category.label(),
            krw(program.max_amount),
            program.interest_rate_label,
            program.requirements_text
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use soho_diagnosis::diagnosis::{diagnose, ApplicantProfile, DebtBreakdown};

    fn result() -> DiagnosisResult {
        let profile = ApplicantProfile {
            credit_score_nice: Some(780),
            credit_score_kcb: None,
            annual_revenue: 150_000_000,
            total_debt: 30_000_000,
            debt_breakdown: DebtBreakdown::default(),
            has_technology_certification: false,
            business_age_years: 4,
            industry: None,
            employee_count: None,
        };
        diagnose(&profile, &ProgramCatalog::standard())
    }

    #[test]
    fn summary_lists_every_program() {
        let rendered = render_result(&result());

        assert!(rendered.starts_with("SOHO grade"));
        for program in ProgramCatalog::standard().programs() {
            assert!(rendered.contains(&program.name), "missing {}", program.name);
        }
        assert!(rendered.contains("missing technology certification"));
    }

    #[test]
    fn batch_summary_reports_skipped_rows() {
        let rows = vec![
            BatchRow {
                client_id: "C-1".to_string(),
                result: Some(result()),
                error: None,
            },
            BatchRow {
                client_id: "C-2".to_string(),
                result: None,
                error: Some("applicant profile is missing required field 'annual_revenue'".to_string()),
            },
        ];

        let rendered = render_batch(&rows);

        assert!(rendered.starts_with("Diagnosed 2 client record(s)"));
        assert!(rendered.contains("C-2: skipped"));
    }

    #[test]
    fn catalog_listing_includes_rates() {
        let rendered = render_catalog(&ProgramCatalog::standard());

        assert!(rendered.contains("Program catalog 2025.1 (6 programs)"));
        assert!(rendered.contains("policy rate 2.0% (variable)"));
    }
}
