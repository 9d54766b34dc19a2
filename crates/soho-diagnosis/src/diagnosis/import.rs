use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{parse_flag, ApplicantSubmission, Industry};

/// One client row from a CSV export, keyed by the caller's client identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSubmission {
    pub client_id: String,
    pub submission: ApplicantSubmission,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read client export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid client CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognised has_technology value '{value}'")]
    TechnologyFlag { row: usize, value: String },
    #[error("row {row}: unrecognised industry '{value}'")]
    Industry { row: usize, value: String },
}

pub fn import_submissions_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ImportedSubmission>, ImportError> {
    let file = File::open(path)?;
    import_submissions(file)
}

/// Parse a client export whose columns mirror the persisted client table.
///
/// Blank cells become `None` so intake can decide what is missing.
pub fn import_submissions<R: Read>(reader: R) -> Result<Vec<ImportedSubmission>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut imported = Vec::new();

    for (index, record) in csv_reader.deserialize::<ClientRow>().enumerate() {
        let row = record?;
        let line = index + 2;

        let has_technology = match row.has_technology.as_deref() {
            Some(raw) => Some(
                parse_flag(raw).ok_or_else(|| ImportError::TechnologyFlag {
                    row: line,
                    value: raw.to_string(),
                })?,
            ),
            None => None,
        };

        let industry = match row.industry.as_deref() {
            Some(raw) => Some(Industry::parse(raw).ok_or_else(|| ImportError::Industry {
                row: line,
                value: raw.to_string(),
            })?),
            None => None,
        };

        imported.push(ImportedSubmission {
            client_id: row.client_id,
            submission: ApplicantSubmission {
                credit_score_nice: row.nice_score,
                credit_score_kcb: row.kcb_score,
                annual_revenue: row.annual_revenue,
                total_debt: row.total_debt,
                debt: row.debt,
                debt_breakdown: None,
                debt_policy_fund: row.debt_policy_fund,
                debt_credit_loan: row.debt_credit_loan,
                debt_secondary_loan: row.debt_secondary_loan,
                debt_card_loan: row.debt_card_loan,
                has_technology_certification: has_technology,
                business_age_years: row.business_years,
                industry,
                employee_count: row.employee_count,
            },
        });
    }

    Ok(imported)
}

#[derive(Debug, Deserialize)]
struct ClientRow {
    #[serde(alias = "id")]
    client_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    nice_score: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    kcb_score: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    annual_revenue: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    debt: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    total_debt: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    debt_policy_fund: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    debt_credit_loan: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    debt_secondary_loan: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    debt_card_loan: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    has_technology: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    business_years: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    employee_count: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    industry: Option<String>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
