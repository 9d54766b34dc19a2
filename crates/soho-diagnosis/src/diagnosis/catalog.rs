use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{Grade, Industry};

/// Product family a policy fund belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramCategory {
    TechnologyGuarantee,
    CreditGuarantee,
    PolicyLoan,
    SmallBusinessLoan,
}

impl ProgramCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ProgramCategory::TechnologyGuarantee => "technology guarantee",
            ProgramCategory::CreditGuarantee => "credit guarantee",
            ProgramCategory::PolicyLoan => "policy loan",
            ProgramCategory::SmallBusinessLoan => "small business loan",
        }
    }
}

/// One declared eligibility rule. Each rule yields exactly one audited condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityRule {
    MinCreditScore {
        min: i32,
    },
    MinBusinessAge {
        years: u32,
    },
    MaxBusinessAge {
        years: u32,
    },
    RevenueRange {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    TechnologyRequired,
    MaxDebtRatio {
        max: f64,
    },
    MinGrade {
        grade: Grade,
    },
    ExcludedIndustries {
        industries: Vec<Industry>,
    },
}

/// Static description of a government policy-loan program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDefinition {
    pub name: String,
    pub category: ProgramCategory,
    pub max_amount: u64,
    pub interest_rate_label: String,
    pub requirements_text: String,
    pub rules: Vec<EligibilityRule>,
}

/// Read-only list of programs, in declaration order.
///
/// Loaded once and shared behind an `Arc`; a new catalog replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramCatalog {
    pub version: String,
    programs: Vec<ProgramDefinition>,
}

impl ProgramCatalog {
    pub fn new(
        version: impl Into<String>,
        programs: Vec<ProgramDefinition>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            version: version.into(),
            programs,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn empty() -> Self {
        Self {
            version: "empty".to_string(),
            programs: Vec::new(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: ProgramCatalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn programs(&self) -> &[ProgramDefinition] {
        &self.programs
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn largest_max_amount(&self) -> u64 {
        self.programs
            .iter()
            .map(|program| program.max_amount)
            .max()
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for program in &self.programs {
            if program.name.trim().is_empty() {
                return Err(CatalogError::Invalid("program name is blank".to_string()));
            }
            if !seen.insert(program.name.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate program '{}'",
                    program.name
                )));
            }
            for rule in &program.rules {
                match rule {
                    EligibilityRule::MaxDebtRatio { max } if !max.is_finite() || *max < 0.0 => {
                        return Err(CatalogError::Invalid(format!(
                            "'{}' declares a negative or non-finite debt ratio",
                            program.name
                        )));
                    }
                    EligibilityRule::RevenueRange {
                        min: Some(min),
                        max: Some(max),
                    } if min > max => {
                        return Err(CatalogError::Invalid(format!(
                            "'{}' declares an empty revenue range",
                            program.name
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Built-in catalog of the major Korean small-business policy funds.
    pub fn standard() -> Self {
        let excluded = vec![Industry::Finance, Industry::RealEstate];

        Self {
            version: "2025.1".to_string(),
            programs: vec![
                ProgramDefinition {
                    name: "KOTEC Technology Appraisal Guarantee".to_string(),
                    category: ProgramCategory::TechnologyGuarantee,
                    max_amount: 300_000_000,
                    interest_rate_label: "bank rate 3.5-4.5% + guarantee fee 0.5-1.5%"
                        .to_string(),
                    requirements_text: "Certified technology (patent, venture or R&D lab), \
                        credit score 600 or higher, debt no more than 3x annual revenue"
                        .to_string(),
                    rules: vec![
                        EligibilityRule::TechnologyRequired,
                        EligibilityRule::MinCreditScore { min: 600 },
                        EligibilityRule::MaxDebtRatio { max: 3.0 },
                    ],
                },
                ProgramDefinition {
                    name: "KOSME Innovation Growth Fund".to_string(),
                    category: ProgramCategory::PolicyLoan,
                    max_amount: 500_000_000,
                    interest_rate_label: "policy rate 2.5% (variable)".to_string(),
                    requirements_text: "SOHO grade B or better, at least 3 years in business, \
                        annual revenue of 100M KRW or more"
                        .to_string(),
                    rules: vec![
                        EligibilityRule::MinGrade { grade: Grade::B },
                        EligibilityRule::MinBusinessAge { years: 3 },
                        EligibilityRule::RevenueRange {
                            min: Some(100_000_000),
                            max: None,
                        },
                    ],
                },
                ProgramDefinition {
                    name: "KOSME Startup Foundation Fund".to_string(),
                    category: ProgramCategory::PolicyLoan,
                    max_amount: 300_000_000,
                    interest_rate_label: "policy rate 2.0% (variable)".to_string(),
                    requirements_text: "Under 7 years in business, credit score 600 or higher, \
                        not in finance or real estate"
                        .to_string(),
                    rules: vec![
                        EligibilityRule::MaxBusinessAge { years: 7 },
                        EligibilityRule::MinCreditScore { min: 600 },
                        EligibilityRule::ExcludedIndustries {
                            industries: excluded.clone(),
                        },
                    ],
                },
                ProgramDefinition {
                    name: "KODIT Credit Guarantee".to_string(),
                    category: ProgramCategory::CreditGuarantee,
                    max_amount: 300_000_000,
                    interest_rate_label: "bank rate 4.0-5.0% + guarantee fee 0.5-1.5%"
                        .to_string(),
                    requirements_text: "Credit score 700 or higher, at least 1 year in business, \
                        debt no more than 2x annual revenue"
                        .to_string(),
                    rules: vec![
                        EligibilityRule::MinCreditScore { min: 700 },
                        EligibilityRule::MinBusinessAge { years: 1 },
                        EligibilityRule::MaxDebtRatio { max: 2.0 },
                    ],
                },
                ProgramDefinition {
                    name: "Regional Credit Guarantee Foundation".to_string(),
                    category: ProgramCategory::CreditGuarantee,
                    max_amount: 100_000_000,
                    interest_rate_label: "bank rate 4.0-5.5% + guarantee fee 1.0%".to_string(),
                    requirements_text: "Credit score 550 or higher, annual revenue up to 1B KRW, \
                        debt no more than 3x annual revenue"
                        .to_string(),
                    rules: vec![
                        EligibilityRule::MinCreditScore { min: 550 },
                        EligibilityRule::RevenueRange {
                            min: None,
                            max: Some(1_000_000_000),
                        },
                        EligibilityRule::MaxDebtRatio { max: 3.0 },
                    ],
                },
                ProgramDefinition {
                    name: "SEMAS Small Business Stabilization Loan".to_string(),
                    category: ProgramCategory::SmallBusinessLoan,
                    max_amount: 70_000_000,
                    interest_rate_label: "policy rate 3.0-3.5%".to_string(),
                    requirements_text: "Operating at least 1 year, credit score 450 or higher, \
                        not in finance or real estate"
                        .to_string(),
                    rules: vec![
                        EligibilityRule::MinBusinessAge { years: 1 },
                        EligibilityRule::MinCreditScore { min: 450 },
                        EligibilityRule::ExcludedIndustries {
                            industries: excluded,
                        },
                    ],
                },
            ],
        }
    }
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Failure loading or validating a program catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read program catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("program catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("program catalog rejected: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_valid_and_ordered() {
        let catalog = ProgramCatalog::standard();
        catalog.validate().expect("standard catalog validates");
        assert_eq!(catalog.len(), 6);
        assert_eq!(
            catalog.programs()[0].category,
            ProgramCategory::TechnologyGuarantee
        );
        assert_eq!(catalog.largest_max_amount(), 500_000_000);
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = ProgramCatalog::standard();
        let json = serde_json::to_string(&catalog).expect("serializes");
        let loaded = ProgramCatalog::from_reader(json.as_bytes()).expect("loads");
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn parses_hand_written_rules() {
        let json = r#"{
            "version": "test",
            "programs": [{
                "name": "Local Growth Loan",
                "category": "policy_loan",
                "max_amount": 50000000,
                "interest_rate_label": "2.0%",
                "requirements_text": "grade C or better",
                "rules": [
                    { "kind": "min_grade", "grade": "C" },
                    { "kind": "technology_required" },
                    { "kind": "revenue_range", "min": 10000000 },
                    { "kind": "excluded_industries", "industries": ["real_estate"] }
                ]
            }]
        }"#;

        let catalog = ProgramCatalog::from_reader(json.as_bytes()).expect("catalog parses");
        let rules = &catalog.programs()[0].rules;
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0], EligibilityRule::MinGrade { grade: Grade::C });
        assert_eq!(
            rules[2],
            EligibilityRule::RevenueRange {
                min: Some(10_000_000),
                max: None
            }
        );
    }

    #[test]
    fn rejects_duplicate_program_names() {
        let mut programs = ProgramCatalog::standard().programs().to_vec();
        programs.push(programs[0].clone());
        let err = ProgramCatalog::new("dup", programs).expect_err("duplicate rejected");
        assert!(matches!(err, CatalogError::Invalid(message) if message.contains("duplicate")));
    }

    #[test]
    fn empty_catalog_is_allowed() {
        let catalog = ProgramCatalog::new("none", Vec::new()).expect("empty catalog ok");
        assert!(catalog.is_empty());
        assert_eq!(catalog.largest_max_amount(), 0);
    }
}
