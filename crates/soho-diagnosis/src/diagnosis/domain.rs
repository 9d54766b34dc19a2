use serde::{Deserialize, Deserializer, Serialize};

/// Raw client record as the surrounding application stores it.
///
/// Every field is optional so callers can hand over whatever they persisted; intake
/// decides what is fatal. Aliases cover the field spellings used across the older
/// handlers (`niceScore` vs `nice_score`). The persisted row keeps both `debt` and
/// `total_debt`, and stores the breakdown as flat `debt_*` columns, so those are
/// accepted as separate fields and reconciled at intake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSubmission {
    #[serde(default, alias = "nice_score", alias = "niceScore")]
    pub credit_score_nice: Option<i32>,
    #[serde(default, alias = "kcb_score", alias = "kcbScore")]
    pub credit_score_kcb: Option<i32>,
    #[serde(default, alias = "annualRevenue")]
    pub annual_revenue: Option<i64>,
    #[serde(default, alias = "totalDebt")]
    pub total_debt: Option<i64>,
    /// Legacy debt column. Used only when `total_debt` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<i64>,
    #[serde(default, alias = "debtBreakdown")]
    pub debt_breakdown: Option<DebtBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_policy_fund: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_credit_loan: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_secondary_loan: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_card_loan: Option<i64>,
    #[serde(
        default,
        alias = "has_technology",
        alias = "hasTechnology",
        alias = "hasTechnologyCertification",
        deserialize_with = "flag_from_any"
    )]
    pub has_technology_certification: Option<bool>,
    #[serde(
        default,
        alias = "business_years",
        alias = "businessYears",
        alias = "businessAgeYears"
    )]
    pub business_age_years: Option<u32>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default, alias = "employeeCount")]
    pub employee_count: Option<u32>,
}

impl ApplicantSubmission {
    /// Declared total: `total_debt` first, then the legacy `debt` column.
    pub fn declared_debt(&self) -> Option<i64> {
        self.total_debt.or(self.debt)
    }

    /// The nested breakdown when present, otherwise one assembled from the flat columns.
    pub fn breakdown(&self) -> Option<DebtBreakdown> {
        if self.debt_breakdown.is_some() {
            return self.debt_breakdown;
        }

        let parts = [
            self.debt_policy_fund,
            self.debt_credit_loan,
            self.debt_secondary_loan,
            self.debt_card_loan,
        ];
        parts.iter().any(Option::is_some).then(|| DebtBreakdown {
            policy_fund: self.debt_policy_fund.unwrap_or(0),
            credit_loan: self.debt_credit_loan.unwrap_or(0),
            secondary_loan: self.debt_secondary_loan.unwrap_or(0),
            card_loan: self.debt_card_loan.unwrap_or(0),
        })
    }
}

/// Parse a yes/no flag stored as a bool, a 0/1 integer or a string.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "y" | "yes" => Some(true),
        "0" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

fn flag_from_any<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Option::<RawFlag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawFlag::Bool(value)) => Ok(Some(value)),
        Some(RawFlag::Int(0)) => Ok(Some(false)),
        Some(RawFlag::Int(1)) => Ok(Some(true)),
        Some(RawFlag::Int(other)) => Err(serde::de::Error::custom(format!(
            "technology flag must be 0 or 1, got {other}"
        ))),
        Some(RawFlag::Text(text)) => parse_flag(&text).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognised technology flag '{text}'"))
        }),
    }
}

/// Outstanding debt split by lender type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtBreakdown {
    #[serde(default, alias = "debt_policy_fund", alias = "policyFund")]
    pub policy_fund: i64,
    #[serde(default, alias = "debt_credit_loan", alias = "creditLoan")]
    pub credit_loan: i64,
    #[serde(default, alias = "debt_secondary_loan", alias = "secondaryLoan")]
    pub secondary_loan: i64,
    #[serde(default, alias = "debt_card_loan", alias = "cardLoan")]
    pub card_loan: i64,
}

impl DebtBreakdown {
    /// Sum of the non-negative parts. Saturates instead of overflowing.
    pub fn total(&self) -> i64 {
        [
            self.policy_fund,
            self.credit_loan,
            self.secondary_loan,
            self.card_loan,
        ]
        .iter()
        .fold(0i64, |acc, part| acc.saturating_add((*part).max(0)))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Card and secondary-lender loans, the costliest forms of small-business debt.
    pub fn high_cost(&self) -> i64 {
        self.card_loan
            .max(0)
            .saturating_add(self.secondary_loan.max(0))
    }
}

/// Industry tag used by program exclusion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Manufacturing,
    Wholesale,
    Retail,
    Food,
    Service,
    InformationTechnology,
    Construction,
    Finance,
    RealEstate,
    Other,
}

impl Industry {
    pub const fn label(self) -> &'static str {
        match self {
            Industry::Manufacturing => "manufacturing",
            Industry::Wholesale => "wholesale",
            Industry::Retail => "retail",
            Industry::Food => "food service",
            Industry::Service => "services",
            Industry::InformationTechnology => "information technology",
            Industry::Construction => "construction",
            Industry::Finance => "finance & insurance",
            Industry::RealEstate => "real estate",
            Industry::Other => "other",
        }
    }

    /// Lenient parse for CSV exports and form values.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let industry = match normalized.as_str() {
            "manufacturing" => Industry::Manufacturing,
            "wholesale" => Industry::Wholesale,
            "retail" => Industry::Retail,
            "food" | "food_service" | "restaurant" => Industry::Food,
            "service" | "services" => Industry::Service,
            "information_technology" | "it" | "software" => Industry::InformationTechnology,
            "construction" => Industry::Construction,
            "finance" | "insurance" | "finance_insurance" => Industry::Finance,
            "real_estate" | "realestate" => Industry::RealEstate,
            "other" => Industry::Other,
            _ => return None,
        };
        Some(industry)
    }
}

/// Canonical applicant snapshot consumed by the engine. Immutable per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub credit_score_nice: Option<i32>,
    pub credit_score_kcb: Option<i32>,
    pub annual_revenue: i64,
    pub total_debt: i64,
    pub debt_breakdown: DebtBreakdown,
    pub has_technology_certification: bool,
    pub business_age_years: u32,
    pub industry: Option<Industry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
}

impl ApplicantProfile {
    /// Average of both bureau scores, or whichever one is present.
    pub fn combined_credit_score(&self) -> Option<f64> {
        match (self.credit_score_nice, self.credit_score_kcb) {
            (Some(nice), Some(kcb)) => Some((f64::from(nice) + f64::from(kcb)) / 2.0),
            (Some(score), None) | (None, Some(score)) => Some(f64::from(score)),
            (None, None) => None,
        }
    }

    pub fn revenue(&self) -> i64 {
        self.annual_revenue.max(0)
    }

    pub fn debt(&self) -> i64 {
        self.total_debt.max(0)
    }

    /// Debt over revenue, clamped to `[0, ceiling]`.
    ///
    /// No revenue with outstanding debt is treated as the worst ratio; no revenue and no
    /// debt is zero.
    pub fn debt_ratio(&self, ceiling: f64) -> f64 {
        let revenue = self.revenue();
        let debt = self.debt();
        if revenue == 0 {
            return if debt > 0 { ceiling } else { 0.0 };
        }

        let ratio = debt as f64 / revenue as f64;
        if ratio.is_finite() {
            ratio.clamp(0.0, ceiling)
        } else {
            ceiling
        }
    }
}

/// SOHO creditworthiness tier, declared best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub const fn ordered() -> [Self; 5] {
        [Self::S, Self::A, Self::B, Self::C, Self::D]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    /// True when `self` is the same tier as `floor` or better.
    pub fn at_least(self, floor: Grade) -> bool {
        self <= floor
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
