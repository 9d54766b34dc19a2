use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::Grade;

/// Tunable constants behind grading and limit estimation.
///
/// Every cutoff and coefficient lives here so policy changes never touch the
/// algorithms. Money is in KRW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub credit_floor: f64,
    pub credit_ceiling: f64,
    pub credit_weight: f64,
    /// Upper bound applied to debt/revenue before any lookup.
    pub debt_ratio_ceiling: f64,
    /// `(max ratio, points)`, ascending by ratio. First band that fits wins.
    pub debt_ratio_bands: Vec<RatioBand>,
    /// `(min years, points)`, descending by years. First band that fits wins.
    pub business_age_bands: Vec<AgeBand>,
    pub technology_bonus: f64,
    /// Minimum points per grade, best grade first.
    pub grade_thresholds: Vec<GradeThreshold>,
    pub limit: LimitPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub max_ratio: f64,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub min_years: u32,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeThreshold {
    pub grade: Grade,
    pub min_points: f64,
}

/// Coefficients for the maximum-loan-limit formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitPolicy {
    pub base_by_grade: Vec<GradeBase>,
    /// Revenue at which the multiplier reaches 1.0.
    pub revenue_reference: u64,
    pub max_revenue_multiplier: f64,
    /// Penalty per unit of debt/revenue; the factor is `1 - slope * ratio`.
    pub debt_penalty_slope: f64,
    pub technology_multiplier: f64,
    pub max_loan_cap: u64,
    pub rounding_unit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBase {
    pub grade: Grade,
    pub amount: u64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            credit_floor: 300.0,
            credit_ceiling: 1000.0,
            credit_weight: 50.0,
            debt_ratio_ceiling: 100.0,
            debt_ratio_bands: vec![
                RatioBand {
                    max_ratio: 0.2,
                    points: 25.0,
                },
                RatioBand {
                    max_ratio: 0.5,
                    points: 18.0,
                },
                RatioBand {
                    max_ratio: 1.0,
                    points: 10.0,
                },
                RatioBand {
                    max_ratio: 2.0,
                    points: 4.0,
                },
            ],
            business_age_bands: vec![
                AgeBand {
                    min_years: 7,
                    points: 15.0,
                },
                AgeBand {
                    min_years: 3,
                    points: 11.0,
                },
                AgeBand {
                    min_years: 1,
                    points: 6.0,
                },
            ],
            technology_bonus: 10.0,
            grade_thresholds: vec![
                GradeThreshold {
                    grade: Grade::S,
                    min_points: 85.0,
                },
                GradeThreshold {
                    grade: Grade::A,
                    min_points: 70.0,
                },
                GradeThreshold {
                    grade: Grade::B,
                    min_points: 55.0,
                },
                GradeThreshold {
                    grade: Grade::C,
                    min_points: 40.0,
                },
            ],
            limit: LimitPolicy::default(),
        }
    }
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            base_by_grade: vec![
                GradeBase {
                    grade: Grade::S,
                    amount: 300_000_000,
                },
                GradeBase {
                    grade: Grade::A,
                    amount: 200_000_000,
                },
                GradeBase {
                    grade: Grade::B,
                    amount: 100_000_000,
                },
                GradeBase {
                    grade: Grade::C,
                    amount: 50_000_000,
                },
                GradeBase {
                    grade: Grade::D,
                    amount: 20_000_000,
                },
            ],
            revenue_reference: 100_000_000,
            max_revenue_multiplier: 3.0,
            debt_penalty_slope: 0.5,
            technology_multiplier: 1.2,
            max_loan_cap: 1_000_000_000,
            rounding_unit: 1_000_000,
        }
    }
}

impl ScoringPolicy {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        let policy: ScoringPolicy = serde_json::from_reader(reader)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject tables that would break grade ordering or produce nonsense limits.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.credit_ceiling <= self.credit_floor || !self.credit_ceiling.is_finite() {
            return Err(PolicyError::Invalid(
                "credit_ceiling must exceed credit_floor".to_string(),
            ));
        }

        let weights = [
            self.credit_weight,
            self.technology_bonus,
            self.debt_ratio_ceiling,
        ];
        if weights.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(PolicyError::Invalid(
                "weights must be finite and non-negative".to_string(),
            ));
        }

        if self
            .debt_ratio_bands
            .windows(2)
            .any(|pair| pair[0].max_ratio >= pair[1].max_ratio)
        {
            return Err(PolicyError::Invalid(
                "debt_ratio_bands must be ascending by max_ratio".to_string(),
            ));
        }

        if self
            .business_age_bands
            .windows(2)
            .any(|pair| pair[0].min_years <= pair[1].min_years)
        {
            return Err(PolicyError::Invalid(
                "business_age_bands must be descending by min_years".to_string(),
            ));
        }

        if self
            .grade_thresholds
            .windows(2)
            .any(|pair| pair[0].grade >= pair[1].grade || pair[0].min_points <= pair[1].min_points)
        {
            return Err(PolicyError::Invalid(
                "grade_thresholds must run best grade first with strictly falling cutoffs"
                    .to_string(),
            ));
        }

        self.limit.validate()
    }

    /// Bucket a point total into a grade. Anything below every cutoff is `D`.
    pub fn grade_for(&self, points: f64) -> Grade {
        self.grade_thresholds
            .iter()
            .find(|threshold| points >= threshold.min_points)
            .map(|threshold| threshold.grade)
            .unwrap_or(Grade::D)
    }

    pub fn debt_ratio_points(&self, ratio: f64) -> f64 {
        self.debt_ratio_bands
            .iter()
            .find(|band| ratio <= band.max_ratio)
            .map(|band| band.points)
            .unwrap_or(0.0)
    }

    pub fn business_age_points(&self, years: u32) -> f64 {
        self.business_age_bands
            .iter()
            .find(|band| years >= band.min_years)
            .map(|band| band.points)
            .unwrap_or(0.0)
    }

    /// Largest attainable point total, used to scale scores for display.
    pub fn max_points(&self) -> f64 {
        let ratio = self
            .debt_ratio_bands
            .iter()
            .map(|band| band.points)
            .fold(0.0, f64::max);
        let age = self
            .business_age_bands
            .iter()
            .map(|band| band.points)
            .fold(0.0, f64::max);
        self.credit_weight + ratio + age + self.technology_bonus
    }
}

impl LimitPolicy {
    /// Base amount for a grade. Grades missing from the table fall back to the next
    /// worse grade that is present, or zero.
    pub fn base_for(&self, grade: Grade) -> u64 {
        Grade::ordered()
            .into_iter()
            .filter(|candidate| *candidate >= grade)
            .find_map(|candidate| {
                self.base_by_grade
                    .iter()
                    .find(|entry| entry.grade == candidate)
                    .map(|entry| entry.amount)
            })
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        let bases: Vec<u64> = Grade::ordered()
            .into_iter()
            .map(|grade| self.base_for(grade))
            .collect();
        if bases.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(PolicyError::Invalid(
                "base_by_grade must not increase as grades get worse".to_string(),
            ));
        }

        let factors = [
            self.max_revenue_multiplier,
            self.debt_penalty_slope,
            self.technology_multiplier,
        ];
        if factors.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(PolicyError::Invalid(
                "limit multipliers must be finite and non-negative".to_string(),
            ));
        }

        if self.revenue_reference == 0 {
            return Err(PolicyError::Invalid(
                "revenue_reference must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Failure loading or validating a scoring policy file.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read scoring policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("scoring policy is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scoring policy rejected: {0}")]
    Invalid(String),
}
