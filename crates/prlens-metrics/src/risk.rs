use std::fmt;

use serde::{Deserialize, Serialize};

/// Lines changed above which the large-diff factor fires.
pub const LARGE_DIFF_THRESHOLD: u64 = 500;
/// Changed files above which the many-files factor fires.
pub const MANY_FILES_THRESHOLD: u64 = 10;

/// Weight of a large diff.
pub const LARGE_DIFF_WEIGHT: f64 = 0.40;
/// Weight of touching many files.
pub const MANY_FILES_WEIGHT: f64 = 0.35;
/// Weight of touching core folders. Needs file paths; not in the default model.
pub const CORE_CHANGES_WEIGHT: f64 = 0.50;
/// Weight of a change without test updates. Needs file paths; not in the default model.
pub const NO_TESTS_WEIGHT: f64 = 0.20;

/// Size inputs of the regression-risk model. Missing values count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskInputs {
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changed_files: Option<u64>,
}

impl RiskInputs {
    /// Additions plus deletions.
    pub fn lines_changed(&self) -> u64 {
        self.additions.unwrap_or(0) + self.deletions.unwrap_or(0)
    }

    /// Changed files.
    pub fn files_changed(&self) -> u64 {
        self.changed_files.unwrap_or(0)
    }
}

/// Categorical regression-risk classification.
///
/// # Examples
///
/// ```
/// use prlens_metrics::risk::RiskCategory;
///
/// assert_eq!(RiskCategory::from_score(0.4), RiskCategory::Low);
/// assert_eq!(RiskCategory::from_score(0.41), RiskCategory::Medium);
/// assert_eq!(RiskCategory::from_score(0.71), RiskCategory::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    /// Score up to 0.4.
    Low,
    /// Score above 0.4 up to 0.7.
    Medium,
    /// Score above 0.7.
    High,
}

impl RiskCategory {
    /// Map a score in `[0, 1]` to a category.
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            RiskCategory::High
        } else if score > 0.4 {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskCategory::Low => write!(f, "Low risk"),
            RiskCategory::Medium => write!(f, "Medium risk"),
            RiskCategory::High => write!(f, "High regression risk"),
        }
    }
}

/// A binary risk factor: fires when `applies` holds and contributes `weight`.
#[derive(Clone, Copy)]
pub struct RiskFactor {
    /// Short identifier shown in reports.
    pub name: &'static str,
    /// Probability-like weight in `[0, 1]`.
    pub weight: f64,
    /// Predicate over the model inputs.
    pub applies: fn(&RiskInputs) -> bool,
}

impl fmt::Debug for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskFactor")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

impl RiskFactor {
    /// The large-diff factor (`lines > 500`, weight 0.40).
    pub fn large_diff() -> Self {
        Self {
            name: "large-diff",
            weight: LARGE_DIFF_WEIGHT,
            applies: |inputs| inputs.lines_changed() > LARGE_DIFF_THRESHOLD,
        }
    }

    /// The many-files factor (`files > 10`, weight 0.35).
    pub fn many_files() -> Self {
        Self {
            name: "many-files",
            weight: MANY_FILES_WEIGHT,
            applies: |inputs| inputs.files_changed() > MANY_FILES_THRESHOLD,
        }
    }
}

/// Regression-risk result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionRisk {
    /// Combined score in `[0, 1]`.
    pub score: f64,
    /// Category derived from the score.
    pub category: RiskCategory,
    /// Names of the factors that fired, in model order.
    pub factors: Vec<&'static str>,
}

/// Noisy-OR combination of risk factors.
///
/// The default model contains the two size factors. Factors that need file
/// path data are added with [`RiskModel::with_factor`].
///
/// # Examples
///
/// ```
/// use prlens_metrics::risk::{RiskFactor, RiskInputs, RiskModel};
///
/// let model = RiskModel::default().with_factor(RiskFactor {
///     name: "always",
///     weight: 0.5,
///     applies: |_| true,
/// });
/// let risk = model.evaluate(&RiskInputs::default());
/// assert_eq!(risk.score, 0.5);
/// assert_eq!(risk.factors, vec!["always"]);
/// ```
#[derive(Debug, Clone)]
pub struct RiskModel {
    factors: Vec<RiskFactor>,
}

impl Default for RiskModel {
    fn default() -> Self {
        Self {
            factors: vec![RiskFactor::large_diff(), RiskFactor::many_files()],
        }
    }
}

impl RiskModel {
    /// Append a factor to the model.
    pub fn with_factor(mut self, factor: RiskFactor) -> Self {
        self.factors.push(factor);
        self
    }

    /// Factors in evaluation order.
    pub fn factors(&self) -> &[RiskFactor] {
        &self.factors
    }

    /// Evaluate the model: `score = 1 - Π(1 - w_i)` over firing factors.
    pub fn evaluate(&self, inputs: &RiskInputs) -> RegressionRisk {
        let mut product = 1.0;
        let mut fired = Vec::new();
        for factor in &self.factors {
            if (factor.applies)(inputs) {
                product *= 1.0 - factor.weight.clamp(0.0, 1.0);
                fired.push(factor.name);
            }
        }
        let score = 1.0 - product;
        RegressionRisk {
            score,
            category: RiskCategory::from_score(score),
            factors: fired,
        }
    }
}

/// Compute regression risk with the default model.
///
/// # Examples
///
/// ```
/// use prlens_metrics::risk::{compute_regression_risk, RiskCategory, RiskInputs};
///
/// let risk = compute_regression_risk(&RiskInputs {
///     additions: Some(600),
///     deletions: Some(100),
///     changed_files: Some(15),
/// });
/// assert!((risk.score - 0.61).abs() < 1e-9);
/// assert_eq!(risk.category, RiskCategory::Medium);
/// ```
pub fn compute_regression_risk(inputs: &RiskInputs) -> RegressionRisk {
    RiskModel::default().evaluate(inputs)
}
