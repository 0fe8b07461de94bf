use std::fmt;

use serde::{Deserialize, Serialize};

/// Weight of one added line.
pub const ADDITION_WEIGHT: f64 = 0.5;
/// Weight of one deleted line.
pub const DELETION_WEIGHT: f64 = 0.25;
/// Weight of one changed file.
pub const FILE_WEIGHT: f64 = 10.0;
/// Weight of one commit.
pub const COMMIT_WEIGHT: f64 = 5.0;
/// Weight of one review.
pub const REVIEW_WEIGHT: f64 = 8.0;

/// Inputs of the impact score. Missing size fields count as zero.
///
/// # Examples
///
/// ```
/// use prlens_metrics::impact::ImpactInputs;
///
/// let inputs = ImpactInputs { additions: Some(10), ..Default::default() };
/// assert_eq!(inputs.deletions, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactInputs {
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changed_files: Option<u64>,
    pub commit_count: usize,
    pub review_count: usize,
}

/// Size/activity classification of a pull request.
///
/// # Examples
///
/// ```
/// use prlens_metrics::impact::ImpactCategory;
///
/// assert_eq!(ImpactCategory::from_score(199.9), ImpactCategory::Small);
/// assert_eq!(ImpactCategory::from_score(200.0), ImpactCategory::Medium);
/// assert_eq!(ImpactCategory::from_score(800.0), ImpactCategory::Large);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactCategory {
    /// Score below 200.
    Small,
    /// Score 200 up to (excluding) 800.
    Medium,
    /// Score 800 and above.
    Large,
}

impl ImpactCategory {
    /// Map a numeric score to a category.
    pub fn from_score(score: f64) -> Self {
        if score < 200.0 {
            ImpactCategory::Small
        } else if score < 800.0 {
            ImpactCategory::Medium
        } else {
            ImpactCategory::Large
        }
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactCategory::Small => write!(f, "Small PR"),
            ImpactCategory::Medium => write!(f, "Medium PR"),
            ImpactCategory::Large => write!(f, "Large / High-risk PR"),
        }
    }
}

/// Weighted size/activity score of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactScore {
    /// Raw weighted score (unbounded, non-negative).
    pub score: f64,
    /// Category derived from the score.
    pub category: ImpactCategory,
}

/// Compute the impact score:
/// `additions*0.5 + deletions*0.25 + files*10 + commits*5 + reviews*8`.
///
/// # Examples
///
/// ```
/// use prlens_metrics::impact::{compute_impact_score, ImpactCategory, ImpactInputs};
///
/// let impact = compute_impact_score(&ImpactInputs {
///     additions: Some(200),
///     deletions: Some(100),
///     changed_files: Some(10),
///     commit_count: 5,
///     review_count: 2,
/// });
/// assert_eq!(impact.score, 266.0);
/// assert_eq!(impact.category, ImpactCategory::Medium);
/// ```
pub fn compute_impact_score(inputs: &ImpactInputs) -> ImpactScore {
    let additions = inputs.additions.unwrap_or(0) as f64;
    let deletions = inputs.deletions.unwrap_or(0) as f64;
    let changed_files = inputs.changed_files.unwrap_or(0) as f64;

    let score = additions * ADDITION_WEIGHT
        + deletions * DELETION_WEIGHT
        + changed_files * FILE_WEIGHT
        + inputs.commit_count as f64 * COMMIT_WEIGHT
        + inputs.review_count as f64 * REVIEW_WEIGHT;

    ImpactScore {
        score,
        category: ImpactCategory::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_pr() {
        let impact = compute_impact_score(&ImpactInputs {
            additions: Some(50),
            deletions: Some(20),
            changed_files: Some(2),
            commit_count: 1,
            review_count: 0,
        });
        // 50*0.5 + 20*0.25 = 30 from size, plus 20 for files and 5 for the commit
        assert_eq!(impact.score, 55.0);
        assert_eq!(impact.category, ImpactCategory::Small);
    }

    #[test]
    fn medium_pr() {
        let impact = compute_impact_score(&ImpactInputs {
            additions: Some(200),
            deletions: Some(100),
            changed_files: Some(10),
            commit_count: 5,
            review_count: 2,
        });
        assert_eq!(impact.score, 266.0);
        assert_eq!(impact.category, ImpactCategory::Medium);
    }

    #[test]
    fn large_pr() {
        let impact = compute_impact_score(&ImpactInputs {
            additions: Some(1000),
            deletions: Some(500),
            changed_files: Some(20),
            commit_count: 10,
            review_count: 5,
        });
        assert!(impact.score >= 800.0);
        assert_eq!(impact.category, ImpactCategory::Large);
    }

    #[test]
    fn missing_fields_score_zero() {
        let impact = compute_impact_score(&ImpactInputs::default());
        assert_eq!(impact.score, 0.0);
        assert_eq!(impact.category, ImpactCategory::Small);
    }

    #[test]
    fn category_labels() {
        assert_eq!(ImpactCategory::Small.to_string(), "Small PR");
        assert_eq!(ImpactCategory::Medium.to_string(), "Medium PR");
        assert_eq!(ImpactCategory::Large.to_string(), "Large / High-risk PR");
    }
}
