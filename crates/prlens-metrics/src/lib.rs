//! Pull request heuristics: impact score, regression risk, and change type.
//!
//! Every function here is pure. Missing size fields are read as zero at the
//! point of scoring; the underlying records are never modified.

pub mod classify;
pub mod impact;
pub mod risk;

use prlens_core::PrAggregate;
use serde::Serialize;

use crate::classify::{classify_type, PrType};
use crate::impact::{compute_impact_score, ImpactInputs, ImpactScore};
use crate::risk::{compute_regression_risk, RegressionRisk, RiskInputs};

/// All derived metrics of one pull request.
///
/// # Examples
///
/// ```
/// use prlens_core::{PrAggregate, PullRequestSnapshot};
/// use prlens_metrics::PrMetrics;
///
/// let agg = PrAggregate::new("octo/hello", PullRequestSnapshot::new(1));
/// let metrics = PrMetrics::for_aggregate(&agg);
/// assert_eq!(metrics.impact.score, 0.0);
/// assert!(metrics.pr_type.is_none());
/// assert!(metrics.regression_risk.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrMetrics {
    pub impact: ImpactScore,
    pub pr_type: Option<PrType>,
    /// Only computed when additions and deletions are both known.
    pub regression_risk: Option<RegressionRisk>,
}

impl PrMetrics {
    /// Compute metrics from an aggregate's current state.
    pub fn for_aggregate(aggregate: &PrAggregate) -> Self {
        let snapshot = &aggregate.snapshot;
        let commits = aggregate.commits();

        let impact = compute_impact_score(&ImpactInputs {
            additions: snapshot.additions,
            deletions: snapshot.deletions,
            changed_files: snapshot.changed_files,
            commit_count: commits.len(),
            review_count: aggregate.reviews.len(),
        });

        let regression_risk = (snapshot.additions.is_some() && snapshot.deletions.is_some())
            .then(|| {
                compute_regression_risk(&RiskInputs {
                    additions: snapshot.additions,
                    deletions: snapshot.deletions,
                    changed_files: snapshot.changed_files,
                })
            });

        Self {
            impact,
            pr_type: classify_type(commits),
            regression_risk,
        }
    }
}
