//! Ordering and truncation of per-PR summaries.

use prlens_core::{PrAggregate, SortKey};
use prlens_metrics::PrMetrics;
use serde::Serialize;

/// A rendered pull request summary together with its ranking keys.
///
/// # Examples
///
/// ```
/// use prlens_activity::rank::PrSummary;
/// use prlens_core::{PrAggregate, PullRequestSnapshot};
/// use prlens_metrics::PrMetrics;
///
/// let agg = PrAggregate::new(
///     "octo/hello",
///     PullRequestSnapshot { additions: Some(3), ..PullRequestSnapshot::new(1) },
/// );
/// let metrics = PrMetrics::for_aggregate(&agg);
/// let summary = PrSummary::new(&agg, &metrics, "PR #1".into());
/// assert_eq!(summary.key, "octo/hello#1");
/// assert_eq!(summary.lines, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrSummary {
    /// Aggregate key.
    pub key: String,
    /// Additions plus deletions, missing values counted as zero.
    pub lines: u64,
    /// Impact score.
    pub impact: f64,
    /// Number of reviews seen.
    pub review_count: usize,
    /// Rendered text.
    pub text: String,
}

impl PrSummary {
    /// Capture the ranking keys of `aggregate` next to its rendered `text`.
    pub fn new(aggregate: &PrAggregate, metrics: &PrMetrics, text: String) -> Self {
        Self {
            key: aggregate.key(),
            lines: aggregate.snapshot.lines_changed(),
            impact: metrics.impact.score,
            review_count: aggregate.reviews.len(),
            text,
        }
    }
}

/// Sort summaries in descending order of `sort` and keep the first `limit`.
///
/// The sort is stable: equal keys keep their input order. `None` keeps input
/// order entirely. A limit of zero means no limit.
///
/// # Examples
///
/// ```
/// use prlens_activity::rank::{rank, PrSummary};
/// use prlens_core::SortKey;
///
/// let s = |key: &str, reviews| PrSummary {
///     key: key.into(), lines: 0, impact: 0.0, review_count: reviews, text: key.into(),
/// };
/// let ranked = rank(vec![s("a", 1), s("b", 3), s("c", 3)], Some(SortKey::Reviews), Some(2));
/// let keys: Vec<_> = ranked.iter().map(|r| r.key.as_str()).collect();
/// assert_eq!(keys, vec!["b", "c"]);
/// ```
pub fn rank(
    mut summaries: Vec<PrSummary>,
    sort: Option<SortKey>,
    limit: Option<usize>,
) -> Vec<PrSummary> {
    match sort {
        Some(SortKey::Lines) => summaries.sort_by(|a, b| b.lines.cmp(&a.lines)),
        Some(SortKey::Impact) => summaries.sort_by(|a, b| b.impact.total_cmp(&a.impact)),
        Some(SortKey::Reviews) => summaries.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
        None => {}
    }

    if let Some(limit) = limit.filter(|&n| n > 0) {
        summaries.truncate(limit);
    }
    summaries
}
