//! The two end-to-end flows: ranking a user's recent pull request activity,
//! and reviewing a single pull request.

use prlens_activity::aggregate::aggregate;
use prlens_activity::enrich::{enrich, EnrichStats};
use prlens_activity::rank::{rank, PrSummary};
use prlens_core::{ActivityEvent, ChecksConfig, GitHubApi, PrAggregate, PrlensError, SortKey};
use prlens_metrics::PrMetrics;

use crate::checks::{run_configured_checks, CheckOutcome};
use crate::report::{format_review_comment, format_summary};

/// Ranked summaries of a user's pull request activity.
#[derive(Debug, Clone, Default)]
pub struct ActivityReport {
    pub summaries: Vec<PrSummary>,
    pub stats: EnrichStats,
}

impl ActivityReport {
    /// Summaries separated by a blank line.
    pub fn render(&self) -> String {
        self.summaries
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

/// Aggregate, enrich, score, render and rank an event feed.
///
/// Enrichment failures only degrade individual summaries.
pub async fn build_activity_report<G>(
    events: &[ActivityEvent],
    github: &G,
    sort: Option<SortKey>,
    limit: Option<usize>,
) -> ActivityReport
where
    G: GitHubApi + ?Sized,
{
    let mut index = aggregate(events);
    tracing::info!(events = events.len(), prs = index.len(), "aggregated events");

    let stats = enrich(&mut index, github).await;

    let summaries = index
        .iter()
        .map(|agg| {
            let metrics = PrMetrics::for_aggregate(agg);
            PrSummary::new(agg, &metrics, format_summary(agg, &metrics))
        })
        .collect();

    ActivityReport {
        summaries: rank(summaries, sort, limit),
        stats,
    }
}

/// Everything needed to publish a review of one pull request.
#[derive(Debug, Clone)]
pub struct PreparedReview {
    pub aggregate: PrAggregate,
    pub metrics: PrMetrics,
    pub checks: Vec<CheckOutcome>,
    pub comment: String,
}

impl PreparedReview {
    /// `true` when every executed check passed.
    pub fn checks_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// Fetch a pull request with its reviews, commits and changed files.
///
/// # Errors
///
/// Only the pull request lookup itself is fatal; the follow-up fetches
/// degrade to empty or absent data with a warning.
pub async fn collect_pull_request<G>(
    github: &G,
    repo: &str,
    number: u64,
) -> Result<PrAggregate, PrlensError>
where
    G: GitHubApi + ?Sized,
{
    let snapshot = github.get_pull_request(repo, number).await?;
    let mut aggregate = PrAggregate::new(repo, snapshot);
    let key = aggregate.key();

    match github.list_pull_request_reviews(repo, number).await {
        Ok(reviews) => aggregate.reviews = reviews,
        Err(e) => tracing::warn!(%key, error = %e, "could not fetch reviews"),
    }

    if let Some(commits_url) = aggregate.snapshot.commits_url.clone() {
        aggregate.commit_messages = Some(match github.list_commits(&commits_url).await {
            Ok(commits) => commits.iter().map(|c| c.subject().to_string()).collect(),
            Err(e) => {
                tracing::warn!(%key, error = %e, "could not fetch commits");
                Vec::new()
            }
        });
    }

    match github.list_changed_files(repo, number).await {
        Ok(files) => aggregate.changed_files = Some(files),
        Err(e) => tracing::warn!(%key, error = %e, "could not fetch changed files"),
    }

    Ok(aggregate)
}

/// Collect a pull request, run the configured checks and render the review
/// comment.
pub async fn prepare_review<G>(
    github: &G,
    repo: &str,
    number: u64,
    checks: &ChecksConfig,
) -> Result<PreparedReview, PrlensError>
where
    G: GitHubApi + ?Sized,
{
    let aggregate = collect_pull_request(github, repo, number).await?;
    let metrics = PrMetrics::for_aggregate(&aggregate);
    let outcomes = run_configured_checks(checks).await;
    let comment = format_review_comment(&aggregate, &metrics, &outcomes, checks.max_output_lines);

    Ok(PreparedReview {
        aggregate,
        metrics,
        checks: outcomes,
        comment,
    })
}

/// Post a prepared review comment.
///
/// # Errors
///
/// Returns [`PrlensError::Post`] if GitHub does not acknowledge the comment.
pub async fn publish_review<G>(
    github: &G,
    repo: &str,
    number: u64,
    review: &PreparedReview,
) -> Result<(), PrlensError>
where
    G: GitHubApi + ?Sized,
{
    if github.post_comment(repo, number, &review.comment).await? {
        tracing::info!(repo, number, "review comment posted");
        Ok(())
    } else {
        Err(PrlensError::Post(format!("{repo}#{number}: not acknowledged")))
    }
}
