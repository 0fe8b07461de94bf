//! Follow-up fetches that fill fields event payloads left out.

use prlens_core::{GitHubApi, PrAggregate};
use serde::Serialize;

use crate::aggregate::PrIndex;

/// Counters describing one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichStats {
    /// Full pull request fetches that succeeded.
    pub pulls_fetched: usize,
    /// Full pull request fetches that failed; partial data was kept.
    pub pull_failures: usize,
    /// Commit lists fetched.
    pub commits_fetched: usize,
    /// Commit list fetches that failed; commits were marked as attempted.
    pub commit_failures: usize,
}

/// Enrich every aggregate, one at a time, in index order.
///
/// Failures are logged and isolated to the aggregate they concern; the pass
/// never aborts. Fields that are already present are not fetched again, so
/// running the pass twice costs no extra requests.
pub async fn enrich<G>(index: &mut PrIndex, github: &G) -> EnrichStats
where
    G: GitHubApi + ?Sized,
{
    let mut stats = EnrichStats::default();
    for aggregate in index.iter_mut() {
        enrich_one(aggregate, github, &mut stats).await;
    }
    tracing::debug!(?stats, "enrichment finished");
    stats
}

/// Enrich a single aggregate in place.
pub async fn enrich_one<G>(aggregate: &mut PrAggregate, github: &G, stats: &mut EnrichStats)
where
    G: GitHubApi + ?Sized,
{
    let key = aggregate.key();
    let number = aggregate.snapshot.number;

    if !aggregate.snapshot.has_size_fields() {
        tracing::debug!(%key, "fetching full pull request");
        match github.get_pull_request(&aggregate.repo_name, number).await {
            Ok(full) => {
                aggregate.snapshot.merge_fetched(full);
                stats.pulls_fetched += 1;
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "could not fetch full PR data");
                stats.pull_failures += 1;
            }
        }
    }

    if aggregate.commit_messages.is_none() {
        if let Some(commits_url) = aggregate.snapshot.commits_url.clone() {
            tracing::debug!(%key, "fetching commits");
            match github.list_commits(&commits_url).await {
                Ok(commits) => {
                    aggregate.commit_messages =
                        Some(commits.iter().map(|c| c.subject().to_string()).collect());
                    stats.commits_fetched += 1;
                }
                Err(e) => {
                    tracing::warn!(%key, error = %e, "could not fetch commits");
                    aggregate.commit_messages = Some(Vec::new());
                    stats.commit_failures += 1;
                }
            }
        }
    }
}
