use async_trait::async_trait;

use crate::error::PrlensError;
use crate::types::{ActivityEvent, CommitRecord, PullRequestSnapshot, ReviewRecord};

/// The GitHub operations prlens depends on.
///
/// The REST implementation lives in `prlens-review`; pipeline phases take any
/// implementor so they can run against an in-memory fake in tests.
/// `repo` arguments are full repository names (`owner/name`).
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// List a user's recent public events.
    ///
    /// Fails with [`PrlensError::NotFound`] for an unknown user and
    /// [`PrlensError::RateLimited`] when throttled.
    async fn list_user_events(&self, username: &str) -> Result<Vec<ActivityEvent>, PrlensError>;

    /// Fetch the full pull request.
    async fn get_pull_request(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestSnapshot, PrlensError>;

    /// List submitted reviews of a pull request.
    async fn list_pull_request_reviews(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewRecord>, PrlensError>;

    /// List commits from a pull request's `commits_url`.
    async fn list_commits(&self, commits_ref: &str) -> Result<Vec<CommitRecord>, PrlensError>;

    /// Post `body` as a review comment. Returns `true` once GitHub accepted it.
    async fn post_comment(&self, repo: &str, number: u64, body: &str)
        -> Result<bool, PrlensError>;

    /// List the file names touched by a pull request.
    async fn list_changed_files(&self, repo: &str, number: u64)
        -> Result<Vec<String>, PrlensError>;
}
