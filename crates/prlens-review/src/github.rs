use std::time::Duration;

use async_trait::async_trait;
use prlens_activity::aggregate::format_event_date;
use prlens_core::{
    ActivityEvent, CommitRecord, GitHubApi, GitHubConfig, PrlensError, PullRequestSnapshot,
    ReviewRecord, UserRef,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// GitHub REST client: reads go through `reqwest`, the review comment is
/// posted through `octocrab`.
///
/// # Examples
///
/// ```
/// use prlens_review::github::parse_repository;
///
/// let (owner, repo) = parse_repository("rust-lang/rust").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client from GitHub configuration. The token is optional for
    /// reads of public data.
    ///
    /// # Errors
    ///
    /// Returns [`PrlensError::Config`] if the base URL is invalid or either
    /// HTTP client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, PrlensError> {
        let api_base = config.api_base.trim_end_matches('/').to_string();

        let mut builder = octocrab::Octocrab::builder()
            .base_uri(api_base.as_str())
            .map_err(|e| PrlensError::Config(format!("invalid GitHub API URL {api_base}: {e}")))?;
        if let Some(token) = &config.token {
            builder = builder.personal_token(token.clone());
        }
        let octocrab = builder
            .build()
            .map_err(|e| PrlensError::Config(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PrlensError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http,
            api_base,
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.api_base, path.trim_start_matches('/'))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, subject: &str) -> Result<T, PrlensError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| PrlensError::Network(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PrlensError::from_status(status.as_u16(), subject, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PrlensError::Network(format!("failed to read response from {url}: {e}")))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Deserialize)]
struct ApiReview {
    state: Option<String>,
    user: Option<UserRef>,
    submitted_at: Option<String>,
}

#[derive(Deserialize)]
struct ApiCommit {
    commit: Option<ApiCommitDetail>,
}

#[derive(Deserialize)]
struct ApiCommitDetail {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ApiFile {
    filename: String,
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_user_events(&self, username: &str) -> Result<Vec<ActivityEvent>, PrlensError> {
        self.get_json(&format!("users/{username}/events"), &format!("User {username}"))
            .await
    }

    async fn get_pull_request(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestSnapshot, PrlensError> {
        self.get_json(
            &format!("repos/{repo}/pulls/{number}"),
            &format!("PR #{number} in {repo}"),
        )
        .await
    }

    async fn list_pull_request_reviews(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewRecord>, PrlensError> {
        let reviews: Vec<ApiReview> = self
            .get_json(
                &format!("repos/{repo}/pulls/{number}/reviews"),
                &format!("Reviews of PR #{number} in {repo}"),
            )
            .await?;

        Ok(reviews
            .into_iter()
            .map(|r| ReviewRecord {
                state: r.state.unwrap_or_else(|| "unknown".into()),
                reviewer: r
                    .user
                    .and_then(|u| u.login)
                    .unwrap_or_else(|| "unknown".into()),
                date: format_event_date(r.submitted_at.as_deref()),
            })
            .collect())
    }

    async fn list_commits(&self, commits_ref: &str) -> Result<Vec<CommitRecord>, PrlensError> {
        let commits: Vec<ApiCommit> = self.get_json(commits_ref, "Commit list").await?;
        Ok(commits
            .into_iter()
            .filter_map(|c| c.commit.and_then(|d| d.message))
            .map(|message| CommitRecord { message })
            .collect())
    }

    async fn post_comment(
        &self,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<bool, PrlensError> {
        let route = format!("/repos/{repo}/pulls/{number}/reviews");
        let payload = serde_json::json!({
            "event": "COMMENT",
            "body": body,
        });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| PrlensError::Post(format!("{repo}#{number}: {e}")))?;

        Ok(true)
    }

    async fn list_changed_files(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<String>, PrlensError> {
        let files: Vec<ApiFile> = self
            .get_json(
                &format!("repos/{repo}/pulls/{number}/files"),
                &format!("Files of PR #{number} in {repo}"),
            )
            .await?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }
}

/// Parse a repository slug (`owner/repo`, as in `GITHUB_REPOSITORY`).
///
/// # Errors
///
/// Returns [`PrlensError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use prlens_review::github::parse_repository;
///
/// let (owner, repo) = parse_repository("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
///
/// assert!(parse_repository("hello-world").is_err());
/// ```
pub fn parse_repository(slug: &str) -> Result<(String, String), PrlensError> {
    let invalid = || {
        PrlensError::Config(format!(
            "invalid repository '{slug}', expected owner/repo"
        ))
    };
    let (owner, repo) = slug.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}
