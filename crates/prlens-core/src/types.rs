use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a GitHub activity event.
///
/// Only pull request and pull request review events carry data prlens uses;
/// every other event type deserializes to [`EventKind::Other`].
///
/// # Examples
///
/// ```
/// use prlens_core::EventKind;
///
/// let kind: EventKind = serde_json::from_str("\"PushEvent\"").unwrap();
/// assert_eq!(kind, EventKind::Other);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A pull request was opened, closed, edited, ...
    PullRequestEvent,
    /// A review was submitted on a pull request.
    PullRequestReviewEvent,
    /// Any event type prlens ignores.
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of a user's public activity feed (`GET /users/{user}/events`).
///
/// # Examples
///
/// ```
/// use prlens_core::{ActivityEvent, EventKind};
///
/// let json = r#"{
///     "type": "PullRequestEvent",
///     "repo": { "name": "octo/hello" },
///     "payload": { "pull_request": { "number": 7, "title": "Add greeting" } },
///     "created_at": "2024-03-05T10:00:00Z"
/// }"#;
/// let event: ActivityEvent = serde_json::from_str(json).unwrap();
/// assert_eq!(event.kind, EventKind::PullRequestEvent);
/// assert_eq!(event.repo_name(), Some("octo/hello"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event type tag.
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    /// Repository the event happened in.
    #[serde(default)]
    pub repo: Option<RepoRef>,
    /// Event-specific payload.
    #[serde(default)]
    pub payload: EventPayload,
    /// RFC 3339 timestamp of the event.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ActivityEvent {
    /// Full `owner/name` of the event's repository, if present.
    pub fn repo_name(&self) -> Option<&str> {
        self.repo.as_ref().map(|r| r.name.as_str())
    }
}

/// Repository reference embedded in an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRef {
    /// Full repository name (`owner/name`).
    pub name: String,
}

/// Payload of an activity event. Fields irrelevant to prlens are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    /// Pull request carried by the event, possibly truncated.
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    /// Review carried by a review event.
    #[serde(default)]
    pub review: Option<ReviewPayload>,
}

/// A pull request as it appears inside an event payload.
///
/// Event payloads are frequently partial, so every field is optional,
/// including the number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestPayload {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changed_files: Option<u64>,
    pub commits_url: Option<String>,
}

impl PullRequestPayload {
    /// Convert into a snapshot. Returns `None` when the payload has no number.
    ///
    /// # Examples
    ///
    /// ```
    /// use prlens_core::PullRequestPayload;
    ///
    /// let payload = PullRequestPayload { number: Some(3), ..Default::default() };
    /// assert_eq!(payload.into_snapshot().unwrap().number, 3);
    ///
    /// assert!(PullRequestPayload::default().into_snapshot().is_none());
    /// ```
    pub fn into_snapshot(self) -> Option<PullRequestSnapshot> {
        let number = self.number?;
        Some(PullRequestSnapshot {
            number,
            title: self.title,
            body: self.body,
            additions: self.additions,
            deletions: self.deletions,
            changed_files: self.changed_files,
            commits_url: self.commits_url,
        })
    }
}

/// Review payload of a `PullRequestReviewEvent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub state: Option<String>,
    pub user: Option<UserRef>,
}

/// A GitHub user reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    pub login: Option<String>,
}

/// Partial or complete view of a pull request.
///
/// Size fields are `None` when the originating payload did not carry them.
/// `None` is never the same as zero: it is only treated as zero inside the
/// scoring formulas.
///
/// # Examples
///
/// ```
/// use prlens_core::PullRequestSnapshot;
///
/// let mut local = PullRequestSnapshot {
///     title: Some("Fix login".into()),
///     ..PullRequestSnapshot::new(12)
/// };
/// let fetched = PullRequestSnapshot {
///     additions: Some(40),
///     deletions: Some(2),
///     changed_files: Some(3),
///     ..PullRequestSnapshot::new(12)
/// };
/// local.merge_fetched(fetched);
/// assert_eq!(local.title.as_deref(), Some("Fix login"));
/// assert_eq!(local.additions, Some(40));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    /// Pull request number, unique within its repository.
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub additions: Option<u64>,
    #[serde(default)]
    pub deletions: Option<u64>,
    #[serde(default)]
    pub changed_files: Option<u64>,
    /// API URL listing the pull request's commits.
    #[serde(default)]
    pub commits_url: Option<String>,
}

impl PullRequestSnapshot {
    /// A snapshot carrying only a number.
    pub fn new(number: u64) -> Self {
        Self {
            number,
            title: None,
            body: None,
            additions: None,
            deletions: None,
            changed_files: None,
            commits_url: None,
        }
    }

    /// `true` when additions, deletions and changed files are all known.
    pub fn has_size_fields(&self) -> bool {
        self.additions.is_some() && self.deletions.is_some() && self.changed_files.is_some()
    }

    /// Additions plus deletions, with missing values counted as zero.
    pub fn lines_changed(&self) -> u64 {
        self.additions.unwrap_or(0) + self.deletions.unwrap_or(0)
    }

    /// Shallow right-biased merge: every field present in `fetched`
    /// overrides the local value, local fields the fetch lacks are kept.
    pub fn merge_fetched(&mut self, fetched: PullRequestSnapshot) {
        self.number = fetched.number;
        if fetched.title.is_some() {
            self.title = fetched.title;
        }
        if fetched.body.is_some() {
            self.body = fetched.body;
        }
        if fetched.additions.is_some() {
            self.additions = fetched.additions;
        }
        if fetched.deletions.is_some() {
            self.deletions = fetched.deletions;
        }
        if fetched.changed_files.is_some() {
            self.changed_files = fetched.changed_files;
        }
        if fetched.commits_url.is_some() {
            self.commits_url = fetched.commits_url;
        }
    }
}

/// One review seen for a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Review state as reported by GitHub (`APPROVED`, `COMMENTED`, ...).
    pub state: String,
    /// Login of the reviewer.
    pub reviewer: String,
    /// Human-readable date of the review.
    pub date: String,
}

/// A commit listed for a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit message.
    pub message: String,
}

impl CommitRecord {
    /// First line of the commit message.
    ///
    /// # Examples
    ///
    /// ```
    /// use prlens_core::CommitRecord;
    ///
    /// let c = CommitRecord { message: "fix: parser\n\nlong body".into() };
    /// assert_eq!(c.subject(), "fix: parser");
    /// ```
    pub fn subject(&self) -> &str {
        self.message.split('\n').next().unwrap_or_default()
    }
}

/// Build the aggregate key for a pull request: `owner/repo#number`.
///
/// # Examples
///
/// ```
/// assert_eq!(prlens_core::pr_key("octo/hello", 7), "octo/hello#7");
/// ```
pub fn pr_key(repo_name: &str, number: u64) -> String {
    format!("{repo_name}#{number}")
}

/// Everything prlens has accumulated about one pull request during a run.
///
/// # Examples
///
/// ```
/// use prlens_core::{PrAggregate, PullRequestSnapshot};
///
/// let agg = PrAggregate::new("octo/hello", PullRequestSnapshot::new(7));
/// assert_eq!(agg.key(), "octo/hello#7");
/// assert!(agg.reviews.is_empty());
/// assert!(agg.commit_messages.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrAggregate {
    /// Best snapshot seen so far.
    pub snapshot: PullRequestSnapshot,
    /// Full name of the repository.
    pub repo_name: String,
    /// Reviews in arrival order.
    pub reviews: Vec<ReviewRecord>,
    /// First-line commit messages; `None` until enrichment has been attempted.
    pub commit_messages: Option<Vec<String>>,
    /// Changed file names; only fetched when reviewing a single pull request.
    pub changed_files: Option<Vec<String>>,
}

impl PrAggregate {
    /// Start an aggregate with no reviews and no commit data.
    pub fn new(repo_name: impl Into<String>, snapshot: PullRequestSnapshot) -> Self {
        Self {
            snapshot,
            repo_name: repo_name.into(),
            reviews: Vec::new(),
            commit_messages: None,
            changed_files: None,
        }
    }

    /// Aggregate key (`owner/repo#number`).
    pub fn key(&self) -> String {
        pr_key(&self.repo_name, self.snapshot.number)
    }

    /// Commit messages, or an empty slice when none were retrieved.
    pub fn commits(&self) -> &[String] {
        self.commit_messages.as_deref().unwrap_or_default()
    }
}

/// Ordering key for ranked summaries.
///
/// Implements [`FromStr`] so it can be used directly with `clap` and in
/// `key=value` CLI arguments.
///
/// # Examples
///
/// ```
/// use prlens_core::SortKey;
///
/// let key: SortKey = "impact".parse().unwrap();
/// assert_eq!(key, SortKey::Impact);
/// assert!("stars".parse::<SortKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Additions plus deletions.
    Lines,
    /// Impact score.
    Impact,
    /// Number of reviews.
    Reviews,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Lines => write!(f, "lines"),
            SortKey::Impact => write!(f, "impact"),
            SortKey::Reviews => write!(f, "reviews"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lines" => Ok(SortKey::Lines),
            "impact" => Ok(SortKey::Impact),
            "reviews" => Ok(SortKey::Reviews),
            other => Err(format!(
                "unknown sort key: {other} (expected lines, impact or reviews)"
            )),
        }
    }
}
