//! Grouping of raw activity events into one record per pull request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use prlens_core::{pr_key, ActivityEvent, EventKind, PrAggregate, ReviewRecord};

/// Aggregates keyed by `owner/repo#number`, iterated in first-insertion order.
///
/// # Examples
///
/// ```
/// use prlens_activity::aggregate::PrIndex;
/// use prlens_core::{PrAggregate, PullRequestSnapshot};
///
/// let mut index = PrIndex::new();
/// index.insert(PrAggregate::new("octo/b", PullRequestSnapshot::new(2)));
/// index.insert(PrAggregate::new("octo/a", PullRequestSnapshot::new(1)));
/// let keys: Vec<_> = index.keys().collect();
/// assert_eq!(keys, vec!["octo/b#2", "octo/a#1"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrIndex {
    entries: Vec<PrAggregate>,
    keys: Vec<String>,
    positions: HashMap<String, usize>,
}

impl PrIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aggregates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no aggregate has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when an aggregate exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Aggregate stored under `key`.
    pub fn get(&self, key: &str) -> Option<&PrAggregate> {
        self.positions.get(key).map(|&i| &self.entries[i])
    }

    /// Mutable aggregate stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PrAggregate> {
        self.positions.get(key).map(|&i| &mut self.entries[i])
    }

    /// Insert an aggregate, replacing any aggregate with the same key in place.
    /// Replacement keeps the key's original position.
    pub fn insert(&mut self, aggregate: PrAggregate) {
        let key = aggregate.key();
        match self.positions.get(&key) {
            Some(&i) => self.entries[i] = aggregate,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.keys.push(key);
                self.entries.push(aggregate);
            }
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Aggregates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PrAggregate> {
        self.entries.iter()
    }

    /// Mutable aggregates in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PrAggregate> {
        self.entries.iter_mut()
    }
}

/// Group activity events into per-PR aggregates.
///
/// Single synchronous pass; no network calls. Events without a repository
/// or without a pull request number are skipped. For repeated
/// `PullRequestEvent`s the stored snapshot is only replaced when it lacks
/// `additions` and the incoming one carries them. Every
/// `PullRequestReviewEvent` with a review payload appends a review, creating
/// the aggregate from the (possibly partial) payload when needed.
///
/// # Examples
///
/// ```
/// use prlens_activity::aggregate::aggregate;
/// use prlens_core::ActivityEvent;
///
/// let events: Vec<ActivityEvent> = serde_json::from_str(r#"[
///     {"type": "PullRequestEvent", "repo": {"name": "octo/hello"},
///      "payload": {"pull_request": {"number": 1, "title": "Init"}}},
///     {"type": "PullRequestReviewEvent", "repo": {"name": "octo/hello"},
///      "payload": {"pull_request": {"number": 1},
///                  "review": {"state": "approved", "user": {"login": "kim"}}},
///      "created_at": "2024-03-05T10:00:00Z"}
/// ]"#).unwrap();
///
/// let index = aggregate(&events);
/// let pr = index.get("octo/hello#1").unwrap();
/// assert_eq!(pr.snapshot.title.as_deref(), Some("Init"));
/// assert_eq!(pr.reviews.len(), 1);
/// assert_eq!(pr.reviews[0].date, "3/5/2024");
/// ```
pub fn aggregate(events: &[ActivityEvent]) -> PrIndex {
    let mut index = PrIndex::new();

    for event in events {
        let Some(repo_name) = event.repo_name() else {
            continue;
        };

        match event.kind {
            EventKind::PullRequestEvent => {
                let Some(snapshot) = event
                    .payload
                    .pull_request
                    .clone()
                    .and_then(|pr| pr.into_snapshot())
                else {
                    continue;
                };

                let key = pr_key(repo_name, snapshot.number);
                match index.get_mut(&key) {
                    Some(existing) => {
                        if existing.snapshot.additions.is_none() && snapshot.additions.is_some() {
                            existing.snapshot = snapshot;
                        }
                    }
                    None => index.insert(PrAggregate::new(repo_name, snapshot)),
                }
            }
            EventKind::PullRequestReviewEvent => {
                let Some(review) = &event.payload.review else {
                    continue;
                };
                let Some(snapshot) = event
                    .payload
                    .pull_request
                    .clone()
                    .and_then(|pr| pr.into_snapshot())
                else {
                    continue;
                };

                let key = pr_key(repo_name, snapshot.number);
                if !index.contains_key(&key) {
                    index.insert(PrAggregate::new(repo_name, snapshot));
                }

                let record = ReviewRecord {
                    state: review.state.clone().unwrap_or_else(|| "unknown".into()),
                    reviewer: review
                        .user
                        .as_ref()
                        .and_then(|u| u.login.clone())
                        .unwrap_or_else(|| "unknown".into()),
                    date: format_event_date(event.created_at.as_deref()),
                };
                if let Some(entry) = index.get_mut(&key) {
                    entry.reviews.push(record);
                }
            }
            EventKind::Other => {}
        }
    }

    index
}

/// Render an RFC 3339 timestamp as a short `M/D/YYYY` date in UTC.
///
/// # Examples
///
/// ```
/// use prlens_activity::aggregate::format_event_date;
///
/// assert_eq!(format_event_date(Some("2024-11-09T23:59:00Z")), "11/9/2024");
/// assert_eq!(format_event_date(Some("yesterday")), "unknown date");
/// assert_eq!(format_event_date(None), "unknown date");
/// ```
pub fn format_event_date(created_at: Option<&str>) -> String {
    created_at
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc).format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pr_event(repo: &str, pr: serde_json::Value) -> ActivityEvent {
        serde_json::from_value(json!({
            "type": "PullRequestEvent",
            "repo": { "name": repo },
            "payload": { "pull_request": pr },
            "created_at": "2024-01-15T08:30:00Z"
        }))
        .unwrap()
    }

    fn review_event(repo: &str, number: u64, state: &str, login: &str) -> ActivityEvent {
        serde_json::from_value(json!({
            "type": "PullRequestReviewEvent",
            "repo": { "name": repo },
            "payload": {
                "pull_request": { "number": number },
                "review": { "state": state, "user": { "login": login } }
            },
            "created_at": "2024-01-16T08:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn keys_are_repo_and_number() {
        let events = vec![
            pr_event("a/x", json!({"number": 1})),
            pr_event("a/y", json!({"number": 1})),
            pr_event("a/x", json!({"number": 2})),
            pr_event("a/x", json!({"number": 1})),
        ];
        let index = aggregate(&events);
        assert_eq!(index.len(), 3);
        let keys: Vec<_> = index.keys().collect();
        assert_eq!(keys, vec!["a/x#1", "a/y#1", "a/x#2"]);
        for agg in index.iter() {
            assert_eq!(
                agg.key(),
                format!("{}#{}", agg.repo_name, agg.snapshot.number)
            );
        }
    }

    #[test]
    fn events_without_repo_or_number_are_skipped() {
        let mut no_repo = pr_event("a/x", json!({"number": 1}));
        no_repo.repo = None;
        let events = vec![
            no_repo,
            pr_event("a/x", json!({"title": "no number"})),
            serde_json::from_value(json!({
                "type": "PullRequestReviewEvent",
                "repo": { "name": "a/x" },
                "payload": { "pull_request": { "number": 3 } }
            }))
            .unwrap(),
            serde_json::from_value(json!({"type": "PushEvent", "repo": { "name": "a/x" }}))
                .unwrap(),
        ];
        assert!(aggregate(&events).is_empty());
    }

    #[test]
    fn snapshot_with_additions_replaces_partial_one() {
        let events = vec![
            pr_event("a/x", json!({"number": 1, "title": "partial"})),
            pr_event("a/x", json!({"number": 1, "title": "full", "additions": 10})),
        ];
        let index = aggregate(&events);
        let agg = index.get("a/x#1").unwrap();
        assert_eq!(agg.snapshot.title.as_deref(), Some("full"));
        assert_eq!(agg.snapshot.additions, Some(10));
    }

    #[test]
    fn snapshot_with_additions_is_never_downgraded() {
        let events = vec![
            pr_event("a/x", json!({"number": 1, "title": "full", "additions": 10})),
            pr_event("a/x", json!({"number": 1, "title": "later partial"})),
            pr_event("a/x", json!({"number": 1, "title": "later full", "additions": 99})),
        ];
        let index = aggregate(&events);
        let agg = index.get("a/x#1").unwrap();
        assert_eq!(agg.snapshot.title.as_deref(), Some("full"));
        assert_eq!(agg.snapshot.additions, Some(10));
    }

    #[test]
    fn reviews_survive_snapshot_replacement() {
        let events = vec![
            review_event("a/x", 1, "commented", "ana"),
            pr_event("a/x", json!({"number": 1, "additions": 5})),
            review_event("a/x", 1, "approved", "bo"),
        ];
        let index = aggregate(&events);
        let agg = index.get("a/x#1").unwrap();
        assert_eq!(agg.snapshot.additions, Some(5));
        let reviewers: Vec<_> = agg.reviews.iter().map(|r| r.reviewer.as_str()).collect();
        assert_eq!(reviewers, vec!["ana", "bo"]);
    }

    #[test]
    fn review_accumulation_is_monotonic() {
        let mut events = vec![pr_event("a/x", json!({"number": 1}))];
        let mut last = 0;
        for i in 0..5 {
            events.push(review_event("a/x", 1, "commented", &format!("r{i}")));
            let count = aggregate(&events).get("a/x#1").unwrap().reviews.len();
            assert!(count > last);
            last = count;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn review_defaults_to_unknown() {
        let event: ActivityEvent = serde_json::from_value(json!({
            "type": "PullRequestReviewEvent",
            "repo": { "name": "a/x" },
            "payload": { "pull_request": { "number": 1 }, "review": {} }
        }))
        .unwrap();
        let index = aggregate(&[event]);
        let review = &index.get("a/x#1").unwrap().reviews[0];
        assert_eq!(review.state, "unknown");
        assert_eq!(review.reviewer, "unknown");
        assert_eq!(review.date, "unknown date");
    }

    #[test]
    fn review_event_creates_aggregate_from_partial_payload() {
        let index = aggregate(&[review_event("a/x", 8, "approved", "kim")]);
        let agg = index.get("a/x#8").unwrap();
        assert!(agg.snapshot.title.is_none());
        assert_eq!(agg.reviews[0].state, "approved");
        assert_eq!(agg.reviews[0].date, "1/16/2024");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut index = PrIndex::new();
        index.insert(PrAggregate::new("a/x", prlens_core::PullRequestSnapshot::new(1)));
        index.insert(PrAggregate::new("a/x", prlens_core::PullRequestSnapshot::new(2)));
        let mut replacement = PrAggregate::new("a/x", prlens_core::PullRequestSnapshot::new(1));
        replacement.commit_messages = Some(vec![]);
        index.insert(replacement);
        assert_eq!(index.len(), 2);
        assert_eq!(index.keys().next(), Some("a/x#1"));
        assert!(index.get("a/x#1").unwrap().commit_messages.is_some());
    }
}
