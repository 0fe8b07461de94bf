use std::fmt;

use serde::{Deserialize, Serialize};

/// Change type inferred from commit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrType {
    BugFix,
    Refactor,
    Documentation,
    Feature,
}

impl fmt::Display for PrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrType::BugFix => write!(f, "Bug Fix PR"),
            PrType::Refactor => write!(f, "Refactor PR"),
            PrType::Documentation => write!(f, "Documentation PR"),
            PrType::Feature => write!(f, "Feature PR"),
        }
    }
}

// Checked in order; the first group with a substring match wins.
const KEYWORD_GROUPS: &[(PrType, &[&str])] = &[
    (PrType::BugFix, &["fix", "bug", "hotfix"]),
    (PrType::Refactor, &["refactor", "cleanup"]),
    (PrType::Documentation, &["docs", "readme"]),
    (PrType::Feature, &["feat", "feature", "add", "implement"]),
];

/// Classify a pull request from its commit messages.
///
/// Messages are joined and lowercased, then matched by substring against
/// keyword groups in priority order: bug fix, refactor, documentation,
/// feature. Returns `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use prlens_metrics::classify::{classify_type, PrType};
///
/// let messages = vec!["fix: bug in login".to_string(), "update readme".to_string()];
/// assert_eq!(classify_type(&messages), Some(PrType::BugFix));
///
/// assert_eq!(classify_type(&["random commit message".to_string()]), None);
/// ```
pub fn classify_type(commit_messages: &[String]) -> Option<PrType> {
    let haystack = commit_messages.join(" ").to_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(pr_type, _)| *pr_type)
}
