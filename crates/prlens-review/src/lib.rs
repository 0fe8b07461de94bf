//! GitHub integration and review orchestration.
//!
//! Provides the REST client behind the `GitHubApi` seam, plain-text and
//! markdown report rendering, the lint/coverage check runner, and the
//! pipelines tying them together.

pub mod checks;
pub mod github;
pub mod pipeline;
pub mod report;
