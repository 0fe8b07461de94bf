//! Core types, configuration, and error handling for prlens.
//!
//! This crate provides the shared foundation used by all other prlens crates:
//! - [`PrlensError`]: unified error type using `thiserror`
//! - [`PrlensConfig`]: configuration loaded from `.prlens.toml` and the environment
//! - [`GitHubApi`]: the GitHub capability the pipelines are written against
//! - Shared types: [`ActivityEvent`], [`PullRequestSnapshot`], [`ReviewRecord`],
//!   [`PrAggregate`], [`SortKey`]

mod api;
mod config;
mod error;
mod types;

pub use api::GitHubApi;
pub use config::{ChecksConfig, GitHubConfig, PrlensConfig, ReportConfig};
pub use error::PrlensError;
pub use types::{
    pr_key, ActivityEvent, CommitRecord, EventKind, EventPayload, PrAggregate,
    PullRequestPayload, PullRequestSnapshot, RepoRef, ReviewPayload, ReviewRecord, SortKey,
    UserRef,
};

/// A convenience `Result` type for prlens operations.
pub type Result<T> = std::result::Result<T, PrlensError>;
