use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PrlensError;
use crate::types::SortKey;

/// Top-level configuration loaded from `.prlens.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use prlens_core::PrlensConfig;
///
/// let config = PrlensConfig::default();
/// assert_eq!(config.github.api_base, "https://api.github.com");
/// assert!(config.checks.lint_command.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrlensConfig {
    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Defaults for the `events` report.
    #[serde(default)]
    pub report: ReportConfig,
    /// Lint and coverage checks run in `review` mode.
    #[serde(default)]
    pub checks: ChecksConfig,
}

impl PrlensConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PrlensError::Io`] if the file cannot be read, or
    /// [`PrlensError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use prlens_core::PrlensConfig;
    /// use std::path::Path;
    ///
    /// let config = PrlensConfig::from_file(Path::new(".prlens.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, PrlensError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PrlensError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use prlens_core::PrlensConfig;
    ///
    /// let toml = r#"
    /// [checks]
    /// min_coverage = 80.0
    /// "#;
    /// let config = PrlensConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.checks.min_coverage, Some(80.0));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PrlensError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    ///
    /// Reads `GITHUB_TOKEN` (falling back to `GH_TOKEN`), `GITHUB_REPOSITORY`
    /// and `GITHUB_API_URL`.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup. Empty values are
    /// treated as unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use prlens_core::PrlensConfig;
    ///
    /// let mut config = PrlensConfig::default();
    /// config.apply_env_with(|key| match key {
    ///     "GITHUB_REPOSITORY" => Some("octo/hello".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.github.repository.as_deref(), Some("octo/hello"));
    /// assert!(config.github.token.is_none());
    /// ```
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GITHUB_TOKEN").or_else(|| get("GH_TOKEN")) {
            self.github.token = Some(token);
        }
        if let Some(repo) = get("GITHUB_REPOSITORY") {
            self.github.repository = Some(repo);
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.github.api_base = url.trim_end_matches('/').to_string();
        }
    }

    /// The configured token, or a configuration error naming the variable.
    ///
    /// # Errors
    ///
    /// Returns [`PrlensError::Config`] when no token is set.
    pub fn require_token(&self) -> Result<&str, PrlensError> {
        self.github
            .token
            .as_deref()
            .ok_or_else(|| PrlensError::Config("GITHUB_TOKEN is not set".into()))
    }
}

/// GitHub API configuration.
///
/// # Examples
///
/// ```
/// use prlens_core::GitHubConfig;
///
/// let config = GitHubConfig::default();
/// assert_eq!(config.user_agent, "prlens");
/// assert_eq!(config.timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL (default: `https://api.github.com`).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Access token. Usually supplied through `GITHUB_TOKEN`.
    pub token: Option<String>,
    /// Repository reviewed in `review` mode (`owner/repo`).
    pub repository: Option<String>,
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}

fn default_user_agent() -> String {
    "prlens".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            token: None,
            repository: None,
        }
    }
}

/// Defaults for the `events` report, overridden by CLI arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Ordering applied when no `sort=` argument is given.
    pub default_sort: Option<SortKey>,
    /// Truncation applied when no `limit=` argument is given.
    pub default_limit: Option<usize>,
}

/// Lint and coverage checks for `review` mode.
///
/// Commands are given as program plus arguments and are skipped when empty.
///
/// # Examples
///
/// ```
/// use prlens_core::ChecksConfig;
///
/// let config = ChecksConfig::default();
/// assert_eq!(config.max_output_lines, 40);
/// assert!(config.min_coverage.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Lint command, e.g. `["npx", "eslint", "."]`.
    #[serde(default)]
    pub lint_command: Vec<String>,
    /// Coverage command, e.g. `["npx", "jest", "--coverage"]`.
    #[serde(default)]
    pub coverage_command: Vec<String>,
    /// Minimum total coverage percentage for the coverage check to pass.
    pub min_coverage: Option<f64>,
    /// Trailing output lines kept in the review comment (default: 40).
    #[serde(default = "default_max_output_lines")]
    pub max_output_lines: usize,
    /// Working directory for check commands (default: current directory).
    pub workdir: Option<PathBuf>,
}

fn default_max_output_lines() -> usize {
    40
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            lint_command: Vec::new(),
            coverage_command: Vec::new(),
            min_coverage: None,
            max_output_lines: default_max_output_lines(),
            workdir: None,
        }
    }
}
