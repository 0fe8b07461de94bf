//! Lint and coverage commands run against the checked-out pull request.

use std::fmt;
use std::path::Path;

use prlens_core::ChecksConfig;
use serde::Serialize;
use tokio::process::Command;

/// Which configured check produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Lint,
    Coverage,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Lint => write!(f, "Lint"),
            CheckKind::Coverage => write!(f, "Coverage"),
        }
    }
}

/// Result of running one check command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub kind: CheckKind,
    /// The command line as configured, joined with spaces.
    pub command: String,
    pub passed: bool,
    /// Exit code, if the process ran to completion.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr, or the spawn error.
    pub output: String,
    /// Parsed total coverage percentage (coverage checks only).
    pub coverage: Option<f64>,
}

/// Run a single check command.
///
/// Returns `None` when `command` is empty, meaning the check is not
/// configured. A command that cannot be spawned produces a failed outcome.
pub async fn run_check(
    kind: CheckKind,
    command: &[String],
    workdir: Option<&Path>,
    min_coverage: Option<f64>,
) -> Option<CheckOutcome> {
    let (program, args) = command.split_first()?;
    let command_line = command.join(" ");
    tracing::info!(check = %kind, command = %command_line, "running check");

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }

    let output = match cmd.output().await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(check = %kind, error = %e, "could not spawn check command");
            return Some(CheckOutcome {
                kind,
                command: command_line,
                passed: false,
                exit_code: None,
                output: format!("failed to run `{}`: {e}", program),
                coverage: None,
            });
        }
    };

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }

    let succeeded = output.status.success();
    let (passed, coverage) = match kind {
        CheckKind::Lint => (succeeded, None),
        CheckKind::Coverage => {
            let coverage = parse_coverage_percent(&text);
            let meets_minimum = match min_coverage {
                Some(min) => coverage.is_some_and(|pct| pct >= min),
                None => true,
            };
            (succeeded && meets_minimum, coverage)
        }
    };

    tracing::debug!(check = %kind, passed, ?coverage, "check finished");
    Some(CheckOutcome {
        kind,
        command: command_line,
        passed,
        exit_code: output.status.code(),
        output: text,
        coverage,
    })
}

/// Run every configured check, lint first.
pub async fn run_configured_checks(config: &ChecksConfig) -> Vec<CheckOutcome> {
    let workdir = config.workdir.as_deref();
    let mut outcomes = Vec::new();
    if let Some(lint) = run_check(CheckKind::Lint, &config.lint_command, workdir, None).await {
        outcomes.push(lint);
    }
    if let Some(coverage) = run_check(
        CheckKind::Coverage,
        &config.coverage_command,
        workdir,
        config.min_coverage,
    )
    .await
    {
        outcomes.push(coverage);
    }
    outcomes
}

/// Extract the total coverage percentage from a coverage tool's output.
///
/// Recognises the istanbul/jest summary row (`All files | 85.3 | ...`) and
/// otherwise the last `NN.NN%` token on a line mentioning `coverage` or
/// starting with `TOTAL` (tarpaulin, llvm-cov, coverage.py).
///
/// # Examples
///
/// ```
/// use prlens_review::checks::parse_coverage_percent;
///
/// let jest = "File      | % Stmts | % Branch\nAll files |   85.3  |    70\n";
/// assert_eq!(parse_coverage_percent(jest), Some(85.3));
///
/// let tarpaulin = "|| Tested/Total Lines:\n72.50% coverage, 145/200 lines covered";
/// assert_eq!(parse_coverage_percent(tarpaulin), Some(72.5));
///
/// assert_eq!(parse_coverage_percent("no numbers here"), None);
/// ```
pub fn parse_coverage_percent(output: &str) -> Option<f64> {
    let istanbul = output.lines().find_map(|line| {
        let line = line.trim();
        if !line.starts_with("All files") {
            return None;
        }
        line.split('|').nth(1)?.trim().parse::<f64>().ok()
    });
    if istanbul.is_some() {
        return istanbul;
    }

    output.lines().rev().find_map(|line| {
        let trimmed = line.trim();
        if !(trimmed.to_lowercase().contains("coverage") || trimmed.starts_with("TOTAL")) {
            return None;
        }
        trimmed
            .split_whitespace()
            .filter_map(percent_token)
            .last()
    })
}

fn percent_token(token: &str) -> Option<f64> {
    let token = token.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '%'));
    token.strip_suffix('%')?.parse::<f64>().ok()
}

/// Keep the last `max_lines` lines of `output`. Zero keeps everything.
pub fn tail_lines(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.trim_end().lines().collect();
    if max_lines == 0 || lines.len() <= max_lines {
        return lines.join("\n");
    }
    lines[lines.len() - max_lines..].join("\n")
}
