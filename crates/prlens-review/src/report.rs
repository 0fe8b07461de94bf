//! Plain-text summaries and markdown review comments.
//!
//! Both renderers are pure functions of their inputs.

use std::fmt::Write;

use prlens_core::PrAggregate;
use prlens_metrics::PrMetrics;

use crate::checks::{tail_lines, CheckKind, CheckOutcome};

const NOT_IN_EVENT: &str = "(data not available in event)";

/// Whole-number impact score, halves rounded up.
fn display_score(score: f64) -> f64 {
    score.round()
}

/// Render the multi-line plain-text summary of one pull request.
///
/// # Examples
///
/// ```
/// use prlens_core::{PrAggregate, PullRequestSnapshot};
/// use prlens_metrics::PrMetrics;
/// use prlens_review::report::format_summary;
///
/// let agg = PrAggregate::new(
///     "octo/hello",
///     PullRequestSnapshot { title: Some("Fix login".into()), ..PullRequestSnapshot::new(7) },
/// );
/// let text = format_summary(&agg, &PrMetrics::for_aggregate(&agg));
/// assert!(text.starts_with("PR #7: \"Fix login\" (octo/hello)"));
/// assert!(text.contains("- Reviews: (none)"));
/// ```
pub fn format_summary(aggregate: &PrAggregate, metrics: &PrMetrics) -> String {
    let snapshot = &aggregate.snapshot;
    let mut lines = Vec::new();

    lines.push(format!(
        "PR #{}: \"{}\" ({})",
        snapshot.number,
        snapshot.title.as_deref().unwrap_or("(no title)"),
        aggregate.repo_name
    ));

    match (snapshot.additions, snapshot.deletions) {
        (Some(additions), Some(deletions)) => {
            lines.push(format!("- Lines changed: +{additions} / -{deletions}"));
        }
        _ => lines.push(format!("- Lines changed: {NOT_IN_EVENT}")),
    }

    match snapshot.changed_files {
        Some(files) => lines.push(format!("- Files changed: {files}")),
        None => lines.push(format!("- Files changed: {NOT_IN_EVENT}")),
    }

    lines.push(format!(
        "- Impact: {} (score {})",
        metrics.impact.category,
        display_score(metrics.impact.score)
    ));

    if let Some(pr_type) = metrics.pr_type {
        lines.push(format!("- PR type: {pr_type}"));
    }

    let commits = aggregate.commits();
    if commits.is_empty() {
        lines.push("- Commit messages: (none retrieved)".to_string());
    } else {
        lines.push(format!("- Commit messages ({}):", commits.len()));
        lines.extend(commits.iter().map(|msg| format!("  • {msg}")));
    }

    if aggregate.reviews.is_empty() {
        lines.push("- Reviews: (none)".to_string());
    } else {
        lines.push(format!("- Reviews ({}):", aggregate.reviews.len()));
        lines.extend(
            aggregate
                .reviews
                .iter()
                .map(|r| format!("  • {} by {} on {}", r.state, r.reviewer, r.date)),
        );
    }

    if let Some(risk) = &metrics.regression_risk {
        lines.push(format!(
            "- Regression risk: {} (score {:.1}%)",
            risk.category,
            risk.score * 100.0
        ));
    }

    lines.join("\n")
}

/// Render the markdown body posted as a pull request review.
///
/// Check output is cut to its last `max_output_lines` lines (zero keeps
/// all of it).
pub fn format_review_comment(
    aggregate: &PrAggregate,
    metrics: &PrMetrics,
    checks: &[CheckOutcome],
    max_output_lines: usize,
) -> String {
    let snapshot = &aggregate.snapshot;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "## PR Review: #{} \"{}\"\n",
        snapshot.number,
        snapshot.title.as_deref().unwrap_or("(no title)")
    );
    let _ = writeln!(out, "**Repository:** `{}`\n", aggregate.repo_name);

    out.push_str("| Metric | Value |\n|--------|-------|\n");
    let lines_value = match (snapshot.additions, snapshot.deletions) {
        (Some(a), Some(d)) => format!("+{a} / -{d}"),
        _ => "n/a".to_string(),
    };
    let files_value = snapshot
        .changed_files
        .map_or_else(|| "n/a".to_string(), |f| f.to_string());
    let _ = writeln!(out, "| Lines changed | {lines_value} |");
    let _ = writeln!(out, "| Files changed | {files_value} |");
    let _ = writeln!(out, "| Commits | {} |", aggregate.commits().len());
    let _ = writeln!(out, "| Reviews | {} |\n", aggregate.reviews.len());

    let _ = writeln!(
        out,
        "- **Impact:** {} (score {})",
        metrics.impact.category,
        display_score(metrics.impact.score)
    );
    if let Some(pr_type) = metrics.pr_type {
        let _ = writeln!(out, "- **PR type:** {pr_type}");
    }
    if let Some(risk) = &metrics.regression_risk {
        let _ = write!(
            out,
            "- **Regression risk:** {} ({:.1}%)",
            risk.category,
            risk.score * 100.0
        );
        if !risk.factors.is_empty() {
            let _ = write!(out, ", factors: {}", risk.factors.join(", "));
        }
        out.push('\n');
    }
    out.push('\n');

    out.push_str("### Commits\n\n");
    let commits = aggregate.commits();
    if commits.is_empty() {
        out.push_str("_No commit messages retrieved._\n");
    } else {
        for msg in commits {
            let _ = writeln!(out, "- {msg}");
        }
    }
    out.push('\n');

    out.push_str("### Reviews\n\n");
    if aggregate.reviews.is_empty() {
        out.push_str("_No reviews yet._\n");
    } else {
        for r in &aggregate.reviews {
            let _ = writeln!(out, "- **{}** by @{} on {}", r.state, r.reviewer, r.date);
        }
    }
    out.push('\n');

    if let Some(files) = &aggregate.changed_files {
        let _ = writeln!(out, "### Changed files ({})\n", files.len());
        for file in files {
            let _ = writeln!(out, "- `{file}`");
        }
        out.push('\n');
    }

    for check in checks {
        let status = if check.passed { "passed" } else { "failed" };
        let _ = write!(out, "### {} {status}", check.kind);
        if check.kind == CheckKind::Coverage {
            if let Some(pct) = check.coverage {
                let _ = write!(out, " ({pct:.1}%)");
            }
        }
        out.push_str("\n\n");

        let _ = write!(out, "`{}`", check.command);
        match check.exit_code {
            Some(code) => {
                let _ = writeln!(out, " exited with code {code}\n");
            }
            None => out.push_str(" did not complete\n\n"),
        }

        let tail = tail_lines(&check.output, max_output_lines);
        if !tail.is_empty() {
            let _ = writeln!(out, "```text\n{tail}\n```\n");
        }
    }

    out.push_str("<sub>Generated by prlens</sub>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use prlens_core::{PullRequestSnapshot, ReviewRecord};

    fn full_aggregate() -> PrAggregate {
        let mut agg = PrAggregate::new(
            "octo/hello",
            PullRequestSnapshot {
                title: Some("Fix login".into()),
                additions: Some(600),
                deletions: Some(100),
                changed_files: Some(15),
                ..PullRequestSnapshot::new(12)
            },
        );
        agg.commit_messages = Some(vec!["fix: bug in login".into(), "update readme".into()]);
        agg.reviews.push(ReviewRecord {
            state: "APPROVED".into(),
            reviewer: "kim".into(),
            date: "1/2/2024".into(),
        });
        agg
    }

    #[test]
    fn summary_with_all_sections() {
        let agg = full_aggregate();
        let text = format_summary(&agg, &PrMetrics::for_aggregate(&agg));
        let expected = "\
PR #12: \"Fix login\" (octo/hello)
- Lines changed: +600 / -100
- Files changed: 15
- Impact: Medium PR (score 493)
- PR type: Bug Fix PR
- Commit messages (2):
  • fix: bug in login
  • update readme
- Reviews (1):
  • APPROVED by kim on 1/2/2024
- Regression risk: Medium risk (score 61.0%)";
        assert_eq!(text, expected);
    }

    #[test]
    fn summary_without_optional_data() {
        let agg = PrAggregate::new("octo/hello", PullRequestSnapshot::new(3));
        let text = format_summary(&agg, &PrMetrics::for_aggregate(&agg));
        let expected = "\
PR #3: \"(no title)\" (octo/hello)
- Lines changed: (data not available in event)
- Files changed: (data not available in event)
- Impact: Small PR (score 0)
- Commit messages: (none retrieved)
- Reviews: (none)";
        assert_eq!(text, expected);
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn summary_needs_both_size_fields_for_lines_and_risk() {
        let agg = PrAggregate::new(
            "octo/hello",
            PullRequestSnapshot {
                additions: Some(5),
                ..PullRequestSnapshot::new(4)
            },
        );
        let text = format_summary(&agg, &PrMetrics::for_aggregate(&agg));
        assert!(text.contains("- Lines changed: (data not available in event)"));
        assert!(!text.contains("Regression risk"));
    }

    fn impact_line(additions: u64) -> String {
        let agg = PrAggregate::new(
            "octo/hello",
            PullRequestSnapshot {
                additions: Some(additions),
                deletions: Some(0),
                changed_files: Some(0),
                ..PullRequestSnapshot::new(1)
            },
        );
        let metrics = PrMetrics::for_aggregate(&agg);
        format_summary(&agg, &metrics)
            .lines()
            .find(|l| l.starts_with("- Impact:"))
            .unwrap()
            .to_string()
    }

    #[test]
    fn impact_score_halves_round_up() {
        assert_eq!(impact_line(1), "- Impact: Small PR (score 1)");
        assert_eq!(impact_line(5), "- Impact: Small PR (score 3)");
        assert_eq!(impact_line(4), "- Impact: Small PR (score 2)");
    }

    #[test]
    fn review_comment_rounds_impact_halves_up() {
        let agg = PrAggregate::new(
            "octo/hello",
            PullRequestSnapshot {
                additions: Some(5),
                deletions: Some(0),
                ..PullRequestSnapshot::new(2)
            },
        );
        let md = format_review_comment(&agg, &PrMetrics::for_aggregate(&agg), &[], 40);
        assert!(md.contains("- **Impact:** Small PR (score 3)"));
    }

    #[test]
    fn summary_is_deterministic() {
        let agg = full_aggregate();
        let metrics = PrMetrics::for_aggregate(&agg);
        assert_eq!(format_summary(&agg, &metrics), format_summary(&agg, &metrics));
    }

    #[test]
    fn review_comment_includes_checks_and_files() {
        let mut agg = full_aggregate();
        agg.changed_files = Some(vec!["src/login.rs".into()]);
        let metrics = PrMetrics::for_aggregate(&agg);
        let checks = vec![
            CheckOutcome {
                kind: CheckKind::Lint,
                command: "npm run lint".into(),
                passed: false,
                exit_code: Some(1),
                output: "line 1\nline 2\nline 3\n".into(),
                coverage: None,
            },
            CheckOutcome {
                kind: CheckKind::Coverage,
                command: "npm test".into(),
                passed: true,
                exit_code: Some(0),
                output: String::new(),
                coverage: Some(87.5),
            },
        ];

        let md = format_review_comment(&agg, &metrics, &checks, 2);
        assert!(md.starts_with("## PR Review: #12 \"Fix login\""));
        assert!(md.contains("| Lines changed | +600 / -100 |"));
        assert!(md.contains("- **PR type:** Bug Fix PR"));
        assert!(md.contains("factors: large-diff, many-files"));
        assert!(md.contains("### Changed files (1)\n\n- `src/login.rs`"));
        assert!(md.contains("### Lint failed"));
        assert!(md.contains("```text\nline 2\nline 3\n```"));
        assert!(!md.contains("line 1"));
        assert!(md.contains("### Coverage passed (87.5%)"));
        assert_eq!(md, format_review_comment(&agg, &metrics, &checks, 2));
    }

    #[test]
    fn review_comment_placeholders() {
        let agg = PrAggregate::new("octo/hello", PullRequestSnapshot::new(9));
        let md = format_review_comment(&agg, &PrMetrics::for_aggregate(&agg), &[], 40);
        assert!(md.contains("| Lines changed | n/a |"));
        assert!(md.contains("_No commit messages retrieved._"));
        assert!(md.contains("_No reviews yet._"));
        assert!(!md.contains("Changed files"));
        assert!(md.ends_with("<sub>Generated by prlens</sub>\n"));
    }
}
