use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};
use prlens_core::{GitHubApi, PrlensConfig, SortKey};
use prlens_review::github::{parse_repository, GitHubClient};
use prlens_review::pipeline;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = ".prlens.toml";

#[derive(Parser)]
#[command(
    name = "prlens",
    version,
    about = "GitHub pull request activity reports and review comments",
    long_about = "prlens summarizes recent pull request activity and reviews pull requests.\n\n\
                   It groups a user's public events per pull request, fills in missing\n\
                   details from the GitHub API, and scores each PR for impact, change\n\
                   type and regression risk.\n\n\
                   Examples:\n  \
                     prlens events octocat                 Summarize recent PR activity\n  \
                     prlens events octocat limit=5 sort=impact\n  \
                     prlens review 42 --dry-run            Print the review for PR #42\n  \
                     prlens init                           Write a default .prlens.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .prlens.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a user's recent pull request activity
    #[command(long_about = "Summarize a user's recent pull request activity.\n\n\
        Fetches the user's public events, groups them per pull request and prints\n\
        one summary per PR. Options may also be given as key=value pairs.\n\n\
        Examples:\n  prlens events octocat\n  prlens events octocat limit=3 sort=lines\n  prlens events octocat --sort reviews")]
    Events {
        /// GitHub username
        username: String,

        /// Extra options as key=value (limit=N, sort=lines|impact|reviews)
        #[arg(value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Maximum number of summaries (0 = no limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Sort key: lines, impact or reviews
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Review a pull request of GITHUB_REPOSITORY and post a comment
    #[command(long_about = "Review a pull request and post the result as a comment.\n\n\
        Reads the repository from GITHUB_REPOSITORY (owner/repo), runs the lint and\n\
        coverage commands from the [checks] config section, and posts a markdown\n\
        review. Intended for CI.\n\n\
        Examples:\n  prlens review 42\n  prlens review 42 --dry-run\n  prlens review 42 --fail-on-checks")]
    Review {
        /// Pull request number
        number: u64,

        /// Print the review instead of posting it
        #[arg(long)]
        dry_run: bool,

        /// Exit with code 1 if any check failed
        #[arg(long)]
        fail_on_checks: bool,
    },
    /// Create a default .prlens.toml configuration file
    #[command(long_about = "Create a default .prlens.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .prlens.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# prlens configuration
# Environment variables GITHUB_TOKEN, GITHUB_REPOSITORY and GITHUB_API_URL
# override the values below.

[github]
# api_base = "https://api.github.com"
# user_agent = "prlens"
# timeout_secs = 30

[report]
# default_sort = "impact"   # lines | impact | reviews
# default_limit = 10        # 0 = no limit

[checks]
# lint_command = ["npm", "run", "lint"]
# coverage_command = ["npx", "jest", "--coverage"]
# min_coverage = 80.0
# max_output_lines = 40
# workdir = "."
"#;

/// Options passed as trailing `key=value` arguments to `events`.
#[derive(Debug, Default, PartialEq)]
struct ExtraArgs {
    limit: Option<usize>,
    sort: Option<SortKey>,
}

/// Parse `key=value` options. The first occurrence of a key wins and unknown
/// keys are ignored.
fn parse_extra_args(args: &[String]) -> Result<ExtraArgs> {
    let mut extra = ExtraArgs::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            miette::bail!(miette::miette!(
                help = "options are written as key=value, e.g. limit=5 sort=impact",
                "unexpected argument '{}'",
                arg
            ));
        };
        match key {
            "limit" if extra.limit.is_none() => {
                let limit = value.parse::<usize>().map_err(|_| {
                    miette::miette!(
                        help = "limit must be a non-negative integer",
                        "invalid limit '{}'",
                        value
                    )
                })?;
                extra.limit = Some(limit);
            }
            "sort" if extra.sort.is_none() => {
                extra.sort = Some(value.parse::<SortKey>().map_err(|e| miette::miette!("{}", e))?);
            }
            "limit" | "sort" => {}
            _ => tracing::warn!(%arg, "ignoring unknown option"),
        }
    }
    Ok(extra)
}

fn load_config(path: Option<&Path>) -> Result<PrlensConfig> {
    let mut config = match path {
        Some(path) => PrlensConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                PrlensConfig::from_file(default_path)?
            } else {
                PrlensConfig::default()
            }
        }
    };
    config.apply_env();
    Ok(config)
}

fn require_token(config: &PrlensConfig) -> Result<()> {
    if config.require_token().is_err() {
        miette::bail!(miette::miette!(
            help = "export GITHUB_TOKEN (or GH_TOKEN) with a personal access token",
            "GITHUB_TOKEN is not set"
        ));
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,prlens=debug,prlens_activity=debug,prlens_review=debug")
    } else {
        EnvFilter::try_from_env("PRLENS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn spinner(message: &'static str) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
            .expect("valid spinner template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    });
    init_tracing(cli.verbose);

    match cli.command {
        Command::Events {
            username,
            options,
            limit,
            sort,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let extra = parse_extra_args(&options)?;
            let limit = limit.or(extra.limit).or(config.report.default_limit);
            let sort = sort.or(extra.sort).or(config.report.default_sort);
            require_token(&config)?;

            let github = GitHubClient::new(&config.github)?;
            let spinner = spinner("Fetching events...");
            let events = match github.list_user_events(&username).await {
                Ok(events) => events,
                Err(e) => {
                    if let Some(pb) = spinner {
                        pb.finish_with_message("Failed");
                    }
                    eprintln!("{e}");
                    return Ok(());
                }
            };

            if events.is_empty() {
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                println!("No events found for this user.");
                return Ok(());
            }

            if let Some(pb) = &spinner {
                pb.set_message("Processing events...");
            }
            let report = pipeline::build_activity_report(&events, &github, sort, limit).await;
            tracing::debug!(stats = ?report.stats, "enrichment finished");
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            if report.is_empty() {
                println!("No matching events found (events may be of types not handled).");
            } else {
                println!("{}", report.render());
            }
        }
        Command::Review {
            number,
            dry_run,
            fail_on_checks,
        } => {
            let config = load_config(cli.config.as_deref())?;
            require_token(&config)?;
            let Some(repository) = config.github.repository.clone() else {
                miette::bail!(miette::miette!(
                    help = "set GITHUB_REPOSITORY to owner/repo",
                    "GITHUB_REPOSITORY is not set"
                ));
            };
            parse_repository(&repository)?;

            let github = GitHubClient::new(&config.github)?;
            let spinner = spinner("Preparing review...");
            let review = pipeline::prepare_review(&github, &repository, number, &config.checks)
                .await
                .inspect_err(|_| {
                    if let Some(pb) = &spinner {
                        pb.finish_with_message("Failed");
                    }
                })?;

            if dry_run {
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                println!("{}", review.comment);
            } else {
                if let Some(pb) = &spinner {
                    pb.set_message("Posting review...");
                }
                pipeline::publish_review(&github, &repository, number, &review)
                    .await
                    .inspect_err(|_| {
                        if let Some(pb) = &spinner {
                            pb.finish_with_message("Failed");
                        }
                    })?;
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                eprintln!("Posted review to {repository}#{number}");
            }

            if fail_on_checks && !review.checks_passed() {
                let failed: Vec<String> = review
                    .checks
                    .iter()
                    .filter(|c| !c.passed)
                    .map(|c| c.kind.to_string())
                    .collect();
                eprintln!("Checks failed: {}", failed.join(", "));
                std::process::exit(1);
            }
        }
        Command::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{} already exists", CONFIG_FILE);
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "prlens", &mut std::io::stdout());
        }
    }

    Ok(())
}
