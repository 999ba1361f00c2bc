//! clonewatch - Track backport clone chains of tracker issues
//!
//! clonewatch fetches tracked issues from a document service, checks that
//! every required backport version has a clone in the issue's clone chain,
//! and lets you mark issues as complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clonewatch::board::Board;
use clonewatch::client::{DocumentService, HttpDocumentService};
use clonewatch::config::Config;
use clonewatch::output::{OutputFormat, render_cards, render_report};
use clonewatch::sync::SyncOutcome;
use clonewatch::{DEFAULT_CONFIG_PATH, find_project_root, load_config_or_default};
use clonewatch_core::{ALL_ASSIGNEES, AssigneeFilter, Filter};
use eyre::{Result, WrapErr};
use figue as args;
use owo_colors::OwoColorize;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Subcommand to run (default: list)
    #[facet(args::subcommand)]
    command: Option<Command>,

    /// Path to config file (default: .config/clonewatch/config.yaml)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Document service base URL (overrides service.url)
    #[facet(args::named, default)]
    url: Option<String>,
}

/// Subcommands
#[derive(Debug, facet::Facet)]
#[repr(u8)]
enum Command {
    /// Show documents as cards, with missing backport warnings
    List {
        /// Only show documents assigned to this person ("all" for everyone)
        #[facet(args::named, default)]
        assignee: Option<String>,

        /// Include completed documents
        #[facet(args::named, default)]
        show_completed: bool,

        /// Output format: text, json, markdown
        #[facet(args::named, args::short = 'f', default)]
        format: Option<String>,
    },

    /// Report documents whose clone chain lacks a required backport
    Check {
        /// Only check documents assigned to this person ("all" for everyone)
        #[facet(args::named, default)]
        assignee: Option<String>,

        /// Include completed documents
        #[facet(args::named, default)]
        show_completed: bool,

        /// Output format: text, json, markdown
        #[facet(args::named, args::short = 'f', default)]
        format: Option<String>,

        /// Exit with status 1 if any backport is missing
        #[facet(args::named, default)]
        check: bool,
    },

    /// Mark a document as complete
    Complete {
        /// Document id, e.g. OCPBUGS-1234
        #[facet(args::positional)]
        id: String,
    },

    /// Mark a document as incomplete again
    Reopen {
        /// Document id, e.g. OCPBUGS-1234
        #[facet(args::positional)]
        id: String,
    },

    /// Run the reference document service
    Serve {
        /// Port to listen on (default: server.port, then 8080)
        #[facet(args::named, args::short = 'p', default)]
        port: Option<u16>,

        /// JSON data file (default: server.data_file next to the config)
        #[facet(args::named, default)]
        data_file: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = figue::from_std_args()
        .map_err(|e| eyre::eyre!("Failed to parse command line arguments: {e}"))?;

    let project_root = find_project_root()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| project_root.join(DEFAULT_CONFIG_PATH));
    let config = load_config_or_default(&config_path)?;
    let config_dir = config_path
        .parent()
        .ok_or_else(|| eyre::eyre!("Config path has no parent directory"))?;

    let service_url = args
        .url
        .clone()
        .unwrap_or_else(|| config.service_url().to_string());

    let command = args.command.unwrap_or(Command::List {
        assignee: None,
        show_completed: false,
        format: None,
    });

    match command {
        Command::List {
            assignee,
            show_completed,
            format,
        } => {
            let board = load_board(&config, &service_url).await?;
            board.set_filter(make_filter(assignee, show_completed)).await;

            let cards = board.visible_cards().await;
            print!("{}", render_cards(&cards, parse_format(format)?)?);
            Ok(())
        }
        Command::Check {
            assignee,
            show_completed,
            format,
            check,
        } => {
            let board = load_board(&config, &service_url).await?;
            board.set_filter(make_filter(assignee, show_completed)).await;

            let report = board.report().await;
            print!("{}", render_report(&report, parse_format(format)?)?);

            if check && !report.is_passing() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Complete { id } => run_completion(&config, &service_url, &id, true).await,
        Command::Reopen { id } => run_completion(&config, &service_url, &id, false).await,
        Command::Serve { port, data_file } => {
            let port = port.unwrap_or_else(|| config.port());
            let data_file = data_file.unwrap_or_else(|| config.data_file(config_dir));
            run_server(port, data_file).await
        }
    }
}

fn make_filter(assignee: Option<String>, show_completed: bool) -> Filter {
    let selector = assignee.as_deref().unwrap_or(ALL_ASSIGNEES);
    Filter::new(AssigneeFilter::parse(selector), show_completed)
}

fn parse_format(format: Option<String>) -> Result<OutputFormat> {
    match format {
        None => Ok(OutputFormat::default()),
        Some(f) => OutputFormat::from_str(&f).ok_or_else(|| {
            eyre::eyre!("Unknown output format '{f}' (expected text, json or markdown)")
        }),
    }
}

async fn load_board(config: &Config, service_url: &str) -> Result<Board> {
    eprintln!(
        "{} Fetching documents from {}...",
        "->".blue().bold(),
        service_url.cyan()
    );

    let service: Arc<dyn DocumentService> = Arc::new(HttpDocumentService::new(
        service_url,
        config.request_timeout(),
    ));
    let board = Board::load(service, config.browse_url())
        .await
        .wrap_err_with(|| format!("Could not load documents from {service_url}"))?;

    let store = board.store();
    let count = store.read().await.len();
    eprintln!("   Found {} documents", count.to_string().green());

    Ok(board)
}

async fn run_completion(config: &Config, service_url: &str, id: &str, completed: bool) -> Result<()> {
    let board = load_board(config, service_url).await?;
    let state = if completed { "complete" } else { "incomplete" };

    let outcome = board
        .set_completion_if_changed(id, completed)
        .await
        .wrap_err_with(|| format!("Could not mark {id} as {state}"))?;

    match outcome {
        SyncOutcome::Committed { .. } => {
            eprintln!("{} Marked {} as {}", "OK".green().bold(), id.cyan(), state);
        }
        SyncOutcome::Unchanged { .. } => {
            eprintln!("{} {} is already {}", "OK".green().bold(), id.cyan(), state);
        }
    }

    if let Some(missing) = board.missing_backports(id).await {
        for version in missing {
            eprintln!(
                "   {} Missing backport for version {}",
                "!".yellow().bold(),
                version.yellow()
            );
        }
    }

    Ok(())
}

async fn run_server(port: u16, data_file: PathBuf) -> Result<()> {
    eprintln!(
        "{} Serving {} on port {}...",
        "->".blue().bold(),
        display_path(&data_file).cyan(),
        port
    );
    clonewatch::server::run(port, data_file).await
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
