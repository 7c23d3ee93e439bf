//! CLI definitions for the three binaries.
//!
//! - `notion-connect`: link the project to a page / tasks database
//! - `dev-log`: write or list dev logs
//! - `prd-fetch`: list PRD items or print one

pub mod commands;
pub mod output;

use crate::config::default_config_path;
use crate::error::NotionError;
use clap::{Args, Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

/// Flags shared by every binary
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Project config file (default: .notion/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

/// How `notion-connect` obtains the tasks database
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectMode {
    /// Create a new `작업` database inside the project page
    Create,
    /// Link an existing project page or tasks database
    Link,
}

/// Link this project to a Notion project page and tasks database
#[derive(Parser, Debug)]
#[command(name = "notion-connect")]
#[command(author, version, about, long_about = None)]
pub struct ConnectCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Project page or tasks database URL (prompted when omitted)
    #[arg(long)]
    pub url: Option<String>,

    /// Create a new tasks database or link an existing one (prompted when omitted)
    #[arg(long, value_enum)]
    pub mode: Option<ConnectMode>,

    /// Overwrite an existing config without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Convert a legacy config (prd_db_id / dev_log_db_id) to project_page_id + tasks_db_id
    #[arg(long, conflicts_with_all = ["url", "mode"])]
    pub migrate: bool,
}

/// Dev log type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogCategory {
    #[value(name = "기능")]
    Feature,
    #[value(name = "버그")]
    Bug,
    #[value(name = "리팩토링")]
    Refactor,
    #[value(name = "문서")]
    Docs,
}

impl LogCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Feature => "기능",
            Self::Bug => "버그",
            Self::Refactor => "리팩토링",
            Self::Docs => "문서",
        }
    }
}

/// Record a dev log as a child page of the project (or PRD) page
#[derive(Parser, Debug)]
#[command(name = "dev-log")]
#[command(author, version, about, long_about = None)]
pub struct LogCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Log title
    pub title: Option<String>,

    /// Log type
    #[arg(short = 't', long = "type", value_enum, default_value_t = LogCategory::Feature)]
    pub log_type: LogCategory,

    /// Details
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Related PRD page id or URL (the log goes inside that page)
    #[arg(short, long)]
    pub prd: Option<String>,

    /// List logs instead of writing one
    #[arg(short, long)]
    pub list: bool,

    /// Number of logs to list
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Fetch PRD items from the tasks database
#[derive(Parser, Debug)]
#[command(name = "prd-fetch")]
#[command(author, version, about, long_about = None)]
pub struct FetchCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Status filter (대기, 진행중, 완료) or `detail`
    #[arg(value_name = "FILTER")]
    pub filter: Option<String>,

    /// Page id or URL, with `detail`
    #[arg(value_name = "ID")]
    pub id: Option<String>,

    /// Maximum number of items
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

/// Filter directives: `RUST_LOG` as given, the crate at `warn` when it is
/// unset, and the crate at `debug` on top of either with `--verbose`.
pub fn log_directives(verbose: bool, rust_log: Option<&str>) -> String {
    let rust_log = rust_log.map(str::trim).filter(|v| !v.is_empty());
    match (verbose, rust_log) {
        (true, Some(env)) => format!("{},notion_skills=debug", env),
        (true, None) => "notion_skills=debug".to_string(),
        (false, Some(env)) => env.to_string(),
        (false, None) => "notion_skills=warn".to_string(),
    }
}

/// Initialize tracing. Logs go to stderr so stdout stays clean.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok();
    let directives = log_directives(verbose, rust_log.as_deref());
    let filter = tracing_subscriber::EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_directives(verbose, None)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error the way every binary does before exiting non-zero
pub fn report_error(err: &anyhow::Error) {
    let actionable = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<NotionError>())
        .any(NotionError::is_user_actionable);

    let message = format!("{:#}", err);
    if actionable {
        eprintln!("{} {}", "✗".red(), message.yellow());
    } else {
        eprintln!("{} {}", "✗".red(), message.red());
    }
}
