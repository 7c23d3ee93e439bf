//! Command implementations for the three binaries.
//!
//! Each command loads the project config once, builds one client, runs a few
//! sequential requests and prints the result.

use super::output::{format_detail, format_logs, format_prds};
use super::{ConnectCli, ConnectMode, FetchCli, LogCli};
use crate::api::{store_api_key, ClientSettings, NotionClient};
use crate::config::{ParentRole, ProjectConfig};
use crate::connect::{create_tasks_database, link_existing, migrate_legacy};
use crate::error::NotionError;
use crate::identifier::{parse_id, NotionId};
use crate::mapper::{NewRecord, LOG_SCHEMA, PRD_SCHEMA};
use crate::records::{fetch_detail, log_target, ListQuery, RecordStore};
use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Status values `prd-fetch` accepts as a filter
pub const STATUS_FILTERS: [&str; 3] = ["대기", "진행중", "완료"];

/// What `prd-fetch` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    List(Option<String>),
    Detail(NotionId),
}

impl FetchMode {
    /// `detail <id>`, a known status, or anything else (= list everything)
    pub fn from_args(filter: Option<&str>, id: Option<&str>) -> Result<Self> {
        match (filter, id) {
            (Some("detail"), Some(id)) => Ok(Self::Detail(parse_id(id)?)),
            (Some("detail"), None) => bail!("usage: prd-fetch detail <ID>"),
            (Some(status), _) if STATUS_FILTERS.contains(&status) => {
                Ok(Self::List(Some(status.to_string())))
            }
            (Some(other), _) => {
                tracing::warn!(
                    "Unknown filter `{}` (expected one of {}), listing everything",
                    other,
                    STATUS_FILTERS.join(", ")
                );
                Ok(Self::List(None))
            }
            (None, _) => Ok(Self::List(None)),
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prompt for the API key without echoing it
fn prompt_api_key(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let key = rpassword::read_password().context("Cannot read API key")?;
    if key.trim().is_empty() {
        bail!("API key cannot be empty");
    }
    Ok(key.trim().to_string())
}

/// Client from the stored key; asks for a key and stores it when missing
fn client_or_store_key(settings: ClientSettings) -> Result<NotionClient> {
    match NotionClient::from_settings(settings.clone()) {
        Ok(client) => Ok(client),
        Err(NotionError::MissingCredential { path }) => {
            println!("\n{}", "Notion API key".cyan().bold());
            println!(
                "  No key at {}. Create an integration at {} and paste its secret.",
                path.display(),
                "https://www.notion.so/my-integrations".cyan()
            );
            let key = prompt_api_key("API key: ")?;
            store_api_key(&path, &key)?;
            println!("  {} Saved API key to {}", "✓".green(), path.display());
            Ok(NotionClient::new(key, settings))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_saved(path: &Path, config: &ProjectConfig) -> Result<()> {
    println!("\n{} {}", "✅ Connected:".green().bold(), path.display());
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

fn select_mode() -> Result<ConnectMode> {
    let items = [
        "Create a new tasks database (paste the project page URL; schema copied from the template)",
        "Link an existing tasks database (paste the project page URL or the database URL)",
    ];
    let choice = Select::new()
        .with_prompt("Mode")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(if choice == 0 {
        ConnectMode::Create
    } else {
        ConnectMode::Link
    })
}

/// `notion-connect`
pub fn connect(args: ConnectCli) -> Result<()> {
    println!("{}", "🔗 notion-connect".bold().cyan());
    let config_path = args.common.config_path();
    let settings = ClientSettings::from_env();

    if args.migrate {
        return migrate(&config_path, settings);
    }

    if config_path.exists() {
        let existing = ProjectConfig::load(&config_path)?;
        println!("\nExisting config: {}", config_path.display());
        println!("{}", existing.to_pretty_json()?);

        if existing.has_legacy_keys() {
            println!(
                "\n{}",
                "Legacy keys (prd_db_id / dev_log_db_id) found. Run `notion-connect --migrate` \
                 to convert them, or link a project page below to replace them."
                    .yellow()
            );
        }

        let overwrite = args.yes
            || Confirm::new()
                .with_prompt("Overwrite?")
                .default(false)
                .interact()?;
        if !overwrite {
            println!("Keeping the existing config.");
            return Ok(());
        }
    }

    let mode = match args.mode {
        Some(mode) => mode,
        None => select_mode()?,
    };
    let client = client_or_store_key(settings)?;

    let url = match args.url {
        Some(url) => url,
        None => {
            let prompt = match mode {
                ConnectMode::Create => "Project page URL",
                ConnectMode::Link => "Project page or tasks database URL",
            };
            Input::<String>::new().with_prompt(prompt).interact_text()?
        }
    };
    let id = parse_id(&url)?;

    let progress = match mode {
        ConnectMode::Create => spinner("Creating tasks database..."),
        ConnectMode::Link => spinner("Looking up tasks database..."),
    };
    let result = match mode {
        ConnectMode::Create => create_tasks_database(&client, &id),
        ConnectMode::Link => link_existing(&client, &id),
    };
    progress.finish_and_clear();

    let config = result?;
    config.save(&config_path)?;
    print_saved(&config_path, &config)
}

fn migrate(config_path: &Path, settings: ClientSettings) -> Result<()> {
    let existing = ProjectConfig::load(config_path)?;
    if !existing.has_legacy_keys() {
        println!("{}", "Config is already in the current format.".green());
        return Ok(());
    }

    let client = client_or_store_key(settings)?;
    let migrated = migrate_legacy(&client, &existing)?;
    if existing.dev_log_db_id.is_some() {
        println!(
            "  {} dev_log_db_id dropped; new logs go under the project page.",
            "→".cyan()
        );
    }

    migrated.save(config_path)?;
    print_saved(config_path, &migrated)
}

/// `dev-log`
pub fn log(args: LogCli) -> Result<()> {
    if !args.list && args.title.is_none() {
        LogCli::command().print_help()?;
        return Ok(());
    }

    let config = ProjectConfig::load(&args.common.config_path())?;
    let (parent, related) = log_target(&config, args.prd.as_deref())?;
    let client = NotionClient::from_settings(ClientSettings::from_env())?;
    let store = RecordStore::new(&client, parent, LOG_SCHEMA);

    if args.list {
        let logs = store.list(&ListQuery::new(args.limit))?;
        println!("{}", format_logs(&logs));
        return Ok(());
    }

    let Some(title) = args.title else {
        return Ok(());
    };
    let record = NewRecord::new(title.clone(), args.log_type.label())
        .with_content(args.content)
        .with_related(related);
    let id = store.create(&record)?;

    println!("{} {}", "✅ 로그 기록됨:".green(), title);
    println!("   ID: {}", id);
    Ok(())
}

/// `prd-fetch`
pub fn fetch(args: FetchCli) -> Result<()> {
    let mode = FetchMode::from_args(args.filter.as_deref(), args.id.as_deref())?;

    match mode {
        FetchMode::Detail(id) => {
            let client = NotionClient::from_settings(ClientSettings::from_env())?;
            let detail = fetch_detail(&client, &id, &PRD_SCHEMA)
                .with_context(|| format!("Cannot fetch PRD {}", id))?;
            println!("{}", format_detail(&detail));
        }
        FetchMode::List(filter) => {
            let config = ProjectConfig::load(&args.common.config_path())?;
            let parent = config.resolve_parent(ParentRole::Records, None)?;
            let client = NotionClient::from_settings(ClientSettings::from_env())?;
            let store = RecordStore::new(&client, parent, PRD_SCHEMA);

            let records = store.list(&ListQuery::new(args.limit).with_filter(filter))?;
            print!("{}", format_prds(&records));
            if records.is_empty() {
                println!();
            }
        }
    }

    Ok(())
}
