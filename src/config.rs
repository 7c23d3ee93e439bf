//! Config module - the `.notion/config.json` file linking a project to Notion.
//!
//! Two shapes exist on disk:
//! - current: `project_page_id` + `tasks_db_id`
//! - legacy: `prd_db_id` + `dev_log_db_id` (separate databases)
//!
//! Both load into the same [`ProjectConfig`]. Consumers never branch on the
//! shape themselves; they ask [`ProjectConfig::resolve_parent`] for the
//! container to work against. `notion-connect --migrate` rewrites a legacy
//! file into the current shape once.

use crate::error::{NotionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Directory holding the project config, relative to the working directory
pub const CONFIG_DIR: &str = ".notion";
/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.json";

/// Env var overriding the credential file location
pub const API_KEY_FILE_ENV: &str = "NOTION_API_KEY_FILE";

/// Default project config path (`.notion/config.json`)
pub fn default_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Credential file path (`~/.config/notion/api_key`), unless overridden by
/// `NOTION_API_KEY_FILE`
pub fn default_credentials_path() -> PathBuf {
    if let Some(path) = std::env::var_os(API_KEY_FILE_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join("notion").join("api_key"))
        .unwrap_or_else(|| PathBuf::from("api_key"))
}

/// Which on-disk shape a config has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaShape {
    /// Only current keys
    Current,
    /// Only legacy keys
    Legacy,
    /// Both; current keys take precedence
    Mixed,
    /// No known key set
    Empty,
}

/// Kind of remote container a record tool writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    /// Records are rows of a structured database
    Database,
    /// Records are child pages of a page
    Page,
}

/// The container an operation runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parent {
    pub id: String,
    pub kind: ParentKind,
}

impl Parent {
    pub fn database(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ParentKind::Database,
        }
    }

    pub fn page(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ParentKind::Page,
        }
    }
}

/// What the caller needs a parent for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRole {
    /// PRD / task records
    Records,
    /// Dev log entries
    Logs,
}

/// Contents of `.notion/config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project page containing the tasks database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_page_id: Option<String>,

    /// Tasks (PRD) database inside the project page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_db_id: Option<String>,

    /// Legacy: standalone PRD database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prd_db_id: Option<String>,

    /// Legacy: standalone dev-log database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_log_db_id: Option<String>,

    /// Keys this tool does not know about, kept on save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl ProjectConfig {
    /// Current-shape config
    pub fn new(project_page_id: impl Into<String>, tasks_db_id: impl Into<String>) -> Self {
        Self {
            project_page_id: Some(project_page_id.into()),
            tasks_db_id: Some(tasks_db_id.into()),
            ..Self::default()
        }
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NotionError::NotConfigured {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(NotionError::io(
                    format!("Cannot read config file: {}", path.display()),
                    e,
                ))
            }
        };

        let config: ProjectConfig = serde_json::from_str(&content).map_err(|e| {
            NotionError::json(format!("Cannot parse config file: {}", path.display()), e)
        })?;

        tracing::debug!("Loaded {} config from {}", config.shape_name(), path.display());
        Ok(config)
    }

    /// Save config, creating the parent directory. Overwrites unconditionally.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                NotionError::io(format!("Cannot create directory: {}", parent.display()), e)
            })?;
        }

        let content = self.to_pretty_json()?;
        std::fs::write(path, content + "\n").map_err(|e| {
            NotionError::io(format!("Cannot write config file: {}", path.display()), e)
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NotionError::json("Cannot serialize config", e))
    }

    pub fn shape(&self) -> SchemaShape {
        let current =
            non_empty(&self.project_page_id).is_some() || non_empty(&self.tasks_db_id).is_some();
        let legacy =
            non_empty(&self.prd_db_id).is_some() || non_empty(&self.dev_log_db_id).is_some();
        match (current, legacy) {
            (true, false) => SchemaShape::Current,
            (false, true) => SchemaShape::Legacy,
            (true, true) => SchemaShape::Mixed,
            (false, false) => SchemaShape::Empty,
        }
    }

    fn shape_name(&self) -> &'static str {
        match self.shape() {
            SchemaShape::Current => "current",
            SchemaShape::Legacy => "legacy",
            SchemaShape::Mixed => "mixed",
            SchemaShape::Empty => "empty",
        }
    }

    /// Has any legacy key that a migration would drop
    pub fn has_legacy_keys(&self) -> bool {
        matches!(self.shape(), SchemaShape::Legacy | SchemaShape::Mixed)
    }

    /// Pick the container for `role`: an explicit override first, then the
    /// role's keys in priority order (current shape before legacy). The first
    /// non-empty value wins.
    pub fn resolve_parent(&self, role: ParentRole, override_id: Option<&str>) -> Result<Parent> {
        if let Some(id) = override_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(Parent::page(id));
        }

        let candidates: Vec<(&str, &Option<String>, ParentKind)> = match role {
            ParentRole::Records => vec![
                ("tasks_db_id", &self.tasks_db_id, ParentKind::Database),
                ("prd_db_id", &self.prd_db_id, ParentKind::Database),
                ("project_page_id", &self.project_page_id, ParentKind::Page),
            ],
            ParentRole::Logs => vec![
                ("project_page_id", &self.project_page_id, ParentKind::Page),
                ("dev_log_db_id", &self.dev_log_db_id, ParentKind::Database),
            ],
        };

        for (key, value, kind) in &candidates {
            if let Some(id) = non_empty(value) {
                tracing::debug!("Resolved {:?} parent from `{}`", role, key);
                return Ok(Parent {
                    id: id.to_string(),
                    kind: *kind,
                });
            }
        }

        let keys = candidates
            .iter()
            .map(|(key, _, _)| *key)
            .collect::<Vec<_>>()
            .join(", ");
        Err(NotionError::MissingParent { keys })
    }

    /// Current-shape copy of a legacy config. The PRD database becomes the
    /// tasks database; legacy keys are dropped.
    pub fn migrated(&self, project_page_id: impl Into<String>) -> Self {
        let tasks_db_id = non_empty(&self.tasks_db_id)
            .or_else(|| non_empty(&self.prd_db_id))
            .map(str::to_string);
        Self {
            project_page_id: Some(project_page_id.into()),
            tasks_db_id,
            prd_db_id: None,
            dev_log_db_id: None,
            extra: self.extra.clone(),
        }
    }
}
