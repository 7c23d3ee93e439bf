//! Connect flows - resolve what the user pasted into a project config.
//!
//! - create: make a `작업` database inside the project page, copying the
//!   property schema from the shared template page when it is reachable
//! - link: accept either the project page or the tasks database
//! - migrate: turn a legacy `prd_db_id` config into the current shape

use crate::api::{object_id, results, NotionApi};
use crate::config::ProjectConfig;
use crate::error::{NotionError, Result};
use crate::identifier::NotionId;
use crate::mapper::rich_text;
use serde_json::{json, Map, Value};

/// Page holding the reference tasks database
pub const TEMPLATE_PAGE_ID: &str = "2fa9589f-b79f-8096-be44-c3b5741ec9d1";
/// Title of the tasks database
pub const TASKS_DB_TITLE: &str = "작업";

/// Schema used when the template cannot be read
pub fn fallback_tasks_schema() -> Value {
    json!({ "Name": { "title": {} } })
}

/// Child database titled [`TASKS_DB_TITLE`], else the first child database
fn pick_tasks_database(blocks: &[Value]) -> Option<String> {
    let databases: Vec<&Value> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("child_database"))
        .collect();

    databases
        .iter()
        .find(|b| {
            b.pointer("/child_database/title")
                .and_then(Value::as_str)
                .map(str::trim)
                == Some(TASKS_DB_TITLE)
        })
        .or_else(|| databases.first())
        .and_then(|b| b.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Database properties reshaped for creation: `{name: {type: config}}`
fn creatable_properties(database: &Value) -> Option<Value> {
    let props = database.get("properties")?.as_object()?;
    let mut out = Map::new();
    for (name, prop) in props {
        let Some(prop_type) = prop.get("type").and_then(Value::as_str) else {
            continue;
        };
        let inner = prop
            .get(prop_type)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!({}));
        out.insert(name.clone(), json!({ prop_type: inner }));
    }
    if out.is_empty() {
        None
    } else {
        Some(Value::Object(out))
    }
}

/// Property schema of the template's tasks database, `None` when the
/// template is unreachable or has no database
pub fn template_tasks_schema(api: &dyn NotionApi, template_page_id: &str) -> Option<Value> {
    let blocks = match api.block_children(template_page_id) {
        Ok(blocks) => blocks,
        Err(e) => {
            tracing::warn!("Cannot read template page: {}", e);
            return None;
        }
    };
    let db_id = pick_tasks_database(results(&blocks))?;

    match api.retrieve_database(&db_id) {
        Ok(database) => creatable_properties(&database),
        Err(e) => {
            tracing::warn!("Cannot read template database {}: {}", db_id, e);
            None
        }
    }
}

/// Create the tasks database under the project page
pub fn create_tasks_database(api: &dyn NotionApi, project_page: &NotionId) -> Result<ProjectConfig> {
    let schema = template_tasks_schema(api, TEMPLATE_PAGE_ID).unwrap_or_else(|| {
        tracing::warn!("Template unavailable, creating tasks database with the default schema");
        fallback_tasks_schema()
    });

    let body = json!({
        "parent": { "type": "page_id", "page_id": project_page.as_dashed() },
        "title": rich_text(TASKS_DB_TITLE),
        "properties": schema,
    });
    let database = api.create_database(&body)?;
    let tasks_db_id = object_id(&database)?;
    tracing::info!("Created tasks database {}", tasks_db_id);

    Ok(ProjectConfig::new(project_page.as_dashed(), tasks_db_id))
}

/// 400/404 on a lookup: the id is the other kind of object or is not shared
/// with the integration
fn is_lookup_miss(err: &NotionError) -> bool {
    matches!(err, NotionError::Api { status: 400 | 404, .. })
}

fn not_linkable(id: &str, miss: Option<&NotionError>) -> NotionError {
    let mut message = format!(
        "{} is neither a project page with a database nor a tasks database; \
         paste the project page URL or the tasks database URL and share it with the integration",
        id
    );
    if let Some(err) = miss {
        message.push_str(&format!(" (last reply: {})", err));
    }
    NotionError::Setup(message)
}

/// Link an existing project page (with a child database) or tasks database.
/// Only lookup misses fall through to the next attempt; any other API error
/// is returned as is.
pub fn link_existing(api: &dyn NotionApi, id: &NotionId) -> Result<ProjectConfig> {
    let id = id.as_dashed();
    let mut miss = None;

    match api.block_children(&id) {
        Ok(children) => {
            if let Some(db_id) = pick_tasks_database(results(&children)) {
                return Ok(ProjectConfig::new(id, db_id));
            }
        }
        Err(e) if is_lookup_miss(&e) => {
            tracing::debug!("{} is not a readable page: {}", id, e);
            miss = Some(e);
        }
        Err(e) => return Err(e),
    }

    match api.retrieve_database(&id) {
        Ok(database) if database.get("object").and_then(Value::as_str) == Some("database") => {
            let page_id = parent_page_id(&database).ok_or_else(|| {
                NotionError::Setup(format!("database {} is not inside a page", id))
            })?;
            Ok(ProjectConfig::new(page_id, id))
        }
        Ok(_) => Err(not_linkable(&id, miss.as_ref())),
        Err(e) if is_lookup_miss(&e) => Err(not_linkable(&id, Some(&e))),
        Err(e) => Err(e),
    }
}

fn parent_page_id(object: &Value) -> Option<String> {
    let parent = object.get("parent")?;
    if parent.get("type").and_then(Value::as_str) != Some("page_id") {
        return None;
    }
    parent
        .get("page_id")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Rewrite a legacy config into the current shape. The project page is the
/// parent page of the PRD database.
pub fn migrate_legacy(api: &dyn NotionApi, config: &ProjectConfig) -> Result<ProjectConfig> {
    if let Some(page) = config
        .project_page_id
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        return Ok(config.migrated(page));
    }

    let db_id = [&config.tasks_db_id, &config.prd_db_id]
        .into_iter()
        .filter_map(|id| id.as_deref())
        .find(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            NotionError::Setup("nothing to migrate: config has no prd_db_id".to_string())
        })?;

    let database = api.retrieve_database(db_id)?;
    let page_id = parent_page_id(&database).ok_or_else(|| {
        NotionError::Setup(format!(
            "PRD database {} is not inside a page; run `notion-connect` and link a project page",
            db_id
        ))
    })?;

    tracing::info!("Migrating legacy config: project page {}", page_id);
    Ok(config.migrated(page_id))
}
