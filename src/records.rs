//! Records module - create and list records under a parent container.
//!
//! A parent is either:
//! - a database: records are rows, listed with a sorted/filtered query
//! - a page: records are child pages, listed by enumerating children
//!   (no filtering)
//!
//! Only the first page of results is read.

use crate::api::{object_id, results, NotionApi};
use crate::config::{Parent, ParentKind, ParentRole, ProjectConfig};
use crate::error::{NotionError, Result};
use crate::identifier::{parse_id, NotionId};
use crate::mapper::{
    log_body_blocks, page_title_properties, render_blocks, NewRecord, Record, RecordSchema,
};
use serde_json::{json, Value};

/// Notion caps `page_size` at 100
pub const MAX_PAGE_SIZE: usize = 100;

/// What to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    /// Equality filter on the category select (database parents only)
    pub filter: Option<String>,
}

impl ListQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}

/// A single record with its page body rendered as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDetail {
    pub record: Record,
    pub body: String,
}

/// Records of one kind under one parent
pub struct RecordStore<'a> {
    api: &'a dyn NotionApi,
    parent: Parent,
    schema: RecordSchema,
}

impl<'a> RecordStore<'a> {
    pub fn new(api: &'a dyn NotionApi, parent: Parent, schema: RecordSchema) -> Self {
        Self {
            api,
            parent,
            schema,
        }
    }

    /// Create a record and return its page id
    pub fn create(&self, record: &NewRecord) -> Result<String> {
        match self.parent.kind {
            ParentKind::Database => {
                let body = json!({
                    "parent": { "type": "database_id", "database_id": self.parent.id },
                    "properties": self.schema.properties(record),
                });
                let page = self.api.create_page(&body)?;
                let id = object_id(&page)?;
                tracing::info!("Created row {} in database {}", id, self.parent.id);
                Ok(id)
            }
            ParentKind::Page => {
                let body = json!({
                    "parent": { "type": "page_id", "page_id": self.parent.id },
                    "properties": page_title_properties(&record.title),
                });
                let page = self.api.create_page(&body)?;
                let id = object_id(&page)?;
                self.api.append_children(&id, log_body_blocks(record))?;
                tracing::info!("Created child page {} under {}", id, self.parent.id);
                Ok(id)
            }
        }
    }

    /// Newest records first, at most `query.limit`
    pub fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        match self.parent.kind {
            ParentKind::Database => self.query_rows(query),
            ParentKind::Page => {
                if let Some(filter) = &query.filter {
                    return Err(NotionError::FilterUnsupported(filter.clone()));
                }
                self.child_pages(query.limit)
            }
        }
    }

    fn query_rows(&self, query: &ListQuery) -> Result<Vec<Record>> {
        let mut body = json!({
            "sorts": [{ "timestamp": "created_time", "direction": "descending" }],
            "page_size": query.limit.min(MAX_PAGE_SIZE),
        });
        if let Some(filter) = &query.filter {
            body["filter"] = self.schema.category_filter(filter);
        }

        let response = self.api.query_database(&self.parent.id, &body)?;
        Ok(results(&response)
            .iter()
            .take(query.limit)
            .map(|page| self.schema.read(page))
            .collect())
    }

    fn child_pages(&self, limit: usize) -> Result<Vec<Record>> {
        let response = self.api.block_children(&self.parent.id)?;
        Ok(results(&response)
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("child_page"))
            .take(limit)
            .map(Record::from_child_page)
            .collect())
    }
}

/// A page's properties plus its flattened block text
pub fn fetch_detail(api: &dyn NotionApi, id: &NotionId, schema: &RecordSchema) -> Result<RecordDetail> {
    let page = api.retrieve_page(&id.as_dashed())?;
    let blocks = api.block_children(&id.as_dashed())?;
    Ok(RecordDetail {
        record: schema.read(&page),
        body: render_blocks(results(&blocks)),
    })
}

/// Where a dev log goes, and what it relates to.
///
/// With a page parent a PRD id becomes the parent itself (the log is a child
/// page of the PRD page). With a legacy log database the PRD id is stored as a
/// relation instead.
pub fn log_target(config: &ProjectConfig, prd: Option<&str>) -> Result<(Parent, Option<NotionId>)> {
    let prd_id = prd
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_id)
        .transpose()?;

    match (config.resolve_parent(ParentRole::Logs, None), prd_id) {
        (Ok(parent), related) if parent.kind == ParentKind::Database => Ok((parent, related)),
        (_, Some(id)) => {
            let parent = config.resolve_parent(ParentRole::Logs, Some(&id.as_dashed()))?;
            Ok((parent, None))
        }
        (base, None) => Ok((base?, None)),
    }
}
