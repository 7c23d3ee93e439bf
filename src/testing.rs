//! Test helpers: an in-memory [`NotionApi`] and response builders.

use crate::api::{HttpMethod, NotionApi};
use crate::error::{NotionError, Result};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// A request seen by [`FakeApi`]
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

enum Reply {
    Json(Value),
    Status(u16, String),
}

/// Replays canned responses by `(method, path)`; unknown routes get a 404
#[derive(Default)]
pub struct FakeApi {
    routes: Vec<(HttpMethod, String, Reply)>,
    sent: RefCell<Vec<SentRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, method: HttpMethod, path: &str, response: Value) -> Self {
        self.routes
            .push((method, path.to_string(), Reply::Json(response)));
        self
    }

    pub fn on_status(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            method,
            path.to_string(),
            Reply::Status(status, body.to_string()),
        ));
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.borrow().clone()
    }

    pub fn sent_to(&self, method: HttpMethod, path: &str) -> Vec<SentRequest> {
        self.sent()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl NotionApi for FakeApi {
    fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        self.sent.borrow_mut().push(SentRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        let reply = self
            .routes
            .iter()
            .find(|(m, p, _)| *m == method && p == path)
            .map(|(_, _, reply)| reply);

        match reply {
            Some(Reply::Json(value)) => Ok(value.clone()),
            Some(Reply::Status(status, body)) => Err(NotionError::Api {
                status: *status,
                body: body.clone(),
            }),
            None => Err(NotionError::Api {
                status: 404,
                body: format!(r#"{{"code":"object_not_found","path":"{}"}}"#, path),
            }),
        }
    }
}

/// Children listing path as built by [`NotionApi::block_children`]
pub fn children_path(id: &str) -> String {
    format!("/blocks/{}/children?page_size=100", id)
}

/// Add `plain_text` next to every `text.content`, the way Notion echoes
/// written rich text back
fn with_plain_text(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out: serde_json::Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), with_plain_text(v)))
                .collect();
            if let Some(content) = map.get("text").and_then(|t| t.get("content")) {
                out.insert("plain_text".to_string(), content.clone());
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(with_plain_text).collect()),
        other => other.clone(),
    }
}

/// Page object as Notion would return it for the written `properties`
pub fn page_from_written(id: &str, properties: Value) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": with_plain_text(&properties)
    })
}

/// Minimal PRD row
pub fn prd_page(id: &str, title: &str, status: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "이름": { "type": "title", "title": [{ "plain_text": title }] },
            "상태": { "type": "select", "select": { "name": status } }
        }
    })
}

pub fn child_page_block(id: &str, title: &str) -> Value {
    json!({ "object": "block", "id": id, "type": "child_page", "child_page": { "title": title } })
}

pub fn child_database_block(id: &str, title: &str) -> Value {
    json!({ "object": "block", "id": id, "type": "child_database", "child_database": { "title": title } })
}

pub fn list_of(results: Vec<Value>) -> Value {
    json!({ "object": "list", "results": results, "has_more": false, "next_cursor": null })
}

/// Serializes tests that touch process environment variables
pub fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Env var set for the lifetime of the value; the previous value is restored
/// on drop. Hold [`env_lock`] while it lives.
pub struct ScopedEnv {
    key: &'static str,
    old: Option<OsString>,
}

impl ScopedEnv {
    pub fn set(key: &'static str, value: impl AsRef<OsStr>) -> Self {
        let old = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, old }
    }

    pub fn unset(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, old }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        match &self.old {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}
