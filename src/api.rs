//! Notion REST gateway.
//!
//! Every request carries a bearer token read from the credential file and the
//! fixed `Notion-Version` header. Non-2xx responses abort the calling
//! operation with the status and the verbatim body; nothing is retried.

use crate::config::default_credentials_path;
use crate::error::{NotionError, Result};
use serde_json::{json, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Notion REST base URL
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
/// Protocol version sent with every request
pub const NOTION_VERSION: &str = "2022-06-28";
/// Env var overriding [`NOTION_API_BASE`]
pub const API_BASE_ENV: &str = "NOTION_API_BASE";

/// Children listing page size; only the first page is ever read
const CHILDREN_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

/// Where and how to talk to Notion
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub notion_version: String,
    pub credentials_path: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: NOTION_API_BASE.to_string(),
            notion_version: NOTION_VERSION.to_string(),
            credentials_path: default_credentials_path(),
        }
    }
}

impl ClientSettings {
    /// Defaults with `NOTION_API_BASE` applied
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                settings.base_url = base.trim().to_string();
            }
        }
        settings
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Read the API key, trailing whitespace stripped
pub fn load_api_key(path: &Path) -> Result<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(NotionError::MissingCredential {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(NotionError::io(
                format!("Cannot read API key: {}", path.display()),
                e,
            ))
        }
    };

    let key = content.trim_end().to_string();
    if key.is_empty() {
        return Err(NotionError::MissingCredential {
            path: path.to_path_buf(),
        });
    }
    Ok(key)
}

/// Write the API key, readable by the owner only on unix
pub fn store_api_key(path: &Path, key: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            NotionError::io(format!("Cannot create directory: {}", parent.display()), e)
        })?;
    }

    std::fs::write(path, format!("{}\n", key.trim()))
        .map_err(|e| NotionError::io(format!("Cannot write API key: {}", path.display()), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
            NotionError::io(format!("Cannot restrict permissions: {}", path.display()), e)
        })?;
    }

    Ok(())
}

/// The Notion endpoints the tools use.
///
/// Only [`NotionApi::request`] talks to the network; the rest build paths and
/// bodies on top of it.
pub trait NotionApi {
    fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value>;

    fn get(&self, path: &str) -> Result<Value> {
        self.request(HttpMethod::Get, path, None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(HttpMethod::Post, path, Some(body))
    }

    fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(HttpMethod::Patch, path, Some(body))
    }

    fn retrieve_page(&self, page_id: &str) -> Result<Value> {
        self.get(&format!("/pages/{}", page_id))
    }

    fn retrieve_database(&self, database_id: &str) -> Result<Value> {
        self.get(&format!("/databases/{}", database_id))
    }

    /// First page of a block's children
    fn block_children(&self, block_id: &str) -> Result<Value> {
        self.get(&format!(
            "/blocks/{}/children?page_size={}",
            block_id, CHILDREN_PAGE_SIZE
        ))
    }

    fn append_children(&self, block_id: &str, children: Vec<Value>) -> Result<Value> {
        self.patch(
            &format!("/blocks/{}/children", block_id),
            &json!({ "children": children }),
        )
    }

    fn create_page(&self, body: &Value) -> Result<Value> {
        self.post("/pages", body)
    }

    fn create_database(&self, body: &Value) -> Result<Value> {
        self.post("/databases", body)
    }

    fn query_database(&self, database_id: &str, body: &Value) -> Result<Value> {
        self.post(&format!("/databases/{}/query", database_id), body)
    }
}

/// `id` field of a created/returned object
pub fn object_id(value: &Value) -> Result<String> {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NotionError::UnexpectedResponse(format!("no `id` in {}", value)))
}

/// `results` array of a list/query response, empty if absent
pub fn results(value: &Value) -> &[Value] {
    value
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Blocking reqwest client for the Notion API
pub struct NotionClient {
    client: reqwest::blocking::Client,
    settings: ClientSettings,
    api_key: String,
}

impl NotionClient {
    pub fn new(api_key: impl Into<String>, settings: ClientSettings) -> Self {
        Self::with_http_client(reqwest::blocking::Client::new(), api_key, settings)
    }

    pub fn with_http_client(
        client: reqwest::blocking::Client,
        api_key: impl Into<String>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            client,
            settings,
            api_key: api_key.into(),
        }
    }

    /// Client using the key stored at `settings.credentials_path`
    pub fn from_settings(settings: ClientSettings) -> Result<Self> {
        let api_key = load_api_key(&settings.credentials_path)?;
        Ok(Self::new(api_key, settings))
    }
}

impl NotionApi for NotionClient {
    fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.settings.url(path);
        tracing::debug!("{} {}", method, url);

        let builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
        };

        let mut builder = builder
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.settings.notion_version)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            tracing::debug!("{} {} -> {}", method, url, status);
            return Err(NotionError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| NotionError::json(format!("Cannot parse response of {} {}", method, path), e))
    }
}
