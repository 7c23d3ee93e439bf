//! Error types for notion-skills.
//!
//! Library code returns `NotionError`; the binaries wrap it in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Every error the library can return
#[derive(Debug, Error)]
pub enum NotionError {
    /// `.notion/config.json` does not exist yet
    #[error("config file not found: {} (run `notion-connect` first)", path.display())]
    NotConfigured { path: PathBuf },

    /// No API key stored
    #[error(
        "API key not found: {} (create an integration at https://www.notion.so/my-integrations, \
         then store its secret in this file or run `notion-connect`)",
        path.display()
    )]
    MissingCredential { path: PathBuf },

    /// No run of 32 hex characters in the input
    #[error("no Notion id found in `{0}`")]
    InvalidIdentifier(String),

    /// None of the probed config keys is set
    #[error("config has none of {keys} (run `notion-connect` to set project_page_id and tasks_db_id)")]
    MissingParent { keys: String },

    /// Non-2xx response, body kept verbatim
    #[error("Notion API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("filtering by `{0}` needs a database parent; the configured parent is a page")]
    FilterUnsupported(String),

    /// 2xx response missing a field the tool relies on
    #[error("unexpected Notion response: {0}")]
    UnexpectedResponse(String),

    /// Setup flow could not resolve the pasted resource
    #[error("{0}")]
    Setup(String),

    #[error("cannot reach Notion API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl NotionError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Errors the user fixes by running setup or storing a key
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured { .. }
                | Self::MissingCredential { .. }
                | Self::MissingParent { .. }
                | Self::InvalidIdentifier(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NotionError>;
