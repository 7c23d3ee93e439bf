//! Notion id extraction.
//!
//! Notion ids are 32 hex digits. They show up in page URLs with or without
//! dashes (`.../Title-2fa9589fb79f8096be44c3b5741ec9d1?v=...`), and the API
//! returns them as dashed UUIDs. Everything the tools store or send uses the
//! dashed, lowercase form.

use crate::error::{NotionError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const ID_HEX_LEN: usize = 32;

/// A remote resource id in canonical `8-4-4-4-12` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotionId(Uuid);

impl NotionId {
    /// Canonical dashed rendering
    pub fn as_dashed(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// 32 hex digits without dashes, as used in notion.so URLs
    pub fn as_simple(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NotionId {
    type Err = NotionError;

    fn from_str(s: &str) -> Result<Self> {
        parse_id(s)
    }
}

impl Serialize for NotionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_dashed())
    }
}

impl<'de> Deserialize<'de> for NotionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_id(&raw).map_err(serde::de::Error::custom)
    }
}

/// Find the first run of 32 hex characters (after dropping every `-`) and
/// return it as a dashed id.
pub fn extract_id(input: &str) -> Option<NotionId> {
    let compact: Vec<char> = input.chars().filter(|c| *c != '-').collect();

    let mut run = 0;
    for (idx, c) in compact.iter().enumerate() {
        if c.is_ascii_hexdigit() {
            run += 1;
            if run == ID_HEX_LEN {
                let hex: String = compact[idx + 1 - ID_HEX_LEN..=idx].iter().collect();
                // 32 ascii hex digits always parse as a simple uuid
                return Uuid::try_parse(&hex).ok().map(NotionId);
            }
        } else {
            run = 0;
        }
    }

    None
}

/// Same as [`extract_id`], with "not found" as an error
pub fn parse_id(input: &str) -> Result<NotionId> {
    extract_id(input).ok_or_else(|| NotionError::InvalidIdentifier(input.trim().to_string()))
}
