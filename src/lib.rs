//! notion-skills - link a project to Notion, record dev logs, fetch PRD items
//!
//! The library holds everything the three binaries share: id extraction,
//! the project config, a small blocking Notion REST client and the mapping
//! between Notion pages and records.

pub mod api;
pub mod cli;
pub mod config;
pub mod connect;
pub mod error;
pub mod identifier;
pub mod mapper;
pub mod records;

#[cfg(test)]
mod testing;

pub use api::{ClientSettings, HttpMethod, NotionApi, NotionClient};
pub use config::{Parent, ParentKind, ParentRole, ProjectConfig, SchemaShape};
pub use error::{NotionError, Result};
pub use identifier::{extract_id, parse_id, NotionId};
pub use mapper::{NewRecord, Record, RecordSchema, LOG_SCHEMA, PRD_SCHEMA};
pub use records::{ListQuery, RecordDetail, RecordStore};
