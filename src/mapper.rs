//! Record mapper - translates between flat records and Notion properties.
//!
//! Property names differ between workspaces (Korean or English column
//! names), so each logical field has an ordered alias list. Writes use the
//! first alias; reads take the first alias whose property is populated.
//! Missing fields never fail a read: they come back as `None` and render as
//! `""` / `없음`.

use crate::identifier::NotionId;
use chrono::{Local, NaiveDate};
use serde_json::{json, Map, Value};

/// Label shown for an unset select
pub const NONE_LABEL: &str = "없음";
/// Title shown for a child page without one
pub const UNTITLED: &str = "(제목 없음)";
/// Free text longer than this is cut in list output
pub const LIST_TEXT_LIMIT: usize = 200;
pub const ELLIPSIS: &str = "...";

/// Notion rejects rich text items longer than this
const RICH_TEXT_CHUNK: usize = 2000;

/// Accepted property names for one logical field, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases(&'static [&'static str]);

impl FieldAliases {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self(names)
    }

    /// Name used when writing
    pub fn primary(&self) -> &'static str {
        self.0[0]
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.0
    }

    /// First populated value among the aliases
    pub fn probe<F>(&self, properties: &Value, read: F) -> Option<String>
    where
        F: Fn(&Value) -> Option<String>,
    {
        self.0
            .iter()
            .filter_map(|name| properties.get(*name))
            .find_map(read)
    }
}

/// Property layout of one record kind
#[derive(Debug, Clone, Copy)]
pub struct RecordSchema {
    pub title: FieldAliases,
    /// Single-select used as status (PRD) or type (log)
    pub category: FieldAliases,
    pub priority: Option<FieldAliases>,
    pub text: FieldAliases,
    pub date: Option<FieldAliases>,
    pub relation: Option<FieldAliases>,
}

/// Requirement items in the tasks / PRD database
pub const PRD_SCHEMA: RecordSchema = RecordSchema {
    title: FieldAliases::new(&["이름", "Name"]),
    category: FieldAliases::new(&["상태", "Status"]),
    priority: Some(FieldAliases::new(&["우선순위", "Priority"])),
    text: FieldAliases::new(&["설명", "내용", "Description"]),
    date: None,
    relation: None,
};

/// Entries in a dev-log database
pub const LOG_SCHEMA: RecordSchema = RecordSchema {
    title: FieldAliases::new(&["이름", "Name"]),
    category: FieldAliases::new(&["타입", "Type"]),
    priority: None,
    text: FieldAliases::new(&["내용", "설명", "Description"]),
    date: Some(FieldAliases::new(&["날짜", "Date"])),
    relation: Some(FieldAliases::new(&["관련 PRD", "PRD"])),
};

/// A record to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub category: String,
    pub content: Option<String>,
    pub related: Option<NotionId>,
    pub date: NaiveDate,
}

impl NewRecord {
    /// Dated today (local time)
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            content: None,
            related: None,
            date: Local::now().date_naive(),
        }
    }

    /// Empty content counts as none; whitespace is kept as written
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.content = if content.is_empty() {
            None
        } else {
            Some(content)
        };
        self
    }

    pub fn with_related(mut self, related: Option<NotionId>) -> Self {
        self.related = related;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// A record read back from Notion. `None` means no alias was populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub text: Option<String>,
    pub date: Option<String>,
    pub related: Vec<String>,
}

impl Record {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Title with the untitled placeholder, for child-page listings
    pub fn title_or_untitled(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(UNTITLED)
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(NONE_LABEL)
    }

    pub fn priority(&self) -> &str {
        self.priority.as_deref().unwrap_or(NONE_LABEL)
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Free text cut for list display
    pub fn summary(&self) -> String {
        truncate_chars(self.text(), LIST_TEXT_LIMIT)
    }

    /// A `child_page` block as a record (title only)
    pub fn from_child_page(block: &Value) -> Self {
        Self {
            id: str_field(block, "id"),
            title: block
                .pointer("/child_page/title")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            ..Self::default()
        }
    }
}

/// First `limit` characters plus [`ELLIPSIS`] when longer
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Rich text array for `content`, split into API-sized items
pub fn rich_text(content: &str) -> Value {
    let chars: Vec<char> = content.chars().collect();
    let items: Vec<Value> = chars
        .chunks(RICH_TEXT_CHUNK)
        .map(|chunk| {
            let text: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": text } })
        })
        .collect();
    Value::Array(items)
}

/// Concatenated text of a rich text array, `None` when empty
pub fn plain_text(items: &Value) -> Option<String> {
    let text: String = items
        .as_array()?
        .iter()
        .filter_map(|item| {
            item.get("plain_text")
                .or_else(|| item.pointer("/text/content"))
                .and_then(Value::as_str)
        })
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn read_title(property: &Value) -> Option<String> {
    plain_text(property.get("title")?)
}

fn read_rich_text(property: &Value) -> Option<String> {
    plain_text(property.get("rich_text")?)
}

/// `select` or `status` option name
fn read_select(property: &Value) -> Option<String> {
    property
        .get("select")
        .filter(|v| !v.is_null())
        .or_else(|| property.get("status").filter(|v| !v.is_null()))?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

fn read_date(property: &Value) -> Option<String> {
    property
        .pointer("/date/start")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn read_relation(property: &Value) -> Option<Vec<String>> {
    let ids: Vec<String> = property
        .get("relation")?
        .as_array()?
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

impl RecordSchema {
    /// Database row properties for a new record. Empty content and a missing
    /// relation are left out.
    pub fn properties(&self, record: &NewRecord) -> Value {
        let mut props = Map::new();
        props.insert(
            self.title.primary().to_string(),
            json!({ "title": rich_text(&record.title) }),
        );
        props.insert(
            self.category.primary().to_string(),
            json!({ "select": { "name": record.category } }),
        );
        if let Some(content) = record.content.as_deref().filter(|c| !c.is_empty()) {
            props.insert(
                self.text.primary().to_string(),
                json!({ "rich_text": rich_text(content) }),
            );
        }
        if let (Some(field), Some(related)) = (self.relation, record.related) {
            props.insert(
                field.primary().to_string(),
                json!({ "relation": [{ "id": related.as_dashed() }] }),
            );
        }
        if let Some(field) = self.date {
            props.insert(
                field.primary().to_string(),
                json!({ "date": { "start": record.date_string() } }),
            );
        }
        Value::Object(props)
    }

    /// Equality filter on the category select
    pub fn category_filter(&self, value: &str) -> Value {
        json!({
            "property": self.category.primary(),
            "select": { "equals": value }
        })
    }

    /// Map a page object (`properties` inside) to a record
    pub fn read(&self, page: &Value) -> Record {
        let empty = Value::Object(Map::new());
        let props = page.get("properties").unwrap_or(&empty);

        Record {
            id: str_field(page, "id"),
            title: self.title.probe(props, read_title),
            category: self.category.probe(props, read_select),
            priority: self
                .priority
                .and_then(|field| field.probe(props, read_select)),
            text: self.text.probe(props, read_rich_text),
            date: self.date.and_then(|field| field.probe(props, read_date)),
            related: self
                .relation
                .and_then(|field| {
                    field
                        .names()
                        .iter()
                        .filter_map(|name| props.get(*name))
                        .find_map(read_relation)
                })
                .unwrap_or_default(),
        }
    }
}

/// Title property of a child page
pub fn page_title_properties(title: &str) -> Value {
    json!({ "title": { "title": rich_text(title) } })
}

fn paragraph(content: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": rich_text(content) }
    })
}

/// Body of a log child page: `[date] [category] title`, then the content
pub fn log_body_blocks(record: &NewRecord) -> Vec<Value> {
    let mut blocks = vec![paragraph(&format!(
        "[{}] [{}] {}",
        record.date_string(),
        record.category,
        record.title
    ))];
    if let Some(content) = record.content.as_deref().filter(|c| !c.is_empty()) {
        blocks.push(paragraph(content));
    }
    blocks
}

/// Flatten page blocks into plain text, one line per block
pub fn render_blocks(blocks: &[Value]) -> String {
    let mut lines = Vec::new();

    for block in blocks {
        let block_type = block.get("type").and_then(Value::as_str).unwrap_or("");
        let Some(text) = block
            .get(block_type)
            .and_then(|inner| inner.get("rich_text"))
            .and_then(plain_text)
        else {
            continue;
        };

        let line = match block_type {
            "paragraph" => text,
            "heading_1" => format!("# {}", text),
            "heading_2" => format!("## {}", text),
            "heading_3" => format!("### {}", text),
            "bulleted_list_item" => format!("• {}", text),
            "numbered_list_item" => format!("1. {}", text),
            "quote" => format!("> {}", text),
            "to_do" => {
                let checked = block
                    .pointer("/to_do/checked")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                format!("[{}] {}", if checked { "x" } else { " " }, text)
            }
            _ => continue,
        };
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::parse_id;
    use crate::testing::page_from_written;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn test_properties_full_log_record() {
        let related = parse_id("2fa9589fb79f8096be44c3b5741ec9d1").unwrap();
        let record = NewRecord::new("Add login", "기능")
            .with_content("OAuth flow")
            .with_related(Some(related))
            .with_date(date());

        let props = LOG_SCHEMA.properties(&record);
        assert_eq!(props["이름"]["title"][0]["text"]["content"], "Add login");
        assert_eq!(props["타입"]["select"]["name"], "기능");
        assert_eq!(props["내용"]["rich_text"][0]["text"]["content"], "OAuth flow");
        assert_eq!(
            props["관련 PRD"]["relation"][0]["id"],
            "2fa9589f-b79f-8096-be44-c3b5741ec9d1"
        );
        assert_eq!(props["날짜"]["date"]["start"], "2026-03-09");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let record = NewRecord::new("Fix crash", "버그")
            .with_content("")
            .with_date(date());

        let props = LOG_SCHEMA.properties(&record);
        let keys: Vec<&String> = props.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(props.get("내용").is_none());
        assert!(props.get("관련 PRD").is_none());

        // PRD schema has no date or relation field at all
        let props = PRD_SCHEMA.properties(&record.with_related(Some(
            parse_id("2fa9589fb79f8096be44c3b5741ec9d1").unwrap(),
        )));
        assert_eq!(props.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_whitespace_content_is_written() {
        let record = NewRecord::new("Fix crash", "버그")
            .with_content("  ")
            .with_date(date());
        assert_eq!(record.content.as_deref(), Some("  "));

        let props = LOG_SCHEMA.properties(&record);
        assert_eq!(props["내용"]["rich_text"][0]["text"]["content"], "  ");
        assert_eq!(log_body_blocks(&record).len(), 2);
    }

    #[test]
    fn test_round_trip_short_text() {
        let record = NewRecord::new("Search page", "진행중").with_content("Full text search");
        let page = page_from_written("id-1", PRD_SCHEMA.properties(&record));

        let read = PRD_SCHEMA.read(&page);
        assert_eq!(read.id, "id-1");
        assert_eq!(read.title(), "Search page");
        assert_eq!(read.category(), "진행중");
        assert_eq!(read.summary(), "Full text search");
        assert_eq!(read.priority(), NONE_LABEL);
    }

    #[test]
    fn test_round_trip_long_text_is_truncated() {
        for len in [199, 200, 201, 2500] {
            let text: String = "가나다라마".chars().cycle().take(len).collect();
            let record = NewRecord::new("T", "대기").with_content(text.clone());
            let read = PRD_SCHEMA.read(&page_from_written("id", PRD_SCHEMA.properties(&record)));

            assert_eq!(read.text(), text, "full text survives, len {}", len);
            if len <= LIST_TEXT_LIMIT {
                assert_eq!(read.summary(), text);
            } else {
                let expected: String = text.chars().take(LIST_TEXT_LIMIT).collect();
                assert_eq!(read.summary(), format!("{}...", expected));
            }
        }
    }

    #[test]
    fn test_read_falls_back_through_aliases() {
        let page = json!({
            "id": "abc",
            "properties": {
                "이름": { "type": "title", "title": [] },
                "Name": { "type": "title", "title": [{ "plain_text": "English title" }] },
                "설명": { "type": "rich_text", "rich_text": [] },
                "Description": { "type": "rich_text", "rich_text": [
                    { "plain_text": "part one, " },
                    { "plain_text": "part two" }
                ] },
                "상태": { "type": "select", "select": null },
                "Status": { "type": "status", "status": { "name": "Done" } },
                "우선순위": { "type": "select", "select": { "name": "높음" } }
            }
        });

        let record = PRD_SCHEMA.read(&page);
        assert_eq!(record.title(), "English title");
        assert_eq!(record.text(), "part one, part two");
        assert_eq!(record.category(), "Done");
        assert_eq!(record.priority(), "높음");
    }

    #[test]
    fn test_read_missing_everything_defaults() {
        let record = PRD_SCHEMA.read(&json!({ "id": "abc" }));
        assert_eq!(record.title(), "");
        assert_eq!(record.category(), NONE_LABEL);
        assert_eq!(record.priority(), NONE_LABEL);
        assert_eq!(record.summary(), "");

        let record = LOG_SCHEMA.read(&json!({ "properties": { "이름": { "title": "oops" } } }));
        assert_eq!(record.id, "");
        assert_eq!(record.title, None);
        assert!(record.related.is_empty());
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_read_log_date_and_relation() {
        let related = parse_id("2fa9589fb79f8096be44c3b5741ec9d1").unwrap();
        let record = NewRecord::new("T", "문서")
            .with_related(Some(related))
            .with_date(date());
        let read = LOG_SCHEMA.read(&page_from_written("x", LOG_SCHEMA.properties(&record)));
        assert_eq!(read.date.as_deref(), Some("2026-03-09"));
        assert_eq!(read.related, vec![related.as_dashed()]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc...");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("한국어입니다", 3), "한국어...");
    }

    #[test]
    fn test_rich_text_chunks_long_content() {
        let content = "a".repeat(RICH_TEXT_CHUNK * 2 + 5);
        let items = rich_text(&content);
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(plain_text(&Value::Array(items.clone())).unwrap(), content);
    }

    #[test]
    fn test_category_filter() {
        assert_eq!(
            PRD_SCHEMA.category_filter("진행중"),
            json!({ "property": "상태", "select": { "equals": "진행중" } })
        );
    }

    #[test]
    fn test_log_body_blocks() {
        let record = NewRecord::new("Refactor api", "리팩토링").with_date(date());
        let blocks = log_body_blocks(&record);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0]["paragraph"]["rich_text"][0]["text"]["content"],
            "[2026-03-09] [리팩토링] Refactor api"
        );

        let blocks = log_body_blocks(&record.with_content("split client module"));
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1]["paragraph"]["rich_text"][0]["text"]["content"],
            "split client module"
        );
    }

    #[test]
    fn test_child_page_record() {
        let record = Record::from_child_page(&json!({
            "id": "p1", "type": "child_page", "child_page": { "title": "Log A" }
        }));
        assert_eq!(record.id, "p1");
        assert_eq!(record.title_or_untitled(), "Log A");

        let record = Record::from_child_page(&json!({
            "id": "p2", "type": "child_page", "child_page": { "title": "" }
        }));
        assert_eq!(record.title_or_untitled(), UNTITLED);
    }

    #[test]
    fn test_render_blocks() {
        let text = |t: &str| json!({ "rich_text": [{ "plain_text": t }] });
        let blocks = vec![
            json!({ "type": "heading_1", "heading_1": text("Goal") }),
            json!({ "type": "paragraph", "paragraph": text("Ship search") }),
            json!({ "type": "paragraph", "paragraph": { "rich_text": [] } }),
            json!({ "type": "heading_2", "heading_2": text("Scope") }),
            json!({ "type": "bulleted_list_item", "bulleted_list_item": text("index") }),
            json!({ "type": "heading_3", "heading_3": text("Later") }),
            json!({ "type": "numbered_list_item", "numbered_list_item": text("ranking") }),
            json!({ "type": "to_do", "to_do": { "rich_text": [{ "plain_text": "tests" }], "checked": true } }),
            json!({ "type": "quote", "quote": text("keep it small") }),
            json!({ "type": "image", "image": {} }),
            json!({ "type": "child_database", "child_database": { "title": "작업" } }),
        ];

        assert_eq!(
            render_blocks(&blocks),
            "# Goal\nShip search\n## Scope\n• index\n### Later\n1. ranking\n[x] tests\n> keep it small"
        );
        assert_eq!(render_blocks(&[]), "");
    }
}
