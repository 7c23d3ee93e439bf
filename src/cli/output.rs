//! Plain-text rendering of records for the terminal.

use crate::mapper::Record;
use crate::records::RecordDetail;
use colored::Colorize;

/// PRD list: `[status] priority title`, summary indented below
pub fn format_prds(records: &[Record]) -> String {
    if records.is_empty() {
        return "📋 PRD가 없습니다.".to_string();
    }

    let mut out = format!("📋 PRD 목록 ({}개)\n\n", records.len());
    for record in records {
        out.push_str(&format!(
            "{} {} {}\n",
            format!("[{}]", record.category()).cyan(),
            record.priority().yellow(),
            record.title().bold()
        ));
        let summary = record.summary();
        if !summary.is_empty() {
            out.push_str(&format!("    {}\n", summary));
        }
        out.push('\n');
    }
    out
}

/// Dev log list. Database rows carry date and type; child pages only a title.
pub fn format_logs(records: &[Record]) -> String {
    if records.is_empty() {
        return "📝 로그가 없습니다.".to_string();
    }

    let mut out = format!("📝 개발 로그 ({}개)\n\n", records.len());
    for record in records {
        let mut line = String::from("  • ");
        if let Some(date) = &record.date {
            line.push_str(&format!("{} ", format!("[{}]", date).dimmed()));
        }
        if let Some(category) = &record.category {
            line.push_str(&format!("{} ", format!("[{}]", category).cyan()));
        }
        line.push_str(record.title_or_untitled());
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Title line followed by the flattened page body
pub fn format_detail(detail: &RecordDetail) -> String {
    let record = &detail.record;
    let mut out = String::new();
    if !record.title().is_empty() {
        out.push_str(&format!(
            "{} {}\n",
            format!("[{}]", record.category()).cyan(),
            record.title().bold()
        ));
        if !detail.body.is_empty() {
            out.push('\n');
        }
    }
    out.push_str(&detail.body);
    out
}
