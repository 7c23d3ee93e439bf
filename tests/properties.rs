//! Property tests for id extraction and the record round trip.

use notion_skills::mapper::{LIST_TEXT_LIMIT, NONE_LABEL};
use notion_skills::{extract_id, NewRecord, PRD_SCHEMA};
use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::json;

/// Insert `-` at each position (clamped to the string length)
fn with_dashes(text: &str, positions: &[usize]) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let mut positions = positions.to_vec();
    positions.sort_unstable_by(|a, b| b.cmp(a));
    for pos in positions {
        chars.insert(pos.min(chars.len()), '-');
    }
    chars.into_iter().collect()
}

fn dashed(hex: &str) -> String {
    let hex = hex.to_lowercase();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

/// Surrounding text: never a hex digit, dashes allowed
fn non_hex_text() -> impl Strategy<Value = String> {
    "[g-zG-Z /?=&_.:#가-힣-]{0,24}"
}

fn separator() -> impl Strategy<Value = String> {
    "[g-zG-Z /?=&_.:#가-힣]{1,3}"
}

proptest! {
    #[test]
    fn prop_extracts_canonical_id_from_any_surroundings(
        hex in "[0-9a-fA-F]{32}",
        dashes in vec(0usize..=32, 0..8),
        prefix in non_hex_text(),
        suffix in non_hex_text(),
    ) {
        let input = format!("{}{}{}", prefix, with_dashes(&hex, &dashes), suffix);
        let id = extract_id(&input);
        prop_assert_eq!(id.map(|id| id.as_dashed()), Some(dashed(&hex)));
    }

    #[test]
    fn prop_no_run_of_32_hex_is_not_found(
        segments in vec(("[0-9a-fA-F]{0,31}", vec(0usize..32, 0..3), separator()), 0..10),
    ) {
        let input: String = segments
            .iter()
            .map(|(hex, dashes, sep)| format!("{}{}", with_dashes(hex, dashes), sep))
            .collect();
        prop_assert_eq!(extract_id(&input), None);
    }

    #[test]
    fn prop_record_round_trip_truncates_summary(
        title in vec(any::<char>(), 1..80).prop_map(|c| c.into_iter().collect::<String>()),
        status in "[가-힣a-zA-Z]{1,10}",
        text in vec(any::<char>(), 1..2600).prop_map(|c| c.into_iter().collect::<String>()),
    ) {
        let record = NewRecord::new(title.clone(), status.clone()).with_content(text.clone());
        let page = json!({ "id": "row", "properties": PRD_SCHEMA.properties(&record) });
        let read = PRD_SCHEMA.read(&page);

        prop_assert_eq!(read.title(), title.as_str());
        prop_assert_eq!(read.category(), status.as_str());
        prop_assert_eq!(read.priority(), NONE_LABEL);
        prop_assert_eq!(read.text(), text.as_str());

        let expected = if text.chars().count() > LIST_TEXT_LIMIT {
            format!("{}...", text.chars().take(LIST_TEXT_LIMIT).collect::<String>())
        } else {
            text.clone()
        };
        prop_assert_eq!(read.summary(), expected);
    }
}
