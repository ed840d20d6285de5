// LogMerge - tests/properties.rs
//
// Property tests for the streaming stages, run entirely in memory.

use logmerge::core::flatten::flatten;
use logmerge::core::order::order_chronologically;
use logmerge::core::pattern::TimestampPattern;
use logmerge::core::restore::restore;
use logmerge::util::constants::DEFAULT_MAX_LINE_BYTES;
use proptest::prelude::*;
use std::io::Cursor;

/// Records as (seconds, continuation lines). Continuation text starts with a
/// letter or space so it can never be mistaken for a record start.
fn records() -> impl Strategy<Value = Vec<(u8, Vec<String>)>> {
    prop::collection::vec(
        (0u8..60, prop::collection::vec("([a-z ][a-z0-9 =]{0,15})?", 0..4)),
        0..24,
    )
}

fn render(records: &[(u8, Vec<String>)]) -> String {
    let mut text = String::new();
    for (i, (second, continuation)) in records.iter().enumerate() {
        text.push_str(&format!("2024-06-16 10:00:{second:02}.000 record {i}\n"));
        for line in continuation {
            text.push_str(line);
            text.push('\n');
        }
    }
    text
}

fn flatten_bytes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flatten(
        Cursor::new(input.to_vec()),
        &mut out,
        TimestampPattern::PlainDot,
        DEFAULT_MAX_LINE_BYTES,
    )
    .expect("flatten");
    out
}

fn restore_bytes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    restore(Cursor::new(input.to_vec()), &mut out, DEFAULT_MAX_LINE_BYTES).expect("restore");
    out
}

proptest! {
    /// Restoring a flattened file reproduces it exactly.
    #[test]
    fn prop_flatten_then_restore_is_identity(recs in records()) {
        let text = render(&recs);
        let flattened = flatten_bytes(text.as_bytes());
        prop_assert_eq!(restore_bytes(&flattened), text.into_bytes());
    }

    /// Flattened output has one line per record and is a fixed point of
    /// flattening.
    #[test]
    fn prop_flatten_is_idempotent(recs in records()) {
        let once = flatten_bytes(render(&recs).as_bytes());
        prop_assert_eq!(once.iter().filter(|b| **b == b'\n').count(), recs.len());
        prop_assert_eq!(flatten_bytes(&once), once);
    }

    /// Ordering equals a stable sort by timestamp: ties keep input order.
    #[test]
    fn prop_order_is_stable_sort(seconds in prop::collection::vec(0u8..4, 0..64)) {
        let lines: Vec<String> = seconds
            .iter()
            .enumerate()
            .map(|(i, s)| format!("'2024-06-16 10:00:0{s},000' entry {i}"))
            .collect();
        let input: String = lines.iter().map(|l| format!("{l}\n")).collect();

        let mut out = Vec::new();
        let stats = order_chronologically(
            Cursor::new(input.into_bytes()),
            &mut out,
            DEFAULT_MAX_LINE_BYTES,
        )
        .expect("order");

        let mut expected: Vec<(u8, &String)> = seconds.iter().copied().zip(lines.iter()).collect();
        expected.sort_by_key(|(s, _)| *s);
        let expected: String = expected.iter().map(|(_, l)| format!("{l}\n")).collect();

        prop_assert_eq!(stats.entries, seconds.len() as u64);
        prop_assert_eq!(String::from_utf8(out).expect("utf8"), expected);
    }
}
