// LogMerge - core/order.rs
//
// Chronological ordering of flattened lines.
//
// Every line of the merged stream is parsed for a leading timestamp (either
// encoding); lines without one are dropped. The retained entries are held in
// memory and sorted with a stable sort, so lines sharing a millisecond keep
// their merge order. Memory use is proportional to the merged size; there is
// no external-sort fallback.

use crate::core::lines::LineReader;
use crate::core::model::{OrderStats, TimestampedEntry};
use crate::core::pattern;
use crate::util::error::StreamError;
use rayon::slice::ParallelSliceMut;
use std::io::{BufRead, Write};

/// Read all lines of `reader` and retain those with a parseable timestamp.
pub fn collect_entries<R: BufRead>(
    reader: R,
    max_line_bytes: usize,
) -> Result<(Vec<TimestampedEntry>, u64), StreamError> {
    let mut lines = LineReader::new(reader, max_line_bytes);
    let mut entries = Vec::new();
    let mut dropped: u64 = 0;

    while let Some(line) = lines.next_line().map_err(StreamError::Read)? {
        match pattern::leading_timestamp(line) {
            Some(timestamp) => entries.push(TimestampedEntry {
                timestamp,
                line: line.to_vec(),
            }),
            None => dropped += 1,
        }
    }

    Ok((entries, dropped))
}

/// Stable sort by timestamp ascending.
///
/// `par_sort_by_key` is a stable merge sort; equal timestamps keep their
/// relative input order.
pub fn sort_entries(entries: &mut [TimestampedEntry]) {
    entries.par_sort_by_key(|entry| entry.timestamp);
}

/// Order the lines of `reader` by leading timestamp and write them to
/// `writer`, one per line. Lines without a parseable timestamp are dropped.
pub fn order_chronologically<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    max_line_bytes: usize,
) -> Result<OrderStats, StreamError> {
    let (mut entries, dropped) = collect_entries(reader, max_line_bytes)?;
    sort_entries(&mut entries);

    for entry in &entries {
        writer.write_all(&entry.line).map_err(StreamError::Write)?;
        writer.write_all(b"\n").map_err(StreamError::Write)?;
    }
    writer.flush().map_err(StreamError::Write)?;

    Ok(OrderStats {
        entries: entries.len() as u64,
        dropped,
    })
}
