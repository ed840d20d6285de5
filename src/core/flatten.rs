// LogMerge - core/flatten.rs
//
// Collapses multi-line records into single lines.
// Core layer: accepts BufRead/Write trait objects, never touches the
// filesystem directly.
//
// A record starts at every line matching the active timestamp pattern; all
// following non-matching lines are continuation lines and are appended to it
// behind the sentinel byte. Lines before the first record cannot be
// attributed to any record and are dropped.
//
// The line limit applies to the joined record as well as to each physical
// line: every later stage reads the flattened record as a single line, so a
// record that would not fit is rejected here, where it fails only its file.

use crate::core::lines::LineReader;
use crate::core::model::FlattenStats;
use crate::core::pattern::TimestampPattern;
use crate::util::constants::SENTINEL;
use crate::util::error::StreamError;
use std::io::{self, BufRead, Write};

/// Flatten every record in `reader` into one line of `writer`.
///
/// Output has exactly one `\n`-terminated line per record, in input order.
/// The writer is flushed before returning.
pub fn flatten<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    pattern: TimestampPattern,
    max_line_bytes: usize,
) -> Result<FlattenStats, StreamError> {
    let mut lines = LineReader::new(reader, max_line_bytes);
    let mut stats = FlattenStats::default();

    // The record being accumulated; `accumulating` is false until the first
    // matching line has been seen.
    let mut record: Vec<u8> = Vec::new();
    let mut accumulating = false;
    let mut line_no: u64 = 0;
    let mut record_start: u64 = 0;

    while let Some(line) = lines.next_line().map_err(StreamError::Read)? {
        line_no += 1;
        if line.contains(&SENTINEL) {
            stats.sentinel_collisions += 1;
        }

        if pattern.matches(line) {
            if accumulating {
                emit(&mut writer, &record)?;
                stats.records += 1;
                record.clear();
            }
            record.extend_from_slice(line);
            accumulating = true;
            record_start = line_no;
        } else if accumulating {
            if record.len() + 1 + line.len() > max_line_bytes {
                return Err(StreamError::Read(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "record starting at line {record_start} exceeds the maximum length of \
                         {max_line_bytes} bytes once joined"
                    ),
                )));
            }
            record.push(SENTINEL);
            record.extend_from_slice(line);
            stats.continuation_lines += 1;
        } else {
            stats.orphan_lines += 1;
        }
    }

    if accumulating {
        emit(&mut writer, &record)?;
        stats.records += 1;
    }

    writer.flush().map_err(StreamError::Write)?;
    Ok(stats)
}

fn emit<W: Write>(writer: &mut W, record: &[u8]) -> Result<(), StreamError> {
    writer.write_all(record).map_err(StreamError::Write)?;
    writer.write_all(b"\n").map_err(StreamError::Write)
}
