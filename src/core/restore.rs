// LogMerge - core/restore.rs
//
// Reverses the flatten stage: every flattened line is split on the sentinel
// and each part is written back as its own physical line.

use crate::core::lines::LineReader;
use crate::core::model::RestoreStats;
use crate::util::constants::SENTINEL;
use crate::util::error::StreamError;
use std::io::{BufRead, Write};

/// Expand each sentinel-joined line of `reader` into its original lines.
pub fn restore<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    max_line_bytes: usize,
) -> Result<RestoreStats, StreamError> {
    let mut lines = LineReader::new(reader, max_line_bytes);
    let mut stats = RestoreStats::default();

    while let Some(line) = lines.next_line().map_err(StreamError::Read)? {
        stats.records += 1;
        for part in line.split(|b| *b == SENTINEL) {
            writer.write_all(part).map_err(StreamError::Write)?;
            writer.write_all(b"\n").map_err(StreamError::Write)?;
            stats.lines_written += 1;
        }
    }

    writer.flush().map_err(StreamError::Write)?;
    Ok(stats)
}
