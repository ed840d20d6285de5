// LogMerge - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
// These types are the shared vocabulary between the core stages and the
// app-layer orchestration.

use crate::core::pattern::TimestampPattern;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Ordering
// =============================================================================

/// A flattened line paired with its parsed leading timestamp.
///
/// Only exists in memory while the ordering stage sorts the merged set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedEntry {
    pub timestamp: DateTime<Utc>,
    /// The flattened line, without its line terminator.
    pub line: Vec<u8>,
}

// =============================================================================
// Per-stage statistics
// =============================================================================

/// Counters produced by flattening one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Records (flattened lines) written.
    pub records: u64,
    /// Continuation lines folded into a preceding record.
    pub continuation_lines: u64,
    /// Lines before the first record; they belong to no record and are dropped.
    pub orphan_lines: u64,
    /// Source lines that already contained the sentinel byte. Such lines will
    /// be split apart again by the restore stage.
    pub sentinel_collisions: u64,
}

/// Counters produced by the ordering stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStats {
    /// Lines retained and written in timestamp order.
    pub entries: u64,
    /// Lines without a parseable leading timestamp (dropped).
    pub dropped: u64,
}

/// Counters produced by the restore stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    /// Flattened lines read.
    pub records: u64,
    /// Physical lines written to the final file.
    pub lines_written: u64,
}

// =============================================================================
// Worker pool results
// =============================================================================

/// A successfully flattened input.
#[derive(Debug, Clone)]
pub struct FlattenedFile {
    /// The discovered input file.
    pub source: PathBuf,
    /// The claimed output path inside the processing directory.
    pub output: PathBuf,
    /// Encoding detected from the first line.
    pub pattern: TimestampPattern,
    pub stats: FlattenStats,
}

// =============================================================================
// Run summary
// =============================================================================

/// Summary of a completed consolidation.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// The final, restored output file.
    pub final_path: PathBuf,
    /// Number of worker threads used by the flatten stage.
    pub workers: usize,
    /// Inputs flattened successfully.
    pub files_flattened: usize,
    /// Inputs skipped because flattening failed.
    pub files_failed: usize,
    pub order: OrderStats,
    pub restore: RestoreStats,
    /// Wall-clock duration of the whole consolidation.
    pub duration: Duration,
}
