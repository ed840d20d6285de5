// LogMerge - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every limit used by the pipeline is declared here so it can be audited
// in one place.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogMerge";

/// Application identifier used for config directories.
pub const APP_ID: &str = "LogMerge";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Output layout
// =============================================================================

/// Name of the output subdirectory created under the input root.
///
/// Directories with this name are pruned from discovery so a second run never
/// re-ingests the artifacts of the first.
pub const PROCESSED_DIR_NAME: &str = "ProcessedLogs";

/// Base name of the concatenated (merge stage) artifact.
pub const MERGED_FILE_NAME: &str = "MERGED.log";

/// Base name of the chronologically ordered (order stage) artifact.
pub const ORDERED_FILE_NAME: &str = "MERGED_ORDERED.log";

/// Marker carried by every final output file name. Cleanup never removes a
/// file whose name contains it.
pub const FINAL_FILE_MARKER: &str = "_FinalMerged";

/// `chrono` format for the wall-clock prefix of the final file name.
pub const FINAL_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Upper bound on numeric suffixes tried when claiming a unique output name.
pub const MAX_NAME_CLAIM_ATTEMPTS: usize = 100_000;

// =============================================================================
// Record encoding
// =============================================================================

/// Separator joining continuation lines onto the first line of a record
/// (ASCII Record Separator). Assumed never to occur in real log text.
pub const SENTINEL: u8 = 0x1E;

// =============================================================================
// I/O limits
// =============================================================================

/// Default maximum length of a single physical line (10 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Lowest accepted line limit. Lines of at least 10 MiB must always be
/// supported, so configuration cannot lower the limit below the default.
pub const MIN_MAX_LINE_BYTES: usize = DEFAULT_MAX_LINE_BYTES;

/// Hard upper bound on the line limit (1 GiB).
pub const ABSOLUTE_MAX_LINE_BYTES: usize = 1024 * 1024 * 1024;

/// Read buffer capacity for streaming stages.
pub const READ_BUFFER_BYTES: usize = 64 * 1024; // 64 KB

/// Write buffer capacity for the merge stage.
pub const MERGE_BUFFER_BYTES: usize = 128 * 1024; // 128 KB

// =============================================================================
// Worker pool
// =============================================================================

/// Default workers per available CPU core.
pub const WORKERS_PER_CPU: usize = 2;

/// Hard upper bound on the worker count (prevents configuration mistakes).
pub const ABSOLUTE_MAX_WORKERS: usize = 1_024;

// =============================================================================
// Discovery
// =============================================================================

/// Case-insensitive file-name pattern selecting `.log` and rotated
/// `.log.<digits>` files.
pub const LOG_FILE_NAME_PATTERN: &str = r"(?i)\.log(\.[0-9]+)?$";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in config.toml.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
