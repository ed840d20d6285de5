// LogMerge - app/pipeline.rs
//
// Stage orchestration: discovery → flatten pool → merge → order → restore →
// cleanup.
//
// Architecture:
//   - `consolidate` is the four-stage transformation for an explicit list of
//     inputs and a processing directory; it returns the final file path.
//   - `run` adds the collaborators around it: discovery, output folder
//     creation, and best-effort cleanup.
//   - Only the flatten stage is concurrent. The pool returns after every
//     worker has been joined, and everything after it runs sequentially on
//     the calling thread.
//   - Intermediate and final artifact names are claimed with the same atomic
//     naming as flattened outputs, so an input that happens to be called
//     MERGED.log can never be overwritten by the merge stage.

use crate::app::{cleanup, merge, pool};
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::model::PipelineSummary;
use crate::core::{order, restore};
use crate::platform::fs as platform_fs;
use crate::util::constants;
use crate::util::error::{PipelineError, Result, StreamError};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

// =============================================================================
// Options
// =============================================================================

/// Options for the transformation stages.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Requested flatten worker count.
    pub workers: usize,

    /// Maximum single line length accepted by every stage.
    pub max_line_bytes: usize,

    /// Per-file progress at info level.
    pub verbose: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: pool::default_worker_count(),
            max_line_bytes: constants::DEFAULT_MAX_LINE_BYTES,
            verbose: false,
        }
    }
}

/// Options for a full run over a directory tree.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory scanned for input files; the output folder is created here.
    pub root: PathBuf,

    pub pipeline: PipelineOptions,

    /// Leave flattened, merged and ordered files in the output folder.
    pub keep_intermediates: bool,
}

/// Result of a full run.
#[derive(Debug)]
pub enum RunOutcome {
    /// No input files were found; nothing was created.
    NothingToDo,

    /// The final file was produced.
    Completed(PipelineSummary),
}

// =============================================================================
// Full run
// =============================================================================

/// Discover inputs under `options.root`, consolidate them, and clean up.
///
/// Fatal conditions (invalid root, output folder creation, merge, order,
/// restore) are returned as errors. Per-file failures and cleanup problems
/// are logged and do not change the outcome.
pub fn run(options: &RunOptions) -> Result<RunOutcome> {
    let found = discovery::discover_log_files(&options.root, &DiscoveryConfig::default())?;
    for warning in &found.warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    if found.files.is_empty() {
        tracing::info!(root = %options.root.display(), "No .log files found");
        return Ok(RunOutcome::NothingToDo);
    }
    tracing::info!(files = found.files.len(), "Discovered log files");

    let processing_dir = platform_fs::create_output_dir(&options.root).map_err(|source| {
        PipelineError::CreateOutputDir {
            path: options.root.join(constants::PROCESSED_DIR_NAME),
            source,
        }
    })?;

    let summary = consolidate(&found.files, &processing_dir, &options.pipeline)?;

    if options.keep_intermediates {
        if options.pipeline.verbose {
            tracing::info!("Cleanup skipped because --keep was provided");
        } else {
            tracing::debug!("Cleanup skipped because --keep was provided");
        }
    } else {
        cleanup::cleanup_processing_dir(&processing_dir, &summary.final_path);
    }

    Ok(RunOutcome::Completed(summary))
}

// =============================================================================
// Transformation stages
// =============================================================================

/// Flatten, merge, order and restore `inputs` inside `processing_dir`.
///
/// Merge order is the order of `inputs`, independent of which worker
/// finished first, so runs over the same inputs are deterministic.
pub fn consolidate(
    inputs: &[PathBuf],
    processing_dir: &Path,
    options: &PipelineOptions,
) -> std::result::Result<PipelineSummary, PipelineError> {
    let started = Instant::now();

    // 1) Flatten every input on the worker pool. Returns after all workers
    //    have been joined.
    let pool_config = pool::PoolConfig {
        workers: options.workers,
        max_line_bytes: options.max_line_bytes,
        verbose: options.verbose,
    };
    let report = pool::flatten_all(inputs, processing_dir, &pool_config);
    if report.flattened.is_empty() {
        tracing::warn!("No input file could be flattened; the final file will be empty");
    }
    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Flatten stage complete"
    );

    // 2) Merge, in input order.
    let stage_start = Instant::now();
    let flattened: Vec<PathBuf> = report.flattened.iter().map(|f| f.output.clone()).collect();
    let (merged_path, merged_file) = claim_artifact(processing_dir, constants::MERGED_FILE_NAME)?;
    let bytes = merge::merge_files(&flattened, merged_file, &merged_path)?;
    tracing::debug!(
        path = %merged_path.display(),
        bytes,
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Merge stage complete"
    );

    // 3) Order chronologically.
    let stage_start = Instant::now();
    let (ordered_path, ordered_file) =
        claim_artifact(processing_dir, constants::ORDERED_FILE_NAME)?;
    let order_stats = run_stream_stage(&merged_path, ordered_file, &ordered_path, |r, w| {
        order::order_chronologically(r, w, options.max_line_bytes)
    })
    .map_err(|(path, source)| PipelineError::Order { path, source })?;
    tracing::debug!(
        path = %ordered_path.display(),
        entries = order_stats.entries,
        dropped = order_stats.dropped,
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Order stage complete"
    );

    // 4) Restore the multi-line structure into the timestamped final file.
    let stage_start = Instant::now();
    let final_name = format!(
        "{}{}.log",
        chrono::Local::now().format(constants::FINAL_TIMESTAMP_FORMAT),
        constants::FINAL_FILE_MARKER
    );
    let (final_path, final_file) = claim_artifact(processing_dir, &final_name)?;
    let restore_stats = run_stream_stage(&ordered_path, final_file, &final_path, |r, w| {
        restore::restore(r, w, options.max_line_bytes)
    })
    .map_err(|(path, source)| PipelineError::Restore { path, source })?;
    tracing::debug!(
        path = %final_path.display(),
        lines = restore_stats.lines_written,
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Restore stage complete"
    );

    Ok(PipelineSummary {
        final_path,
        workers: report.workers,
        files_flattened: report.flattened.len(),
        files_failed: report.failures.len(),
        order: order_stats,
        restore: restore_stats,
        duration: started.elapsed(),
    })
}

fn claim_artifact(dir: &Path, name: &str) -> std::result::Result<(PathBuf, File), PipelineError> {
    platform_fs::claim_unique_file(dir, OsStr::new(name)).map_err(|source| {
        PipelineError::ClaimArtifact {
            path: dir.join(name),
            source,
        }
    })
}

/// Run a streaming core stage from `input` into an already-claimed output.
///
/// Errors carry the path of the side that failed.
fn run_stream_stage<T>(
    input: &Path,
    output: File,
    output_path: &Path,
    stage: impl FnOnce(BufReader<File>, BufWriter<File>) -> std::result::Result<T, StreamError>,
) -> std::result::Result<T, (PathBuf, StreamError)> {
    let file = File::open(input).map_err(|e| (input.to_path_buf(), StreamError::Read(e)))?;
    let reader = BufReader::with_capacity(constants::READ_BUFFER_BYTES, file);
    let writer = BufWriter::with_capacity(constants::READ_BUFFER_BYTES, output);

    stage(reader, writer).map_err(|e| match e {
        StreamError::Read(_) => (input.to_path_buf(), e),
        StreamError::Write(_) => (output_path.to_path_buf(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(workers: usize) -> PipelineOptions {
        PipelineOptions {
            workers,
            ..PipelineOptions::default()
        }
    }

    #[test]
    fn test_consolidate_orders_and_restores() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = src.path().join("app.log");
        fs::write(
            &input,
            "'2024-06-16 10:42:15,123' start\n\
             continuation line 1\n\
             '2024-06-16 10:42:10,000' earlier\n",
        )
        .unwrap();

        let summary = consolidate(&[input], work.path(), &options(2)).unwrap();

        assert_eq!(
            fs::read_to_string(&summary.final_path).unwrap(),
            "'2024-06-16 10:42:10,000' earlier\n\
             '2024-06-16 10:42:15,123' start\n\
             continuation line 1\n"
        );
        assert_eq!(summary.files_flattened, 1);
        assert_eq!(summary.order.entries, 2);
        assert_eq!(summary.restore.lines_written, 3);
        let name = summary.final_path.file_name().unwrap().to_string_lossy();
        assert!(name.ends_with("_FinalMerged.log"), "got {name}");
        assert_eq!(name.len(), "YYYYMMDD_HHMMSS_FinalMerged.log".len());
    }

    #[test]
    fn test_input_named_like_artifact_is_not_clobbered() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = src.path().join(constants::MERGED_FILE_NAME);
        fs::write(&input, "2024-06-16 10:00:00.000 only record\n").unwrap();

        let summary = consolidate(&[input], work.path(), &options(1)).unwrap();
        assert_eq!(
            fs::read_to_string(&summary.final_path).unwrap(),
            "2024-06-16 10:00:00.000 only record\n"
        );
        // The flattened copy kept the plain name; the merge artifact moved aside.
        assert!(work.path().join("MERGED.log").exists());
        assert!(work.path().join("MERGED1.log").exists());
    }

    #[test]
    fn test_all_inputs_failing_yields_empty_final_file() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = src.path().join("junk.log");
        fs::write(&input, "nothing recognisable\n").unwrap();

        let summary = consolidate(&[input], work.path(), &options(1)).unwrap();
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.files_flattened, 0);
        assert_eq!(fs::metadata(&summary.final_path).unwrap().len(), 0);
    }

    #[test]
    fn test_oversized_joined_record_skips_only_its_file() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let good = src.path().join("good.log");
        let big = src.path().join("big.log");
        fs::write(&good, "2024-06-16 10:00:00.000 ok\n").unwrap();
        // Each physical line is within 32 bytes; the joined record is not.
        fs::write(
            &big,
            "2024-06-16 10:00:01.000 big\n\
             aaaaaaaaaaaaaaaaaaaa\n\
             bbbbbbbbbbbbbbbbbbbb\n",
        )
        .unwrap();

        let opts = PipelineOptions {
            workers: 2,
            max_line_bytes: 32,
            verbose: false,
        };
        let summary = consolidate(&[good, big], work.path(), &opts).expect("run must continue");

        assert_eq!(summary.files_flattened, 1);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(
            fs::read_to_string(&summary.final_path).unwrap(),
            "2024-06-16 10:00:00.000 ok\n"
        );
        assert!(
            !work.path().join("big.log").exists(),
            "partial output of the skipped file must be removed"
        );
    }
}
