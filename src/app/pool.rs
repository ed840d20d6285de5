// LogMerge - app/pool.rs
//
// Bounded worker pool for the flatten stage.
//
// Architecture:
//   - A feeder thread pushes (index, path) tasks into a bounded crossbeam
//     queue and drops its sender once every input is queued, which closes the
//     queue and lets idle workers exit.
//   - A fixed number of workers pull from the shared queue, so one slow or
//     failing file never holds up the others.
//   - Results travel back over a second bounded queue drained by the calling
//     thread, which files them into per-input slots. The returned list is
//     therefore in input order, not completion order.
//   - All threads live inside `std::thread::scope`; leaving the scope joins
//     every worker, which is the barrier before the merge stage.
//
// Per-file failures are logged and returned; they never stop the pool.

use crate::core::flatten;
use crate::core::lines::LineReader;
use crate::core::model::FlattenedFile;
use crate::core::pattern::{self, TimestampPattern};
use crate::platform::fs as platform_fs;
use crate::util::constants;
use crate::util::error::{FlattenError, StreamError};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom};
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for one run of the pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Requested worker count (clamped to `1..=ABSOLUTE_MAX_WORKERS` and to
    /// the number of inputs).
    pub workers: usize,

    /// Maximum single line length accepted by the flattener.
    pub max_line_bytes: usize,

    /// Report each flattened file at info level instead of debug.
    pub verbose: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            max_line_bytes: constants::DEFAULT_MAX_LINE_BYTES,
            verbose: false,
        }
    }
}

/// Twice the number of available CPU cores.
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1) * constants::WORKERS_PER_CPU
}

/// Worker count actually spawned for `inputs` files.
pub fn effective_workers(requested: usize, inputs: usize) -> usize {
    requested
        .clamp(1, constants::ABSOLUTE_MAX_WORKERS)
        .min(inputs.max(1))
}

/// Outcome of flattening a batch of inputs.
#[derive(Debug, Default)]
pub struct PoolReport {
    /// Successfully flattened files, in input order.
    pub flattened: Vec<FlattenedFile>,

    /// Files that were skipped, in input order.
    pub failures: Vec<FlattenError>,

    /// Worker threads spawned.
    pub workers: usize,
}

type TaskResult = (usize, Result<FlattenedFile, FlattenError>);

// =============================================================================
// Pool
// =============================================================================

/// Flatten every input into `output_dir` using a bounded set of workers.
///
/// Returns only after every input has been attempted and every worker has
/// terminated.
pub fn flatten_all(inputs: &[PathBuf], output_dir: &Path, config: &PoolConfig) -> PoolReport {
    if inputs.is_empty() {
        return PoolReport::default();
    }

    let workers = effective_workers(config.workers, inputs.len());
    tracing::debug!(inputs = inputs.len(), workers, "Flatten pool starting");

    let (task_tx, task_rx) = bounded::<(usize, &Path)>(workers);
    let (result_tx, result_rx) = bounded::<TaskResult>(workers);
    let mut slots: Vec<Option<Result<FlattenedFile, FlattenError>>> =
        inputs.iter().map(|_| None).collect();

    std::thread::scope(|s| {
        for worker_id in 0..workers {
            let tasks = task_rx.clone();
            let results = result_tx.clone();
            s.spawn(move || worker_loop(worker_id, tasks, results, output_dir, config));
        }

        // From here on only the workers hold these ends, so the result queue
        // disconnects exactly when the last worker exits.
        drop(task_rx);
        drop(result_tx);

        s.spawn(move || {
            for task in inputs.iter().map(PathBuf::as_path).enumerate() {
                if task_tx.send(task).is_err() {
                    break;
                }
            }
        });

        for (index, outcome) in result_rx.iter() {
            slots[index] = Some(outcome);
        }
    });

    let mut report = PoolReport {
        workers,
        ..PoolReport::default()
    };
    for outcome in slots.into_iter().flatten() {
        match outcome {
            Ok(file) => report.flattened.push(file),
            Err(e) => report.failures.push(e),
        }
    }

    tracing::debug!(
        flattened = report.flattened.len(),
        failed = report.failures.len(),
        "Flatten pool drained"
    );

    report
}

fn worker_loop(
    worker_id: usize,
    tasks: Receiver<(usize, &Path)>,
    results: Sender<TaskResult>,
    output_dir: &Path,
    config: &PoolConfig,
) {
    for (index, input) in tasks.iter() {
        let outcome = flatten_file(input, output_dir, config.max_line_bytes);

        match &outcome {
            Ok(file) => report_success(worker_id, file, config.verbose),
            Err(e) => {
                tracing::warn!(
                    worker = worker_id,
                    file = %e.path().display(),
                    error = %e,
                    "Flattening failed; file skipped"
                );
            }
        }

        if results.send((index, outcome)).is_err() {
            break;
        }
    }
}

fn report_success(worker_id: usize, file: &FlattenedFile, verbose: bool) {
    if file.stats.sentinel_collisions > 0 {
        tracing::warn!(
            file = %file.source.display(),
            lines = file.stats.sentinel_collisions,
            "Source already contains the record separator byte; those lines will be split on restore"
        );
    }

    if verbose {
        tracing::info!(
            worker = worker_id,
            source = %file.source.display(),
            output = %file.output.display(),
            pattern = %file.pattern,
            records = file.stats.records,
            "Flattened"
        );
    } else {
        tracing::debug!(
            worker = worker_id,
            source = %file.source.display(),
            output = %file.output.display(),
            records = file.stats.records,
            "Flattened"
        );
    }
}

// =============================================================================
// Per-file job
// =============================================================================

/// Flatten one input into a uniquely named file inside `output_dir`.
///
/// The pattern is detected from the first line before any output name is
/// claimed, so an unrecognised file leaves nothing behind. A partially
/// written output is removed if flattening fails midway.
pub fn flatten_file(
    input: &Path,
    output_dir: &Path,
    max_line_bytes: usize,
) -> Result<FlattenedFile, FlattenError> {
    let read_error = |source: io::Error| FlattenError::Read {
        path: input.to_path_buf(),
        source,
    };

    let file = File::open(input).map_err(|source| FlattenError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::with_capacity(constants::READ_BUFFER_BYTES, file);

    let pattern = detect_pattern(&mut reader, max_line_bytes)
        .map_err(read_error)?
        .ok_or_else(|| FlattenError::UnrecognisedFormat {
            path: input.to_path_buf(),
        })?;

    // Detection consumed part of the stream; start again from the top.
    reader.seek(SeekFrom::Start(0)).map_err(read_error)?;

    let file_name = input
        .file_name()
        .unwrap_or_else(|| OsStr::new("unnamed.log"));
    let (output, out_file) =
        platform_fs::claim_unique_file(output_dir, file_name).map_err(|source| {
            FlattenError::ClaimOutput {
                path: output_dir.join(file_name),
                source,
            }
        })?;

    match flatten::flatten(reader, BufWriter::new(out_file), pattern, max_line_bytes) {
        Ok(stats) => Ok(FlattenedFile {
            source: input.to_path_buf(),
            output,
            pattern,
            stats,
        }),
        Err(e) => {
            platform_fs::remove_best_effort(&output);
            Err(match e {
                StreamError::Read(source) => read_error(source),
                StreamError::Write(source) => FlattenError::Write {
                    path: output,
                    source,
                },
            })
        }
    }
}

/// Classify the stream by its first line only.
fn detect_pattern<R: BufRead>(
    reader: R,
    max_line_bytes: usize,
) -> io::Result<Option<TimestampPattern>> {
    let mut lines = LineReader::new(reader, max_line_bytes);
    Ok(lines.next_line()?.and_then(pattern::detect))
}
