// LogMerge - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config file loading (explicit --config or the platform default)
// 3. Logging initialisation (verbose mode support)
// 4. The merge run and its exit code

use clap::Parser;
use logmerge::app::pipeline::{self, PipelineOptions, RunOptions, RunOutcome};
use logmerge::app::pool;
use logmerge::platform::config::{self, PlatformPaths};
use logmerge::util::error::LogMergeError;
use logmerge::util::{self, constants};
use std::path::PathBuf;

/// LogMerge - merge and chronologically order multi-line log files.
///
/// Every `.log` / `.log.<N>` file under the given folder is flattened,
/// merged, sorted by its leading timestamp, and written back out with its
/// multi-line records intact to `<folder>/ProcessedLogs/<stamp>_FinalMerged.log`.
#[derive(Parser, Debug)]
#[command(name = "logmerge", version, about)]
struct Cli {
    /// Directory containing log files.
    #[arg(short = 'p', long = "parent-folder", alias = "parentFolder")]
    parent_folder: PathBuf,

    /// Concurrent file-processing workers (default = 2 x CPU cores).
    #[arg(short = 'w', long = "workers", value_parser = parse_workers)]
    workers: Option<usize>,

    /// Keep flattened and intermediate files (skip cleanup).
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Verbose output: per-file progress and debug logging.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Explicit config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

fn parse_workers(raw: &str) -> Result<usize, String> {
    let workers: usize = raw
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if (1..=constants::ABSOLUTE_MAX_WORKERS).contains(&workers) {
        Ok(workers)
    } else {
        Err(format!(
            "must be between 1 and {}",
            constants::ABSOLUTE_MAX_WORKERS
        ))
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging starts so [logging] level can take
    // effect; its warnings are reported once the subscriber exists.
    let (app_config, config_warnings) = match &cli.config {
        Some(path) => match config::load_config_strict(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                // Logging is not initialised yet; report directly.
                eprintln!("Error: {}", LogMergeError::from(e));
                std::process::exit(1);
            }
        },
        None => config::load_config(&PlatformPaths::resolve().config_file()),
    };

    util::logging::init(cli.verbose, app_config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::debug!(
        version = constants::APP_VERSION,
        verbose = cli.verbose,
        "LogMerge starting"
    );

    let workers = cli
        .workers
        .or(app_config.workers)
        .unwrap_or_else(pool::default_worker_count);

    let options = RunOptions {
        root: cli.parent_folder,
        pipeline: PipelineOptions {
            workers,
            max_line_bytes: app_config.max_line_bytes,
            verbose: cli.verbose,
        },
        keep_intermediates: cli.keep || app_config.keep_intermediates,
    };

    match pipeline::run(&options) {
        Ok(RunOutcome::NothingToDo) => {
            println!("No .log files found.");
        }
        Ok(RunOutcome::Completed(summary)) => {
            tracing::info!(
                workers = summary.workers,
                files = summary.files_flattened,
                skipped = summary.files_failed,
                entries = summary.order.entries,
                dropped = summary.order.dropped,
                elapsed_ms = summary.duration.as_millis() as u64,
                final_file = %summary.final_path.display(),
                "Merge finished"
            );
            println!("{}", summary.final_path.display());
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
