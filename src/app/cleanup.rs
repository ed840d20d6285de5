// LogMerge - app/cleanup.rs
//
// Best-effort removal of intermediate files once the final file exists.
// Nothing here can fail the run: problems are collected and logged as
// warnings.

use crate::util::constants;
use std::path::{Path, PathBuf};

/// What cleanup did.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files removed.
    pub removed: Vec<PathBuf>,

    /// Files (or the directory listing) that could not be handled.
    pub warnings: Vec<String>,
}

/// Remove every regular file in `dir` except `final_path` and any file whose
/// name marks it as a final artifact (from this or an earlier run).
pub fn cleanup_processing_dir(dir: &Path, final_path: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            report
                .warnings
                .push(format!("Cannot list '{}': {e}", dir.display()));
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report
                    .warnings
                    .push(format!("Cannot read entry in '{}': {e}", dir.display()));
                continue;
            }
        };

        let path = entry.path();
        if path == final_path || is_final_artifact(&path) {
            continue;
        }
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => report.removed.push(path),
            Err(e) => report
                .warnings
                .push(format!("Cannot remove '{}': {e}", path.display())),
        }
    }

    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Cleanup warning");
    }
    tracing::debug!(removed = report.removed.len(), "Cleanup complete");

    report
}

fn is_final_artifact(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().contains(constants::FINAL_FILE_MARKER))
        .unwrap_or(false)
}
