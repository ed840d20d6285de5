// LogMerge - core/discovery.rs
//
// Recursive directory traversal and input log file discovery.
//
// Architecture note: this module uses `walkdir` for directory traversal as an
// OS abstraction (similar to using std::path::Path). It reads only directory
// entries and file types, never file contents.
//
// Rules:
//   - Per-entry I/O errors are non-fatal and collected as warnings.
//   - The output subdirectory is pruned via filter_entry so its contents are
//     never traversed at all, not merely filtered from the results.
//   - Entries are visited in file-name order so the discovery order (and
//     therefore the merge order) is deterministic across runs.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use regex::bytes::Regex;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Directory name pruned from the traversal at any depth below the root.
    pub excluded_dir_name: String,

    /// Whether symbolic links are followed during traversal.
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            excluded_dir_name: constants::PROCESSED_DIR_NAME.to_string(),
            follow_links: false,
        }
    }
}

/// Files selected for processing plus any non-fatal traversal warnings.
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    /// Matching regular files, in traversal order.
    pub files: Vec<PathBuf>,

    /// Human-readable descriptions of entries that could not be inspected.
    pub warnings: Vec<String>,
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover every `.log` / `.log.<digits>` file under `root`.
///
/// # Non-fatal errors
/// Files/directories that cannot be accessed are recorded as warnings and do
/// NOT cause the function to return `Err`.
///
/// # Fatal errors
/// Returns `Err` only if the root path is invalid (`RootNotFound`,
/// `NotADirectory`, `PermissionDenied`).
pub fn discover_log_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<DiscoveryResult, DiscoveryError> {
    validate_root(root)?;

    tracing::debug!(
        root = %root.display(),
        excluded = %config.excluded_dir_name,
        "Discovery starting"
    );

    let mut result = DiscoveryResult::default();

    let walker = walkdir::WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Always allow the root itself, even if it carries the excluded name.
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            e.file_name() != config.excluded_dir_name.as_str()
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                result.warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !is_log_file_name(entry.file_name()) {
            tracing::trace!(file = %path.display(), "Not a log file name");
            continue;
        }

        result.files.push(path.to_path_buf());
    }

    tracing::debug!(
        files = result.files.len(),
        warnings = result.warnings.len(),
        "Discovery complete"
    );

    Ok(result)
}

/// Returns true for names ending in `.log` or `.log.<digits>`, ignoring case.
///
/// Matches on the raw name bytes, so names that are not valid UTF-8 still
/// qualify.
pub fn is_log_file_name(file_name: &OsStr) -> bool {
    static LOG_NAME: OnceLock<Regex> = OnceLock::new();
    LOG_NAME
        .get_or_init(|| Regex::new(constants::LOG_FILE_NAME_PATTERN).expect("log file name regex"))
        .is_match(file_name.as_encoded_bytes())
}

/// Check that `root` exists and is a directory.
///
/// Uses `fs::metadata()` rather than `Path::is_dir()` because the latter maps
/// every error, including PermissionDenied, to `false`.
fn validate_root(root: &Path) -> Result<(), DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        fs::write(root.join("app.log"), "2024-01-01 12:00:00.000 a\n").expect("write app.log");
        fs::write(root.join("SERVICE.LOG"), "2024-01-01 12:00:01.000 b\n")
            .expect("write SERVICE.LOG");
        fs::write(root.join("app.log.3"), "2024-01-01 11:00:00.000 c\n").expect("write app.log.3");
        fs::write(root.join("readme.txt"), "Just a readme\n").expect("write readme.txt");
        fs::write(root.join("backup.log.gz"), "binary").expect("write .gz");
        fs::write(root.join("app.log.old"), "old").expect("write .old");

        let sub = root.join("subdir");
        fs::create_dir(&sub).expect("mkdir subdir");
        fs::write(sub.join("sub.log"), "2024-01-01 12:00:02.000 d\n").expect("write sub.log");

        let processed = root.join(constants::PROCESSED_DIR_NAME);
        fs::create_dir(&processed).expect("mkdir processed");
        fs::write(processed.join("MERGED.log"), "x\n").expect("write MERGED.log");

        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_discovers_log_files() {
        let dir = make_temp_tree();
        let result = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let found = names(&result.files);

        assert!(found.contains(&"app.log".to_string()), "got {found:?}");
        assert!(found.contains(&"SERVICE.LOG".to_string()), "case-insensitive");
        assert!(found.contains(&"app.log.3".to_string()), "rotated suffix");
        assert!(found.contains(&"sub.log".to_string()), "recursive");
        assert!(!found.contains(&"readme.txt".to_string()));
        assert!(!found.contains(&"backup.log.gz".to_string()));
        assert!(!found.contains(&"app.log.old".to_string()));
        assert!(result.warnings.is_empty(), "unexpected: {:?}", result.warnings);
    }

    #[test]
    fn test_processed_dir_is_pruned() {
        let dir = make_temp_tree();
        let result = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(
            result
                .files
                .iter()
                .all(|p| !p.components().any(|c| c.as_os_str() == constants::PROCESSED_DIR_NAME)),
            "nothing under the output folder may be discovered: {:?}",
            result.files
        );
    }

    #[test]
    fn test_nested_processed_dir_is_pruned_too() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join(constants::PROCESSED_DIR_NAME);
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("x.log"), "x").unwrap();
        let result = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_order_is_deterministic() {
        let dir = make_temp_tree();
        let first = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let second = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn test_empty_tree_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_root_not_found() {
        let result = discover_log_files(
            Path::new("/nonexistent/path/logmerge"),
            &DiscoveryConfig::default(),
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir.log");
        fs::write(&file, "content").unwrap();
        let result = discover_log_files(&file, &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_is_log_file_name() {
        let is_log = |name: &str| is_log_file_name(OsStr::new(name));
        assert!(is_log("a.log"));
        assert!(is_log("a.LoG"));
        assert!(is_log("a.log.12"));
        assert!(!is_log("a.log."));
        assert!(!is_log("a.logx"));
        assert!(!is_log("a.log.1a"));
        assert!(!is_log("log"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_is_discovered() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.log");
        let path = dir.path().join(name);
        // Some filesystems reject invalid UTF-8 names outright.
        if fs::write(&path, "2024-01-01 12:00:00.000 a\n").is_err() {
            return;
        }

        let result = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(result.files, vec![path]);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }
}
