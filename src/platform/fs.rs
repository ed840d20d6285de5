// LogMerge - platform/fs.rs
//
// Filesystem helpers shared by the worker pool and the pipeline stages.
//
// The processing directory is the only resource written concurrently. Names
// in it are claimed with `OpenOptions::create_new`, which the OS performs as a
// single atomic check-and-create: of two workers racing for the same name,
// exactly one succeeds and the other moves on to the next suffix.

use crate::util::constants;
use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Create (if needed) the output subdirectory under `root` and return it.
pub fn create_output_dir(root: &Path) -> io::Result<PathBuf> {
    let path = root.join(constants::PROCESSED_DIR_NAME);
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Atomically claim an unused file name in `dir`, based on `file_name`.
///
/// Tries `file_name` first, then inserts `1`, `2`, … before the extension
/// (`app.log` → `app1.log` → `app2.log`). Returns the claimed path with the
/// newly created, empty file opened for writing.
pub fn claim_unique_file(dir: &Path, file_name: &OsStr) -> io::Result<(PathBuf, File)> {
    for attempt in 0..constants::MAX_NAME_CLAIM_ATTEMPTS {
        let candidate = dir.join(candidate_name(file_name, attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => {
                if attempt > 0 {
                    tracing::debug!(
                        requested = %file_name.to_string_lossy(),
                        claimed = %candidate.display(),
                        "Output name collision resolved"
                    );
                }
                return Ok((candidate, file));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free name for '{}' after {} attempts",
            file_name.to_string_lossy(),
            constants::MAX_NAME_CLAIM_ATTEMPTS
        ),
    ))
}

/// `file_name` with `suffix` inserted before the extension; suffix 0 is the
/// name itself.
fn candidate_name(file_name: &OsStr, suffix: usize) -> OsString {
    if suffix == 0 {
        return file_name.to_os_string();
    }
    let path = Path::new(file_name);
    let mut name = path.file_stem().unwrap_or(file_name).to_os_string();
    name.push(suffix.to_string());
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Remove `path`, logging rather than propagating any failure.
pub fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), error = %e, "Could not remove file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_candidate_name_inserts_before_extension() {
        assert_eq!(candidate_name(OsStr::new("A.log"), 0), "A.log");
        assert_eq!(candidate_name(OsStr::new("A.log"), 1), "A1.log");
        assert_eq!(candidate_name(OsStr::new("A.log"), 12), "A12.log");
        assert_eq!(candidate_name(OsStr::new("app.log.3"), 1), "app.log1.3");
        assert_eq!(candidate_name(OsStr::new("noext"), 2), "noext2");
    }

    #[test]
    fn test_claim_skips_existing_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.log"), "taken").unwrap();

        let (path, _) = claim_unique_file(dir.path(), OsStr::new("A.log")).unwrap();
        assert_eq!(path, dir.path().join("A1.log"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("A.log")).unwrap(),
            "taken",
            "existing file must not be touched"
        );
    }

    #[test]
    fn test_concurrent_claims_never_share_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let claimed: Vec<PathBuf> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let barrier = Arc::clone(&barrier);
                    let dir = dir.path();
                    s.spawn(move || {
                        barrier.wait();
                        claim_unique_file(dir, OsStr::new("A.log")).unwrap().0
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<_> = claimed.iter().collect();
        assert_eq!(unique.len(), threads, "duplicate claim in {claimed:?}");
    }

    #[test]
    fn test_create_output_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = create_output_dir(dir.path()).unwrap();
        let second = create_output_dir(dir.path()).unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
        assert!(first.ends_with(constants::PROCESSED_DIR_NAME));
    }
}
