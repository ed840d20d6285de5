// LogMerge - app/merge.rs
//
// Byte-for-byte concatenation of flattened files, in the order given.
// Every flattened line already carries its terminator, so no record-level
// interpretation happens here. Any failure is fatal: a partial merge would
// silently lose records.

use crate::util::constants;
use crate::util::error::PipelineError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append the contents of each file in `sources` to `dest`, in list order.
///
/// `dest` is an already-claimed, empty output file. Returns the total number
/// of bytes copied.
pub fn merge_files(sources: &[PathBuf], dest: File, dest_path: &Path) -> Result<u64, PipelineError> {
    let mut writer = BufWriter::with_capacity(constants::MERGE_BUFFER_BYTES, dest);
    let mut total: u64 = 0;

    for source in sources {
        let merge_error = |e: io::Error| PipelineError::Merge {
            path: source.clone(),
            source: e,
        };
        let mut input = File::open(source).map_err(merge_error)?;
        let copied = io::copy(&mut input, &mut writer).map_err(merge_error)?;
        tracing::trace!(file = %source.display(), bytes = copied, "Merged");
        total += copied;
    }

    writer.flush().map_err(|source| PipelineError::Merge {
        path: dest_path.to_path_buf(),
        source,
    })?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_concatenates_in_list_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        fs::write(&a, "2024-06-16 10:00:05.000 a\n").unwrap();
        fs::write(&b, "2024-06-16 10:00:01.000 b\n").unwrap();

        let dest_path = dir.path().join("MERGED.log");
        let dest = File::create(&dest_path).unwrap();
        let bytes = merge_files(&[b.clone(), a.clone()], dest, &dest_path).unwrap();

        assert_eq!(
            fs::read_to_string(&dest_path).unwrap(),
            "2024-06-16 10:00:01.000 b\n2024-06-16 10:00:05.000 a\n"
        );
        assert_eq!(bytes, 52);
    }

    #[test]
    fn test_empty_source_list_gives_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest_path = dir.path().join("MERGED.log");
        let dest = File::create(&dest_path).unwrap();
        assert_eq!(merge_files(&[], dest, &dest_path).unwrap(), 0);
        assert_eq!(fs::metadata(&dest_path).unwrap().len(), 0);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let dest_path = dir.path().join("MERGED.log");
        let dest = File::create(&dest_path).unwrap();
        let missing = dir.path().join("gone.log");

        let err = merge_files(&[missing.clone()], dest, &dest_path).unwrap_err();
        match err {
            PipelineError::Merge { path, .. } => assert_eq!(path, missing),
            other => panic!("expected Merge error, got {other:?}"),
        }
    }
}
