// LogMerge - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every error keeps its path and its
// underlying cause so the full chain can be logged.
//
// Severity classes:
//   - FlattenError: per-file, recoverable (the file is skipped).
//   - PipelineError / DiscoveryError: fatal to the whole run.
//   - ConfigError: fatal only for an explicitly requested config file.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for fatal LogMerge failures.
/// Errors are categorised by the subsystem that produced them. Per-file
/// `FlattenError`s never reach this level; the worker pool reports them.
#[derive(Debug)]
pub enum LogMergeError {
    /// Input discovery failed.
    Discovery(DiscoveryError),

    /// A pipeline stage failed; the run cannot produce a usable final file.
    Pipeline(PipelineError),

    /// Configuration loading failed.
    Config(ConfigError),
}

impl fmt::Display for LogMergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Pipeline(e) => write!(f, "Pipeline error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LogMergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Pipeline(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Stream errors
// ---------------------------------------------------------------------------

/// Failure of a streaming core stage, split by side.
///
/// Core functions only see readers and writers, so they cannot name a path;
/// the app layer maps each side onto a path-carrying error.
#[derive(Debug)]
pub enum StreamError {
    /// Reading the input stream failed (includes over-long lines).
    Read(io::Error),

    /// Writing the output stream failed.
    Write(io::Error),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read failed: {e}"),
            Self::Write(e) => write!(f, "write failed: {e}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) | Self::Write(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to input discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Input folder '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Input folder '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogMergeError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Flatten errors (per-file, recoverable)
// ---------------------------------------------------------------------------

/// Errors that abort the flattening of a single input file.
#[derive(Debug)]
pub enum FlattenError {
    /// The input file could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// The first line does not start with a supported timestamp.
    UnrecognisedFormat { path: PathBuf },

    /// Reading the input failed mid-file (includes over-long lines).
    Read { path: PathBuf, source: io::Error },

    /// No unique output name could be claimed in the processing directory.
    ClaimOutput { path: PathBuf, source: io::Error },

    /// Writing the flattened output failed.
    Write { path: PathBuf, source: io::Error },
}

impl FlattenError {
    /// Path of the file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. }
            | Self::UnrecognisedFormat { path }
            | Self::Read { path, .. }
            | Self::ClaimOutput { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}

impl fmt::Display for FlattenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Cannot open '{}': {source}", path.display())
            }
            Self::UnrecognisedFormat { path } => {
                write!(f, "'{}': unrecognised log format", path.display())
            }
            Self::Read { path, source } => {
                write!(f, "Read error in '{}': {source}", path.display())
            }
            Self::ClaimOutput { path, source } => {
                write!(
                    f,
                    "Cannot claim output name near '{}': {source}",
                    path.display()
                )
            }
            Self::Write { path, source } => {
                write!(f, "Write error on '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FlattenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
            Self::ClaimOutput { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::UnrecognisedFormat { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline errors (stage-fatal)
// ---------------------------------------------------------------------------

/// Errors that abort the whole run.
#[derive(Debug)]
pub enum PipelineError {
    /// The output subdirectory could not be created.
    CreateOutputDir { path: PathBuf, source: io::Error },

    /// An intermediate or final artifact name could not be claimed.
    ClaimArtifact { path: PathBuf, source: io::Error },

    /// Concatenating the flattened files failed.
    Merge { path: PathBuf, source: io::Error },

    /// Reading the merged file or writing the ordered file failed.
    Order { path: PathBuf, source: StreamError },

    /// Reading the ordered file or writing the final file failed.
    Restore { path: PathBuf, source: StreamError },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateOutputDir { path, source } => write!(
                f,
                "Failed to create output folder '{}': {source}",
                path.display()
            ),
            Self::ClaimArtifact { path, source } => {
                write!(f, "Failed to create '{}': {source}", path.display())
            }
            Self::Merge { path, source } => {
                write!(f, "Merge failed on '{}': {source}", path.display())
            }
            Self::Order { path, source } => {
                write!(f, "Ordering failed on '{}': {source}", path.display())
            }
            Self::Restore { path, source } => {
                write!(f, "Re-format failed on '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateOutputDir { source, .. } => Some(source),
            Self::ClaimArtifact { source, .. } => Some(source),
            Self::Merge { source, .. } => Some(source),
            Self::Order { source, .. } => Some(source),
            Self::Restore { source, .. } => Some(source),
        }
    }
}

impl From<PipelineError> for LogMergeError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LogMergeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogMerge results.
pub type Result<T> = std::result::Result<T, LogMergeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_flatten_error_display_names_file() {
        let err = FlattenError::UnrecognisedFormat {
            path: PathBuf::from("app.log"),
        };
        assert_eq!(err.to_string(), "'app.log': unrecognised log format");
        assert_eq!(err.path(), std::path::Path::new("app.log"));
    }

    #[test]
    fn test_pipeline_error_preserves_source_chain() {
        let err: LogMergeError = PipelineError::Order {
            path: PathBuf::from("MERGED.log"),
            source: StreamError::Read(io::Error::other("disk gone")),
        }
        .into();

        let pipeline = err.source().expect("pipeline source");
        let stream = pipeline.source().expect("stream source");
        let io_err = stream.source().expect("io source");
        assert_eq!(io_err.to_string(), "disk gone");
        assert!(err.to_string().contains("MERGED.log"));
    }

    #[test]
    fn test_config_error_converts_to_top_level() {
        let err: LogMergeError = ConfigError::Io {
            path: PathBuf::from("custom.toml"),
            source: io::Error::from(io::ErrorKind::NotFound),
        }
        .into();
        assert!(matches!(err, LogMergeError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: "), "got: {err}");
        assert!(err.to_string().contains("custom.toml"));
    }
}
