// LogMerge - platform/config.rs
//
// Platform-specific config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogMerge configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logmerge/ or %APPDATA%\LogMerge\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[merge]` section.
    pub merge: MergeSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[merge]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct MergeSection {
    /// Number of flatten workers.
    pub workers: Option<usize>,
    /// Keep intermediate files after the run.
    pub keep_intermediates: Option<bool>,
    /// Maximum single line length in MiB.
    pub max_line_mib: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Worker count; `None` means "2 x available CPU cores".
    pub workers: Option<usize>,
    /// Keep intermediate files after the run.
    pub keep_intermediates: bool,
    /// Maximum single line length in bytes.
    pub max_line_bytes: usize,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workers: None,
            keep_intermediates: false,
            max_line_bytes: constants::DEFAULT_MAX_LINE_BYTES,
            log_level: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_strict(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load and validate a config file that the user explicitly asked for.
///
/// A missing, unreadable, or unparseable file is an error; out-of-range
/// values are still only warnings.
pub fn load_config_strict(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Merge: workers --
    if let Some(workers) = raw.merge.workers {
        if (1..=constants::ABSOLUTE_MAX_WORKERS).contains(&workers) {
            config.workers = Some(workers);
        } else {
            warnings.push(format!(
                "[merge] workers = {workers} is out of range (1-{}). Using default (2 x CPU cores).",
                constants::ABSOLUTE_MAX_WORKERS,
            ));
        }
    }

    // -- Merge: keep_intermediates --
    if let Some(keep) = raw.merge.keep_intermediates {
        config.keep_intermediates = keep;
    }

    // -- Merge: max_line_mib --
    if let Some(mib) = raw.merge.max_line_mib {
        let min_mib = constants::MIN_MAX_LINE_BYTES / (1024 * 1024);
        let max_mib = constants::ABSOLUTE_MAX_LINE_BYTES / (1024 * 1024);
        if (min_mib..=max_mib).contains(&mib) {
            config.max_line_bytes = mib * 1024 * 1024;
        } else {
            warnings.push(format!(
                "[merge] max_line_mib = {mib} is out of range ({min_mib}-{max_mib}). \
                 Using default ({}).",
                constants::DEFAULT_MAX_LINE_BYTES / (1024 * 1024),
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}
