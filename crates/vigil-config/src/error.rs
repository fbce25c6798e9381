//! Error types for config loading and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating the fleet config.
///
/// All of these are fatal: the process refuses to start on a bad config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported config format for {0} (use .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("duplicate target name: {0}")]
    DuplicateTarget(String),

    #[error("target {target}: invalid expect_stdout_regex: {source}")]
    InvalidRegex {
        target: String,
        source: regex::Error,
    },

    #[error("target {target}: invalid http method {method:?}")]
    InvalidHttpMethod { target: String, method: String },

    #[error("sweep_interval_seconds must be nonzero unless run_once is set")]
    ZeroInterval,
}
