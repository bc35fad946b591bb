//! CLI-level errors (wraps domain and config errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::TreeError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not a JSON array of strings: {path}")]
    Input {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("round trip mismatch for {0}")]
    RoundTrip(PathBuf),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::Pattern(_) => crate::exitcode::USAGE,
            CliError::Tree(_) | CliError::Input { .. } => crate::exitcode::DATAERR,
            CliError::Config(_) => crate::exitcode::CONFIG,
            CliError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                crate::exitcode::NOINPUT
            }
            CliError::Io { .. } => crate::exitcode::IOERR,
            CliError::RoundTrip(_) => crate::exitcode::CHECK_FAILED,
            CliError::Serialize(_) => crate::exitcode::SOFTWARE,
        }
    }
}
