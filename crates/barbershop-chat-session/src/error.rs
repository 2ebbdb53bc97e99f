//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// A result type using `ConfigError`.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading chat settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The prompt file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The prompt file exists but holds no text.
    #[error("system prompt file {0} is empty")]
    EmptyPrompt(PathBuf),
}
