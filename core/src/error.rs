//! Error type for configuration lookups and file loading.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No usable value was stored and the supplied default is itself empty.
    #[error("Provided default value is invalid")]
    InvalidDefault,

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A configuration file is not valid in its format.
    #[error("failed to parse {} as {format}: {message}", path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Format name, `json` or `toml`.
        format: &'static str,
        /// Parser message.
        message: String,
    },

    /// The top level of a configuration file is not a table.
    #[error("top level of {} is not a table", path.display())]
    NotATable {
        /// Offending file.
        path: PathBuf,
    },

    /// The file extension does not name a known format.
    #[error("unsupported configuration format: {}", path.display())]
    UnsupportedFormat {
        /// Offending file.
        path: PathBuf,
    },
}
