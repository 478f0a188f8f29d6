//! Error types for bosun core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing add-on files.
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be read or written.
    #[error("File I/O error at {path}: {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config document is not valid YAML.
    #[error("Failed to parse {path}: {source}")]
    Yaml {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Config document could not be rendered back to YAML.
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl Error {
    /// Wraps an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
