//! Unified error types for the catalog, its persistence pipeline and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure the crate can report.
///
/// Lookup misses, malformed records and missing snapshots are all recoverable;
/// callers decide on the fallback.
#[derive(Debug, Error)]
pub enum Error {
    /// No catalog entry exists for the requested product id.
    #[error("Product with id {id} not found")]
    NotFound {
        /// The id that was looked up
        id: i32,
    },

    /// A persisted record could not be decoded.
    #[error("Parse error: {message}")]
    Parse {
        /// What was wrong with the record
        message: String,
    },

    /// Filesystem failure during load, snapshot, restore or report writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot error: {message}")]
    Snapshot {
        /// Underlying codec message
        message: String,
    },

    /// The staging area holds no usable snapshot.
    #[error("No snapshot available in {}", dir.display())]
    NoSnapshotAvailable {
        /// Staging directory that was searched
        dir: PathBuf,
    },

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl Error {
    /// Shorthand for building a [`Error::Parse`].
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(value: bincode::Error) -> Self {
        Self::Snapshot {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
