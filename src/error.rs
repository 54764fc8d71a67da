//! Error types for loading, diffing and writing locale files
use std::path::PathBuf;

use crate::tree::CodecError;

/// Errors that abort a sync run (or the processing of a single file)
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Filesystem error on a working file or the assets directory
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A locale file is not a nested object of strings
    #[error("invalid locale JSON in '{origin}': {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Flattened keys could not be reassembled into a tree
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// HTTP transport error talking to the release host
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The release host answered, but not with what we asked for
    #[error("remote error: {0}")]
    Remote(String),

    /// Missing or inconsistent configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Json {
            origin: origin.into(),
            source,
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
