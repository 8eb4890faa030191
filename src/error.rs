//! Error types for the live motion pipeline and its collaborators

use std::path::PathBuf;
use thiserror::Error;

/// A batch entry (or the whole body) could not be decoded into samples
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedInputError {
    /// Entry at `index` is missing a required field
    #[error("batch entry {index} is missing field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// Body is not a batch of sample records
    #[error("undecodable batch: {0}")]
    Undecodable(String),
}

/// Startup configuration problems. Fatal, never raised per request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("tempo bucket set is empty")]
    EmptyTempoBuckets,

    #[error("window duration must be positive, got {0}")]
    NonPositiveWindow(f64),

    #[error("failed to read config {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Failures of the storage collaborator behind the track catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to enumerate {path:?}: {source}")]
    Enumerate {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid asset key: {0}")]
    InvalidAssetKey(String),

    #[error("invalid upload name: {0}")]
    InvalidUploadName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-stage failure of one ingest request, aggregated at the boundary
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Offline audio tempo estimation failures
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("tempo engine failed: {0}")]
    Engine(String),
}
