//! Error types for imcite-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for imcite operations
pub type Result<T> = std::result::Result<T, ImciteError>;

/// Main error type for imcite operations
///
/// Only cache-level failures abort a run. Everything that can go wrong
/// while resolving a single citation (unreachable connector, no match,
/// ambiguous match) degrades to a per-citation `Unresolved` outcome and
/// never surfaces here.
#[derive(Error, Debug)]
pub enum ImciteError {
    /// Bibliography cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Bibliography-cache errors; all variants are fatal to the run
#[derive(Error, Debug)]
pub enum CacheError {
    /// Existing bibliography file could not be parsed. Surfaced rather
    /// than auto-repaired: silently discarding prior records would
    /// violate the append-only guarantee.
    #[error("bibliography file {path:?} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Temporary-file write or atomic replace failed. The original file
    /// is left untouched.
    #[error("failed to write bibliography file {path:?}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// Filename suffix does not select a known bibliography format
    #[error("unsupported bibliography format: {path:?} (expected .json or .yaml)")]
    UnsupportedFormat { path: PathBuf },

    /// I/O error reading the bibliography file (other than not-found,
    /// which is an empty cache)
    #[error("failed to read bibliography file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Connector-level errors; always recoverable, the orchestrator falls
/// through to the next source instead of aborting
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Transport failed or timed out; treated identically to an empty
    /// result so one unreachable source never blocks another
    #[error("connector unreachable: {message}")]
    Unreachable { message: String },

    /// The source answered with something that is not a candidate list
    #[error("invalid connector response: {message}")]
    InvalidResponse { message: String },
}
