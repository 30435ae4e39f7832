//! Centralized error types for mhtunpack.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mhtunpack library.
#[derive(Error, Debug)]
pub enum MhtError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("MHT file not found: {0}")]
    FileNotFound(PathBuf),

    /// The archive contains no multipart boundary declaration.
    ///
    /// Fatal for the whole conversion: without the boundary token the
    /// archive cannot be split into sections and no partial result is
    /// usable.
    #[error("no multipart boundary declaration found before end of archive")]
    MissingBoundary,

    /// Inline HTML reassembly was requested on parts whose images were
    /// decoded to raw bytes; decoded bytes cannot be re-embedded as
    /// base64 `data:` URIs.
    #[error("inline HTML output requires image decoding to be disabled")]
    IncompatibleMode,
}

/// Convenience alias for `Result<T, MhtError>`.
pub type Result<T> = std::result::Result<T, MhtError>;

impl MhtError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
