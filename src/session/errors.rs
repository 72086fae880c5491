//! Session manifest error types
//!
//! These errors cover the dev-tooling path only (loading and converting a
//! session manifest). The restore core itself absorbs degraded snapshot
//! content and never surfaces errors; see the restore module.

use std::path::Path;

use thiserror::Error;

/// Result type for session manifest operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Session manifest errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Manifest file could not be read or written
    #[error("Failed to access session manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON or does not match the schema
    #[error("Invalid session manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),

    /// Checksum string is not of the form `crc32:xxxxxxxx`
    #[error("Invalid checksum string: {0}")]
    InvalidChecksum(String),

    /// Payload is not valid base64
    #[error("Invalid payload encoding for record {id}: {reason}")]
    InvalidPayload { id: u64, reason: String },

    /// Manifest format version is not supported
    #[error("Unsupported manifest format version: {0}")]
    UnsupportedVersion(u8),
}

impl SessionError {
    /// I/O error with the offending path attached
    pub fn io_error_at_path(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
