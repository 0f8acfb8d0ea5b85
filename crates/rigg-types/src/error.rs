//! Error taxonomy shared by every backend kind.
//!
//! The core layers (value store, tree reader, path operations) propagate
//! transport failures unchanged; there is no retry below the caller.

use std::time::Duration;

use thiserror::Error;

/// Result type for target operations.
pub type TargetResult<T> = Result<T, TargetError>;

/// Target operation errors.
#[derive(Debug, Clone, Error)]
pub enum TargetError {
    /// A path (or its parent) that must exist does not.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A path exists but with the wrong kind (e.g. `makedirs` over a file).
    #[error("path conflict: {0} exists and is not a directory")]
    PathConflict(String),

    /// The backend refused the operation, or elevation was requested on a
    /// session that cannot provide it.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Post-write read-back did not match the intended value.
    #[error("verification failed for {path}: wrote {expected:?}, read back {actual:?}")]
    Verification {
        path: String,
        expected: String,
        actual: String,
    },

    /// An entry under a tree read could not be read. Partial trees are a
    /// backend integrity failure, so one bad entry fails the whole call.
    #[error("read error: {0}")]
    Read(String),

    /// The transport did not respond within its deadline.
    #[error("transport timeout after {0:?}")]
    TransportTimeout(Duration),

    /// Command execution failed at the transport layer (non-zero exit,
    /// connection loss, failure to spawn the transport process).
    #[error("transport error: {0}")]
    Transport(String),

    /// The target can no longer serve requests (e.g. a powered-off guest).
    #[error("target unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for TargetError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => TargetError::PathNotFound(err.to_string()),
            ErrorKind::PermissionDenied => TargetError::PermissionDenied(err.to_string()),
            ErrorKind::AlreadyExists => TargetError::PathConflict(err.to_string()),
            _ => TargetError::Transport(err.to_string()),
        }
    }
}
