//! Error types shared by every bhyvebox component.

use thiserror::Error;

/// Result alias used across the crate.
pub type BhyveboxResult<T> = Result<T, BhyveboxError>;

/// Every failure the core can surface.
///
/// Variants carry the operation that produced them in their message so the
/// CLI can print the error without extra context.
#[derive(Debug, Error)]
pub enum BhyveboxError {
    /// Persisted `config.json` is missing, unreadable or malformed.
    #[error("config load error: {0}")]
    ConfigLoad(String),

    /// The command builder was handed a key outside its curated list.
    #[error("unsupported argument: {0}")]
    UnsupportedArgument(String),

    /// Creating one of the guest's datasets or volumes failed.
    #[error("provisioning failed for {path}: {message}")]
    Provisioning { path: String, message: String },

    /// Start was requested for a UUID that has no guest dataset.
    #[error("guest not found: {0}")]
    GuestNotFound(String),

    /// A stage binary failed to launch or exited unsuccessfully.
    #[error("{binary} failed ({status}): {stderr}")]
    ProcessExecution {
        binary: String,
        status: String,
        stderr: String,
    },

    /// Storage backend (zfs/zpool) query or I/O failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid user configuration (pool selection, field validation).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Illegal boot sequence transition.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Guest lock is held by another invocation or cannot be taken.
    #[error("lock error: {0}")]
    Lock(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BhyveboxError {
    /// True for the "no such guest" condition, regardless of message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BhyveboxError::GuestNotFound(_))
    }
}
