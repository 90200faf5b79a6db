//! Error types for the allocator service and its client.
//!
//! `From<Error>` for `tonic::Status` lets the server return these directly
//! from handlers with an appropriate status code.

use core::time::Duration;
use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for allocator transport and service failures.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The endpoint could not be reached at startup.
    #[error("allocator unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// The endpoint could not be built (for example a malformed host).
    #[error("transport error: {context}")]
    Transport { context: String },

    /// The allocator answered with a non-OK status.
    #[error("allocator returned {}: {}", .0.code(), .0.message())]
    Rpc(#[from] Status),

    /// The call did not complete within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The allocator counts time from a different epoch, so its identifiers
    /// would decode to the wrong creation time.
    #[error("allocator epoch {found} ms does not match {expected} ms")]
    EpochMismatch { expected: u64, found: u64 },

    /// The request was malformed.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The allocator is shutting down.
    #[error("allocator is shutting down")]
    Unavailable,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Unreachable { .. } | Error::Transport { .. } => Status::unavailable(err.to_string()),
            Error::Rpc(status) => status,
            Error::Timeout { .. } => Status::deadline_exceeded(err.to_string()),
            Error::EpochMismatch { .. } => Status::failed_precondition(err.to_string()),
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
            Error::Unavailable => Status::unavailable("allocator is shutting down"),
        }
    }
}
