//! Common result and error types for pipweave.

/// The standard result type for operations that can only fail because of a
/// bug in pipweave itself.
///
/// User-facing failures (unreadable graph files, bad configuration) have
/// their own error enums in the crates that detect them.
pub type PipweaveResult<T> = Result<T, InternalError>;

/// An internal error indicating a broken invariant, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
