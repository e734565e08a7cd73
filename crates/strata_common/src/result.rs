//! The fatal error type shared by scope construction and rebasing.

/// Result of an operation that can only fail on a broken internal invariant.
pub type StrataResult<T> = Result<T, InternalError>;

/// A broken internal invariant: a selector that does not resolve against a
/// congruent root, a value bound twice, a scope chain that cannot be classified.
///
/// These are never recoverable. Re-running the same operation on the same
/// tree reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal rebase error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error.
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
