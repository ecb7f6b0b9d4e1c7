//! Error types for loadgen-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Constructor or configuration validation failure
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted in a lifecycle state that forbids it,
    /// e.g. running a terminated generator or feeding a closed pool
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A blocking wait was interrupted by the queue being closed
    #[error("interrupted while waiting: {0}")]
    Interrupted(String),

    /// Failure surfaced by a caller-supplied worker
    #[error("worker error: {0}")]
    Worker(String),

    /// IO error, e.g. failure to spawn a drain thread
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Shorthand for an `InvalidState` error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("rate must be positive");
        assert_eq!(err.to_string(), "invalid argument: rate must be positive");

        let err = Error::invalid_state("generator already terminated");
        assert_eq!(
            err.to_string(),
            "invalid state: generator already terminated"
        );
    }
}
