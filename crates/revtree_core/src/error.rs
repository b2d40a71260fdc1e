//! Error types for revtree core.
//!
//! Only structural problems are errors. A command that is well-formed but
//! conflicts with the current state is not an error; it yields a
//! [`Rejection`](crate::engine::Rejection) instead.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in revtree core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An identifier is not a valid name.
    #[error("invalid id {id:?}: {message}")]
    InvalidId {
        /// The rejected identifier text.
        id: String,
        /// Why it was rejected.
        message: String,
    },

    /// An address has missing or misplaced components.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// Description of the problem.
        message: String,
    },

    /// A command is malformed or does not fit the context it was executed in.
    #[error("invalid command: {message}")]
    InvalidCommand {
        /// Description of the problem.
        message: String,
    },

    /// A sync log entry was appended out of order.
    #[error("sync log out of order: expected revision {expected}, got {actual}")]
    SyncLogOutOfOrder {
        /// The only revision the log would accept.
        expected: i64,
        /// The revision that was offered.
        actual: i64,
    },

    /// A sync log truncation point lies outside the log.
    #[error("cannot truncate sync log to {requested}: log covers {base}..={current}")]
    InvalidTruncation {
        /// The requested new base revision.
        requested: i64,
        /// Current base revision.
        base: i64,
        /// Current head revision.
        current: i64,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid id error.
    pub fn invalid_id(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidId {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid address error.
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Creates an invalid command error.
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = CoreError::SyncLogOutOfOrder {
            expected: 4,
            actual: 6,
        };
        assert_eq!(
            err.to_string(),
            "sync log out of order: expected revision 4, got 6"
        );

        let err = CoreError::invalid_command("change commands must target a field");
        assert!(err.to_string().starts_with("invalid command"));
    }
}
