//! Error types for the sync protocol.

use revtree_codec::CodecError;
use revtree_core::CoreError;
use std::fmt::Display;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while mapping records or reconciling logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Encoding, decoding or interpreting a record failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A core invariant was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Entries needed for a resend were already truncated from the log.
    #[error("revision {requested} is no longer in the log, which starts after {base}")]
    Truncated {
        /// First revision asked for.
        requested: i64,
        /// Current base revision of the log.
        base: i64,
    },
}

impl ProtocolError {
    /// Create a parse error for the named element.
    pub fn parse(element: impl Into<String>, message: impl Display) -> Self {
        Self::Codec(CodecError::parse(element, message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_name_the_element() {
        let err = ProtocolError::parse("xevent", "missing attribute 'type'");
        assert_eq!(
            err.to_string(),
            "cannot parse <xevent>: missing attribute 'type'"
        );
    }

    #[test]
    fn core_errors_convert() {
        let err: ProtocolError = CoreError::invalid_command("bad").into();
        assert!(matches!(err, ProtocolError::Core(_)));
    }
}
