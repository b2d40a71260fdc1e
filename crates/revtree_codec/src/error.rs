//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding or interpreting records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a record to bytes.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode bytes into a record.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// A record was well-formed bytes but could not be interpreted.
    #[error("cannot parse <{element}>: {message}")]
    Parse {
        /// Name of the offending element.
        element: String,
        /// What was wrong with it.
        message: String,
    },

    /// A record carried an element name other than the one expected.
    #[error("expected element <{expected}>, found <{found}>")]
    UnexpectedElement {
        /// Element name the caller asked for.
        expected: String,
        /// Element name actually present.
        found: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Create a parse error for the named element.
    pub fn parse(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected element error.
    pub fn unexpected_element(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedElement {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_element() {
        let err = CodecError::parse("xevent", "missing attribute 'type'");
        assert_eq!(
            err.to_string(),
            "cannot parse <xevent>: missing attribute 'type'"
        );
    }

    #[test]
    fn unexpected_element_display() {
        let err = CodecError::unexpected_element("xcommand", "xevent");
        assert!(err.to_string().contains("xcommand"));
        assert!(err.to_string().contains("xevent"));
    }
}
