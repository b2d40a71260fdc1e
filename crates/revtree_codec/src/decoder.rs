//! Byte decoders for records.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;

/// Decode a value from CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid CBOR or do not match the
/// expected shape.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    ciborium::de::from_reader(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

/// Decode a value from JSON bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON or do not match the
/// expected shape.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
}
