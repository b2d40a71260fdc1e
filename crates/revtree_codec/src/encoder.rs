//! Byte encoders for records.

use crate::error::{CodecError, CodecResult};
use serde::Serialize;

/// Encode a value to CBOR bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_cbor<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buffer = Vec::new();
    ciborium::ser::into_writer(value, &mut buffer)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(buffer)
}

/// Encode a value to pretty-printed JSON bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}
