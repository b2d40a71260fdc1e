//! Byte encodings for record files.

use crate::error::{ProtocolError, ProtocolResult};
use revtree_codec::{from_cbor, from_json, to_cbor, to_json, CodecError, Record};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How records are turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    /// Compact binary CBOR.
    #[default]
    Cbor,
    /// Human-readable JSON.
    Json,
}

impl EncodingFormat {
    /// Picks the format from a file extension; anything but `.json` is CBOR.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => EncodingFormat::Json,
            _ => EncodingFormat::Cbor,
        }
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncodingFormat::Cbor => "cbor",
            EncodingFormat::Json => "json",
        })
    }
}

impl FromStr for EncodingFormat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cbor" => Ok(EncodingFormat::Cbor),
            "json" => Ok(EncodingFormat::Json),
            other => Err(CodecError::decoding_failed(format!("unknown encoding {other:?}")).into()),
        }
    }
}

/// Encodes a record tree to bytes.
pub fn encode_records(record: &Record, format: EncodingFormat) -> ProtocolResult<Vec<u8>> {
    let bytes = match format {
        EncodingFormat::Cbor => to_cbor(record)?,
        EncodingFormat::Json => to_json(record)?,
    };
    Ok(bytes)
}

/// Decodes a record tree from bytes.
pub fn decode_records(bytes: &[u8], format: EncodingFormat) -> ProtocolResult<Record> {
    let record = match format {
        EncodingFormat::Cbor => from_cbor(bytes)?,
        EncodingFormat::Json => from_json(bytes)?,
    };
    Ok(record)
}
