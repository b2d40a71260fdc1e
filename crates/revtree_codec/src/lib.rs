//! # revtree codec
//!
//! Field values and wire records for revtree.
//!
//! This crate provides:
//! - [`Value`], the opaque payload stored in fields
//! - [`Record`], the tree-shaped element commands and events are exchanged as
//! - CBOR and JSON byte encodings of both
//!
//! ## Usage
//!
//! ```
//! use revtree_codec::{from_cbor, to_cbor, Record, Value};
//!
//! let record = Record::new("value").with_value(Value::Integer(42));
//! let bytes = to_cbor(&record).unwrap();
//!
//! let decoded: Record = from_cbor(&bytes).unwrap();
//! assert_eq!(record, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod record;
mod value;

pub use decoder::{from_cbor, from_json};
pub use encoder::{to_cbor, to_json};
pub use error::{CodecError, CodecResult};
pub use record::Record;
pub use value::Value;
