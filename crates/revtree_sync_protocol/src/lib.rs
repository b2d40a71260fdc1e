//! # revtree sync protocol
//!
//! The exchange format between a revtree repository and its peers.
//!
//! Commands, events and whole sync logs map one-to-one onto
//! [`Record`](revtree_codec::Record) trees, which are stored or sent as CBOR
//! or JSON. Decoding a record that was produced by encoding a value always
//! yields that value again. The [`reconcile`] module compares a local sync
//! log against a remote event stream.
//!
//! ## Usage
//!
//! ```
//! use revtree_core::{AtomicCommand, Command, Config, Id, Intent, Repository};
//! use revtree_sync_protocol::{command_from_record, command_to_record};
//!
//! let repo = Repository::new(Config::new().repository_id("phonebook")).unwrap();
//! let add: Command = AtomicCommand::add_model(repo.address(), Id::new("contacts").unwrap(), Intent::Forced)
//!     .unwrap()
//!     .into();
//!
//! let record = command_to_record(&add);
//! assert_eq!(record.attr("forced"), Some("true"));
//! assert_eq!(command_from_record(&record).unwrap(), add);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod attrs;
mod command;
mod error;
mod event;
mod format;
mod log;
pub mod reconcile;

pub use command::{command_from_record, command_to_record};
pub use error::{ProtocolError, ProtocolResult};
pub use event::{event_from_record, event_to_record};
pub use format::{decode_records, encode_records, EncodingFormat};
pub use log::{entry_from_record, entry_to_record, sync_log_from_record, sync_log_to_record};
pub use reconcile::{entries_to_resend, find_divergence};

/// Element name of an atomic command.
pub const XCOMMAND: &str = "xcommand";
/// Element name of a transaction; its children are [`XCOMMAND`]s.
pub const XTRANSACTION: &str = "xtransaction";
/// Element name of an atomic event.
pub const XEVENT: &str = "xevent";
/// Element name of a transaction event; its children are [`XEVENT`]s.
pub const XTRANSACTION_EVENT: &str = "xtransactionEvent";
/// Element name of a sync log.
pub const XSYNCLOG: &str = "xsynclog";
/// Element name of one sync log entry.
pub const XSYNCLOG_ENTRY: &str = "xsynclogentry";
/// Element name of an old or new field value inside an event.
pub const VALUE: &str = "value";
