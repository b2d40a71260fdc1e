//! # revtree core
//!
//! Versioned entity trees with optimistic concurrency.
//!
//! State is a tree: repository → model → object → field, where fields hold
//! opaque [`Value`](revtree_codec::Value)s. Callers change it by issuing
//! [`Command`]s that carry an [`Intent`]:
//! - `Forced`: apply whatever the current state
//! - `SafeStateBound`: the target must be in the expected state
//! - `SafeRevBound`: additionally, the target revision must match
//!
//! The [`engine`] validates a command on an [`overlay`] of the committed
//! model, computes the minimal set of [`Event`]s, and assigns the next
//! revision. Committed changes are recorded in a [`SyncLog`].
//!
//! ## Usage
//!
//! ```
//! use revtree_core::{AtomicCommand, CommitOutcome, Config, Id, Intent, Repository};
//!
//! let repo = Repository::new(Config::new().repository_id("phonebook")).unwrap();
//! let add = AtomicCommand::add_model(repo.address(), Id::new("contacts").unwrap(), Intent::SafeStateBound)
//!     .unwrap();
//! let outcome = repo.execute(&add.into()).unwrap();
//! assert!(matches!(outcome, CommitOutcome::Committed { revision: 0, .. }));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
mod config;
pub mod engine;
pub mod entity;
mod error;
pub mod event;
pub mod overlay;
mod repository;
pub mod revision;
pub mod store;
mod sync_log;

pub use command::{AtomicCommand, ChangeType, Command, Intent, RevisionBound, Transaction};
pub use config::Config;
pub use engine::{commit, execute, CommitOutcome, RejectReason, Rejection, Verdict};
pub use entity::{Address, Id, Level};
pub use error::{CoreError, CoreResult};
pub use event::{AtomicEvent, Event, EventHeader, FieldEvent, TransactionEvent};
pub use repository::Repository;
pub use store::{MemoryModel, ReadableField, ReadableModel, ReadableObject};
pub use sync_log::{SyncLog, SyncLogEntry};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
