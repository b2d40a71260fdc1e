//! Commands: immutable descriptions of intended changes.

mod atomic;
mod intent;
mod transaction;

pub use atomic::{AtomicCommand, EntityCommand, FieldCommand};
pub use intent::{Intent, RevisionBound};
pub use transaction::{Transaction, TransactionBuilder};

use crate::entity::{Address, Level};
use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Kind of change a command requests or an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// An entity or value comes into existence.
    Add,
    /// An entity or value goes away.
    Remove,
    /// A field value is replaced.
    Change,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeType::Add => "ADD",
            ChangeType::Remove => "REMOVE",
            ChangeType::Change => "CHANGE",
        })
    }
}

impl FromStr for ChangeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(ChangeType::Add),
            "REMOVE" => Ok(ChangeType::Remove),
            "CHANGE" => Ok(ChangeType::Change),
            other => Err(CoreError::invalid_command(format!(
                "unknown change type {other:?}"
            ))),
        }
    }
}

/// A command as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A single change.
    Atomic(AtomicCommand),
    /// Several changes applied all-or-nothing.
    Transaction(Transaction),
}

impl Command {
    /// The address the command is sent to.
    #[must_use]
    pub fn target(&self) -> &Address {
        match self {
            Command::Atomic(c) => c.target(),
            Command::Transaction(t) => t.target(),
        }
    }

    /// The model whose state this command changes.
    ///
    /// Repository commands change the model they add or remove.
    pub fn model_address(&self) -> CoreResult<Address> {
        let address = match self {
            Command::Atomic(c) if c.level() == Level::Repository => c.changed_entity(),
            other => other.target().clone(),
        };
        address.model_address().ok_or_else(|| {
            CoreError::invalid_command(format!("{address} is not inside a model"))
        })
    }

    /// The atomic commands in execution order.
    #[must_use]
    pub fn atomic_commands(&self) -> &[AtomicCommand] {
        match self {
            Command::Atomic(c) => std::slice::from_ref(c),
            Command::Transaction(t) => t.commands(),
        }
    }
}

impl From<AtomicCommand> for Command {
    fn from(command: AtomicCommand) -> Self {
        Command::Atomic(command)
    }
}

impl From<Transaction> for Command {
    fn from(transaction: Transaction) -> Self {
        Command::Transaction(transaction)
    }
}
