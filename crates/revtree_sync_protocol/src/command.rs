//! Command ↔ record mapping.
//!
//! ```text
//! <xcommand type="ADD" repositoryId="r" modelId="m" id="o1" revision="5"/>
//! <xtransaction repositoryId="r" modelId="m">
//!     <xcommand .../>
//! </xtransaction>
//! ```

use crate::attrs::{self, read_address, read_id, read_intent, write_address, write_intent};
use crate::error::{ProtocolError, ProtocolResult};
use crate::{XCOMMAND, XTRANSACTION};
use revtree_codec::{CodecError, Record};
use revtree_core::{AtomicCommand, ChangeType, Command, Level, Transaction};

/// Maps a command to its record form.
pub fn command_to_record(command: &Command) -> Record {
    match command {
        Command::Atomic(command) => atomic_to_record(command),
        Command::Transaction(txn) => {
            let mut record = Record::new(XTRANSACTION);
            write_address(&mut record, txn.target());
            for command in txn.commands() {
                record.push_child(atomic_to_record(command));
            }
            record
        }
    }
}

/// Parses a command record; the element name selects atomic or transaction.
pub fn command_from_record(record: &Record) -> ProtocolResult<Command> {
    match record.name.as_str() {
        XCOMMAND => atomic_from_record(record).map(Command::Atomic),
        XTRANSACTION => {
            let target = read_address(record)?;
            let commands = record
                .children
                .iter()
                .map(|child| {
                    child.expect_name(XCOMMAND)?;
                    atomic_from_record(child)
                })
                .collect::<ProtocolResult<Vec<_>>>()?;
            Transaction::new(target, commands)
                .map(Command::Transaction)
                .map_err(|e| ProtocolError::parse(&record.name, e))
        }
        other => Err(CodecError::unexpected_element(XCOMMAND, other).into()),
    }
}

pub(crate) fn atomic_to_record(command: &AtomicCommand) -> Record {
    let mut record = Record::new(XCOMMAND).with_attr(attrs::TYPE, command.change_type());
    write_address(&mut record, command.target());
    match command {
        AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
            record.set_attr(attrs::ID, c.child());
        }
        AtomicCommand::Field(c) => record.value = c.value().cloned(),
    }
    write_intent(&mut record, command.intent());
    record
}

pub(crate) fn atomic_from_record(record: &Record) -> ProtocolResult<AtomicCommand> {
    let change_type: ChangeType = record.require_parsed(attrs::TYPE)?;
    let target = read_address(record)?;
    let intent = read_intent(record)?;
    let command = if target.level() == Level::Field {
        AtomicCommand::field(target, change_type, record.value.clone(), intent)
    } else {
        let child = read_id(record, attrs::ID)?.ok_or_else(|| {
            ProtocolError::parse(&record.name, format!("missing attribute '{}'", attrs::ID))
        })?;
        AtomicCommand::entity(target, change_type, child, intent)
    };
    command.map_err(|e| ProtocolError::parse(&record.name, e))
}
