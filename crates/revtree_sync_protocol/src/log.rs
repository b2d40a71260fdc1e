//! Sync log ↔ record mapping.
//!
//! ```text
//! <xsynclog repositoryId="r" modelId="m" baseRevision="-1" syncRevision="0">
//!     <xsynclogentry revision="0">
//!         <xcommand .../>
//!         <xevent .../>
//!     </xsynclogentry>
//! </xsynclog>
//! ```

use crate::attrs::{self, read_address, write_address};
use crate::command::{command_from_record, command_to_record};
use crate::error::{ProtocolError, ProtocolResult};
use crate::event::{event_from_record, event_to_record};
use crate::{XSYNCLOG, XSYNCLOG_ENTRY};
use revtree_codec::Record;
use revtree_core::{SyncLog, SyncLogEntry};

/// Maps a whole sync log, header and entries, to a record.
pub fn sync_log_to_record(log: &SyncLog) -> Record {
    let mut record = Record::new(XSYNCLOG).with_attr(attrs::BASE_REVISION, log.base_revision());
    write_address(&mut record, log.model_address());
    attrs::write_revision(&mut record, attrs::SYNC_REVISION, log.sync_revision());
    for entry in log.entries() {
        record.push_child(entry_to_record(entry));
    }
    record
}

/// Rebuilds a sync log, re-checking its ordering invariants.
pub fn sync_log_from_record(record: &Record) -> ProtocolResult<SyncLog> {
    record.expect_name(XSYNCLOG)?;
    let model_address = read_address(record)?;
    let base_revision: i64 = record.require_parsed(attrs::BASE_REVISION)?;
    let sync_revision = record.parse_attr(attrs::SYNC_REVISION)?;
    let entries = record
        .children
        .iter()
        .map(entry_from_record)
        .collect::<ProtocolResult<Vec<_>>>()?;
    Ok(SyncLog::from_parts(
        model_address,
        base_revision,
        sync_revision,
        entries,
    )?)
}

/// Maps one entry to an `xsynclogentry` element.
pub fn entry_to_record(entry: &SyncLogEntry) -> Record {
    let mut record = Record::new(XSYNCLOG_ENTRY).with_attr(attrs::REVISION, entry.revision);
    record.push_child(command_to_record(&entry.command));
    record.push_child(event_to_record(&entry.event));
    record
}

/// Parses one `xsynclogentry` element.
pub fn entry_from_record(record: &Record) -> ProtocolResult<SyncLogEntry> {
    record.expect_name(XSYNCLOG_ENTRY)?;
    let revision = record.require_parsed(attrs::REVISION)?;
    match record.children.as_slice() {
        [command, event] => Ok(SyncLogEntry {
            command: command_from_record(command)?,
            event: event_from_record(event)?,
            revision,
        }),
        children => Err(ProtocolError::parse(
            &record.name,
            format!("expected a command and an event, found {} children", children.len()),
        )),
    }
}
