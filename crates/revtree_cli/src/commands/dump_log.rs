//! Dump log command implementation.

use super::{describe_command, describe_event, load_log};
use revtree_core::SyncLog;
use revtree_sync_protocol::EncodingFormat;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Sync log entry representation for output.
#[derive(Debug, Serialize)]
pub struct EntryInfo {
    /// Committed revision.
    pub revision: i64,
    /// Who made the change.
    pub actor: String,
    /// Summary of the command.
    pub command: String,
    /// Summary of the event.
    pub event: String,
    /// Number of atomic events the commit produced.
    pub atomic_events: usize,
    /// Whether the remote has acknowledged the entry.
    pub synced: bool,
}

/// Runs the dump-log command.
pub fn run(
    path: &Path,
    encoding: Option<EncodingFormat>,
    since: Option<i64>,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Dumping sync log {:?}", path);
    let log = load_log(path, encoding)?;
    let entries = list_entries(&log, since, limit);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            print_text_output(&entries);
        }
    }

    Ok(())
}

/// Entries from `since` on (all of them by default), at most `limit`.
pub fn list_entries(log: &SyncLog, since: Option<i64>, limit: Option<usize>) -> Vec<EntryInfo> {
    let entries = match since {
        Some(revision) => log.entries_since(revision),
        None => log.entries(),
    };
    entries
        .take(limit.unwrap_or(usize::MAX))
        .map(|entry| EntryInfo {
            revision: entry.revision,
            actor: entry.event.actor().to_string(),
            command: describe_command(&entry.command),
            event: describe_event(&entry.event),
            atomic_events: entry.event.len(),
            synced: log.sync_revision().is_some_and(|r| entry.revision <= r),
        })
        .collect()
}

fn print_text_output(entries: &[EntryInfo]) {
    println!("Sync Log Entries ({} shown)", entries.len());
    println!("================");
    println!();

    for entry in entries {
        let mark = if entry.synced { ' ' } else { '*' };
        println!("[{:>6}]{} by {}", entry.revision, mark, entry.actor);
        println!("    command: {}", entry.command);
        println!("    event:   {} [{} atomic]", entry.event, entry.atomic_events);
    }
}
