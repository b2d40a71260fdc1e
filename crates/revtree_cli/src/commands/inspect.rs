//! Inspect command implementation.

use super::load_log;
use revtree_core::{Event, SyncLog};
use revtree_sync_protocol::EncodingFormat;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Sync log inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// Address of the model the log belongs to.
    pub model: String,
    /// Revision before the first entry.
    pub base_revision: i64,
    /// Revision of the last entry.
    pub current_revision: i64,
    /// Last revision the remote acknowledged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_revision: Option<i64>,
    /// Number of entries.
    pub entry_count: usize,
    /// Entries not yet acknowledged.
    pub pending_count: usize,
    /// Entries whose event is a transaction event.
    pub transaction_count: usize,
    /// Atomic events across all entries.
    pub atomic_event_count: usize,
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    encoding: Option<EncodingFormat>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting sync log {:?}", path);
    let log = load_log(path, encoding)?;
    let result = inspect(path, &log);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Summarizes a loaded log.
pub fn inspect(path: &Path, log: &SyncLog) -> InspectResult {
    InspectResult {
        path: path.display().to_string(),
        model: log.model_address().to_string(),
        base_revision: log.base_revision(),
        current_revision: log.current_revision(),
        sync_revision: log.sync_revision(),
        entry_count: log.len(),
        pending_count: log.pending().count(),
        transaction_count: log
            .entries()
            .filter(|e| matches!(e.event, Event::Transaction(_)))
            .count(),
        atomic_event_count: log.entries().map(|e| e.event.len()).sum(),
    }
}

fn print_text_output(result: &InspectResult) {
    println!("revtree Sync Log");
    println!("================");
    println!();
    println!("Path:  {}", result.path);
    println!("Model: {}", result.model);
    println!();
    println!("Revisions:");
    println!("  Base:    {}", result.base_revision);
    println!("  Current: {}", result.current_revision);
    match result.sync_revision {
        Some(rev) => println!("  Synced:  {}", rev),
        None => println!("  Synced:  never"),
    }
    println!();
    println!("Entries:");
    println!("  Total:         {}", result.entry_count);
    println!("  Pending:       {}", result.pending_count);
    println!("  Transactions:  {}", result.transaction_count);
    println!("  Atomic events: {}", result.atomic_event_count);
}
