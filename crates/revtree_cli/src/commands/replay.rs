//! Replay command implementation.
//!
//! Re-executes every logged command against an empty model and checks that
//! each one produces the logged event and revision again.

use super::{load_log, CliError, CliResult};
use revtree_core::{commit, CommitOutcome, MemoryModel, ReadableModel, SyncLog};
use revtree_sync_protocol::EncodingFormat;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Replay result.
#[derive(Debug, Serialize)]
pub struct ReplayResult {
    /// Entries re-executed before the replay ended.
    pub entries_replayed: usize,
    /// Model revision after the replay.
    pub final_revision: Option<i64>,
    /// Whether the model exists after the replay.
    pub model_exists: bool,
    /// SHA-256 of the replayed model state.
    pub digest: String,
    /// Entries that did not replay as logged.
    pub mismatches: Vec<String>,
}

impl ReplayResult {
    fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Runs the replay command.
pub fn run(
    path: &Path,
    encoding: Option<EncodingFormat>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Replaying sync log {:?}", path);
    let log = load_log(path, encoding)?;
    let result = replay(&log)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err("Replay failed".into())
    }
}

/// Replays a complete log.
///
/// The log must start at base -1; a truncated log lacks the state its first
/// entry was committed against. Replay stops at the first mismatch, since
/// the state no longer matches what later entries were committed against.
pub fn replay(log: &SyncLog) -> CliResult<ReplayResult> {
    if log.base_revision() != -1 {
        return Err(CliError::Replay(format!(
            "log starts after revision {}, replay needs the full history",
            log.base_revision()
        )));
    }
    let model_address = log.model_address();
    let mut model = MemoryModel::absent(model_address.clone())?;
    let mut mismatches = Vec::new();
    let mut replayed = 0;

    for entry in log.entries() {
        replayed += 1;
        let outcome = commit(Some(&model), model_address, &entry.command, entry.event.actor())?;
        let mismatch = match outcome {
            CommitOutcome::Committed { event, revision } => {
                if revision != entry.revision {
                    Some(format!("committed revision {revision} instead"))
                } else if event != entry.event {
                    debug!("replayed {:?}, logged {:?}", event, entry.event);
                    Some("produced a different event".to_string())
                } else {
                    model.apply_event(&event, revision)?;
                    None
                }
            }
            CommitOutcome::NoChange => Some("produced no change".to_string()),
            CommitOutcome::Rejected(rejection) => Some(format!("was rejected: {rejection}")),
        };
        if let Some(message) = mismatch {
            warn!("revision {} {}", entry.revision, message);
            mismatches.push(format!("revision {}: {}", entry.revision, message));
            break;
        }
    }

    Ok(ReplayResult {
        entries_replayed: replayed,
        final_revision: model.revision(),
        model_exists: model.exists(),
        digest: model.digest_hex(),
        mismatches,
    })
}

fn print_text_output(result: &ReplayResult) {
    println!("Replayed {} entries", result.entries_replayed);
    match result.final_revision {
        Some(rev) => println!("Final revision: {}", rev),
        None => println!("Final revision: none"),
    }
    println!("Model exists:   {}", result.model_exists);
    println!("Digest:         {}", result.digest);
    println!();
    if result.is_ok() {
        println!("✓ Replay matches the log");
    } else {
        for mismatch in &result.mismatches {
            println!("  {}", mismatch);
        }
        println!("✗ Replay diverged from the log");
    }
}
