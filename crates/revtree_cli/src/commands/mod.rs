//! CLI command implementations.

pub mod dump_log;
pub mod inspect;
pub mod replay;

use revtree_core::{Command, CoreError, Event, SyncLog};
use revtree_sync_protocol::{decode_records, sync_log_from_record, EncodingFormat, ProtocolError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be read.
    #[error("cannot read {path:?}: {source}")]
    Io {
        /// File that was asked for.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a valid sync log.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Re-executing the log hit a structural error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The log cannot be replayed.
    #[error("cannot replay: {0}")]
    Replay(String),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Reads a sync log file. Without an explicit encoding, the file extension
/// decides.
pub fn load_log(path: &Path, encoding: Option<EncodingFormat>) -> CliResult<SyncLog> {
    let format = encoding.unwrap_or_else(|| EncodingFormat::from_path(path));
    debug!("Reading {:?} as {}", path, format);
    let bytes = std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record = decode_records(&bytes, format)?;
    Ok(sync_log_from_record(&record)?)
}

/// One-line summary of a command.
pub fn describe_command(command: &Command) -> String {
    match command {
        Command::Atomic(atomic) => atomic.to_string(),
        Command::Transaction(txn) => {
            format!("transaction on {} ({} commands)", txn.target(), txn.len())
        }
    }
}

/// One-line summary of an event.
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Atomic(atomic) => atomic.to_string(),
        Event::Transaction(txn) => {
            format!("transaction on {} ({} events)", txn.target, txn.events.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_testkit::{phonebook_log, TempLogFile};

    #[test]
    fn load_both_encodings() {
        let log = phonebook_log();
        for format in [EncodingFormat::Cbor, EncodingFormat::Json] {
            let file = TempLogFile::write(&log, format);
            assert_eq!(load_log(file.path(), None).unwrap(), log);
            assert_eq!(load_log(file.path(), Some(format)).unwrap(), log);
        }
    }

    #[test]
    fn wrong_encoding_is_a_protocol_error() {
        let file = TempLogFile::write(&phonebook_log(), EncodingFormat::Json);
        assert!(matches!(
            load_log(file.path(), Some(EncodingFormat::Cbor)),
            Err(CliError::Protocol(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_log(&dir.path().join("absent.cbor"), None).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
        assert!(err.to_string().contains("absent.cbor"));
    }

    #[test]
    fn descriptions() {
        let log = phonebook_log();
        let first = log.entry(0).unwrap();
        assert!(describe_command(&first.command).contains("contacts"));
        let second = log.entry(1).unwrap();
        assert!(describe_command(&second.command).starts_with("transaction on"));
        assert!(describe_event(&second.event).ends_with("events)"));
    }
}
