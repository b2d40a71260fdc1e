//! Test fixtures: a small phonebook model and its history.
//!
//! The phonebook repository holds one model, `contacts`, with two people:
//!
//! | object | field | value |
//! |---|---|---|
//! | `ada` | `name` | `"Ada"` |
//! | `ada` | `phone` | `"555-0100"` |
//! | `alan` | `name` | `"Alan"` |
//! | `alan` | `phone` | (empty) |

use revtree_codec::Value;
use revtree_core::{
    Address, AtomicCommand, Command, CommitOutcome, Config, Id, Intent, MemoryModel, Repository,
    SyncLog, Transaction,
};
use revtree_sync_protocol::{encode_records, sync_log_to_record, EncodingFormat};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Repository id used by every fixture.
pub const REPOSITORY: &str = "phonebook";
/// Model id used by every fixture.
pub const MODEL: &str = "contacts";

/// Parses an id, panicking on invalid input.
pub fn id(raw: &str) -> Id {
    Id::new(raw).expect("fixture ids are valid")
}

/// Address of the phonebook repository.
pub fn repository_address() -> Address {
    Address::repository(id(REPOSITORY))
}

/// Address of the contacts model.
pub fn model_address() -> Address {
    Address::model(id(REPOSITORY), id(MODEL))
}

/// Address of an object in the contacts model.
pub fn object_address(object: &str) -> Address {
    Address::object(id(REPOSITORY), id(MODEL), id(object))
}

/// Address of a field in the contacts model.
pub fn field_address(object: &str, field: &str) -> Address {
    Address::field(id(REPOSITORY), id(MODEL), id(object), id(field))
}

/// The contacts model as a snapshot at `revision`; every entity carries it.
pub fn phonebook_model(revision: i64) -> MemoryModel {
    let mut model = MemoryModel::new(model_address(), revision).expect("model address");
    let ada = model.create_object(id("ada"), revision).expect("new object");
    ada.create_field(id("name"), revision)
        .expect("new field")
        .set_value(Some(Value::from("Ada")));
    ada.create_field(id("phone"), revision)
        .expect("new field")
        .set_value(Some(Value::from("555-0100")));
    let alan = model.create_object(id("alan"), revision).expect("new object");
    alan.create_field(id("name"), revision)
        .expect("new field")
        .set_value(Some(Value::from("Alan")));
    alan.create_field(id("phone"), revision).expect("new field");
    model
}

/// A repository holding [`phonebook_model`] at `revision`, with an empty log.
pub fn phonebook_repository(revision: i64) -> Repository {
    let repo = Repository::new(Config::new().repository_id(REPOSITORY)).expect("valid config");
    repo.insert_model(phonebook_model(revision))
        .expect("model fits repository");
    repo
}

/// The commands that build the phonebook from nothing, one commit each.
pub fn phonebook_commands() -> Vec<Command> {
    let model = model_address();
    let person = |object: &str, name: &str| -> Command {
        let address = object_address(object);
        Transaction::new(
            model.clone(),
            vec![
                AtomicCommand::add_object(&model, id(object), Intent::SafeStateBound)
                    .expect("object command"),
                AtomicCommand::add_field(&address, id("name"), Intent::SafeStateBound)
                    .expect("field command"),
                AtomicCommand::add_value(
                    &field_address(object, "name"),
                    Value::from(name),
                    Intent::SafeStateBound,
                )
                .expect("value command"),
                AtomicCommand::add_field(&address, id("phone"), Intent::SafeStateBound)
                    .expect("field command"),
            ],
        )
        .expect("transaction")
        .into()
    };
    vec![
        AtomicCommand::add_model(&repository_address(), id(MODEL), Intent::SafeStateBound)
            .expect("model command")
            .into(),
        person("ada", "Ada"),
        person("alan", "Alan"),
        AtomicCommand::add_value(
            &field_address("ada", "phone"),
            Value::from("555-0100"),
            Intent::safe_rev(1).expect("revision"),
        )
        .expect("value command")
        .into(),
    ]
}

/// A fresh repository that went through [`phonebook_commands`].
///
/// Its log starts at base -1, so it holds the complete history.
pub fn phonebook_history() -> Repository {
    let repo = Repository::new(Config::new().repository_id(REPOSITORY)).expect("valid config");
    for command in phonebook_commands() {
        match repo.execute(&command).expect("well-formed command") {
            CommitOutcome::Committed { .. } => {}
            other => panic!("fixture command {command:?} did not commit: {other:?}"),
        }
    }
    repo
}

/// The sync log of [`phonebook_history`].
pub fn phonebook_log() -> SyncLog {
    phonebook_history()
        .sync_log(&id(MODEL))
        .expect("model has a log")
}

/// A sync log written to a temporary file, removed on drop.
pub struct TempLogFile {
    path: PathBuf,
    _dir: TempDir,
}

impl TempLogFile {
    /// Writes `log` in `format` to a file named after the format.
    pub fn write(log: &SyncLog, format: EncodingFormat) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join(format!("log.{format}"));
        let bytes = encode_records(&sync_log_to_record(log), format).expect("encodable log");
        std::fs::write(&path, bytes).expect("Failed to write log file");
        Self { path, _dir: dir }
    }

    /// Path of the written file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_core::{ReadableField, ReadableModel, ReadableObject};

    #[test]
    fn history_matches_snapshot_contents() {
        let repo = phonebook_history();
        let built = repo.model(&id(MODEL)).unwrap();
        assert_eq!(built.revision(), Some(3));
        let ada = built.object(&id("ada")).unwrap();
        assert_eq!(
            ada.field(&id("phone")).unwrap().value(),
            Some(&Value::from("555-0100"))
        );
        let alan = built.object(&id("alan")).unwrap();
        assert_eq!(alan.field(&id("phone")).unwrap().value(), None);
    }

    #[test]
    fn log_covers_every_commit() {
        let log = phonebook_log();
        assert_eq!(log.base_revision(), -1);
        assert_eq!(log.current_revision(), 3);
        assert_eq!(log.len(), phonebook_commands().len());
    }

    #[test]
    fn temp_file_is_named_after_format() {
        let file = TempLogFile::write(&phonebook_log(), EncodingFormat::Json);
        assert!(file.path().exists());
        assert_eq!(EncodingFormat::from_path(file.path()), EncodingFormat::Json);
    }
}
