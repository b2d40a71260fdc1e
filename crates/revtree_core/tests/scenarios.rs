//! End-to-end commit scenarios against a repository.

use revtree_codec::Value;
use revtree_core::{
    Address, AtomicCommand, AtomicEvent, ChangeType, CommitOutcome, Config, Event, Id, Intent,
    Level, MemoryModel, ReadableField, ReadableModel, ReadableObject, RejectReason, Repository,
    Transaction,
};

fn id(s: &str) -> Id {
    Id::new(s).unwrap()
}

fn model_address() -> Address {
    Address::model(id("r"), id("m"))
}

fn object_address(object: &str) -> Address {
    Address::object(id("r"), id("m"), id(object))
}

fn field_address(object: &str, field: &str) -> Address {
    Address::field(id("r"), id("m"), id(object), id(field))
}

/// A repository holding model `m` at `revision`, seeded by `build`.
fn repository_with(revision: i64, build: impl FnOnce(&mut MemoryModel)) -> Repository {
    let repo = Repository::new(Config::new().repository_id("r")).unwrap();
    let mut model = MemoryModel::new(model_address(), revision).unwrap();
    build(&mut model);
    repo.insert_model(model).unwrap();
    repo
}

fn committed(outcome: CommitOutcome) -> (Event, i64) {
    match outcome {
        CommitOutcome::Committed { event, revision } => (event, revision),
        other => panic!("expected a commit, got {other:?}"),
    }
}

#[test]
fn add_object_bound_to_model_revision() {
    let repo = repository_with(5, |_| {});
    let cmd = AtomicCommand::add_object(&model_address(), id("o1"), Intent::safe_rev(5).unwrap())
        .unwrap();
    let (event, revision) = committed(repo.execute(&cmd.into()).unwrap());

    assert_eq!(revision, 6);
    match event {
        Event::Atomic(AtomicEvent::Model(header)) => {
            assert_eq!(header.change_type, ChangeType::Add);
            assert_eq!(header.changed_entity, object_address("o1"));
            assert_eq!(header.old_model_rev, Some(5));
            assert!(!header.in_transaction);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(repo.model_revision(&id("m")), Some(6));
}

#[test]
fn stale_field_change_is_rejected() {
    let repo = repository_with(3, |model| {
        model
            .create_object(id("o1"), 3)
            .unwrap()
            .create_field(id("f1"), 3)
            .unwrap()
            .set_value(Some(Value::from("V1")));
    });
    let change = AtomicCommand::change_value(
        &field_address("o1", "f1"),
        Value::from("V2"),
        Intent::safe_rev(3).unwrap(),
    )
    .unwrap();

    let (event, revision) = committed(repo.execute(&change.clone().into()).unwrap());
    assert_eq!(revision, 4);
    match event {
        Event::Atomic(AtomicEvent::Field(e)) => {
            assert_eq!(e.header.change_type, ChangeType::Change);
            assert_eq!(e.header.old_field_rev, Some(3));
            assert_eq!(e.old_value, Some(Value::from("V1")));
            assert_eq!(e.new_value, Some(Value::from("V2")));
        }
        other => panic!("unexpected event {other:?}"),
    }

    match repo.execute(&change.into()).unwrap() {
        CommitOutcome::Rejected(rejection) => assert_eq!(
            rejection.reason,
            RejectReason::RevisionMismatch {
                expected: 3,
                actual: Some(4)
            }
        ),
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[test]
fn object_removal_is_packed_with_implied_events() {
    let repo = repository_with(7, |model| {
        model
            .create_object(id("o1"), 7)
            .unwrap()
            .create_field(id("f1"), 7)
            .unwrap()
            .set_value(Some(Value::from(42i64)));
    });
    let txn = Transaction::new(
        model_address(),
        vec![AtomicCommand::remove_object(&model_address(), id("o1"), Intent::SafeStateBound).unwrap()],
    )
    .unwrap();
    let (event, _) = committed(repo.execute(&txn.into()).unwrap());

    let Event::Transaction(txn_event) = event else {
        panic!("expected a transaction event");
    };
    let summary: Vec<_> = txn_event
        .events
        .iter()
        .map(|e| (e.level(), e.change_type(), e.is_implied()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Level::Field, ChangeType::Remove, true),
            (Level::Object, ChangeType::Remove, true),
            (Level::Model, ChangeType::Remove, false),
        ]
    );
    assert!(txn_event.events.iter().all(AtomicEvent::in_transaction));
    assert_eq!(txn_event.old_model_rev, Some(7));
    assert!(repo.model(&id("m")).unwrap().is_empty());
}

#[test]
fn failed_transaction_commits_nothing() {
    let repo = repository_with(2, |model| {
        model.create_object(id("o1"), 2).unwrap();
    });
    let before = repo.model(&id("m")).unwrap();
    let txn = Transaction::new(
        model_address(),
        vec![
            AtomicCommand::add_object(&model_address(), id("o2"), Intent::SafeStateBound).unwrap(),
            AtomicCommand::add_field(&object_address("o2"), id("f"), Intent::SafeStateBound)
                .unwrap(),
            AtomicCommand::add_object(&model_address(), id("o1"), Intent::SafeStateBound).unwrap(),
        ],
    )
    .unwrap();

    match repo.execute(&txn.into()).unwrap() {
        CommitOutcome::Rejected(rejection) => {
            assert_eq!(rejection.index, Some(2));
            assert_eq!(rejection.reason, RejectReason::AlreadyExists);
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(repo.model(&id("m")).unwrap(), before);
    assert!(repo.sync_log(&id("m")).unwrap().is_empty());
}

#[test]
fn packing_threshold() {
    let repo = repository_with(0, |model| {
        let object = model.create_object(id("o1"), 0).unwrap();
        object.create_field(id("a"), 0).unwrap();
        object.create_field(id("b"), 0).unwrap();
    });

    let single = AtomicCommand::add_value(&field_address("o1", "a"), Value::from(1i64), Intent::Forced)
        .unwrap();
    let (event, _) = committed(repo.execute(&single.into()).unwrap());
    assert!(matches!(event, Event::Atomic(_)));
    assert!(!event.atomic_events()[0].in_transaction());

    let txn = Transaction::new(
        object_address("o1"),
        vec![
            AtomicCommand::change_value(&field_address("o1", "a"), Value::from(2i64), Intent::Forced)
                .unwrap(),
            AtomicCommand::add_value(&field_address("o1", "b"), Value::from(3i64), Intent::Forced)
                .unwrap(),
        ],
    )
    .unwrap();
    let (event, _) = committed(repo.execute(&txn.into()).unwrap());
    match event {
        Event::Transaction(t) => {
            assert_eq!(t.events.len(), 2);
            assert_eq!(t.target, object_address("o1"));
            assert_eq!(t.old_object_rev, Some(1));
            assert!(t.events.iter().all(AtomicEvent::in_transaction));
        }
        Event::Atomic(_) => panic!("expected a transaction event"),
    }
}

#[test]
fn transaction_with_one_net_change_stands_alone() {
    let repo = repository_with(0, |model| {
        model.create_object(id("o1"), 0).unwrap();
    });
    let txn = Transaction::new(
        model_address(),
        vec![
            AtomicCommand::add_object(&model_address(), id("tmp"), Intent::Forced).unwrap(),
            AtomicCommand::remove_object(&model_address(), id("tmp"), Intent::Forced).unwrap(),
            AtomicCommand::add_object(&model_address(), id("o2"), Intent::Forced).unwrap(),
        ],
    )
    .unwrap();
    let (event, revision) = committed(repo.execute(&txn.into()).unwrap());
    assert_eq!(revision, 1);
    assert_eq!(event.len(), 1);
    assert!(!event.atomic_events()[0].in_transaction());
    assert_eq!(
        event.atomic_events()[0].changed_entity(),
        &object_address("o2")
    );
}

#[test]
fn forced_commands_are_idempotent() {
    let repo = repository_with(4, |model| {
        model.create_object(id("o1"), 4).unwrap();
    });
    let add = AtomicCommand::add_object(&model_address(), id("o1"), Intent::Forced).unwrap();
    assert_eq!(repo.execute(&add.into()).unwrap(), CommitOutcome::NoChange);

    let remove = AtomicCommand::remove_object(&model_address(), id("ghost"), Intent::Forced).unwrap();
    assert_eq!(repo.execute(&remove.into()).unwrap(), CommitOutcome::NoChange);
    assert_eq!(repo.model_revision(&id("m")), Some(4));
}

#[test]
fn model_can_be_removed_and_re_added() {
    let repo = Repository::new(Config::new().repository_id("r")).unwrap();
    let repo_address = repo.address().clone();
    let add = AtomicCommand::add_model(&repo_address, id("m"), Intent::SafeStateBound).unwrap();
    committed(repo.execute(&add.clone().into()).unwrap());

    let add_object = AtomicCommand::add_object(&model_address(), id("o"), Intent::Forced).unwrap();
    committed(repo.execute(&add_object.into()).unwrap());

    let remove = AtomicCommand::remove_model(&repo_address, id("m"), Intent::safe_rev(1).unwrap())
        .unwrap();
    let (event, revision) = committed(repo.execute(&remove.into()).unwrap());
    assert_eq!(revision, 2);
    let last = event.atomic_events().last().unwrap();
    assert_eq!(last.level(), Level::Repository);
    assert!(repo.model_ids().is_empty());

    let rebound = add.with_intent(Intent::safe_rev(2).unwrap()).unwrap();
    let (_, revision) = committed(repo.execute(&rebound.into()).unwrap());
    assert_eq!(revision, 3);
    let model = repo.model(&id("m")).unwrap();
    assert!(model.exists());
    assert!(model.is_empty());
}

#[test]
fn snapshot_reflects_every_commit() {
    let repo = repository_with(0, |_| {});
    let txn = Transaction::new(
        object_address("o"),
        vec![
            AtomicCommand::add_object(&model_address(), id("o"), Intent::SafeStateBound).unwrap(),
            AtomicCommand::add_field(&object_address("o"), id("name"), Intent::SafeStateBound)
                .unwrap(),
            AtomicCommand::add_value(&field_address("o", "name"), Value::from("Ada"), Intent::SafeStateBound)
                .unwrap(),
        ],
    )
    .unwrap();
    committed(repo.execute(&txn.into()).unwrap());

    let model = repo.model(&id("m")).unwrap();
    let object = model.object(&id("o")).unwrap();
    assert_eq!(object.revision(), Some(1));
    let field = object.field(&id("name")).unwrap();
    assert_eq!(field.value(), Some(&Value::from("Ada")));
    assert_eq!(field.revision(), Some(1));
}
