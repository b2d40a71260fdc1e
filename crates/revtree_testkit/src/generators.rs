//! Property-based test generators using proptest.
//!
//! Object and field ids are drawn from small pools so that generated
//! commands collide with generated state often enough to exercise conflicts.

use crate::fixtures::{field_address, id, model_address, object_address};
use proptest::prelude::*;
use revtree_codec::Value;
use revtree_core::{AtomicCommand, ChangeType, Command, Id, Intent, MemoryModel, Transaction};

/// Object ids the generators pick from.
pub const OBJECT_POOL: [&str; 3] = ["o1", "o2", "o3"];
/// Field ids the generators pick from.
pub const FIELD_POOL: [&str; 3] = ["f1", "f2", "f3"];

/// Strategy for arbitrary valid ids.
pub fn id_strategy() -> impl Strategy<Value = Id> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_.-]{0,15}")
        .expect("Invalid regex")
        .prop_map(|raw| id(&raw))
}

/// Strategy for field values, including nested lists.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        "[a-z0-9 ]{0,12}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(2, 8, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::List)
    })
}

/// Strategy for a small set of values, so equal values come up often.
pub fn small_value_strategy() -> impl Strategy<Value = Value> {
    (0i64..3).prop_map(Value::Integer)
}

/// Strategy for intents with absolute bounds up to `max_revision`.
pub fn intent_strategy(max_revision: i64) -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Forced),
        Just(Intent::SafeStateBound),
        (0..=max_revision).prop_map(|r| Intent::safe_rev(r).expect("non-negative revision")),
    ]
}

/// Strategy for a contacts model at `revision` filled from the id pools.
///
/// Entity revisions are drawn from `0..=revision`, objects never newer than
/// the model and fields never newer than their object.
pub fn model_strategy(revision: i64) -> impl Strategy<Value = MemoryModel> {
    let field = (0..=revision, prop::option::of(small_value_strategy()));
    let fields = prop::collection::btree_map(pooled_field(), field, 0..=3);
    let objects = prop::collection::btree_map(pooled_object(), (0..=revision, fields), 0..=3);
    objects.prop_map(move |objects| {
        let mut model = MemoryModel::new(model_address(), revision).expect("model address");
        for (object_id, (object_rev, fields)) in objects {
            let object = model
                .create_object(id(object_id), object_rev)
                .expect("new object");
            for (field_id, (field_rev, value)) in fields {
                object
                    .create_field(id(field_id), field_rev.min(object_rev))
                    .expect("new field")
                    .set_value(value);
            }
        }
        model
    })
}

fn pooled_object() -> impl Strategy<Value = &'static str> {
    prop::sample::select(OBJECT_POOL.to_vec())
}

fn pooled_field() -> impl Strategy<Value = &'static str> {
    prop::sample::select(FIELD_POOL.to_vec())
}

fn entity_change() -> impl Strategy<Value = ChangeType> {
    prop_oneof![Just(ChangeType::Add), Just(ChangeType::Remove)]
}

fn value_change() -> impl Strategy<Value = ChangeType> {
    prop_oneof![
        Just(ChangeType::Add),
        Just(ChangeType::Change),
        Just(ChangeType::Remove)
    ]
}

/// Strategy for an atomic command inside the contacts model.
pub fn atomic_command_strategy(max_revision: i64) -> impl Strategy<Value = AtomicCommand> {
    prop_oneof![
        (pooled_object(), entity_change(), intent_strategy(max_revision)).prop_map(
            |(object, change, intent)| {
                AtomicCommand::entity(model_address(), change, id(object), intent)
                    .expect("object command")
            }
        ),
        (pooled_object(), pooled_field(), entity_change(), intent_strategy(max_revision)).prop_map(
            |(object, field, change, intent)| {
                AtomicCommand::entity(object_address(object), change, id(field), intent)
                    .expect("field command")
            }
        ),
        (
            pooled_object(),
            pooled_field(),
            value_change(),
            small_value_strategy(),
            intent_strategy(max_revision)
        )
            .prop_map(|(object, field, change, value, intent)| {
                let value = (change != ChangeType::Remove).then_some(value);
                AtomicCommand::field(field_address(object, field), change, value, intent)
                    .expect("value command")
            }),
    ]
}

/// Strategy for an atomic command or a model-level transaction of up to
/// five commands.
pub fn command_strategy(max_revision: i64) -> impl Strategy<Value = Command> {
    prop_oneof![
        atomic_command_strategy(max_revision).prop_map(Command::Atomic),
        prop::collection::vec(atomic_command_strategy(max_revision), 1..=5).prop_map(|commands| {
            Transaction::new(model_address(), commands)
                .expect("commands lie inside the model")
                .into()
        }),
    ]
}
