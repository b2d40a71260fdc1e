//! Event ↔ record mapping.
//!
//! The event variant follows the level of the target address. `id` names
//! the changed child and is omitted for value events, whose changed entity
//! is the target itself. Old and new values travel as `value` children.

use crate::attrs::{self, read_address, read_id, write_address, write_revision};
use crate::error::{ProtocolError, ProtocolResult};
use crate::{VALUE, XEVENT, XTRANSACTION_EVENT};
use revtree_codec::{CodecError, Record, Value};
use revtree_core::{
    AtomicEvent, ChangeType, Event, EventHeader, FieldEvent, Id, Level, TransactionEvent,
};

const OLD: &str = "old";
const NEW: &str = "new";

/// Maps an event to its record form.
pub fn event_to_record(event: &Event) -> Record {
    match event {
        Event::Atomic(event) => atomic_to_record(event),
        Event::Transaction(txn) => {
            let mut record = Record::new(XTRANSACTION_EVENT).with_attr(attrs::ACTOR, &txn.actor);
            write_address(&mut record, &txn.target);
            write_revision(&mut record, attrs::MODEL_REVISION, txn.old_model_rev);
            write_revision(&mut record, attrs::OBJECT_REVISION, txn.old_object_rev);
            for event in &txn.events {
                record.push_child(atomic_to_record(event));
            }
            record
        }
    }
}

/// Parses an event record; the element name selects atomic or transaction.
pub fn event_from_record(record: &Record) -> ProtocolResult<Event> {
    match record.name.as_str() {
        XEVENT => atomic_from_record(record).map(Event::Atomic),
        XTRANSACTION_EVENT => {
            let events = record
                .children
                .iter()
                .map(|child| {
                    child.expect_name(XEVENT)?;
                    atomic_from_record(child)
                })
                .collect::<ProtocolResult<Vec<_>>>()?;
            Ok(Event::Transaction(TransactionEvent {
                actor: read_actor(record)?,
                target: read_address(record)?,
                old_model_rev: record.parse_attr(attrs::MODEL_REVISION)?,
                old_object_rev: record.parse_attr(attrs::OBJECT_REVISION)?,
                events,
            }))
        }
        other => Err(CodecError::unexpected_element(XEVENT, other).into()),
    }
}

fn atomic_to_record(event: &AtomicEvent) -> Record {
    let header = event.header();
    let mut record = Record::new(XEVENT)
        .with_attr(attrs::TYPE, header.change_type)
        .with_attr(attrs::ACTOR, &header.actor);
    write_address(&mut record, &header.target);
    if header.changed_entity != header.target {
        record.set_attr(attrs::ID, header.changed_entity.id());
    }
    write_revision(&mut record, attrs::MODEL_REVISION, header.old_model_rev);
    write_revision(&mut record, attrs::OBJECT_REVISION, header.old_object_rev);
    write_revision(&mut record, attrs::FIELD_REVISION, header.old_field_rev);
    record.set_flag(attrs::IMPLIED, header.implied);
    record.set_flag(attrs::IN_TRANSACTION, header.in_transaction);

    if let AtomicEvent::Field(e) = event {
        for (kind, value) in [(OLD, &e.old_value), (NEW, &e.new_value)] {
            if let Some(value) = value {
                record.push_child(
                    Record::new(VALUE)
                        .with_attr(attrs::KIND, kind)
                        .with_value(value.clone()),
                );
            }
        }
    }
    record
}

fn atomic_from_record(record: &Record) -> ProtocolResult<AtomicEvent> {
    let target = read_address(record)?;
    let level = target.level();
    let changed_entity = match (level, read_id(record, attrs::ID)?) {
        (Level::Field, None) => target.clone(),
        (Level::Field, Some(_)) => {
            return Err(ProtocolError::parse(
                &record.name,
                "value events carry no child id",
            ))
        }
        (_, Some(child)) => target
            .child(child)
            .map_err(|e| ProtocolError::parse(&record.name, e))?,
        (_, None) => {
            return Err(ProtocolError::parse(
                &record.name,
                format!("missing attribute '{}'", attrs::ID),
            ))
        }
    };
    let header = EventHeader {
        actor: read_actor(record)?,
        target,
        changed_entity,
        change_type: record.require_parsed::<ChangeType>(attrs::TYPE)?,
        old_model_rev: record.parse_attr(attrs::MODEL_REVISION)?,
        old_object_rev: record.parse_attr(attrs::OBJECT_REVISION)?,
        old_field_rev: record.parse_attr(attrs::FIELD_REVISION)?,
        implied: record.flag(attrs::IMPLIED)?,
        in_transaction: record.flag(attrs::IN_TRANSACTION)?,
    };

    Ok(match level {
        Level::Repository => AtomicEvent::Repository(header),
        Level::Model => AtomicEvent::Model(header),
        Level::Object => AtomicEvent::Object(header),
        Level::Field => AtomicEvent::Field(FieldEvent {
            header,
            old_value: read_value(record, OLD)?,
            new_value: read_value(record, NEW)?,
        }),
    })
}

fn read_actor(record: &Record) -> ProtocolResult<Id> {
    read_id(record, attrs::ACTOR)?.ok_or_else(|| {
        ProtocolError::parse(&record.name, format!("missing attribute '{}'", attrs::ACTOR))
    })
}

fn read_value(record: &Record, kind: &str) -> ProtocolResult<Option<Value>> {
    let mut found = record
        .children_named(VALUE)
        .filter(|child| child.attr(attrs::KIND) == Some(kind));
    let Some(child) = found.next() else {
        return Ok(None);
    };
    if found.next().is_some() {
        return Err(ProtocolError::parse(
            &record.name,
            format!("duplicate {kind} value"),
        ));
    }
    child
        .value
        .clone()
        .map(Some)
        .ok_or_else(|| ProtocolError::parse(VALUE, "empty value element"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_core::Address;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    fn header(target: Address, changed_entity: Address, change_type: ChangeType) -> EventHeader {
        EventHeader {
            actor: id("alice"),
            target,
            changed_entity,
            change_type,
            old_model_rev: Some(7),
            old_object_rev: None,
            old_field_rev: None,
            implied: false,
            in_transaction: false,
        }
    }

    #[test]
    fn model_event_names_child() {
        let model = Address::model(id("r"), id("m"));
        let object = Address::object(id("r"), id("m"), id("o1"));
        let event = Event::Atomic(AtomicEvent::Model(header(model, object, ChangeType::Add)));
        let record = event_to_record(&event);
        assert_eq!(record.name, "xevent");
        assert_eq!(record.attr("id"), Some("o1"));
        assert_eq!(record.attr("modelRevision"), Some("7"));
        assert_eq!(record.attr("objectRevision"), None);
        assert_eq!(record.attr("implied"), None);
        assert_eq!(event_from_record(&record).unwrap(), event);
    }

    #[test]
    fn field_event_values() {
        let field = Address::field(id("r"), id("m"), id("o"), id("f"));
        let mut h = header(field.clone(), field, ChangeType::Change);
        h.old_object_rev = Some(3);
        h.old_field_rev = Some(3);
        let event = Event::Atomic(AtomicEvent::Field(FieldEvent {
            header: h,
            old_value: Some(Value::from("V1")),
            new_value: Some(Value::from("V2")),
        }));
        let record = event_to_record(&event);
        assert_eq!(record.attr("id"), None);
        assert_eq!(record.children_named("value").count(), 2);
        assert_eq!(event_from_record(&record).unwrap(), event);
    }

    #[test]
    fn transaction_event_nests_members() {
        let model = Address::model(id("r"), id("m"));
        let object = Address::object(id("r"), id("m"), id("o"));
        let field = Address::field(id("r"), id("m"), id("o"), id("f"));
        let mut first = header(object.clone(), field.clone(), ChangeType::Remove);
        first.implied = true;
        first.in_transaction = true;
        let mut second = header(model.clone(), object, ChangeType::Remove);
        second.in_transaction = true;
        let event = Event::Transaction(TransactionEvent {
            actor: id("alice"),
            target: model,
            old_model_rev: Some(7),
            old_object_rev: None,
            events: vec![AtomicEvent::Object(first), AtomicEvent::Model(second)],
        });
        let record = event_to_record(&event);
        assert_eq!(record.name, "xtransactionEvent");
        assert_eq!(record.children[0].attr("implied"), Some("true"));
        assert_eq!(record.children[1].attr("inTransaction"), Some("true"));
        assert_eq!(event_from_record(&record).unwrap(), event);
    }

    #[test]
    fn missing_actor_fails() {
        let record = Record::new("xevent")
            .with_attr("type", "ADD")
            .with_attr("repositoryId", "r")
            .with_attr("id", "m");
        assert_eq!(
            event_from_record(&record).unwrap_err(),
            ProtocolError::parse("xevent", "missing attribute 'actor'")
        );
    }

    #[test]
    fn value_event_with_child_id_fails() {
        let record = Record::new("xevent")
            .with_attr("type", "ADD")
            .with_attr("actor", "a")
            .with_attr("repositoryId", "r")
            .with_attr("modelId", "m")
            .with_attr("objectId", "o")
            .with_attr("fieldId", "f")
            .with_attr("id", "x");
        assert!(event_from_record(&record).is_err());
    }

    #[test]
    fn empty_value_element_fails() {
        let mut record = Record::new("xevent")
            .with_attr("type", "ADD")
            .with_attr("actor", "a")
            .with_attr("repositoryId", "r")
            .with_attr("modelId", "m")
            .with_attr("objectId", "o")
            .with_attr("fieldId", "f");
        record.push_child(Record::new("value").with_attr("kind", "new"));
        assert_eq!(
            event_from_record(&record).unwrap_err(),
            ProtocolError::parse("value", "empty value element")
        );
    }
}
