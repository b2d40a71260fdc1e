//! Turning a validated overlay into events.

use crate::command::ChangeType;
use crate::entity::{Address, Id, Level};
use crate::event::{AtomicEvent, Event, EventHeader, FieldEvent, TransactionEvent};
use crate::overlay::{OverlayField, OverlayModel, OverlayObject};
use crate::store::{ReadableField, ReadableModel, ReadableObject};
use revtree_codec::Value;
use tracing::trace;

/// Collects the atomic events that take the overlay's base to its current
/// state.
///
/// Removals come first, bottom-up: the values, fields and objects that go
/// away with a removed container are reported as implied before the
/// container itself. Additions follow top-down, then value changes. Entities
/// that were touched but ended up equal to the base produce nothing.
pub fn collect(overlay: &OverlayModel<'_>, actor: &Id) -> Vec<AtomicEvent> {
    let mut emitter = Emitter {
        actor,
        old_model_rev: overlay.base_revision(),
        events: Vec::new(),
    };
    let model_address = overlay.address();

    if overlay.is_cleared() && overlay.base_exists() {
        if let Some(base) = overlay.base() {
            for id in base.object_ids() {
                if let Some(object) = base.object(id) {
                    emitter.remove_object(model_address, object, true);
                }
            }
        }
        emitter.repository(model_address, ChangeType::Remove);
    }
    let created = overlay.exists() && (overlay.is_cleared() || !overlay.base_exists());
    if created {
        emitter.repository(model_address, ChangeType::Add);
    }

    if let Some(base) = overlay.base() {
        for id in overlay.removed_objects() {
            if let Some(object) = base.object(id) {
                emitter.remove_object(model_address, object, false);
            }
        }
    }
    for object in overlay.added_objects() {
        emitter.add_object(model_address, object);
    }
    for object in overlay.changed_objects() {
        emitter.change_object(object);
    }

    trace!("{} events for {}", emitter.events.len(), model_address);
    emitter.events
}

/// Packs collected events into the event a commit reports.
///
/// A single event stands alone. Several events are wrapped in one
/// transaction event and all marked as part of it. `target` is the address
/// the command was sent to: the model for atomic commands, the model or
/// object for transactions.
pub fn pack(
    mut events: Vec<AtomicEvent>,
    overlay: &OverlayModel<'_>,
    target: &Address,
    actor: &Id,
) -> Option<Event> {
    match events.len() {
        0 => None,
        1 => events.pop().map(Event::Atomic),
        _ => {
            for event in &mut events {
                event.header_mut().in_transaction = true;
            }
            let old_object_rev = match target.level() {
                Level::Object => overlay
                    .base()
                    .and_then(|b| b.object(target.id()))
                    .and_then(|o| o.revision()),
                _ => None,
            };
            Some(Event::Transaction(TransactionEvent {
                actor: actor.clone(),
                target: target.clone(),
                old_model_rev: overlay.base_revision(),
                old_object_rev,
                events,
            }))
        }
    }
}

struct Emitter<'e> {
    actor: &'e Id,
    old_model_rev: Option<i64>,
    events: Vec<AtomicEvent>,
}

impl Emitter<'_> {
    fn header(
        &self,
        target: &Address,
        changed: Address,
        change_type: ChangeType,
        old_object_rev: Option<i64>,
        old_field_rev: Option<i64>,
        implied: bool,
    ) -> EventHeader {
        EventHeader {
            actor: self.actor.clone(),
            target: target.clone(),
            changed_entity: changed,
            change_type,
            old_model_rev: self.old_model_rev,
            old_object_rev,
            old_field_rev,
            implied,
            in_transaction: false,
        }
    }

    fn repository(&mut self, model: &Address, change_type: ChangeType) {
        let repository = model.parent().unwrap_or_else(|| model.clone());
        let header = self.header(&repository, model.clone(), change_type, None, None, false);
        self.events.push(AtomicEvent::Repository(header));
    }

    fn value(
        &mut self,
        field: &Address,
        old_object_rev: Option<i64>,
        old_field_rev: Option<i64>,
        old_value: Option<Value>,
        new_value: Option<Value>,
        implied: bool,
    ) {
        let change_type = match (&old_value, &new_value) {
            (None, _) => ChangeType::Add,
            (_, None) => ChangeType::Remove,
            _ => ChangeType::Change,
        };
        let header = self.header(
            field,
            field.clone(),
            change_type,
            old_object_rev,
            old_field_rev,
            implied,
        );
        self.events.push(AtomicEvent::Field(FieldEvent {
            header,
            old_value,
            new_value,
        }));
    }

    /// Reports a committed field going away, its value first.
    fn remove_field(&mut self, object: &dyn ReadableObject, field: &dyn ReadableField, implied: bool) {
        if let Some(value) = field.value() {
            self.value(
                field.address(),
                object.revision(),
                field.revision(),
                Some(value.clone()),
                None,
                true,
            );
        }
        let header = self.header(
            object.address(),
            field.address().clone(),
            ChangeType::Remove,
            object.revision(),
            field.revision(),
            implied,
        );
        self.events.push(AtomicEvent::Object(header));
    }

    /// Reports a committed object going away, its fields first.
    fn remove_object(&mut self, model: &Address, object: &dyn ReadableObject, implied: bool) {
        for id in object.field_ids() {
            if let Some(field) = object.field(id) {
                self.remove_field(object, field, true);
            }
        }
        let header = self.header(
            model,
            object.address().clone(),
            ChangeType::Remove,
            object.revision(),
            None,
            implied,
        );
        self.events.push(AtomicEvent::Model(header));
    }

    fn add_field(&mut self, object: &OverlayObject<'_>, field: &OverlayField<'_>) {
        let header = self.header(
            object.address(),
            field.address().clone(),
            ChangeType::Add,
            object.revision(),
            None,
            false,
        );
        self.events.push(AtomicEvent::Object(header));
        if let Some(value) = field.value() {
            self.value(
                field.address(),
                object.revision(),
                None,
                None,
                Some(value.clone()),
                false,
            );
        }
    }

    fn add_object(&mut self, model: &Address, object: &OverlayObject<'_>) {
        let header = self.header(
            model,
            object.address().clone(),
            ChangeType::Add,
            None,
            None,
            false,
        );
        self.events.push(AtomicEvent::Model(header));
        for field in object.added_fields() {
            self.add_field(object, field);
        }
    }

    fn change_object(&mut self, object: &OverlayObject<'_>) {
        if let Some(base) = object.base() {
            for id in object.removed_fields() {
                if let Some(field) = base.field(id) {
                    self.remove_field(base, field, false);
                }
            }
        }
        for field in object.added_fields() {
            self.add_field(object, field);
        }
        for field in object.changed_fields().filter(|f| f.is_changed()) {
            self.value(
                field.address(),
                object.revision(),
                field.revision(),
                field.base_value().cloned(),
                field.value().cloned(),
                false,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryModel;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    fn model_address() -> Address {
        Address::model(id("r"), id("m"))
    }

    fn base() -> MemoryModel {
        let mut model = MemoryModel::new(model_address(), 5).unwrap();
        let object = model.create_object(id("o1"), 3).unwrap();
        object
            .create_field(id("f1"), 3)
            .unwrap()
            .set_value(Some(Value::from("V1")));
        object.create_field(id("f2"), 2).unwrap();
        model
    }

    fn kinds(events: &[AtomicEvent]) -> Vec<(Level, ChangeType, String, bool)> {
        events
            .iter()
            .map(|e| {
                (
                    e.level(),
                    e.change_type(),
                    e.changed_entity().to_string(),
                    e.is_implied(),
                )
            })
            .collect()
    }

    #[test]
    fn object_removal_cascades_bottom_up() {
        let model = base();
        let mut overlay = OverlayModel::new(model_address(), Some(&model));
        overlay.remove_object(&id("o1"));

        let events = collect(&overlay, &id("a"));
        assert_eq!(
            kinds(&events),
            vec![
                (Level::Field, ChangeType::Remove, "/r/m/o1/f1".into(), true),
                (Level::Object, ChangeType::Remove, "/r/m/o1/f1".into(), true),
                (Level::Object, ChangeType::Remove, "/r/m/o1/f2".into(), true),
                (Level::Model, ChangeType::Remove, "/r/m/o1".into(), false),
            ]
        );
        let header = events[0].header();
        assert_eq!(header.old_model_rev, Some(5));
        assert_eq!(header.old_object_rev, Some(3));
        assert_eq!(header.old_field_rev, Some(3));
    }

    #[test]
    fn additions_are_top_down() {
        let model = base();
        let mut overlay = OverlayModel::new(model_address(), Some(&model));
        overlay.create_object(id("o2"));
        let object = overlay.object_mut(&id("o2")).unwrap();
        object.create_field(id("f"));
        object
            .field_mut(&id("f"))
            .unwrap()
            .set_value(Some(Value::from(1i64)));

        let events = collect(&overlay, &id("a"));
        assert_eq!(
            kinds(&events),
            vec![
                (Level::Model, ChangeType::Add, "/r/m/o2".into(), false),
                (Level::Object, ChangeType::Add, "/r/m/o2/f".into(), false),
                (Level::Field, ChangeType::Add, "/r/m/o2/f".into(), false),
            ]
        );
        assert!(events.iter().all(|e| e.header().old_object_rev.is_none()));
    }

    #[test]
    fn identity_changes_emit_nothing() {
        let model = base();
        let mut overlay = OverlayModel::new(model_address(), Some(&model));
        let field = overlay
            .object_mut(&id("o1"))
            .unwrap()
            .field_mut(&id("f1"))
            .unwrap();
        field.set_value(Some(Value::from("V2")));
        field.set_value(Some(Value::from("V1")));
        assert!(collect(&overlay, &id("a")).is_empty());
    }

    #[test]
    fn value_change_carries_old_and_new() {
        let model = base();
        let mut overlay = OverlayModel::new(model_address(), Some(&model));
        overlay
            .object_mut(&id("o1"))
            .unwrap()
            .field_mut(&id("f2"))
            .unwrap()
            .set_value(Some(Value::from(true)));

        let events = collect(&overlay, &id("a"));
        assert_eq!(events.len(), 1);
        match &events[0] {
            AtomicEvent::Field(e) => {
                assert_eq!(e.header.change_type, ChangeType::Add);
                assert_eq!(e.header.old_field_rev, Some(2));
                assert_eq!(e.old_value, None);
                assert_eq!(e.new_value, Some(Value::from(true)));
            }
            other => panic!("unexpected event {other}"),
        }
    }

    #[test]
    fn model_removal_reports_contents_as_implied() {
        let model = base();
        let mut overlay = OverlayModel::new(model_address(), Some(&model));
        overlay.remove_model();

        let events = collect(&overlay, &id("a"));
        let last = events.last().unwrap();
        assert_eq!(last.level(), Level::Repository);
        assert_eq!(last.change_type(), ChangeType::Remove);
        assert!(!last.is_implied());
        assert_eq!(last.header().target.to_string(), "/r");
        assert!(events[..events.len() - 1].iter().all(AtomicEvent::is_implied));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn packing() {
        let model = base();
        let mut overlay = OverlayModel::new(model_address(), Some(&model));
        assert!(pack(Vec::new(), &overlay, &model_address(), &id("a")).is_none());

        overlay.create_object(id("o2"));
        let single = pack(collect(&overlay, &id("a")), &overlay, &model_address(), &id("a")).unwrap();
        assert!(matches!(single, Event::Atomic(_)));
        assert!(!single.atomic_events()[0].in_transaction());

        overlay.create_object(id("o3"));
        let object = Address::object(id("r"), id("m"), id("o1"));
        let packed = pack(collect(&overlay, &id("a")), &overlay, &object, &id("a")).unwrap();
        match packed {
            Event::Transaction(t) => {
                assert_eq!(t.events.len(), 2);
                assert!(t.events.iter().all(AtomicEvent::in_transaction));
                assert_eq!(t.old_model_rev, Some(5));
                assert_eq!(t.old_object_rev, Some(3));
            }
            Event::Atomic(_) => panic!("expected a transaction event"),
        }
    }
}
