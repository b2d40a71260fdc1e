//! Atomic events, one per entity level.

use crate::command::ChangeType;
use crate::entity::{Address, Id, Level};
use revtree_codec::Value;
use std::fmt;

/// Fields shared by every atomic event.
///
/// The `old_*_rev` fields hold the revisions the affected entities had
/// before the commit; `None` means the entity did not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHeader {
    /// Who caused the change.
    pub actor: Id,
    /// The container the event is reported on.
    pub target: Address,
    /// The entity that was added, removed or changed.
    pub changed_entity: Address,
    /// What happened.
    pub change_type: ChangeType,
    /// Model revision before the commit.
    pub old_model_rev: Option<i64>,
    /// Object revision before the commit (object and field events).
    pub old_object_rev: Option<i64>,
    /// Field revision before the commit (object and field events).
    pub old_field_rev: Option<i64>,
    /// True if the change is a structural consequence of removing a container.
    pub implied: bool,
    /// True if the event is part of a [`TransactionEvent`](super::TransactionEvent).
    pub in_transaction: bool,
}

/// A change to a field's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEvent {
    /// Common event data; target and changed entity are the field.
    pub header: EventHeader,
    /// Value before the change.
    pub old_value: Option<Value>,
    /// Value after the change.
    pub new_value: Option<Value>,
}

/// One committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicEvent {
    /// A model was added to or removed from a repository.
    Repository(EventHeader),
    /// An object was added to or removed from a model.
    Model(EventHeader),
    /// A field was added to or removed from an object.
    Object(EventHeader),
    /// A field's value was added, changed or removed.
    Field(FieldEvent),
}

impl AtomicEvent {
    /// Common event data.
    #[must_use]
    pub fn header(&self) -> &EventHeader {
        match self {
            AtomicEvent::Repository(h) | AtomicEvent::Model(h) | AtomicEvent::Object(h) => h,
            AtomicEvent::Field(e) => &e.header,
        }
    }

    /// Mutable access to the common event data.
    pub fn header_mut(&mut self) -> &mut EventHeader {
        match self {
            AtomicEvent::Repository(h) | AtomicEvent::Model(h) | AtomicEvent::Object(h) => h,
            AtomicEvent::Field(e) => &mut e.header,
        }
    }

    /// Level of the event's target.
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            AtomicEvent::Repository(_) => Level::Repository,
            AtomicEvent::Model(_) => Level::Model,
            AtomicEvent::Object(_) => Level::Object,
            AtomicEvent::Field(_) => Level::Field,
        }
    }

    /// What happened.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.header().change_type
    }

    /// The entity that was added, removed or changed.
    #[must_use]
    pub fn changed_entity(&self) -> &Address {
        &self.header().changed_entity
    }

    /// True if the change was implied by removing a container.
    #[must_use]
    pub fn is_implied(&self) -> bool {
        self.header().implied
    }

    /// True if the event belongs to a transaction event.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.header().in_transaction
    }
}

impl fmt::Display for AtomicEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.header();
        write!(f, "{} {} {}", self.level(), h.change_type, h.changed_entity)?;
        if let AtomicEvent::Field(e) = self {
            match (&e.old_value, &e.new_value) {
                (Some(old), Some(new)) => write!(f, " {old} -> {new}")?,
                (None, Some(new)) => write!(f, " = {new}")?,
                (Some(old), None) => write!(f, " (was {old})")?,
                (None, None) => {}
            }
        }
        if h.implied {
            f.write_str(" [implied]")?;
        }
        Ok(())
    }
}
