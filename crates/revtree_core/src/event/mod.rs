//! Events: immutable records of committed changes.

mod atomic;

pub use atomic::{AtomicEvent, EventHeader, FieldEvent};

use crate::entity::{Address, Id};

/// Several atomic events committed together under one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    /// Who caused the changes.
    pub actor: Id,
    /// The model or object the transaction was applied to.
    pub target: Address,
    /// Model revision before the commit.
    pub old_model_rev: Option<i64>,
    /// Object revision before the commit, for object-level transactions.
    pub old_object_rev: Option<i64>,
    /// Member events in commit order; all have `in_transaction` set.
    pub events: Vec<AtomicEvent>,
}

/// What a successful commit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Exactly one change.
    Atomic(AtomicEvent),
    /// Several changes packed together.
    Transaction(TransactionEvent),
}

impl Event {
    /// The atomic events in commit order.
    #[must_use]
    pub fn atomic_events(&self) -> &[AtomicEvent] {
        match self {
            Event::Atomic(e) => std::slice::from_ref(e),
            Event::Transaction(t) => &t.events,
        }
    }

    /// Who caused the change.
    #[must_use]
    pub fn actor(&self) -> &Id {
        match self {
            Event::Atomic(e) => &e.header().actor,
            Event::Transaction(t) => &t.actor,
        }
    }

    /// Where the event is reported.
    #[must_use]
    pub fn target(&self) -> &Address {
        match self {
            Event::Atomic(e) => &e.header().target,
            Event::Transaction(t) => &t.target,
        }
    }

    /// Model revision before the commit.
    #[must_use]
    pub fn old_model_rev(&self) -> Option<i64> {
        match self {
            Event::Atomic(e) => e.header().old_model_rev,
            Event::Transaction(t) => t.old_model_rev,
        }
    }

    /// Number of atomic events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atomic_events().len()
    }

    /// Always false; an event records at least one change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atomic_events().is_empty()
    }
}
