//! Read-only access to committed state.
//!
//! The engine only ever reads through these traits. Overlays implement them
//! too, so a pending change set can be inspected the same way as the base it
//! sits on.

mod memory;

pub use memory::{MemoryField, MemoryModel, MemoryObject};

use crate::entity::{Address, Id};
use revtree_codec::Value;

/// A field: a named slot holding at most one value.
pub trait ReadableField {
    /// Address of the field.
    fn address(&self) -> &Address;

    /// Revision of the last change to the field; `None` for fields that are
    /// not committed yet.
    fn revision(&self) -> Option<i64>;

    /// Current value, if any.
    fn value(&self) -> Option<&Value>;
}

/// An object: a set of fields.
pub trait ReadableObject {
    /// Address of the object.
    fn address(&self) -> &Address;

    /// Revision of the last change inside the object; `None` for objects
    /// that are not committed yet.
    fn revision(&self) -> Option<i64>;

    /// The field with the given id.
    fn field(&self, id: &Id) -> Option<&dyn ReadableField>;

    /// Ids of all fields, in ascending order for committed state.
    fn field_ids(&self) -> Box<dyn Iterator<Item = &Id> + '_>;

    /// True if the object has a field with the given id.
    fn has_field(&self, id: &Id) -> bool {
        self.field(id).is_some()
    }

    /// True if the object has no fields.
    fn is_empty(&self) -> bool {
        self.field_ids().next().is_none()
    }
}

/// A model: a set of objects inside a repository.
///
/// A model that was removed keeps its revision so that a later re-add can be
/// bound to it; a model that never existed has no revision.
pub trait ReadableModel {
    /// Address of the model.
    fn address(&self) -> &Address;

    /// Current revision; `None` if the model never existed.
    fn revision(&self) -> Option<i64>;

    /// True if the model currently exists.
    fn exists(&self) -> bool;

    /// The object with the given id.
    fn object(&self, id: &Id) -> Option<&dyn ReadableObject>;

    /// Ids of all objects.
    fn object_ids(&self) -> Box<dyn Iterator<Item = &Id> + '_>;

    /// True if the model has an object with the given id.
    fn has_object(&self, id: &Id) -> bool {
        self.object(id).is_some()
    }

    /// True if the model has no objects.
    fn is_empty(&self) -> bool {
        self.object_ids().next().is_none()
    }
}
