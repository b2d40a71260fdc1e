//! In-memory committed state.

use super::{ReadableField, ReadableModel, ReadableObject};
use crate::command::ChangeType;
use crate::entity::{Address, Id, Level};
use crate::error::{CoreError, CoreResult};
use crate::event::{AtomicEvent, Event};
use revtree_codec::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A committed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryField {
    address: Address,
    revision: i64,
    value: Option<Value>,
}

impl MemoryField {
    /// Replaces the value without touching the revision.
    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }
}

impl ReadableField for MemoryField {
    fn address(&self) -> &Address {
        &self.address
    }

    fn revision(&self) -> Option<i64> {
        Some(self.revision)
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// A committed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    address: Address,
    revision: i64,
    fields: BTreeMap<Id, MemoryField>,
}

impl MemoryObject {
    /// Adds an empty field at the given revision, replacing any existing one.
    pub fn create_field(&mut self, id: Id, revision: i64) -> CoreResult<&mut MemoryField> {
        let address = self.address.child(id.clone())?;
        let field = MemoryField {
            address,
            revision,
            value: None,
        };
        self.fields.insert(id.clone(), field);
        self.fields
            .get_mut(&id)
            .ok_or_else(|| CoreError::invalid_operation("field vanished after insert"))
    }

    /// Mutable access to a field.
    pub fn field_mut(&mut self, id: &Id) -> Option<&mut MemoryField> {
        self.fields.get_mut(id)
    }

    /// Overrides the object revision.
    pub fn set_revision(&mut self, revision: i64) {
        self.revision = revision;
    }

    /// Iterates over the fields in id order.
    pub fn fields(&self) -> impl Iterator<Item = &MemoryField> {
        self.fields.values()
    }
}

impl ReadableObject for MemoryObject {
    fn address(&self) -> &Address {
        &self.address
    }

    fn revision(&self) -> Option<i64> {
        Some(self.revision)
    }

    fn field(&self, id: &Id) -> Option<&dyn ReadableField> {
        self.fields.get(id).map(|f| f as &dyn ReadableField)
    }

    fn field_ids(&self) -> Box<dyn Iterator<Item = &Id> + '_> {
        Box::new(self.fields.keys())
    }
}

/// A committed model snapshot.
///
/// Besides serving as the read-only base of the engine, a snapshot can fold
/// committed events into itself with [`MemoryModel::apply_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryModel {
    address: Address,
    revision: Option<i64>,
    exists: bool,
    objects: BTreeMap<Id, MemoryObject>,
}

impl MemoryModel {
    /// An existing, empty model at the given revision.
    pub fn new(address: Address, revision: i64) -> CoreResult<Self> {
        Self::check_address(&address)?;
        Ok(Self {
            address,
            revision: Some(revision),
            exists: true,
            objects: BTreeMap::new(),
        })
    }

    /// A model that has never existed.
    pub fn absent(address: Address) -> CoreResult<Self> {
        Self::check_address(&address)?;
        Ok(Self {
            address,
            revision: None,
            exists: false,
            objects: BTreeMap::new(),
        })
    }

    fn check_address(address: &Address) -> CoreResult<()> {
        if address.level() == Level::Model {
            Ok(())
        } else {
            Err(CoreError::invalid_address(format!(
                "{address} is not a model address"
            )))
        }
    }

    /// Adds an empty object at the given revision, replacing any existing one.
    pub fn create_object(&mut self, id: Id, revision: i64) -> CoreResult<&mut MemoryObject> {
        let address = self.address.child(id.clone())?;
        let object = MemoryObject {
            address,
            revision,
            fields: BTreeMap::new(),
        };
        self.objects.insert(id.clone(), object);
        self.objects
            .get_mut(&id)
            .ok_or_else(|| CoreError::invalid_operation("object vanished after insert"))
    }

    /// Mutable access to an object.
    pub fn object_mut(&mut self, id: &Id) -> Option<&mut MemoryObject> {
        self.objects.get_mut(id)
    }

    /// Iterates over the objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &MemoryObject> {
        self.objects.values()
    }

    /// Folds a committed event into the snapshot.
    ///
    /// Every entity the event touches, and the model itself, ends up at
    /// `revision`. A removed model keeps `revision` as its tombstone.
    /// The event must have been generated against this exact state; an event
    /// that does not fit fails with `InvalidOperation` and may leave the
    /// snapshot partially updated.
    pub fn apply_event(&mut self, event: &Event, revision: i64) -> CoreResult<()> {
        for atomic in event.atomic_events() {
            self.apply_atomic(atomic, revision)?;
        }
        self.revision = Some(revision);
        Ok(())
    }

    fn apply_atomic(&mut self, event: &AtomicEvent, revision: i64) -> CoreResult<()> {
        let header = event.header();
        let changed = &header.changed_entity;
        match event {
            AtomicEvent::Repository(_) => {
                if changed != &self.address {
                    return Err(CoreError::invalid_operation(format!(
                        "event for {changed} applied to {}",
                        self.address
                    )));
                }
                match header.change_type {
                    ChangeType::Add => self.exists = true,
                    ChangeType::Remove => self.exists = false,
                    ChangeType::Change => {
                        return Err(CoreError::invalid_operation("models cannot change"))
                    }
                }
                self.objects.clear();
            }
            AtomicEvent::Model(_) => {
                self.check_target(changed, Level::Object)?;
                let id = changed.id().clone();
                match header.change_type {
                    ChangeType::Add => {
                        self.create_object(id, revision)?;
                    }
                    ChangeType::Remove => {
                        self.objects.remove(&id).ok_or_else(|| missing(changed))?;
                    }
                    ChangeType::Change => {
                        return Err(CoreError::invalid_operation("objects cannot change"))
                    }
                }
            }
            AtomicEvent::Object(_) => {
                self.check_target(changed, Level::Field)?;
                let object = self.object_for(changed)?;
                let id = changed.id().clone();
                match header.change_type {
                    ChangeType::Add => {
                        object.create_field(id, revision)?;
                    }
                    ChangeType::Remove => {
                        object.fields.remove(&id).ok_or_else(|| missing(changed))?;
                    }
                    ChangeType::Change => {
                        return Err(CoreError::invalid_operation("fields cannot change"))
                    }
                }
                object.revision = revision;
            }
            AtomicEvent::Field(e) => {
                self.check_target(changed, Level::Field)?;
                let object = self.object_for(changed)?;
                let field = object
                    .fields
                    .get_mut(changed.id())
                    .ok_or_else(|| missing(changed))?;
                field.value = e.new_value.clone();
                field.revision = revision;
                object.revision = revision;
            }
        }
        Ok(())
    }

    fn check_target(&self, changed: &Address, level: Level) -> CoreResult<()> {
        if !self.exists {
            return Err(CoreError::invalid_operation(format!(
                "model {} does not exist",
                self.address
            )));
        }
        if changed.level() != level || !self.address.contains(changed) {
            return Err(CoreError::invalid_operation(format!(
                "{changed} is not a {level} of {}",
                self.address
            )));
        }
        Ok(())
    }

    fn object_for(&mut self, changed: &Address) -> CoreResult<&mut MemoryObject> {
        let id = changed
            .object_id()
            .ok_or_else(|| CoreError::invalid_operation(format!("{changed} has no object")))?;
        self.objects.get_mut(id).ok_or_else(|| missing(changed))
    }

    /// SHA-256 over the canonical state, for convergence checks.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hash_str(&mut hasher, &self.address.to_string());
        hasher.update([u8::from(self.exists)]);
        hash_revision(&mut hasher, self.revision);
        hasher.update((self.objects.len() as u64).to_le_bytes());
        for object in self.objects.values() {
            hash_str(&mut hasher, object.address.id().as_str());
            hasher.update(object.revision.to_le_bytes());
            hasher.update((object.fields.len() as u64).to_le_bytes());
            for field in object.fields.values() {
                hash_str(&mut hasher, field.address.id().as_str());
                hasher.update(field.revision.to_le_bytes());
                match &field.value {
                    Some(value) => {
                        hasher.update([1]);
                        hash_value(&mut hasher, value);
                    }
                    None => hasher.update([0]),
                }
            }
        }
        hasher.finalize().into()
    }

    /// [`digest`](Self::digest) as lowercase hex.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        self.digest().iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn missing(address: &Address) -> CoreError {
    CoreError::invalid_operation(format!("{address} does not exist"))
}

fn hash_revision(hasher: &mut Sha256, revision: Option<i64>) {
    match revision {
        Some(r) => {
            hasher.update([1]);
            hasher.update(r.to_le_bytes());
        }
        None => hasher.update([0]),
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Bool(b) => hasher.update([0x01, u8::from(*b)]),
        Value::Integer(n) => {
            hasher.update([0x02]);
            hasher.update(n.to_le_bytes());
        }
        Value::Text(s) => {
            hasher.update([0x03]);
            hash_str(hasher, s);
        }
        Value::Bytes(b) => {
            hasher.update([0x04]);
            hasher.update((b.len() as u64).to_le_bytes());
            hasher.update(b);
        }
        Value::List(items) => {
            hasher.update([0x05]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                hash_value(hasher, item);
            }
        }
    }
}

impl ReadableModel for MemoryModel {
    fn address(&self) -> &Address {
        &self.address
    }

    fn revision(&self) -> Option<i64> {
        self.revision
    }

    fn exists(&self) -> bool {
        self.exists
    }

    fn object(&self, id: &Id) -> Option<&dyn ReadableObject> {
        self.objects.get(id).map(|o| o as &dyn ReadableObject)
    }

    fn object_ids(&self) -> Box<dyn Iterator<Item = &Id> + '_> {
        Box::new(self.objects.keys())
    }
}
