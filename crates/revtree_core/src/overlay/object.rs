use super::OverlayField;
use crate::entity::{Address, Id};
use crate::store::{ReadableField, ReadableObject};
use std::collections::{BTreeMap, BTreeSet};

/// Pending changes to one object.
///
/// Base fields are wrapped lazily into `changed` the first time they are
/// reached for mutation; fields created here live in `added`. An id can sit
/// in both `removed` and `added` when a base field was removed and then
/// created again.
pub struct OverlayObject<'a> {
    address: Address,
    base: Option<&'a dyn ReadableObject>,
    removed: BTreeSet<Id>,
    added: BTreeMap<Id, OverlayField<'a>>,
    changed: BTreeMap<Id, OverlayField<'a>>,
}

impl<'a> OverlayObject<'a> {
    pub(crate) fn wrap(base: &'a dyn ReadableObject) -> Self {
        Self::with_base(base.address().clone(), Some(base))
    }

    pub(crate) fn new(address: Address) -> Self {
        Self::with_base(address, None)
    }

    fn with_base(address: Address, base: Option<&'a dyn ReadableObject>) -> Self {
        Self {
            address,
            base,
            removed: BTreeSet::new(),
            added: BTreeMap::new(),
            changed: BTreeMap::new(),
        }
    }

    /// The committed object, if any.
    #[must_use]
    pub fn base(&self) -> Option<&'a dyn ReadableObject> {
        self.base
    }

    /// True if the object is not committed yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.base.is_none()
    }

    fn base_field(&self, id: &Id) -> Option<&'a dyn ReadableField> {
        self.base.and_then(|b| b.field(id))
    }

    fn base_visible(&self, id: &Id) -> bool {
        !self.removed.contains(id) && self.base_field(id).is_some()
    }

    /// Creates an empty field. Returns false if the field already exists.
    pub fn create_field(&mut self, id: Id) -> bool {
        if self.has_field(&id) {
            return false;
        }
        let address = match self.address.child(id.clone()) {
            Ok(address) => address,
            Err(_) => return false,
        };
        self.added.insert(id, OverlayField::new(address));
        true
    }

    /// Removes a field. Returns false if the field does not exist.
    pub fn remove_field(&mut self, id: &Id) -> bool {
        if self.added.remove(id).is_some() {
            return true;
        }
        if self.base_visible(id) {
            self.changed.remove(id);
            self.removed.insert(id.clone());
            return true;
        }
        false
    }

    /// Mutable access to a field, wrapping the base field on first use.
    pub fn field_mut(&mut self, id: &Id) -> Option<&mut OverlayField<'a>> {
        if self.added.contains_key(id) {
            return self.added.get_mut(id);
        }
        if self.removed.contains(id) {
            return None;
        }
        if !self.changed.contains_key(id) {
            let base = self.base_field(id)?;
            self.changed.insert(id.clone(), OverlayField::wrap(base));
        }
        self.changed.get_mut(id)
    }

    /// Base fields removed here.
    pub fn removed_fields(&self) -> impl Iterator<Item = &Id> {
        self.removed.iter()
    }

    /// Fields created here.
    pub fn added_fields(&self) -> impl Iterator<Item = &OverlayField<'a>> {
        self.added.values()
    }

    /// Base fields reached for mutation; some may be unchanged.
    pub fn changed_fields(&self) -> impl Iterator<Item = &OverlayField<'a>> {
        self.changed.values()
    }

    /// Minimal number of commands needed to reach this state from the base,
    /// counting no further than `limit`.
    #[must_use]
    pub fn count_changes(&self, limit: usize) -> usize {
        let mut count = self.removed.len();
        for field in self.added.values() {
            if count >= limit {
                return limit;
            }
            count += 1 + field.count_changes();
        }
        for field in self.changed.values() {
            if count >= limit {
                return limit;
            }
            count += field.count_changes();
        }
        count.min(limit)
    }
}

impl ReadableObject for OverlayObject<'_> {
    fn address(&self) -> &Address {
        &self.address
    }

    fn revision(&self) -> Option<i64> {
        self.base.and_then(|b| b.revision())
    }

    fn field(&self, id: &Id) -> Option<&dyn ReadableField> {
        if let Some(field) = self.added.get(id) {
            return Some(field as &dyn ReadableField);
        }
        if self.removed.contains(id) {
            return None;
        }
        if let Some(field) = self.changed.get(id) {
            return Some(field as &dyn ReadableField);
        }
        self.base_field(id)
    }

    fn field_ids(&self) -> Box<dyn Iterator<Item = &Id> + '_> {
        let base: Option<&dyn ReadableObject> = self.base;
        let visible = base
            .into_iter()
            .flat_map(|b| b.field_ids())
            .filter(move |id| !self.removed.contains(*id));
        Box::new(visible.chain(self.added.keys()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryModel, ReadableModel};
    use revtree_codec::Value;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    fn base() -> MemoryModel {
        let mut model = MemoryModel::new(Address::model(id("r"), id("m")), 5).unwrap();
        let object = model.create_object(id("o"), 5).unwrap();
        object
            .create_field(id("f"), 4)
            .unwrap()
            .set_value(Some(Value::from("V1")));
        object.create_field(id("g"), 5).unwrap();
        model
    }

    #[test]
    fn lazily_wraps_and_counts() {
        let model = base();
        let mut overlay = OverlayObject::wrap(model.object(&id("o")).unwrap());
        assert_eq!(overlay.count_changes(usize::MAX), 0);

        let f = overlay.field_mut(&id("f")).unwrap();
        assert_eq!(f.revision(), Some(4));
        assert_eq!(overlay.count_changes(usize::MAX), 0);

        overlay
            .field_mut(&id("f"))
            .unwrap()
            .set_value(Some(Value::from("V2")));
        assert_eq!(overlay.count_changes(usize::MAX), 1);
        assert_eq!(
            overlay.field(&id("f")).unwrap().value(),
            Some(&Value::from("V2"))
        );
    }

    #[test]
    fn create_and_remove() {
        let model = base();
        let mut overlay = OverlayObject::wrap(model.object(&id("o")).unwrap());

        assert!(!overlay.create_field(id("f")));
        assert!(overlay.create_field(id("h")));
        assert!(overlay.has_field(&id("h")));
        assert_eq!(overlay.count_changes(usize::MAX), 1);

        overlay
            .field_mut(&id("h"))
            .unwrap()
            .set_value(Some(Value::from(true)));
        assert_eq!(overlay.count_changes(usize::MAX), 2);

        assert!(overlay.remove_field(&id("h")));
        assert!(!overlay.has_field(&id("h")));
        assert_eq!(overlay.count_changes(usize::MAX), 0);

        assert!(overlay.remove_field(&id("g")));
        assert!(!overlay.remove_field(&id("g")));
        assert!(overlay.field_mut(&id("g")).is_none());
        assert_eq!(overlay.count_changes(usize::MAX), 1);

        let ids: Vec<_> = overlay.field_ids().cloned().collect();
        assert_eq!(ids, vec![id("f")]);
    }

    #[test]
    fn remove_then_recreate_counts_both() {
        let model = base();
        let mut overlay = OverlayObject::wrap(model.object(&id("o")).unwrap());
        assert!(overlay.remove_field(&id("f")));
        assert!(overlay.create_field(id("f")));

        let recreated = overlay.field(&id("f")).unwrap();
        assert_eq!(recreated.value(), None);
        assert_eq!(recreated.revision(), None);
        assert_eq!(overlay.count_changes(usize::MAX), 2);
        assert_eq!(overlay.count_changes(1), 1);
    }

    #[test]
    fn base_is_untouched() {
        let model = base();
        let before = model.digest();
        {
            let mut overlay = OverlayObject::wrap(model.object(&id("o")).unwrap());
            overlay.remove_field(&id("g"));
            overlay
                .field_mut(&id("f"))
                .unwrap()
                .set_value(None);
        }
        assert_eq!(model.digest(), before);
    }
}
