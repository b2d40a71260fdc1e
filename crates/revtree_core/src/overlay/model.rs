use super::OverlayObject;
use crate::entity::{Address, Id};
use crate::store::{ReadableModel, ReadableObject};
use std::collections::{BTreeMap, BTreeSet};

/// Pending changes to one model, including its own existence.
///
/// Removing the model hides the whole base and discards everything pending
/// underneath it; re-adding it starts from an empty model.
pub struct OverlayModel<'a> {
    address: Address,
    base: Option<&'a dyn ReadableModel>,
    exists: bool,
    cleared: bool,
    removed: BTreeSet<Id>,
    added: BTreeMap<Id, OverlayObject<'a>>,
    changed: BTreeMap<Id, OverlayObject<'a>>,
}

impl<'a> OverlayModel<'a> {
    /// Opens an overlay on `base`; `None` stands for a model with no
    /// committed state at all.
    #[must_use]
    pub fn new(address: Address, base: Option<&'a dyn ReadableModel>) -> Self {
        let exists = base.is_some_and(|b| b.exists());
        Self {
            address,
            base,
            exists,
            cleared: false,
            removed: BTreeSet::new(),
            added: BTreeMap::new(),
            changed: BTreeMap::new(),
        }
    }

    /// The committed model, if any.
    #[must_use]
    pub fn base(&self) -> Option<&'a dyn ReadableModel> {
        self.base
    }

    /// Revision of the committed model; `None` if it never existed.
    #[must_use]
    pub fn base_revision(&self) -> Option<i64> {
        self.base.and_then(|b| b.revision())
    }

    /// True if the committed model exists.
    #[must_use]
    pub fn base_exists(&self) -> bool {
        self.base.is_some_and(|b| b.exists())
    }

    /// True if the committed contents are hidden because the model was
    /// removed here.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Brings the model into existence. Returns false if it already exists.
    pub fn create_model(&mut self) -> bool {
        if self.exists {
            return false;
        }
        self.exists = true;
        true
    }

    /// Removes the model and everything in it. Returns false if it does not
    /// exist.
    pub fn remove_model(&mut self) -> bool {
        if !self.exists {
            return false;
        }
        self.exists = false;
        self.cleared = true;
        self.removed.clear();
        self.added.clear();
        self.changed.clear();
        true
    }

    fn base_object(&self, id: &Id) -> Option<&'a dyn ReadableObject> {
        if self.cleared {
            return None;
        }
        self.base.and_then(|b| b.object(id))
    }

    fn base_visible(&self, id: &Id) -> bool {
        !self.removed.contains(id) && self.base_object(id).is_some()
    }

    /// Creates an empty object. Returns false if the model does not exist or
    /// already has the object.
    pub fn create_object(&mut self, id: Id) -> bool {
        if !self.exists || self.has_object(&id) {
            return false;
        }
        let address = match self.address.child(id.clone()) {
            Ok(address) => address,
            Err(_) => return false,
        };
        self.added.insert(id, OverlayObject::new(address));
        true
    }

    /// Removes an object with all its fields. Returns false if there is no
    /// such object.
    pub fn remove_object(&mut self, id: &Id) -> bool {
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

    /// Mutable access to an object, wrapping the base object on first use.
    pub fn object_mut(&mut self, id: &Id) -> Option<&mut OverlayObject<'a>> {
        if self.added.contains_key(id) {
            return self.added.get_mut(id);
        }
        if self.removed.contains(id) {
            return None;
        }
        if !self.changed.contains_key(id) {
            let base = self.base_object(id)?;
            self.changed.insert(id.clone(), OverlayObject::wrap(base));
        }
        self.changed.get_mut(id)
    }

    /// Base objects removed individually.
    ///
    /// Objects hidden by removing the whole model are not listed.
    pub fn removed_objects(&self) -> impl Iterator<Item = &Id> {
        self.removed.iter()
    }

    /// Objects created here.
    pub fn added_objects(&self) -> impl Iterator<Item = &OverlayObject<'a>> {
        self.added.values()
    }

    /// Base objects reached for mutation; some may be unchanged.
    pub fn changed_objects(&self) -> impl Iterator<Item = &OverlayObject<'a>> {
        self.changed.values()
    }

    /// Minimal number of commands needed to reach this state from the base,
    /// counting no further than `limit`.
    ///
    /// Removing an existing model counts once however much it held; removing
    /// and re-adding it counts twice plus whatever the new model holds.
    #[must_use]
    pub fn count_changes(&self, limit: usize) -> usize {
        let mut count = match (self.base_exists(), self.exists) {
            (true, false) => return 1.min(limit),
            (false, false) => return 0,
            (false, true) => 1,
            (true, true) if self.cleared => 2,
            (true, true) => 0,
        };
        count += self.removed.len();
        for object in self.added.values() {
            if count >= limit {
                return limit;
            }
            count += 1 + object.count_changes(limit - count);
        }
        for object in self.changed.values() {
            if count >= limit {
                return limit;
            }
            count += object.count_changes(limit - count);
        }
        count.min(limit)
    }
}

impl ReadableModel for OverlayModel<'_> {
    fn address(&self) -> &Address {
        &self.address
    }

    fn revision(&self) -> Option<i64> {
        self.base_revision()
    }

    fn exists(&self) -> bool {
        self.exists
    }

    fn object(&self, id: &Id) -> Option<&dyn ReadableObject> {
        if let Some(object) = self.added.get(id) {
            return Some(object as &dyn ReadableObject);
        }
        if self.removed.contains(id) {
            return None;
        }
        if let Some(object) = self.changed.get(id) {
            return Some(object as &dyn ReadableObject);
        }
        self.base_object(id)
    }

    fn object_ids(&self) -> Box<dyn Iterator<Item = &Id> + '_> {
        let base: Option<&dyn ReadableModel> = if self.cleared { None } else { self.base };
        let visible = base
            .into_iter()
            .flat_map(|b| b.object_ids())
            .filter(move |id| !self.removed.contains(*id));
        Box::new(visible.chain(self.added.keys()))
    }
}
