use crate::entity::Address;
use crate::store::ReadableField;
use revtree_codec::Value;

/// A pending change to one field's value.
///
/// Only a value that differs from the base is recorded; setting the base
/// value again turns the overlay back into an identity.
pub struct OverlayField<'a> {
    address: Address,
    base: Option<&'a dyn ReadableField>,
    value: Option<Option<Value>>,
}

impl<'a> OverlayField<'a> {
    /// Wraps a committed field.
    pub(crate) fn wrap(base: &'a dyn ReadableField) -> Self {
        Self {
            address: base.address().clone(),
            base: Some(base),
            value: None,
        }
    }

    /// A field that does not exist in the base.
    pub(crate) fn new(address: Address) -> Self {
        Self {
            address,
            base: None,
            value: None,
        }
    }

    /// The committed field, if any.
    #[must_use]
    pub fn base(&self) -> Option<&'a dyn ReadableField> {
        self.base
    }

    /// Value of the committed field.
    #[must_use]
    pub fn base_value(&self) -> Option<&'a Value> {
        self.base.and_then(|b| b.value())
    }

    /// True if the field is not committed yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.base.is_none()
    }

    /// Sets or clears the value.
    pub fn set_value(&mut self, value: Option<Value>) {
        if value.as_ref() == self.base_value() {
            self.value = None;
        } else {
            self.value = Some(value);
        }
    }

    /// True if the value differs from the base.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.value.is_some()
    }

    /// Number of commands needed to reach this state from the base value.
    #[must_use]
    pub fn count_changes(&self) -> usize {
        usize::from(self.is_changed())
    }
}

impl ReadableField for OverlayField<'_> {
    fn address(&self) -> &Address {
        &self.address
    }

    fn revision(&self) -> Option<i64> {
        self.base.and_then(|b| b.revision())
    }

    fn value(&self) -> Option<&Value> {
        match &self.value {
            Some(value) => value.as_ref(),
            None => self.base_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Id;
    use crate::store::{MemoryModel, ReadableModel, ReadableObject};

    fn base() -> MemoryModel {
        let id = |s: &str| Id::new(s).unwrap();
        let mut model = MemoryModel::new(Address::model(id("r"), id("m")), 3).unwrap();
        model
            .create_object(id("o"), 3)
            .unwrap()
            .create_field(id("f"), 3)
            .unwrap()
            .set_value(Some(Value::from("V1")));
        model
    }

    #[test]
    fn setting_base_value_is_identity() {
        let model = base();
        let field = model
            .object(&Id::new("o").unwrap())
            .and_then(|o| o.field(&Id::new("f").unwrap()))
            .unwrap();
        let mut overlay = OverlayField::wrap(field);
        assert_eq!(overlay.count_changes(), 0);

        overlay.set_value(Some(Value::from("V2")));
        assert!(overlay.is_changed());
        assert_eq!(overlay.value(), Some(&Value::from("V2")));
        assert_eq!(overlay.revision(), Some(3));

        overlay.set_value(Some(Value::from("V1")));
        assert!(!overlay.is_changed());
        assert_eq!(overlay.count_changes(), 0);

        overlay.set_value(None);
        assert_eq!(overlay.value(), None);
        assert_eq!(overlay.count_changes(), 1);
    }

    #[test]
    fn new_field_has_no_revision() {
        let address = Address::field(
            Id::new("r").unwrap(),
            Id::new("m").unwrap(),
            Id::new("o").unwrap(),
            Id::new("g").unwrap(),
        );
        let mut overlay = OverlayField::new(address);
        assert!(overlay.is_new());
        assert_eq!(overlay.revision(), None);
        overlay.set_value(None);
        assert_eq!(overlay.count_changes(), 0);
        overlay.set_value(Some(Value::from(1i64)));
        assert_eq!(overlay.count_changes(), 1);
    }
}
