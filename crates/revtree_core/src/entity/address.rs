//! Hierarchical entity addresses.

use super::Id;
use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Nesting level of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// A repository holds models.
    Repository,
    /// A model holds objects.
    Model,
    /// An object holds fields.
    Object,
    /// A field holds at most one value.
    Field,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Repository => "repository",
            Level::Model => "model",
            Level::Object => "object",
            Level::Field => "field",
        })
    }
}

/// Address of a repository, model, object or field.
///
/// An address is an ordered tuple `(repository, model?, object?, field?)`
/// whose set components always form a prefix: a field address has all four
/// components, an object address has the first three, and so on. The
/// rightmost component determines the [`Level`].
///
/// The textual form is `/repo/model/object/field` with unset trailing
/// components omitted.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    repository: Id,
    model: Option<Id>,
    object: Option<Id>,
    field: Option<Id>,
}

impl Address {
    /// Builds an address from optional components.
    ///
    /// Fails with [`CoreError::InvalidAddress`] unless the set components
    /// form a prefix of the tuple.
    pub fn new(
        repository: Option<Id>,
        model: Option<Id>,
        object: Option<Id>,
        field: Option<Id>,
    ) -> CoreResult<Self> {
        if field.is_some() && object.is_none() {
            return Err(CoreError::invalid_address("field address without object id"));
        }
        if object.is_some() && model.is_none() {
            return Err(CoreError::invalid_address("object address without model id"));
        }
        let repository = repository
            .ok_or_else(|| CoreError::invalid_address("address without repository id"))?;
        Ok(Self {
            repository,
            model,
            object,
            field,
        })
    }

    /// Address of a repository.
    #[must_use]
    pub fn repository(repository: Id) -> Self {
        Self {
            repository,
            model: None,
            object: None,
            field: None,
        }
    }

    /// Address of a model.
    #[must_use]
    pub fn model(repository: Id, model: Id) -> Self {
        Self {
            repository,
            model: Some(model),
            object: None,
            field: None,
        }
    }

    /// Address of an object.
    #[must_use]
    pub fn object(repository: Id, model: Id, object: Id) -> Self {
        Self {
            repository,
            model: Some(model),
            object: Some(object),
            field: None,
        }
    }

    /// Address of a field.
    #[must_use]
    pub fn field(repository: Id, model: Id, object: Id, field: Id) -> Self {
        Self {
            repository,
            model: Some(model),
            object: Some(object),
            field: Some(field),
        }
    }

    /// The repository component.
    #[must_use]
    pub fn repository_id(&self) -> &Id {
        &self.repository
    }

    /// The model component, if set.
    #[must_use]
    pub fn model_id(&self) -> Option<&Id> {
        self.model.as_ref()
    }

    /// The object component, if set.
    #[must_use]
    pub fn object_id(&self) -> Option<&Id> {
        self.object.as_ref()
    }

    /// The field component, if set.
    #[must_use]
    pub fn field_id(&self) -> Option<&Id> {
        self.field.as_ref()
    }

    /// Level of the entity this address names.
    #[must_use]
    pub fn level(&self) -> Level {
        match (&self.model, &self.object, &self.field) {
            (None, _, _) => Level::Repository,
            (Some(_), None, _) => Level::Model,
            (Some(_), Some(_), None) => Level::Object,
            (Some(_), Some(_), Some(_)) => Level::Field,
        }
    }

    /// The rightmost set component.
    #[must_use]
    pub fn id(&self) -> &Id {
        self.field
            .as_ref()
            .or(self.object.as_ref())
            .or(self.model.as_ref())
            .unwrap_or(&self.repository)
    }

    /// Strips the rightmost component; repositories have no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Address> {
        let mut parent = self.clone();
        if parent.field.take().is_some()
            || parent.object.take().is_some()
            || parent.model.take().is_some()
        {
            Some(parent)
        } else {
            None
        }
    }

    /// Address of the child with the given id.
    ///
    /// Fields have no children; asking for one is an address error.
    pub fn child(&self, id: Id) -> CoreResult<Address> {
        let mut child = self.clone();
        match self.level() {
            Level::Repository => child.model = Some(id),
            Level::Model => child.object = Some(id),
            Level::Object => child.field = Some(id),
            Level::Field => {
                return Err(CoreError::invalid_address(format!(
                    "field {self} cannot have children"
                )))
            }
        }
        Ok(child)
    }

    /// True if `other` lies strictly below this address.
    #[must_use]
    pub fn contains(&self, other: &Address) -> bool {
        self.level() < other.level() && self.equals_or_contains(other)
    }

    /// True if `other` is this address or lies below it.
    #[must_use]
    pub fn equals_or_contains(&self, other: &Address) -> bool {
        fn extends(prefix: &Option<Id>, value: &Option<Id>) -> bool {
            prefix.is_none() || prefix == value
        }
        self.repository == other.repository
            && extends(&self.model, &other.model)
            && extends(&self.object, &other.object)
            && extends(&self.field, &other.field)
    }

    /// The enclosing model address, if this address is at or below a model.
    #[must_use]
    pub fn model_address(&self) -> Option<Address> {
        self.model
            .as_ref()
            .map(|m| Address::model(self.repository.clone(), m.clone()))
    }

    /// The enclosing object address, if this address is at or below an object.
    #[must_use]
    pub fn object_address(&self) -> Option<Address> {
        match (&self.model, &self.object) {
            (Some(m), Some(o)) => Some(Address::object(
                self.repository.clone(),
                m.clone(),
                o.clone(),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.repository)?;
        for part in [&self.model, &self.object, &self.field].into_iter().flatten() {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| CoreError::invalid_address(format!("{s:?} does not start with '/'")))?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() > 4 {
            return Err(CoreError::invalid_address(format!(
                "{s:?} has more than four components"
            )));
        }
        let mut ids = parts
            .into_iter()
            .map(|p| Id::new(p).map_err(|e| CoreError::invalid_address(format!("{s:?}: {e}"))));
        let mut next = || ids.next().transpose();
        let repository = next()?;
        let model = next()?;
        let object = next()?;
        let field = next()?;
        Address::new(repository, model, object, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn levels() {
        assert_eq!(Address::repository(id("r")).level(), Level::Repository);
        assert_eq!(Address::model(id("r"), id("m")).level(), Level::Model);
        assert_eq!(
            Address::object(id("r"), id("m"), id("o")).level(),
            Level::Object
        );
        assert_eq!(
            Address::field(id("r"), id("m"), id("o"), id("f")).level(),
            Level::Field
        );
    }

    #[test]
    fn new_rejects_gaps() {
        assert!(Address::new(Some(id("r")), None, Some(id("o")), None).is_err());
        assert!(Address::new(Some(id("r")), Some(id("m")), None, Some(id("f"))).is_err());
        assert!(Address::new(None, Some(id("m")), None, None).is_err());
        assert!(Address::new(None, None, None, None).is_err());
        assert!(Address::new(Some(id("r")), Some(id("m")), Some(id("o")), None).is_ok());
    }

    #[test]
    fn parent_strips_rightmost() {
        let field = Address::field(id("r"), id("m"), id("o"), id("f"));
        let object = field.parent().unwrap();
        assert_eq!(object, Address::object(id("r"), id("m"), id("o")));
        let model = object.parent().unwrap();
        let repo = model.parent().unwrap();
        assert_eq!(repo, Address::repository(id("r")));
        assert!(repo.parent().is_none());
    }

    #[test]
    fn child_resolution() {
        let model = Address::model(id("r"), id("m"));
        let object = model.child(id("o")).unwrap();
        assert_eq!(object.to_string(), "/r/m/o");
        let field = object.child(id("f")).unwrap();
        assert_eq!(field.id(), &id("f"));
        assert!(matches!(
            field.child(id("x")),
            Err(CoreError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn containment() {
        let model = Address::model(id("r"), id("m"));
        let object = Address::object(id("r"), id("m"), id("o"));
        let other = Address::object(id("r"), id("n"), id("o"));

        assert!(model.contains(&object));
        assert!(!object.contains(&model));
        assert!(!model.contains(&model));
        assert!(model.equals_or_contains(&model));
        assert!(!model.contains(&other));
        assert!(Address::repository(id("r")).contains(&other));
        assert!(!Address::repository(id("q")).contains(&other));
    }

    #[test]
    fn text_roundtrip() {
        for text in ["/r", "/r/m", "/r/m/o", "/r/m/o/f"] {
            let address: Address = text.parse().unwrap();
            assert_eq!(address.to_string(), text);
        }
        assert!("r/m".parse::<Address>().is_err());
        assert!("/r//o".parse::<Address>().is_err());
        assert!("/r/m/o/f/x".parse::<Address>().is_err());
        assert!("/".parse::<Address>().is_err());
    }

    #[test]
    fn enclosing_addresses() {
        let field = Address::field(id("r"), id("m"), id("o"), id("f"));
        assert_eq!(
            field.model_address(),
            Some(Address::model(id("r"), id("m")))
        );
        assert_eq!(
            field.object_address(),
            Some(Address::object(id("r"), id("m"), id("o")))
        );
        assert_eq!(Address::repository(id("r")).model_address(), None);
    }

    proptest::proptest! {
        #[test]
        fn parsed_text_displays_unchanged(
            parts in proptest::collection::vec("[a-z_][a-z0-9_.-]{0,8}", 1..=4)
        ) {
            let text = format!("/{}", parts.join("/"));
            let address: Address = text.parse().unwrap();
            proptest::prop_assert_eq!(address.to_string(), text);
            if let Some(parent) = address.parent() {
                proptest::prop_assert!(parent.contains(&address));
                proptest::prop_assert!(!address.contains(&parent));
            }
        }
    }
}
