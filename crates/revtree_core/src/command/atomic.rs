//! Atomic commands, one per entity level.

use super::{ChangeType, Intent};
use crate::entity::{Address, Id, Level};
use crate::error::{CoreError, CoreResult};
use revtree_codec::Value;
use std::fmt;

/// Adds or removes a child entity of the target.
///
/// Used for repository (model children), model (object children) and
/// object (field children) commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCommand {
    target: Address,
    change_type: ChangeType,
    child: Id,
    intent: Intent,
}

impl EntityCommand {
    /// The container the child is added to or removed from.
    #[must_use]
    pub fn target(&self) -> &Address {
        &self.target
    }

    /// Add or Remove.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// Id of the child entity.
    #[must_use]
    pub fn child(&self) -> &Id {
        &self.child
    }

    /// Conflict policy.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }
}

/// Sets, replaces or clears the value of the target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCommand {
    target: Address,
    change_type: ChangeType,
    value: Option<Value>,
    intent: Intent,
}

impl FieldCommand {
    /// The field whose value changes.
    #[must_use]
    pub fn target(&self) -> &Address {
        &self.target
    }

    /// Add, Remove or Change.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// The new value; `None` exactly for Remove.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Conflict policy.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }
}

/// A single change request against one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicCommand {
    /// Add or remove a model in a repository.
    Repository(EntityCommand),
    /// Add or remove an object in a model.
    Model(EntityCommand),
    /// Add or remove a field in an object.
    Object(EntityCommand),
    /// Add, change or remove a field's value.
    Field(FieldCommand),
}

impl AtomicCommand {
    /// Builds an add/remove command for a child of `target`.
    ///
    /// The variant follows the target's level. Fields cannot be the target
    /// and only Add and Remove are accepted.
    pub fn entity(
        target: Address,
        change_type: ChangeType,
        child: Id,
        intent: Intent,
    ) -> CoreResult<Self> {
        if change_type == ChangeType::Change {
            return Err(CoreError::invalid_command(format!(
                "change commands must target a field, not {target}"
            )));
        }
        let intent = intent.validate()?;
        let command = EntityCommand {
            target,
            change_type,
            child,
            intent,
        };
        Ok(match command.target.level() {
            Level::Repository => AtomicCommand::Repository(command),
            Level::Model => AtomicCommand::Model(command),
            Level::Object => AtomicCommand::Object(command),
            Level::Field => {
                return Err(CoreError::invalid_command(format!(
                    "field {} has no children to add or remove",
                    command.target
                )))
            }
        })
    }

    /// Builds a value command for the field at `target`.
    ///
    /// Add and Change need a value; Remove must not carry one.
    pub fn field(
        target: Address,
        change_type: ChangeType,
        value: Option<Value>,
        intent: Intent,
    ) -> CoreResult<Self> {
        if target.level() != Level::Field {
            return Err(CoreError::invalid_command(format!(
                "value commands must target a field, not {target}"
            )));
        }
        match (change_type, &value) {
            (ChangeType::Remove, Some(_)) => {
                return Err(CoreError::invalid_command("remove must not carry a value"))
            }
            (ChangeType::Add | ChangeType::Change, None) => {
                return Err(CoreError::invalid_command(format!(
                    "{change_type} needs a value"
                )))
            }
            _ => {}
        }
        let intent = intent.validate()?;
        Ok(AtomicCommand::Field(FieldCommand {
            target,
            change_type,
            value,
            intent,
        }))
    }

    /// Adds model `id` to the repository at `repository`.
    pub fn add_model(repository: &Address, id: Id, intent: Intent) -> CoreResult<Self> {
        Self::expect_level(repository, Level::Repository)?;
        Self::entity(repository.clone(), ChangeType::Add, id, intent)
    }

    /// Removes model `id` from the repository at `repository`.
    pub fn remove_model(repository: &Address, id: Id, intent: Intent) -> CoreResult<Self> {
        Self::expect_level(repository, Level::Repository)?;
        Self::entity(repository.clone(), ChangeType::Remove, id, intent)
    }

    /// Adds object `id` to the model at `model`.
    pub fn add_object(model: &Address, id: Id, intent: Intent) -> CoreResult<Self> {
        Self::expect_level(model, Level::Model)?;
        Self::entity(model.clone(), ChangeType::Add, id, intent)
    }

    /// Removes object `id` from the model at `model`.
    pub fn remove_object(model: &Address, id: Id, intent: Intent) -> CoreResult<Self> {
        Self::expect_level(model, Level::Model)?;
        Self::entity(model.clone(), ChangeType::Remove, id, intent)
    }

    /// Adds field `id` to the object at `object`.
    pub fn add_field(object: &Address, id: Id, intent: Intent) -> CoreResult<Self> {
        Self::expect_level(object, Level::Object)?;
        Self::entity(object.clone(), ChangeType::Add, id, intent)
    }

    /// Removes field `id` from the object at `object`.
    pub fn remove_field(object: &Address, id: Id, intent: Intent) -> CoreResult<Self> {
        Self::expect_level(object, Level::Object)?;
        Self::entity(object.clone(), ChangeType::Remove, id, intent)
    }

    /// Sets the value of an empty field.
    pub fn add_value(field: &Address, value: Value, intent: Intent) -> CoreResult<Self> {
        Self::field(field.clone(), ChangeType::Add, Some(value), intent)
    }

    /// Replaces the value of a field.
    pub fn change_value(field: &Address, value: Value, intent: Intent) -> CoreResult<Self> {
        Self::field(field.clone(), ChangeType::Change, Some(value), intent)
    }

    /// Clears the value of a field.
    pub fn remove_value(field: &Address, intent: Intent) -> CoreResult<Self> {
        Self::field(field.clone(), ChangeType::Remove, None, intent)
    }

    fn expect_level(address: &Address, level: Level) -> CoreResult<()> {
        if address.level() == level {
            Ok(())
        } else {
            Err(CoreError::invalid_command(format!(
                "expected a {level} address, got {address}"
            )))
        }
    }

    /// The address the command is sent to.
    #[must_use]
    pub fn target(&self) -> &Address {
        match self {
            AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
                &c.target
            }
            AtomicCommand::Field(c) => &c.target,
        }
    }

    /// The entity whose existence or value the command changes.
    #[must_use]
    pub fn changed_entity(&self) -> Address {
        match self {
            AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
                // Targets of entity commands are never fields, so a child always resolves.
                c.target
                    .child(c.child.clone())
                    .unwrap_or_else(|_| c.target.clone())
            }
            AtomicCommand::Field(c) => c.target.clone(),
        }
    }

    /// Add, Remove or Change.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        match self {
            AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
                c.change_type
            }
            AtomicCommand::Field(c) => c.change_type,
        }
    }

    /// Conflict policy.
    #[must_use]
    pub fn intent(&self) -> Intent {
        match self {
            AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
                c.intent
            }
            AtomicCommand::Field(c) => c.intent,
        }
    }

    /// Level of the target address.
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            AtomicCommand::Repository(_) => Level::Repository,
            AtomicCommand::Model(_) => Level::Model,
            AtomicCommand::Object(_) => Level::Object,
            AtomicCommand::Field(_) => Level::Field,
        }
    }

    /// The same command with a different intent.
    pub fn with_intent(&self, intent: Intent) -> CoreResult<Self> {
        Ok(self.rebound(intent.validate()?))
    }

    /// Swaps the intent without validation; the engine uses it to pin
    /// relative bounds to the revision they resolve to.
    pub(crate) fn rebound(&self, intent: Intent) -> Self {
        let mut command = self.clone();
        match &mut command {
            AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
                c.intent = intent;
            }
            AtomicCommand::Field(c) => c.intent = intent,
        }
        command
    }
}

impl fmt::Display for AtomicCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicCommand::Repository(c) | AtomicCommand::Model(c) | AtomicCommand::Object(c) => {
                write!(
                    f,
                    "{} {} in {} ({})",
                    c.change_type, c.child, c.target, c.intent
                )
            }
            AtomicCommand::Field(c) => match &c.value {
                Some(v) => write!(f, "{} {} = {} ({})", c.change_type, c.target, v, c.intent),
                None => write!(f, "{} {} ({})", c.change_type, c.target, c.intent),
            },
        }
    }
}
