//! Transactions: ordered groups of atomic commands applied all-or-nothing.

use super::AtomicCommand;
use crate::entity::{Address, Level};
use crate::error::{CoreError, CoreResult};

/// An ordered sequence of atomic commands sharing one model or object target.
///
/// Every nested command must change an entity at or below the target. If any
/// command is rejected, none of them takes effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    target: Address,
    commands: Vec<AtomicCommand>,
}

impl Transaction {
    /// Creates a transaction, checking that every command fits the target.
    pub fn new(target: Address, commands: Vec<AtomicCommand>) -> CoreResult<Self> {
        if !matches!(target.level(), Level::Model | Level::Object) {
            return Err(CoreError::invalid_command(format!(
                "transactions target a model or object, not {target}"
            )));
        }
        if let Some(stray) = commands
            .iter()
            .find(|c| !target.equals_or_contains(&c.changed_entity()))
        {
            return Err(CoreError::invalid_command(format!(
                "command {stray} lies outside transaction target {target}"
            )));
        }
        Ok(Self { target, commands })
    }

    /// The model or object all commands apply to.
    #[must_use]
    pub fn target(&self) -> &Address {
        &self.target
    }

    /// The commands in execution order.
    #[must_use]
    pub fn commands(&self) -> &[AtomicCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the transaction holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Incrementally assembles a [`Transaction`].
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    target: Address,
    commands: Vec<AtomicCommand>,
}

impl TransactionBuilder {
    /// Starts an empty transaction against `target`.
    #[must_use]
    pub fn new(target: Address) -> Self {
        Self {
            target,
            commands: Vec::new(),
        }
    }

    /// Appends a command.
    #[must_use]
    pub fn push(mut self, command: AtomicCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Validates and builds the transaction.
    pub fn build(self) -> CoreResult<Transaction> {
        Transaction::new(self.target, self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Intent;
    use crate::entity::Id;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn target_must_be_model_or_object() {
        let repo = Address::repository(id("r"));
        assert!(Transaction::new(repo, Vec::new()).is_err());

        let field = Address::field(id("r"), id("m"), id("o"), id("f"));
        assert!(Transaction::new(field, Vec::new()).is_err());
    }

    #[test]
    fn commands_must_lie_under_target() {
        let model = Address::model(id("r"), id("m"));
        let other = Address::model(id("r"), id("n"));

        let inside = AtomicCommand::add_object(&model, id("o"), Intent::Forced).unwrap();
        let outside = AtomicCommand::add_object(&other, id("o"), Intent::Forced).unwrap();

        assert!(Transaction::new(model.clone(), vec![inside.clone()]).is_ok());
        assert!(matches!(
            Transaction::new(model, vec![inside, outside]),
            Err(CoreError::InvalidCommand { .. })
        ));
    }

    #[test]
    fn model_transaction_may_create_its_model() {
        let repo = Address::repository(id("r"));
        let model = Address::model(id("r"), id("m"));
        let txn = TransactionBuilder::new(model.clone())
            .push(AtomicCommand::add_model(&repo, id("m"), Intent::SafeStateBound).unwrap())
            .push(AtomicCommand::add_object(&model, id("o"), Intent::SafeStateBound).unwrap())
            .build()
            .unwrap();
        assert_eq!(txn.len(), 2);
        assert_eq!(txn.target(), &model);
    }

    #[test]
    fn object_transaction_may_create_its_object() {
        let model = Address::model(id("r"), id("m"));
        let object = Address::object(id("r"), id("m"), id("o"));
        let txn = Transaction::new(
            object.clone(),
            vec![
                AtomicCommand::add_object(&model, id("o"), Intent::Forced).unwrap(),
                AtomicCommand::add_field(&object, id("f"), Intent::Forced).unwrap(),
            ],
        );
        assert!(txn.is_ok());

        let sibling = AtomicCommand::add_object(&model, id("p"), Intent::Forced).unwrap();
        assert!(Transaction::new(object, vec![sibling]).is_err());
    }
}
