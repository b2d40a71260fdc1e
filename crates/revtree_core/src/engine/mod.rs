//! Command execution engine.
//!
//! [`execute`] checks a command against an overlay and applies it there.
//! [`commit`] runs a whole attempt: it opens an overlay on the committed
//! model, executes the command, and turns the resulting diff into the event
//! and revision to commit. Nothing here locks or touches the base; callers
//! serialize attempts per model.

mod events;
mod execute;
mod verdict;

pub use events::{collect, pack};
pub use execute::execute;
pub use verdict::{RejectReason, Rejection, Verdict};

use crate::command::Command;
use crate::entity::{Address, Id};
use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::overlay::OverlayModel;
use crate::revision;
use crate::store::ReadableModel;
use tracing::debug;

/// Result of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The command changed state.
    Committed {
        /// What happened.
        event: Event,
        /// The model's new revision.
        revision: i64,
    },
    /// The command was valid but left the model as it was.
    NoChange,
    /// The command conflicts with the committed state.
    Rejected(Rejection),
}

/// Validates `command` against the committed model and computes its event.
///
/// `base` is the committed model, or `None` if there is no state for it at
/// all. The base is only read; applying the returned event to it is up to the
/// caller.
pub fn commit(
    base: Option<&dyn ReadableModel>,
    model_address: &Address,
    command: &Command,
    actor: &Id,
) -> CoreResult<CommitOutcome> {
    if command.model_address()? != *model_address {
        return Err(CoreError::invalid_command(format!(
            "command for {} committed to {model_address}",
            command.target()
        )));
    }
    if let Some(base) = base {
        if base.address() != model_address {
            return Err(CoreError::invalid_operation(format!(
                "base {} does not match {model_address}",
                base.address()
            )));
        }
    }

    let mut overlay = OverlayModel::new(model_address.clone(), base);
    if let Verdict::Rejected(rejection) = execute(&mut overlay, command)? {
        return Ok(CommitOutcome::Rejected(rejection));
    }
    if overlay.count_changes(2) == 0 {
        debug!("no net change on {model_address}");
        return Ok(CommitOutcome::NoChange);
    }

    let target = match command {
        Command::Transaction(transaction) => transaction.target(),
        Command::Atomic(_) => model_address,
    };
    let events = collect(&overlay, actor);
    let Some(event) = pack(events, &overlay, target, actor) else {
        return Ok(CommitOutcome::NoChange);
    };
    let revision = revision::next(overlay.base_revision());
    debug!(
        "{model_address} -> revision {revision} ({} events)",
        event.len()
    );
    Ok(CommitOutcome::Committed { event, revision })
}
