//! Intent-driven application of commands to an overlay.

use super::{RejectReason, Rejection, Verdict};
use crate::command::{AtomicCommand, ChangeType, Command, FieldCommand, Intent, RevisionBound};
use crate::entity::{Address, Level};
use crate::error::{CoreError, CoreResult};
use crate::overlay::{OverlayField, OverlayModel, OverlayObject};
use crate::store::{ReadableField, ReadableModel, ReadableObject};
use tracing::{debug, trace};

/// Result of one atomic step: `Err` carries a conflict, not a failure.
type Step = Result<(), RejectReason>;

/// Validates `command` against the overlay and applies it there.
///
/// Structural problems (a command aimed outside the overlay's model) are
/// errors. Conflicts with the current state are returned as
/// [`Verdict::Rejected`]. Transaction-relative revisions are resolved against
/// the overlay's base revision before any command runs; a model that never
/// existed counts as revision -1.
///
/// When a transaction is rejected the overlay keeps whatever the earlier
/// commands did; callers must drop it.
pub fn execute(overlay: &mut OverlayModel<'_>, command: &Command) -> CoreResult<Verdict> {
    let base = overlay.base_revision().unwrap_or(-1);
    match command {
        Command::Atomic(atomic) => {
            let resolved = resolve(atomic, base);
            Ok(match apply(overlay, &resolved)? {
                Ok(()) => Verdict::Applied,
                Err(reason) => Verdict::Rejected(Rejection {
                    reason,
                    command: resolved,
                    index: None,
                }),
            })
        }
        Command::Transaction(transaction) => {
            if !overlay.address().equals_or_contains(transaction.target()) {
                return Err(CoreError::invalid_command(format!(
                    "transaction on {} sent to {}",
                    transaction.target(),
                    overlay.address()
                )));
            }
            for (index, atomic) in transaction.commands().iter().enumerate() {
                let resolved = resolve(atomic, base);
                if let Err(reason) = apply(overlay, &resolved)? {
                    debug!("transaction on {} stopped at #{index}", transaction.target());
                    return Ok(Verdict::Rejected(Rejection {
                        reason,
                        command: resolved,
                        index: Some(index),
                    }));
                }
            }
            Ok(Verdict::Applied)
        }
    }
}

fn resolve(command: &AtomicCommand, base: i64) -> AtomicCommand {
    if command.intent().is_relative() {
        command.rebound(command.intent().resolved(base))
    } else {
        command.clone()
    }
}

fn check_address(overlay: &OverlayModel<'_>, command: &AtomicCommand) -> CoreResult<()> {
    let fits = match command.level() {
        Level::Repository => &command.changed_entity() == overlay.address(),
        _ => overlay.address().equals_or_contains(command.target()),
    };
    if fits {
        Ok(())
    } else {
        Err(CoreError::invalid_command(format!(
            "{command} does not apply to {}",
            overlay.address()
        )))
    }
}

fn apply(overlay: &mut OverlayModel<'_>, command: &AtomicCommand) -> CoreResult<Step> {
    check_address(overlay, command)?;
    let intent = command.intent();
    let step = match command {
        AtomicCommand::Repository(c) => {
            let exists = overlay.exists();
            let revision = overlay.revision();
            match c.change_type() {
                ChangeType::Add => decide_add(intent, exists, revision).map(|create| {
                    if create {
                        overlay.create_model();
                    }
                }),
                ChangeType::Remove => decide_remove(intent, exists, revision).map(|remove| {
                    if remove {
                        overlay.remove_model();
                    }
                }),
                ChangeType::Change => return Err(not_a_field(command)),
            }
        }
        AtomicCommand::Model(c) => {
            if !overlay.exists() {
                return Ok(Err(RejectReason::ContainerMissing));
            }
            let id = c.child();
            let exists = overlay.has_object(id);
            match c.change_type() {
                ChangeType::Add => {
                    decide_add(intent, exists, overlay.revision()).map(|create| {
                        if create {
                            overlay.create_object(id.clone());
                        }
                    })
                }
                ChangeType::Remove => {
                    let revision = overlay.object(id).and_then(|o| o.revision());
                    decide_remove(intent, exists, revision).map(|remove| {
                        if remove {
                            overlay.remove_object(id);
                        }
                    })
                }
                ChangeType::Change => return Err(not_a_field(command)),
            }
        }
        AtomicCommand::Object(c) => {
            let Some(object) = object_at(overlay, c.target()) else {
                return Ok(Err(RejectReason::ContainerMissing));
            };
            let id = c.child();
            let exists = object.has_field(id);
            match c.change_type() {
                ChangeType::Add => decide_add(intent, exists, object.revision()).map(|create| {
                    if create {
                        object.create_field(id.clone());
                    }
                }),
                ChangeType::Remove => {
                    let revision = object.field(id).and_then(|f| f.revision());
                    decide_remove(intent, exists, revision).map(|remove| {
                        if remove {
                            object.remove_field(id);
                        }
                    })
                }
                ChangeType::Change => return Err(not_a_field(command)),
            }
        }
        AtomicCommand::Field(c) => {
            let field = object_at(overlay, c.target())
                .and_then(|object| object.field_mut(c.target().id()));
            match field {
                Some(field) => apply_value(field, c),
                None => Err(RejectReason::ContainerMissing),
            }
        }
    };
    match &step {
        Ok(()) => debug!("applied {command}"),
        Err(reason) => trace!("{command} conflicts: {reason}"),
    }
    Ok(step)
}

fn not_a_field(command: &AtomicCommand) -> CoreError {
    CoreError::invalid_command(format!("{command}: only fields can change"))
}

fn object_at<'o, 'a>(
    overlay: &'o mut OverlayModel<'a>,
    address: &Address,
) -> Option<&'o mut OverlayObject<'a>> {
    if !overlay.exists() {
        return None;
    }
    overlay.object_mut(address.object_id()?)
}

/// Decides an entity add. `Ok(false)` means nothing to do.
fn decide_add(intent: Intent, exists: bool, container_revision: Option<i64>) -> Result<bool, RejectReason> {
    if exists {
        return if intent.is_forced() {
            Ok(false)
        } else {
            Err(RejectReason::AlreadyExists)
        };
    }
    check_bound(intent, container_revision).map(|()| true)
}

/// Decides an entity removal. `Ok(false)` means nothing to do.
fn decide_remove(intent: Intent, exists: bool, revision: Option<i64>) -> Result<bool, RejectReason> {
    if !exists {
        return if intent.is_forced() {
            Ok(false)
        } else {
            Err(RejectReason::Missing)
        };
    }
    check_bound(intent, revision).map(|()| true)
}

fn check_bound(intent: Intent, actual: Option<i64>) -> Step {
    match intent {
        Intent::Forced | Intent::SafeStateBound => Ok(()),
        // Relative bounds are resolved before a command gets here.
        Intent::SafeRevBound(RevisionBound::Absolute(expected) | RevisionBound::Relative(expected)) => {
            if actual == Some(expected) {
                Ok(())
            } else {
                Err(RejectReason::RevisionMismatch { expected, actual })
            }
        }
    }
}

fn apply_value(field: &mut OverlayField<'_>, command: &FieldCommand) -> Step {
    let intent = command.intent();
    let has_value = field.value().is_some();
    match command.change_type() {
        ChangeType::Add if has_value && !intent.is_forced() => Err(RejectReason::ValuePresent),
        ChangeType::Remove if !has_value => {
            if intent.is_forced() {
                Ok(())
            } else {
                Err(RejectReason::ValueMissing)
            }
        }
        ChangeType::Change if !has_value && !intent.is_forced() => Err(RejectReason::ValueMissing),
        _ => {
            check_bound(intent, field.revision())?;
            field.set_value(command.value().cloned());
            Ok(())
        }
    }
}
