use crate::command::AtomicCommand;
use std::fmt;

/// Why a well-formed command was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The entity to add already exists.
    AlreadyExists,
    /// The entity to remove does not exist.
    Missing,
    /// The bound revision is not the entity's current revision.
    RevisionMismatch {
        /// Revision the command was bound to.
        expected: i64,
        /// Revision actually found; `None` if the entity has none.
        actual: Option<i64>,
    },
    /// The field already holds a value.
    ValuePresent,
    /// The field holds no value.
    ValueMissing,
    /// The entity the command addresses does not exist.
    ContainerMissing,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::AlreadyExists => f.write_str("already exists"),
            RejectReason::Missing => f.write_str("does not exist"),
            RejectReason::RevisionMismatch {
                expected,
                actual: Some(actual),
            } => write!(f, "expected revision {expected}, found {actual}"),
            RejectReason::RevisionMismatch {
                expected,
                actual: None,
            } => write!(f, "expected revision {expected}, found none"),
            RejectReason::ValuePresent => f.write_str("field already has a value"),
            RejectReason::ValueMissing => f.write_str("field has no value"),
            RejectReason::ContainerMissing => f.write_str("target does not exist"),
        }
    }
}

/// A semantic conflict: the command is valid but does not fit current state.
///
/// Callers are expected to refresh their view and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// What did not fit.
    pub reason: RejectReason,
    /// The offending atomic command.
    pub command: AtomicCommand,
    /// Position of the command inside its transaction, if any.
    pub index: Option<usize>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "command #{index} {}: {}", self.command, self.reason),
            None => write!(f, "{}: {}", self.command, self.reason),
        }
    }
}

/// Outcome of executing a command against an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every atomic command was applied to the overlay.
    Applied,
    /// A command was rejected. For transactions the overlay may hold the
    /// effects of earlier commands and must be discarded.
    Rejected(Rejection),
}

impl Verdict {
    /// True for [`Verdict::Applied`].
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Verdict::Applied)
    }

    /// The rejection, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Applied => None,
            Verdict::Rejected(r) => Some(r),
        }
    }
}
