//! Conflict-detection policy attached to a command.

use crate::error::{CoreError, CoreResult};
use crate::revision;
use std::fmt;

/// A revision a command is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevisionBound {
    /// An absolute revision.
    Absolute(i64),
    /// An offset from the revision the enclosing transaction starts from.
    Relative(i64),
}

impl RevisionBound {
    /// Resolves to an absolute revision given the transaction base.
    #[must_use]
    pub fn resolve(self, base: i64) -> i64 {
        match self {
            RevisionBound::Absolute(r) => r,
            RevisionBound::Relative(offset) => base.saturating_add(offset),
        }
    }
}

/// How a command guards against concurrent modification.
///
/// | intent | meaning |
/// |---|---|
/// | `Forced` | apply whatever the current state; missing or duplicate targets are no-ops |
/// | `SafeStateBound` | fail if the target is not in the expected state (exists / absent / has value) |
/// | `SafeRevBound` | like `SafeStateBound`, and the target's revision must match exactly |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// No checks.
    Forced,
    /// State checks only.
    SafeStateBound,
    /// State and revision checks.
    SafeRevBound(RevisionBound),
}

impl Intent {
    /// A revision-bound intent for an absolute revision.
    ///
    /// Revisions are non-negative; anything else is a malformed command.
    pub fn safe_rev(revision: i64) -> CoreResult<Self> {
        Intent::SafeRevBound(RevisionBound::Absolute(revision)).validate()
    }

    /// A revision-bound intent relative to the enclosing transaction's base.
    pub fn relative(offset: i64) -> CoreResult<Self> {
        Intent::SafeRevBound(RevisionBound::Relative(offset)).validate()
    }

    /// Checks that a revision bound can be expressed on the wire.
    ///
    /// Absolute revisions must be real revisions below the relative range,
    /// and relative offsets must fit inside it.
    pub fn validate(self) -> CoreResult<Self> {
        match self {
            Intent::SafeRevBound(RevisionBound::Absolute(revision)) if revision < 0 => {
                Err(CoreError::invalid_command(format!(
                    "revision-bound intent needs a real revision, got {revision}"
                )))
            }
            Intent::SafeRevBound(RevisionBound::Absolute(revision))
                if revision >= revision::RELATIVE_REV =>
            {
                Err(CoreError::invalid_command(format!(
                    "revision {revision} lies in the relative range"
                )))
            }
            Intent::SafeRevBound(RevisionBound::Relative(offset))
                if !(0..revision::RELATIVE_REV).contains(&offset) =>
            {
                Err(CoreError::invalid_command(format!(
                    "relative revision offset {offset} out of range"
                )))
            }
            valid => Ok(valid),
        }
    }

    /// Interprets a raw wire revision, including the reserved sentinels.
    pub fn from_raw(raw: i64) -> CoreResult<Self> {
        match raw {
            revision::FORCED => Ok(Intent::Forced),
            revision::SAFE_STATE_BOUND => Ok(Intent::SafeStateBound),
            r if r >= revision::RELATIVE_REV => Self::relative(r - revision::RELATIVE_REV),
            r => Self::safe_rev(r),
        }
    }

    /// The raw wire revision for this intent.
    #[must_use]
    pub fn to_raw(self) -> i64 {
        match self {
            Intent::Forced => revision::FORCED,
            Intent::SafeStateBound => revision::SAFE_STATE_BOUND,
            Intent::SafeRevBound(RevisionBound::Absolute(r)) => r,
            Intent::SafeRevBound(RevisionBound::Relative(offset)) => {
                revision::RELATIVE_REV + offset
            }
        }
    }

    /// Replaces a relative bound with the absolute revision it denotes.
    #[must_use]
    pub fn resolved(self, base: i64) -> Self {
        match self {
            Intent::SafeRevBound(bound) => {
                Intent::SafeRevBound(RevisionBound::Absolute(bound.resolve(base)))
            }
            other => other,
        }
    }

    /// True for [`Intent::Forced`].
    #[must_use]
    pub fn is_forced(self) -> bool {
        matches!(self, Intent::Forced)
    }

    /// True if this intent still carries a relative bound.
    #[must_use]
    pub fn is_relative(self) -> bool {
        matches!(self, Intent::SafeRevBound(RevisionBound::Relative(_)))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Forced => f.write_str("forced"),
            Intent::SafeStateBound => f.write_str("safe"),
            Intent::SafeRevBound(RevisionBound::Absolute(r)) => write!(f, "rev={r}"),
            Intent::SafeRevBound(RevisionBound::Relative(o)) => write!(f, "rev=base+{o}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_rev_requires_real_revision() {
        assert!(Intent::safe_rev(0).is_ok());
        assert!(Intent::safe_rev(17).is_ok());
        assert!(matches!(
            Intent::safe_rev(-1),
            Err(CoreError::InvalidCommand { .. })
        ));
        assert!(Intent::safe_rev(revision::RELATIVE_REV).is_err());
    }

    #[test]
    fn hand_built_bounds_are_validated() {
        for bad in [
            RevisionBound::Absolute(-1),
            RevisionBound::Absolute(revision::RELATIVE_REV),
            RevisionBound::Relative(-1),
            RevisionBound::Relative(revision::RELATIVE_REV),
        ] {
            assert!(matches!(
                Intent::SafeRevBound(bad).validate(),
                Err(CoreError::InvalidCommand { .. })
            ));
        }
        assert_eq!(Intent::Forced.validate().unwrap(), Intent::Forced);
        assert_eq!(
            Intent::SafeRevBound(RevisionBound::Relative(0)).validate().unwrap(),
            Intent::relative(0).unwrap()
        );
    }

    #[test]
    fn raw_sentinels() {
        assert_eq!(Intent::from_raw(-1).unwrap(), Intent::Forced);
        assert_eq!(Intent::from_raw(-2).unwrap(), Intent::SafeStateBound);
        assert_eq!(
            Intent::from_raw(5).unwrap(),
            Intent::SafeRevBound(RevisionBound::Absolute(5))
        );
        assert_eq!(
            Intent::from_raw(revision::RELATIVE_REV + 3).unwrap(),
            Intent::SafeRevBound(RevisionBound::Relative(3))
        );
        assert!(Intent::from_raw(-7).is_err());
    }

    #[test]
    fn raw_roundtrip() {
        for intent in [
            Intent::Forced,
            Intent::SafeStateBound,
            Intent::safe_rev(9).unwrap(),
            Intent::relative(2).unwrap(),
        ] {
            assert_eq!(Intent::from_raw(intent.to_raw()).unwrap(), intent);
        }
    }

    #[test]
    fn relative_resolution() {
        let intent = Intent::relative(1).unwrap();
        assert!(intent.is_relative());
        let resolved = intent.resolved(10);
        assert_eq!(resolved, Intent::SafeRevBound(RevisionBound::Absolute(11)));
        assert!(!resolved.is_relative());
        assert_eq!(Intent::Forced.resolved(10), Intent::Forced);
    }
}
