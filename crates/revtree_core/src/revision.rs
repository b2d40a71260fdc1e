//! Revision numbers and the reserved sentinels used on the wire.
//!
//! Entity revisions are non-negative. Within the engine an entity that has
//! never existed has no revision (`None`); the sentinels below only appear
//! where commands are exchanged as raw numbers.

/// Raw command revision meaning "apply regardless of state".
pub const FORCED: i64 = -1;

/// Raw command revision meaning "apply only if the entity state allows it".
pub const SAFE_STATE_BOUND: i64 = -2;

/// Offset marking a raw command revision as relative to the enclosing
/// transaction's base revision.
pub const RELATIVE_REV: i64 = 0x4000_0000_0000_0000;

/// Revision a model gets when it is first committed.
pub const FIRST: i64 = 0;

/// Revision following `current`, where `None` means the entity never existed.
#[must_use]
pub fn next(current: Option<i64>) -> i64 {
    current.map_or(FIRST, |r| r + 1)
}
