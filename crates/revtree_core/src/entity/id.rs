//! Entity identifier.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Name of a repository, model, object, field or actor.
///
/// Ids are:
/// - Non-empty and at most [`Id::MAX_LEN`] bytes
/// - Started by an ASCII letter or `_`
/// - Otherwise made of ASCII alphanumerics, `_`, `-` and `.`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(String);

impl Id {
    /// Longest accepted id, in bytes.
    pub const MAX_LEN: usize = 100;

    /// Creates an id after validating it.
    pub fn new(raw: impl Into<String>) -> CoreResult<Self> {
        let raw = raw.into();
        Self::validate(&raw)?;
        Ok(Self(raw))
    }

    /// Creates a new unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("_{}", Uuid::new_v4().simple()))
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(raw: &str) -> CoreResult<()> {
        let mut chars = raw.chars();
        let first = chars
            .next()
            .ok_or_else(|| CoreError::invalid_id(raw, "empty"))?;
        if raw.len() > Self::MAX_LEN {
            return Err(CoreError::invalid_id(raw, "too long"));
        }
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(CoreError::invalid_id(
                raw,
                "must start with a letter or '_'",
            ));
        }
        if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
            return Err(CoreError::invalid_id(
                raw,
                format!("illegal character {bad:?}"),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Id {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
