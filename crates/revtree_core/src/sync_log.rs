//! Synchronization log: the ledger of locally committed changes.
//!
//! Each entry pairs a command with the event it produced and the revision
//! it committed. Entries are kept in strictly increasing revision order
//! without gaps, starting right after the base revision.

use crate::command::Command;
use crate::entity::Address;
use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::revision;
use std::collections::{vec_deque, VecDeque};

/// One committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLogEntry {
    /// The command as submitted.
    pub command: Command,
    /// The event it produced.
    pub event: Event,
    /// The revision it committed.
    pub revision: i64,
}

/// Append-only log of one model's committed changes.
///
/// # Invariants
///
/// - Entries cover exactly `base_revision + 1 ..= current_revision`
/// - `base_revision <= sync_revision <= current_revision`, once a sync
///   revision has been set
/// - Only truncation removes entries, and only from the front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLog {
    model_address: Address,
    base_revision: i64,
    sync_revision: Option<i64>,
    entries: VecDeque<SyncLogEntry>,
}

impl SyncLog {
    /// Creates an empty log whose next entry will be `base_revision + 1`.
    ///
    /// A log for a model that does not exist yet starts at base -1.
    #[must_use]
    pub fn new(model_address: Address, base_revision: i64) -> Self {
        Self {
            model_address,
            base_revision,
            sync_revision: None,
            entries: VecDeque::new(),
        }
    }

    /// Rebuilds a log from persisted state, checking its invariants.
    pub fn from_parts(
        model_address: Address,
        base_revision: i64,
        sync_revision: Option<i64>,
        entries: Vec<SyncLogEntry>,
    ) -> CoreResult<Self> {
        if !(-1..revision::RELATIVE_REV).contains(&base_revision) {
            return Err(CoreError::invalid_operation(format!(
                "base revision {base_revision} is not a revision"
            )));
        }
        let mut log = Self::new(model_address, base_revision);
        for entry in entries {
            log.append(entry)?;
        }
        if let Some(rev) = sync_revision {
            log.set_sync_revision(rev)?;
        }
        Ok(log)
    }

    /// The model this log belongs to.
    #[must_use]
    pub fn model_address(&self) -> &Address {
        &self.model_address
    }

    /// Revision just before the oldest entry still held.
    #[must_use]
    pub fn base_revision(&self) -> i64 {
        self.base_revision
    }

    /// Revision of the newest entry, or the base if the log is empty.
    #[must_use]
    pub fn current_revision(&self) -> i64 {
        self.base_revision.saturating_add(self.entries.len() as i64)
    }

    /// Highest revision acknowledged by the remote side.
    #[must_use]
    pub fn sync_revision(&self) -> Option<i64> {
        self.sync_revision
    }

    /// Appends an entry; its revision must be exactly one past the current
    /// revision.
    pub fn append(&mut self, entry: SyncLogEntry) -> CoreResult<()> {
        let expected = self.current_revision().checked_add(1).ok_or_else(|| {
            CoreError::invalid_operation("sync log has no revisions left")
        })?;
        if entry.revision != expected {
            return Err(CoreError::SyncLogOutOfOrder {
                expected,
                actual: entry.revision,
            });
        }
        self.entries.push_back(entry);
        Ok(())
    }

    /// The entry that committed `revision`.
    #[must_use]
    pub fn entry(&self, revision: i64) -> Option<&SyncLogEntry> {
        let offset = revision.checked_sub(self.base_revision.checked_add(1)?)?;
        self.entries.get(usize::try_from(offset).ok()?)
    }

    /// Entries with revision `>= revision`, oldest first.
    ///
    /// The iterator is lazy and can be cloned to walk the same range again.
    pub fn entries_since(&self, revision: i64) -> vec_deque::Iter<'_, SyncLogEntry> {
        let skip = revision
            .saturating_sub(self.base_revision.saturating_add(1))
            .clamp(0, self.entries.len() as i64);
        self.entries.range(skip as usize..)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> vec_deque::Iter<'_, SyncLogEntry> {
        self.entries.iter()
    }

    /// Entries the remote has not acknowledged yet.
    pub fn pending(&self) -> vec_deque::Iter<'_, SyncLogEntry> {
        match self.sync_revision {
            Some(rev) => self.entries_since(rev.saturating_add(1)),
            None => self.entries(),
        }
    }

    /// Records that the remote holds everything up to `revision`.
    ///
    /// The sync revision never moves backwards and cannot pass the current
    /// revision.
    pub fn set_sync_revision(&mut self, revision: i64) -> CoreResult<()> {
        if revision > self.current_revision() {
            return Err(CoreError::invalid_operation(format!(
                "sync revision {revision} is ahead of current revision {}",
                self.current_revision()
            )));
        }
        if self.sync_revision.is_some_and(|current| revision < current) {
            return Err(CoreError::invalid_operation(format!(
                "sync revision cannot move back to {revision}"
            )));
        }
        self.sync_revision = Some(revision);
        Ok(())
    }

    /// Drops every entry up to and including `new_base`.
    pub fn truncate_before(&mut self, new_base: i64) -> CoreResult<()> {
        let current = self.current_revision();
        if new_base < self.base_revision || new_base > current {
            return Err(CoreError::InvalidTruncation {
                requested: new_base,
                base: self.base_revision,
                current,
            });
        }
        let drop = (new_base - self.base_revision) as usize;
        self.entries.drain(..drop);
        self.base_revision = new_base;
        Ok(())
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the log holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
