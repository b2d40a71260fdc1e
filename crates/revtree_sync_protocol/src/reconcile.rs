//! Divergence detection between a local sync log and a remote event stream.
//!
//! What to do with the diverging entries (resend, rebase, drop) is up to
//! the caller; this module only finds where the two histories part.

use crate::error::{ProtocolError, ProtocolResult};
use revtree_core::{Event, SyncLog, SyncLogEntry};
use std::collections::{vec_deque, BTreeMap};
use tracing::debug;

/// Finds the lowest revision at which the local log and the remote stream
/// disagree.
///
/// Only revisions above the log's base are compared; older remote events
/// are ignored. A revision present on one side only counts as divergence.
/// Returns `None` when both histories match.
pub fn find_divergence(
    log: &SyncLog,
    remote: impl IntoIterator<Item = (i64, Event)>,
) -> Option<i64> {
    let base = log.base_revision();
    let remote: BTreeMap<i64, Event> = remote
        .into_iter()
        .filter(|(revision, _)| *revision > base)
        .collect();
    let current = log.current_revision();
    let local_mismatch = log
        .entries()
        .find(|entry| remote.get(&entry.revision) != Some(&entry.event))
        .map(|entry| entry.revision);
    let remote_only = remote.keys().copied().find(|revision| *revision > current);
    let divergence = local_mismatch.into_iter().chain(remote_only).min();

    debug!(
        "divergence for {}: {:?} (local {}, remote {})",
        log.model_address(),
        divergence,
        current,
        remote.len()
    );
    divergence
}

/// The local entries from `divergence` on, in revision order.
///
/// Fails if entries at or after `divergence` were already truncated.
pub fn entries_to_resend(
    log: &SyncLog,
    divergence: i64,
) -> ProtocolResult<vec_deque::Iter<'_, SyncLogEntry>> {
    if divergence <= log.base_revision() {
        return Err(ProtocolError::Truncated {
            requested: divergence,
            base: log.base_revision(),
        });
    }
    Ok(log.entries_since(divergence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_core::{AtomicCommand, CommitOutcome, Config, Id, Intent, Repository};

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    /// A log with a model add at 0 and objects `o0..o{n}` at 1..=n.
    fn log_with(objects: usize) -> SyncLog {
        let repo = Repository::new(Config::new().repository_id("r")).unwrap();
        let add = AtomicCommand::add_model(repo.address(), id("m"), Intent::SafeStateBound).unwrap();
        repo.execute(&add.into()).unwrap();
        let model = repo.model_address(id("m")).unwrap();
        for i in 0..objects {
            let cmd = AtomicCommand::add_object(&model, id(&format!("o{i}")), Intent::Forced).unwrap();
            assert!(matches!(
                repo.execute(&cmd.into()).unwrap(),
                CommitOutcome::Committed { .. }
            ));
        }
        repo.sync_log(&id("m")).unwrap()
    }

    fn stream(log: &SyncLog) -> Vec<(i64, Event)> {
        log.entries().map(|e| (e.revision, e.event.clone())).collect()
    }

    #[test]
    fn identical_histories() {
        let log = log_with(3);
        assert_eq!(find_divergence(&log, stream(&log)), None);
    }

    #[test]
    fn remote_behind() {
        let log = log_with(3);
        let mut remote = stream(&log);
        remote.truncate(2);
        assert_eq!(find_divergence(&log, remote), Some(2));
        let resend: Vec<_> = entries_to_resend(&log, 2).unwrap().map(|e| e.revision).collect();
        assert_eq!(resend, vec![2, 3]);
    }

    #[test]
    fn remote_ahead() {
        let log = log_with(1);
        let longer = log_with(3);
        assert_eq!(find_divergence(&log, stream(&longer)), Some(2));
    }

    #[test]
    fn conflicting_event() {
        let log = log_with(3);
        let mut remote = stream(&log);
        let other = log_with(4);
        remote[2] = (2, other.entry(4).unwrap().event.clone());
        assert_eq!(find_divergence(&log, remote), Some(2));
    }

    #[test]
    fn truncated_entries_cannot_be_resent() {
        let mut log = log_with(3);
        log.truncate_before(1).unwrap();
        assert_eq!(
            entries_to_resend(&log, 1).unwrap_err(),
            ProtocolError::Truncated {
                requested: 1,
                base: 1
            }
        );
        assert_eq!(entries_to_resend(&log, 2).unwrap().count(), 2);
    }

    #[test]
    fn events_below_base_are_ignored() {
        let mut log = log_with(3);
        let remote = stream(&log);
        log.truncate_before(2).unwrap();
        assert_eq!(find_divergence(&log, remote), None);
    }

    #[test]
    fn far_remote_revision_is_found_directly() {
        let log = log_with(0);
        let mut remote = stream(&log);
        let event = remote[0].1.clone();
        remote.push((3_000_000_000, event.clone()));
        assert_eq!(find_divergence(&log, remote), Some(3_000_000_000));

        let log = log_with(1);
        let remote = vec![(0, log.entry(0).unwrap().event.clone()), (i64::MAX, event)];
        assert_eq!(find_divergence(&log, remote), Some(1));
    }
}
