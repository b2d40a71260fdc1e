//! Repository facade: committed models with their sync logs.

use crate::command::Command;
use crate::config::Config;
use crate::engine::{self, CommitOutcome};
use crate::entity::{Address, Id};
use crate::error::{CoreError, CoreResult};
use crate::store::{MemoryModel, ReadableModel};
use crate::sync_log::{SyncLog, SyncLogEntry};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

struct ModelSlot {
    snapshot: MemoryModel,
    log: SyncLog,
}

/// A repository of models, each with its committed snapshot and sync log.
///
/// Every model sits behind its own lock, so commands on one model are
/// validated and committed one at a time while different models proceed
/// independently.
pub struct Repository {
    config: Config,
    address: Address,
    default_actor: Id,
    models: RwLock<BTreeMap<Id, Arc<Mutex<ModelSlot>>>>,
}

impl Repository {
    /// Creates an empty repository.
    pub fn new(config: Config) -> CoreResult<Self> {
        let address = Address::repository(Id::new(config.repository_id.as_str())?);
        let default_actor = Id::new(config.default_actor.as_str())?;
        Ok(Self {
            config,
            address,
            default_actor,
            models: RwLock::new(BTreeMap::new()),
        })
    }

    /// The repository address.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seeds a model from an existing snapshot with an empty sync log based
    /// at the snapshot's revision.
    pub fn insert_model(&self, snapshot: MemoryModel) -> CoreResult<()> {
        let address = snapshot.address().clone();
        if !self.address.contains(&address) {
            return Err(CoreError::invalid_operation(format!(
                "{address} does not belong to {}",
                self.address
            )));
        }
        let id = address.id().clone();
        let mut models = self.models.write();
        if models.contains_key(&id) {
            return Err(CoreError::invalid_operation(format!(
                "model {address} is already loaded"
            )));
        }
        let log = SyncLog::new(address, snapshot.revision().unwrap_or(-1));
        models.insert(id, Arc::new(Mutex::new(ModelSlot { snapshot, log })));
        Ok(())
    }

    /// Executes a command as the configured default actor.
    pub fn execute(&self, command: &Command) -> CoreResult<CommitOutcome> {
        self.execute_as(command, &self.default_actor)
    }

    /// Executes a command and commits its event.
    ///
    /// On success the event is folded into the model snapshot and appended
    /// to the model's sync log. Rejections are returned, and logged when
    /// configured to.
    pub fn execute_as(&self, command: &Command, actor: &Id) -> CoreResult<CommitOutcome> {
        let model_address = command.model_address()?;
        if !self.address.contains(&model_address) {
            return Err(CoreError::invalid_command(format!(
                "{} is not in repository {}",
                command.target(),
                self.address
            )));
        }
        let slot = self.slot_or_insert(&model_address)?;
        let mut guard = slot.lock();
        let slot = &mut *guard;

        let outcome = engine::commit(Some(&slot.snapshot), &model_address, command, actor)?;
        match &outcome {
            CommitOutcome::Committed { event, revision } => {
                slot.snapshot.apply_event(event, *revision)?;
                slot.log.append(SyncLogEntry {
                    command: command.clone(),
                    event: event.clone(),
                    revision: *revision,
                })?;
                self.apply_retention(&mut slot.log)?;
                debug!("{model_address} committed revision {revision}");
            }
            CommitOutcome::NoChange => {
                debug!("{model_address} unchanged by {}", command.target());
            }
            CommitOutcome::Rejected(rejection) => {
                if self.config.log_rejections {
                    warn!(
                        "rejected {rejection} on {model_address} at revision {:?}",
                        slot.snapshot.revision()
                    );
                }
            }
        }
        Ok(outcome)
    }

    fn apply_retention(&self, log: &mut SyncLog) -> CoreResult<()> {
        if let Some(keep) = self.config.sync_log_retention {
            let excess = log.len().saturating_sub(keep);
            if excess > 0 {
                log.truncate_before(log.base_revision() + excess as i64)?;
            }
        }
        Ok(())
    }

    fn slot(&self, id: &Id) -> Option<Arc<Mutex<ModelSlot>>> {
        self.models.read().get(id).cloned()
    }

    fn slot_or_insert(&self, model_address: &Address) -> CoreResult<Arc<Mutex<ModelSlot>>> {
        let id = model_address.id();
        if let Some(slot) = self.slot(id) {
            return Ok(slot);
        }
        let mut models = self.models.write();
        if let Some(slot) = models.get(id) {
            return Ok(Arc::clone(slot));
        }
        let slot = Arc::new(Mutex::new(ModelSlot {
            snapshot: MemoryModel::absent(model_address.clone())?,
            log: SyncLog::new(model_address.clone(), -1),
        }));
        models.insert(id.clone(), Arc::clone(&slot));
        Ok(slot)
    }

    /// A copy of the committed snapshot of a model.
    #[must_use]
    pub fn model(&self, id: &Id) -> Option<MemoryModel> {
        self.with_model(id, MemoryModel::clone)
    }

    /// Runs `f` on the committed snapshot of a model while holding its lock.
    pub fn with_model<R>(&self, id: &Id, f: impl FnOnce(&MemoryModel) -> R) -> Option<R> {
        let slot = self.slot(id)?;
        let guard = slot.lock();
        Some(f(&guard.snapshot))
    }

    /// Current revision of a model; `None` if it never existed.
    #[must_use]
    pub fn model_revision(&self, id: &Id) -> Option<i64> {
        self.with_model(id, |m| m.revision()).flatten()
    }

    /// Ids of the models that currently exist.
    #[must_use]
    pub fn model_ids(&self) -> Vec<Id> {
        let slots: Vec<_> = self
            .models
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();
        slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().snapshot.exists())
            .map(|(id, _)| id)
            .collect()
    }

    /// A copy of a model's sync log.
    #[must_use]
    pub fn sync_log(&self, id: &Id) -> Option<SyncLog> {
        let slot = self.slot(id)?;
        let guard = slot.lock();
        Some(guard.log.clone())
    }

    /// Records that the remote side holds a model's changes up to `revision`.
    pub fn acknowledge(&self, id: &Id, revision: i64) -> CoreResult<()> {
        let slot = self
            .slot(id)
            .ok_or_else(|| CoreError::invalid_operation(format!("unknown model {id}")))?;
        let mut guard = slot.lock();
        guard.log.set_sync_revision(revision)
    }

    /// Address of a model in this repository.
    pub fn model_address(&self, id: Id) -> CoreResult<Address> {
        self.address.child(id)
    }
}
