//! Attribute names and the helpers shared by every mapping.

use crate::error::{ProtocolError, ProtocolResult};
use revtree_codec::Record;
use revtree_core::{Address, Id, Intent, RevisionBound};

pub(crate) const TYPE: &str = "type";
pub(crate) const ID: &str = "id";
pub(crate) const ACTOR: &str = "actor";
pub(crate) const FORCED: &str = "forced";
pub(crate) const REVISION: &str = "revision";
pub(crate) const RELATIVE: &str = "relative";
pub(crate) const MODEL_REVISION: &str = "modelRevision";
pub(crate) const OBJECT_REVISION: &str = "objectRevision";
pub(crate) const FIELD_REVISION: &str = "fieldRevision";
pub(crate) const IMPLIED: &str = "implied";
pub(crate) const IN_TRANSACTION: &str = "inTransaction";
pub(crate) const KIND: &str = "kind";
pub(crate) const BASE_REVISION: &str = "baseRevision";
pub(crate) const SYNC_REVISION: &str = "syncRevision";

const REPOSITORY_ID: &str = "repositoryId";
const MODEL_ID: &str = "modelId";
const OBJECT_ID: &str = "objectId";
const FIELD_ID: &str = "fieldId";

pub(crate) fn write_address(record: &mut Record, address: &Address) {
    record.set_attr(REPOSITORY_ID, address.repository_id());
    if let Some(id) = address.model_id() {
        record.set_attr(MODEL_ID, id);
    }
    if let Some(id) = address.object_id() {
        record.set_attr(OBJECT_ID, id);
    }
    if let Some(id) = address.field_id() {
        record.set_attr(FIELD_ID, id);
    }
}

pub(crate) fn read_id(record: &Record, key: &str) -> ProtocolResult<Option<Id>> {
    record
        .attr(key)
        .map(|raw| Id::new(raw).map_err(|e| ProtocolError::parse(&record.name, e)))
        .transpose()
}

pub(crate) fn read_address(record: &Record) -> ProtocolResult<Address> {
    Address::new(
        read_id(record, REPOSITORY_ID)?,
        read_id(record, MODEL_ID)?,
        read_id(record, OBJECT_ID)?,
        read_id(record, FIELD_ID)?,
    )
    .map_err(|e| ProtocolError::parse(&record.name, e))
}

pub(crate) fn write_revision(record: &mut Record, key: &str, revision: Option<i64>) {
    if let Some(revision) = revision {
        record.set_attr(key, revision);
    }
}

pub(crate) fn write_intent(record: &mut Record, intent: Intent) {
    match intent {
        Intent::Forced => record.set_flag(FORCED, true),
        Intent::SafeStateBound => {}
        Intent::SafeRevBound(RevisionBound::Absolute(revision)) => {
            record.set_attr(REVISION, revision);
        }
        Intent::SafeRevBound(RevisionBound::Relative(offset)) => {
            record.set_attr(REVISION, offset);
            record.set_flag(RELATIVE, true);
        }
    }
}

/// Reads the intent attributes.
///
/// Besides the flag form written by [`write_intent`], a bare `revision`
/// holding one of the raw sentinels is accepted.
pub(crate) fn read_intent(record: &Record) -> ProtocolResult<Intent> {
    let forced = record.flag(FORCED)?;
    let relative = record.flag(RELATIVE)?;
    let revision = record.parse_attr::<i64>(REVISION)?;
    let intent = match (forced, relative, revision) {
        (true, false, None) => Ok(Intent::Forced),
        (true, _, _) => {
            return Err(ProtocolError::parse(
                &record.name,
                "forced commands carry no revision",
            ))
        }
        (false, false, None) => Ok(Intent::SafeStateBound),
        (false, true, None) => {
            return Err(ProtocolError::parse(
                &record.name,
                "relative flag without revision",
            ))
        }
        (false, true, Some(offset)) => Intent::relative(offset),
        (false, false, Some(raw)) => Intent::from_raw(raw),
    };
    intent.map_err(|e| ProtocolError::parse(&record.name, e))
}
