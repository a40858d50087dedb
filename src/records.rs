use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::record::{records_from_values, ProjectRecord};
use crate::storage::{SlotError, StoreHandle, PROJECTS_KEY};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read stored projects: {0}")]
    Read(#[source] SlotError),
    #[error("stored projects are not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("stored projects are not a list")]
    NotAList,
    #[error("failed to encode projects: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to save projects: {0}")]
    Write(#[source] SlotError),
    #[error("no project at position {position} (list has {len})")]
    InvalidPosition { position: usize, len: usize },
}

/// Result of the save that follows every mutation. A failed save leaves the
/// in-memory list as the working copy for the rest of the session.
#[must_use]
#[derive(Debug)]
pub enum Persisted {
    Saved,
    Failed(StoreError),
}

impl Persisted {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persisted::Saved)
    }

    pub fn into_result(self) -> Result<(), StoreError> {
        match self {
            Persisted::Saved => Ok(()),
            Persisted::Failed(err) => Err(err),
        }
    }
}

impl From<Result<(), StoreError>> for Persisted {
    fn from(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Persisted::Saved,
            Err(err) => Persisted::Failed(err),
        }
    }
}

/// The authoritative ordered list of projects, mirrored to the projects slot.
#[derive(Debug)]
pub struct RecordStore {
    slots: StoreHandle,
    records: Vec<ProjectRecord>,
}

impl RecordStore {
    /// Create an empty store without reading the slot.
    pub fn new(slots: StoreHandle) -> Self {
        Self {
            slots,
            records: Vec::new(),
        }
    }

    /// Create a store and load it. A failed load is returned alongside the
    /// (empty) store rather than instead of it.
    pub fn open(slots: StoreHandle) -> (Self, Result<usize, StoreError>) {
        let mut store = Self::new(slots);
        let loaded = store.load();
        (store, loaded)
    }

    /// Replace the in-memory list with the slot contents.
    ///
    /// An absent slot loads as an empty list. On error the list is left empty.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        match read_slot(&self.slots) {
            Ok(records) => {
                self.records = records;
                info!(target: "folio", event = "projects_loaded", count = self.records.len());
                Ok(self.records.len())
            }
            Err(err) => {
                self.records.clear();
                warn!(target: "folio", event = "projects_load_failed", error = %err);
                Err(err)
            }
        }
    }

    /// Serialize the whole list to the slot. The write is not retried.
    pub fn save(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.records).map_err(StoreError::Encode)?;
        match self.slots.set(PROJECTS_KEY, &payload) {
            Ok(()) => {
                info!(target: "folio", event = "projects_saved", count = self.records.len());
                Ok(())
            }
            Err(err) => {
                warn!(
                    target: "folio",
                    event = "projects_save_failed",
                    count = self.records.len(),
                    error = %err
                );
                Err(StoreError::Write(err))
            }
        }
    }

    pub fn append(&mut self, record: ProjectRecord) -> Persisted {
        self.records.push(record);
        self.save().into()
    }

    pub fn replace_at(
        &mut self,
        position: usize,
        record: ProjectRecord,
    ) -> Result<Persisted, StoreError> {
        self.check_position(position)?;
        self.records[position] = record;
        Ok(self.save().into())
    }

    pub fn remove_at(&mut self, position: usize) -> Result<(ProjectRecord, Persisted), StoreError> {
        self.check_position(position)?;
        let removed = self.records.remove(position);
        Ok((removed, self.save().into()))
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&ProjectRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn slots(&self) -> &StoreHandle {
        &self.slots
    }

    pub(crate) fn check_position(&self, position: usize) -> Result<(), StoreError> {
        if position < self.records.len() {
            Ok(())
        } else {
            Err(StoreError::InvalidPosition {
                position,
                len: self.records.len(),
            })
        }
    }
}

fn read_slot(slots: &StoreHandle) -> Result<Vec<ProjectRecord>, StoreError> {
    let Some(raw) = slots.get(PROJECTS_KEY).map_err(StoreError::Read)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Value>(&raw).map_err(StoreError::Decode)? {
        Value::Array(values) => Ok(records_from_values(values)),
        _ => Err(StoreError::NotAList),
    }
}
