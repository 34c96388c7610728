//! In-process append-only record log.

use crate::model::coordinate::Coordinate;
use crate::store::{new_record_id, EventStore, Record, StoreResult};
use log::{debug, warn};
use std::cell::RefCell;

/// Event store keeping every published record in memory.
///
/// Intended for tests and short-lived tools. Not `Sync`; share it between
/// services by reference.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    log: RefCell<Vec<Record>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `records`, in publish order.
    ///
    /// Records without an id receive one.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let log = records
            .into_iter()
            .map(|mut record| {
                record.id.get_or_insert_with(new_record_id);
                record
            })
            .collect();
        Self {
            log: RefCell::new(log),
        }
    }

    /// Snapshot of every record in publish order.
    pub fn records(&self) -> Vec<Record> {
        self.log.borrow().clone()
    }

    /// Number of published records, all versions included.
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Every version of `coordinate`, oldest publish first.
    pub fn versions_of(&self, coordinate: &Coordinate) -> Vec<Record> {
        self.log
            .borrow()
            .iter()
            .filter(|record| record.is_version_of(coordinate))
            .cloned()
            .collect()
    }
}

impl EventStore for MemoryEventStore {
    fn get_latest_by_coordinate(&self, coordinate: &Coordinate) -> StoreResult<Option<Record>> {
        let log = self.log.borrow();
        // Later publishes win ties because max_by_key keeps the last maximum.
        let latest = log
            .iter()
            .filter(|record| record.is_version_of(coordinate))
            .max_by_key(|record| record.created_at)
            .cloned();
        Ok(latest)
    }

    fn get_by_id(&self, record_id: &str) -> StoreResult<Option<Record>> {
        let found = self
            .log
            .borrow()
            .iter()
            .find(|record| record.id.as_deref() == Some(record_id))
            .cloned();
        Ok(found)
    }

    fn publish(&self, record: &Record) -> StoreResult<bool> {
        let mut log = self.log.borrow_mut();
        let mut record = record.clone();
        if record.identifier().is_none() {
            warn!(
                "event=record_publish module=store status=rejected backend=memory reason=missing_identifier kind={}",
                record.kind
            );
            return Ok(false);
        }
        let record_id = record.id.get_or_insert_with(new_record_id).clone();

        if log
            .iter()
            .any(|stored| stored.id.as_deref() == Some(record_id.as_str()))
        {
            warn!(
                "event=record_publish module=store status=rejected backend=memory reason=duplicate_id record_id={record_id}"
            );
            return Ok(false);
        }

        debug!(
            "event=record_publish module=store status=ok backend=memory kind={} record_id={record_id}",
            record.kind
        );
        log.push(record);
        Ok(true)
    }
}
