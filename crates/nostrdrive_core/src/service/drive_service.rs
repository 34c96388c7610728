//! Drive use-case service.
//!
//! # Invariants
//! - Roots are folder coordinates without repeats on every published
//!   version.
//! - Mutations are read-modify-write without compare-and-swap; the later of
//!   two concurrent publishes wins.

use super::{
    ensure_kind, fetch_latest, next_created_at, now_unix_seconds, publish_record,
    validate_identifier, validate_replacement_title, validate_title, Clock,
};
use crate::codec::{decode_drive, decode_folder, encode_drive};
use crate::error::{DriveError, DriveResult};
use crate::model::address::Address;
use crate::model::coordinate::Coordinate;
use crate::model::drive::Drive;
use crate::model::folder::Folder;
use crate::model::DRIVE_KIND;
use crate::store::EventStore;
use std::collections::HashSet;

/// Input for [`DriveService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDrive {
    pub identifier: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub roots: Vec<Coordinate>,
}

impl NewDrive {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }
}

/// Drive operations over an event store.
pub struct DriveService<S: EventStore> {
    store: S,
    clock: Clock,
}

impl<S: EventStore> DriveService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: now_unix_seconds,
        }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates and publishes a drive owned by `owner`.
    ///
    /// # Contract
    /// - `identifier` must not be blank; a present title must not be blank.
    /// - Roots must be distinct folder coordinates.
    pub fn create(&self, owner: &Address, request: NewDrive) -> DriveResult<Drive> {
        validate_identifier(&request.identifier)?;
        validate_title(request.title.as_deref())?;
        ensure_distinct_roots(&request.roots)?;

        let coordinate = owner.coordinate(DRIVE_KIND, request.identifier)?;
        let mut drive = Drive::new(coordinate, request.roots)?;
        drive.set_title(request.title);
        drive.set_description(request.description);
        self.publish(drive, 0)
    }

    /// Latest version of the drive at `coordinate`.
    ///
    /// # Errors
    /// - `Validation` when `coordinate` is not a drive coordinate.
    /// - `NotFound` when the store has no record for it.
    pub fn get(&self, coordinate: &Coordinate) -> DriveResult<Drive> {
        ensure_kind(coordinate, DRIVE_KIND, "drive")?;
        let record = fetch_latest(&self.store, coordinate)?;
        Ok(decode_drive(&record)?)
    }

    /// Drive version stored under `record_id`.
    pub fn get_by_id(&self, record_id: &str) -> DriveResult<Drive> {
        match self.store.get_by_id(record_id)? {
            Some(record) if record.kind == DRIVE_KIND => Ok(decode_drive(&record)?),
            _ => Err(DriveError::not_found(format!("drive record {record_id}"))),
        }
    }

    /// Publishes a caller-edited drive as the next version.
    ///
    /// A title carried over unchanged from the stored version is not
    /// re-validated.
    pub fn update(&self, drive: &Drive) -> DriveResult<Drive> {
        ensure_distinct_roots(drive.roots())?;
        let previous = self.store.get_latest_by_coordinate(drive.coordinate())?;
        validate_replacement_title(drive.title(), previous.as_ref())?;
        let floor = previous
            .map_or(0, |record| record.created_at)
            .max(drive.created_at());
        self.publish(drive.clone(), floor)
    }

    pub fn set_title(&self, coordinate: &Coordinate, title: Option<String>) -> DriveResult<Drive> {
        validate_title(title.as_deref())?;
        let mut drive = self.get(coordinate)?;
        drive.set_title(title);
        self.publish_next(drive)
    }

    pub fn set_description(
        &self,
        coordinate: &Coordinate,
        description: Option<String>,
    ) -> DriveResult<Drive> {
        let mut drive = self.get(coordinate)?;
        drive.set_description(description);
        self.publish_next(drive)
    }

    /// Marks the drive archived and publishes it.
    pub fn archive(&self, coordinate: &Coordinate) -> DriveResult<Drive> {
        let mut drive = self.get(coordinate)?;
        drive.archive();
        self.publish_next(drive)
    }

    /// Replaces all roots, in the given order.
    ///
    /// # Errors
    /// - `Validation` when a root is not a folder coordinate.
    /// - `DuplicateEntry` when a root repeats.
    pub fn set_roots(&self, coordinate: &Coordinate, roots: Vec<Coordinate>) -> DriveResult<Drive> {
        ensure_distinct_roots(&roots)?;
        let mut drive = self.get(coordinate)?;
        drive.set_roots(roots)?;
        self.publish_next(drive)
    }

    /// Appends one root folder.
    pub fn add_root(&self, coordinate: &Coordinate, root: Coordinate) -> DriveResult<Drive> {
        let mut drive = self.get(coordinate)?;
        drive.add_root(root)?;
        self.publish_next(drive)
    }

    /// Removes one root folder. Absent roots publish nothing.
    pub fn remove_root(&self, coordinate: &Coordinate, root: &Coordinate) -> DriveResult<Drive> {
        let mut drive = self.get(coordinate)?;
        if !drive.remove_root(root) {
            return Ok(drive);
        }
        self.publish_next(drive)
    }

    /// Latest version of every root folder, in root order.
    ///
    /// Roots without a record are skipped.
    pub fn root_folders(&self, coordinate: &Coordinate) -> DriveResult<Vec<Folder>> {
        let drive = self.get(coordinate)?;
        let found = self.store.get_latest_by_coordinates(drive.roots())?;
        drive
            .roots()
            .iter()
            .filter_map(|root| found.get(root))
            .map(|record| decode_folder(record).map_err(DriveError::from))
            .collect()
    }

    fn publish_next(&self, drive: Drive) -> DriveResult<Drive> {
        let floor = drive.created_at();
        self.publish(drive, floor)
    }

    fn publish(&self, mut drive: Drive, created_at_floor: i64) -> DriveResult<Drive> {
        drive.set_created_at(next_created_at(self.clock, created_at_floor));
        let record = encode_drive(&drive);
        publish_record(&self.store, &record, drive.coordinate(), "drive")?;
        drive.set_record_id(None);
        Ok(drive)
    }
}

fn ensure_distinct_roots(roots: &[Coordinate]) -> DriveResult<()> {
    let mut seen = HashSet::with_capacity(roots.len());
    match roots.iter().find(|root| !seen.insert(*root)) {
        Some(root) => Err(DriveError::DuplicateEntry(root.clone())),
        None => Ok(()),
    }
}
