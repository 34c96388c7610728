//! Folder use-case service.
//!
//! # Responsibility
//! - Create, read and edit folders through an `EventStore`.
//! - Enforce member kind policy and membership uniqueness on writes.
//!
//! # Invariants
//! - Member kinds are checked before any store interaction.
//! - A failed precondition publishes nothing.
//! - Entry hints survive reorders and moves.
//!
//! # Concurrency
//! Mutations read the latest version, change it in memory and publish a
//! replacement. There is no compare-and-swap: two editors working from the
//! same version race, and the later publish wins.

use super::{
    ensure_kind, fetch_latest, next_created_at, now_unix_seconds, publish_record,
    validate_identifier, validate_replacement_title, validate_title, Clock,
};
use crate::codec::{decode_folder, encode_folder};
use crate::error::{DriveError, DriveResult};
use crate::model::address::Address;
use crate::model::coordinate::Coordinate;
use crate::model::entry::FolderEntry;
use crate::model::folder::Folder;
use crate::model::FOLDER_KIND;
use crate::store::{EventStore, Record};
use crate::validation::kind::KindValidator;
use log::info;
use std::collections::HashSet;

/// Input for [`FolderService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFolder {
    pub identifier: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub entries: Vec<FolderEntry>,
}

impl NewFolder {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }
}

/// Both folders as published by [`FolderService::move_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedEntry {
    pub source: Folder,
    pub destination: Folder,
}

/// One folder entry paired with the latest record it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub entry: FolderEntry,
    /// `None` when the store has no record for the entry coordinate.
    pub record: Option<Record>,
}

/// Folder operations over an event store.
pub struct FolderService<S: EventStore> {
    store: S,
    kinds: KindValidator,
    clock: Clock,
}

impl<S: EventStore> FolderService<S> {
    /// Creates a service using the standard member kind allow-list.
    pub fn new(store: S) -> Self {
        Self::with_kinds(store, KindValidator::default())
    }

    pub fn with_kinds(store: S, kinds: KindValidator) -> Self {
        Self {
            store,
            kinds,
            clock: now_unix_seconds,
        }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn kinds(&self) -> &KindValidator {
        &self.kinds
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates and publishes a folder owned by `owner`.
    ///
    /// # Contract
    /// - `identifier` must not be blank; a present title must not be blank.
    /// - Every initial entry must have an allowed kind and a unique
    ///   coordinate.
    /// - An existing folder with the same coordinate is replaced.
    pub fn create(&self, owner: &Address, request: NewFolder) -> DriveResult<Folder> {
        validate_identifier(&request.identifier)?;
        validate_title(request.title.as_deref())?;
        self.validate_entries(&request.entries, &HashSet::new())?;

        let coordinate = owner.coordinate(FOLDER_KIND, request.identifier)?;
        let mut folder = Folder::with_entries(coordinate, request.entries)?;
        folder.set_title(request.title);
        folder.set_description(request.description);
        self.publish(folder, 0)
    }

    /// Latest version of the folder at `coordinate`.
    ///
    /// # Errors
    /// - `Validation` when `coordinate` is not a folder coordinate.
    /// - `NotFound` when the store has no record for it.
    pub fn get(&self, coordinate: &Coordinate) -> DriveResult<Folder> {
        ensure_kind(coordinate, FOLDER_KIND, "folder")?;
        let record = fetch_latest(&self.store, coordinate)?;
        Ok(decode_folder(&record)?)
    }

    /// Latest versions of several folders, in input order.
    ///
    /// Folders without a record are omitted.
    pub fn get_many(&self, coordinates: &[Coordinate]) -> DriveResult<Vec<Folder>> {
        for coordinate in coordinates {
            ensure_kind(coordinate, FOLDER_KIND, "folder")?;
        }
        let found = self.store.get_latest_by_coordinates(coordinates)?;
        coordinates
            .iter()
            .filter_map(|coordinate| found.get(coordinate))
            .map(|record| decode_folder(record).map_err(DriveError::from))
            .collect()
    }

    /// Folder version stored under `record_id`.
    pub fn get_by_id(&self, record_id: &str) -> DriveResult<Folder> {
        match self.store.get_by_id(record_id)? {
            Some(record) if record.kind == FOLDER_KIND => Ok(decode_folder(&record)?),
            _ => Err(DriveError::not_found(format!("folder record {record_id}"))),
        }
    }

    /// Publishes a caller-edited folder as the next version.
    ///
    /// # Contract
    /// - Membership must be unique.
    /// - A changed title and members absent from the stored version are
    ///   validated as on create. Values carried over from the stored version
    ///   are trusted as published.
    /// - The folder need not exist yet.
    pub fn update(&self, folder: &Folder) -> DriveResult<Folder> {
        let previous = self.store.get_latest_by_coordinate(folder.coordinate())?;
        validate_replacement_title(folder.title(), previous.as_ref())?;
        let stored_members: HashSet<Coordinate> = previous
            .as_ref()
            .and_then(|record| decode_folder(record).ok())
            .map(|stored| {
                stored
                    .entries()
                    .iter()
                    .map(|entry| entry.coordinate().clone())
                    .collect()
            })
            .unwrap_or_default();
        self.validate_entries(folder.entries(), &stored_members)?;
        let floor = previous
            .map_or(0, |record| record.created_at)
            .max(folder.created_at());
        self.publish(folder.clone(), floor)
    }

    pub fn set_title(&self, coordinate: &Coordinate, title: Option<String>) -> DriveResult<Folder> {
        validate_title(title.as_deref())?;
        let mut folder = self.get(coordinate)?;
        folder.set_title(title);
        self.publish_next(folder)
    }

    pub fn set_description(
        &self,
        coordinate: &Coordinate,
        description: Option<String>,
    ) -> DriveResult<Folder> {
        let mut folder = self.get(coordinate)?;
        folder.set_description(description);
        self.publish_next(folder)
    }

    /// Replaces the whole membership, in the given order.
    pub fn set_entries(
        &self,
        coordinate: &Coordinate,
        entries: Vec<FolderEntry>,
    ) -> DriveResult<Folder> {
        self.validate_entries(&entries, &HashSet::new())?;
        let mut folder = self.get(coordinate)?;
        folder.set_entries(entries);
        self.publish_next(folder)
    }

    /// Merges hints into the entry for `member`. `None` keeps a hint.
    ///
    /// # Errors
    /// - `NotFound` when `member` is not in the folder.
    pub fn update_entry_hints(
        &self,
        coordinate: &Coordinate,
        member: &Coordinate,
        relay_hint: Option<String>,
        last_seen_record_id: Option<String>,
        name_hint: Option<String>,
    ) -> DriveResult<Folder> {
        let mut folder = self.get(coordinate)?;
        let updated = folder
            .entry(member)
            .ok_or_else(|| DriveError::not_found(format!("{member} in folder {coordinate}")))?
            .with_hints(relay_hint, last_seen_record_id, name_hint);
        folder.replace_entry(updated);
        self.publish_next(folder)
    }

    /// Latest record of every entry, in entry order.
    pub fn resolve_entries(&self, coordinate: &Coordinate) -> DriveResult<Vec<ResolvedEntry>> {
        let folder = self.get(coordinate)?;
        let found = self
            .store
            .get_latest_by_coordinates(&folder.entry_coordinates())?;
        Ok(folder
            .entries()
            .iter()
            .map(|entry| ResolvedEntry {
                entry: entry.clone(),
                record: found.get(entry.coordinate()).cloned(),
            })
            .collect())
    }

    /// Marks the folder archived and publishes it.
    pub fn archive(&self, coordinate: &Coordinate) -> DriveResult<Folder> {
        let mut folder = self.get(coordinate)?;
        folder.archive();
        self.publish_next(folder)
    }

    /// Appends `entry` to the folder.
    ///
    /// # Errors
    /// - `InvalidKind` before any store interaction when the entry kind is
    ///   not allowed.
    /// - `DuplicateEntry` when the coordinate is already a member.
    pub fn add_entry(&self, coordinate: &Coordinate, entry: FolderEntry) -> DriveResult<Folder> {
        self.kinds.validate(entry.kind())?;
        let mut folder = self.get(coordinate)?;
        folder.add_entry(entry)?;
        self.publish_next(folder)
    }

    /// Removes `member` from the folder.
    ///
    /// Removing a coordinate that is not a member publishes nothing and
    /// returns the folder unchanged.
    pub fn remove_entry(&self, coordinate: &Coordinate, member: &Coordinate) -> DriveResult<Folder> {
        let mut folder = self.get(coordinate)?;
        if folder.remove_entry(member).is_none() {
            return Ok(folder);
        }
        self.publish_next(folder)
    }

    /// Moves `member` from `source` to the end of `destination`.
    ///
    /// # Contract
    /// - `NotFound` when `member` is not in `source`; nothing is published.
    /// - `DuplicateEntry` when `destination` already holds `member`.
    /// - The member kind is not checked against the allow-list; an existing
    ///   member keeps its place in the policy it was added under.
    /// - The destination is published first, then the source. The two
    ///   publishes are independent; a failure in between leaves the member
    ///   in both folders.
    pub fn move_entry(
        &self,
        member: &Coordinate,
        source: &Coordinate,
        destination: &Coordinate,
    ) -> DriveResult<MovedEntry> {
        if source == destination {
            return Err(DriveError::validation(
                "source and destination folders are the same",
            ));
        }

        let mut source_folder = self.get(source)?;
        let entry = source_folder
            .remove_entry(member)
            .ok_or_else(|| DriveError::not_found(format!("{member} in folder {source}")))?;
        let mut destination_folder = self.get(destination)?;
        destination_folder.add_entry(entry)?;

        let destination_folder = self.publish_next(destination_folder)?;
        let source_folder = self.publish_next(source_folder)?;
        info!(
            "event=folder_move_entry module=service status=ok member={member} source={source} destination={destination}"
        );
        Ok(MovedEntry {
            source: source_folder,
            destination: destination_folder,
        })
    }

    /// Reorders entries to follow `order`.
    ///
    /// # Errors
    /// - `Validation` unless `order` is an exact permutation of the current
    ///   members.
    pub fn reorder_entries(
        &self,
        coordinate: &Coordinate,
        order: &[Coordinate],
    ) -> DriveResult<Folder> {
        let mut folder = self.get(coordinate)?;
        if order.len() != folder.len() {
            return Err(DriveError::validation(format!(
                "reorder lists {} coordinates, folder has {} entries",
                order.len(),
                folder.len()
            )));
        }

        let mut seen = HashSet::with_capacity(order.len());
        let mut entries = Vec::with_capacity(order.len());
        for member in order {
            if !seen.insert(member) {
                return Err(DriveError::validation(format!(
                    "reorder lists {member} more than once"
                )));
            }
            let entry = folder.entry(member).ok_or_else(|| {
                DriveError::validation(format!("{member} is not an entry of {coordinate}"))
            })?;
            entries.push(entry.clone());
        }

        folder.set_entries(entries);
        self.publish_next(folder)
    }

    /// Checks uniqueness, and member kinds for entries outside `trusted`.
    fn validate_entries(
        &self,
        entries: &[FolderEntry],
        trusted: &HashSet<Coordinate>,
    ) -> DriveResult<()> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            if !trusted.contains(entry.coordinate()) {
                self.kinds.validate(entry.kind())?;
            }
            if !seen.insert(entry.coordinate()) {
                return Err(DriveError::DuplicateEntry(entry.coordinate().clone()));
            }
        }
        Ok(())
    }

    /// Publishes `folder` as the successor of its current version.
    fn publish_next(&self, folder: Folder) -> DriveResult<Folder> {
        let floor = folder.created_at();
        self.publish(folder, floor)
    }

    fn publish(&self, mut folder: Folder, created_at_floor: i64) -> DriveResult<Folder> {
        folder.set_created_at(next_created_at(self.clock, created_at_floor));
        let record = encode_folder(&folder);
        publish_record(&self.store, &record, folder.coordinate(), "folder")?;
        folder.set_record_id(None);
        Ok(folder)
    }
}
