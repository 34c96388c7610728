//! Folder aggregate.
//!
//! # Responsibility
//! - Hold the ordered membership of one folder plus its metadata.
//!
//! # Invariants
//! - The folder coordinate always has kind `FOLDER_KIND`.
//! - Entry order is the canonical application order.
//! - `add_entry` rejects duplicate coordinates; construction and
//!   `set_entries` trust their input (decoded records are taken verbatim).
//! - Member kind policy is not enforced here; see `KindValidator`.

use crate::model::coordinate::Coordinate;
use crate::model::entry::FolderEntry;
use crate::model::{ensure_kind, ModelError, FOLDER_KIND};
use serde::Serialize;

/// Folder aggregate keyed by its own coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    coordinate: Coordinate,
    title: Option<String>,
    description: Option<String>,
    entries: Vec<FolderEntry>,
    record_id: Option<String>,
    created_at: i64,
    archived: bool,
}

impl Folder {
    /// Creates an empty folder.
    ///
    /// # Errors
    /// - `KindMismatch` when `coordinate` is not a folder coordinate.
    pub fn new(coordinate: Coordinate) -> Result<Self, ModelError> {
        Self::with_entries(coordinate, Vec::new())
    }

    /// Creates a folder with entries taken in the given order.
    pub fn with_entries(
        coordinate: Coordinate,
        entries: Vec<FolderEntry>,
    ) -> Result<Self, ModelError> {
        ensure_kind(&coordinate, FOLDER_KIND)?;
        Ok(Self {
            coordinate,
            title: None,
            description: None,
            entries,
            record_id: None,
            created_at: 0,
            archived: false,
        })
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn identifier(&self) -> &str {
        self.coordinate.identifier()
    }

    pub fn owner(&self) -> &str {
        self.coordinate.owner()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[FolderEntry] {
        &self.entries
    }

    /// Entry coordinates in canonical order.
    pub fn entry_coordinates(&self) -> Vec<Coordinate> {
        self.entries
            .iter()
            .map(|entry| entry.coordinate().clone())
            .collect()
    }

    /// Replaces all entries, keeping the given order.
    pub fn set_entries(&mut self, entries: Vec<FolderEntry>) {
        self.entries = entries;
    }

    /// Appends one entry.
    ///
    /// # Errors
    /// - `DuplicateMember` when an entry with the same coordinate exists.
    pub fn add_entry(&mut self, entry: FolderEntry) -> Result<(), ModelError> {
        if self.has_entry(entry.coordinate()) {
            return Err(ModelError::DuplicateMember(entry.coordinate().clone()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Removes the entry for `coordinate`, returning it when present.
    pub fn remove_entry(&mut self, coordinate: &Coordinate) -> Option<FolderEntry> {
        let position = self.position_of(coordinate)?;
        Some(self.entries.remove(position))
    }

    /// Replaces the entry sharing `entry`'s coordinate in place.
    ///
    /// Returns `false` when no such entry exists.
    pub fn replace_entry(&mut self, entry: FolderEntry) -> bool {
        match self.position_of(entry.coordinate()) {
            Some(position) => {
                self.entries[position] = entry;
                true
            }
            None => false,
        }
    }

    pub fn has_entry(&self, coordinate: &Coordinate) -> bool {
        self.position_of(coordinate).is_some()
    }

    /// Zero-based position of `coordinate` in the entry order.
    pub fn position_of(&self, coordinate: &Coordinate) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.refers_to(coordinate))
    }

    pub fn entry(&self, coordinate: &Coordinate) -> Option<&FolderEntry> {
        self.entries.iter().find(|entry| entry.refers_to(coordinate))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the record this folder was decoded from.
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn set_record_id(&mut self, record_id: Option<String>) {
        self.record_id = record_id;
    }

    /// Unix seconds of the record version.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn set_created_at(&mut self, created_at: i64) {
        self.created_at = created_at;
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Marks the folder archived. There is no un-archive.
    pub fn archive(&mut self) {
        self.archived = true;
    }
}
