//! Folder membership entry.
//!
//! # Invariants
//! - Entry identity is its coordinate; hints never take part in equality
//!   checks done by folders and services.
//! - Hint updates merge: `None` keeps the prior value.

use crate::model::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

/// One membership relation from a folder to an addressable object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    coordinate: Coordinate,
    relay_hint: Option<String>,
    last_seen_record_id: Option<String>,
    name_hint: Option<String>,
}

impl FolderEntry {
    /// Creates an entry with no hints.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            relay_hint: None,
            last_seen_record_id: None,
            name_hint: None,
        }
    }

    /// Creates an entry with every hint given explicitly.
    pub fn with_all_hints(
        coordinate: Coordinate,
        relay_hint: Option<String>,
        last_seen_record_id: Option<String>,
        name_hint: Option<String>,
    ) -> Self {
        Self {
            coordinate,
            relay_hint,
            last_seen_record_id,
            name_hint,
        }
    }

    /// Returns a copy with hints merged in.
    ///
    /// A `None` argument keeps the current value; it never clears it.
    pub fn with_hints(
        &self,
        relay_hint: Option<String>,
        last_seen_record_id: Option<String>,
        name_hint: Option<String>,
    ) -> Self {
        Self {
            coordinate: self.coordinate.clone(),
            relay_hint: relay_hint.or_else(|| self.relay_hint.clone()),
            last_seen_record_id: last_seen_record_id
                .or_else(|| self.last_seen_record_id.clone()),
            name_hint: name_hint.or_else(|| self.name_hint.clone()),
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn kind(&self) -> u32 {
        self.coordinate.kind()
    }

    pub fn relay_hint(&self) -> Option<&str> {
        self.relay_hint.as_deref()
    }

    pub fn last_seen_record_id(&self) -> Option<&str> {
        self.last_seen_record_id.as_deref()
    }

    pub fn name_hint(&self) -> Option<&str> {
        self.name_hint.as_deref()
    }

    /// Returns whether this entry points at `coordinate`.
    pub fn refers_to(&self, coordinate: &Coordinate) -> bool {
        &self.coordinate == coordinate
    }
}

impl From<Coordinate> for FolderEntry {
    fn from(value: Coordinate) -> Self {
        Self::new(value)
    }
}
