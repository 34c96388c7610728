//! Event store contract and bundled local implementations.
//!
//! # Responsibility
//! - Define the narrow read/publish interface services depend on.
//! - Provide in-memory and SQLite record logs implementing it with
//!   last-write-wins reads.
//!
//! # Invariants
//! - Stores are append-only; publishing never rewrites an older record.
//! - "Latest" means greatest `created_at`; ties go to the later publish.
//! - A `false` publish result means the store refused the record; transport
//!   or storage failures are reported as `StoreError`.
//! - Records whose `d` tag is absent or valueless are refused and never
//!   match a coordinate lookup.

use crate::db::DbError;
use crate::model::coordinate::Coordinate;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod record;
pub mod sqlite;

pub use memory::MemoryEventStore;
pub use record::{Record, Tag};
pub use sqlite::SqliteEventStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from event store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Tag payload could not be encoded or decoded.
    Json(serde_json::Error),
    /// Persisted data cannot be converted to a record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store requires table `{table}`")
            }
            Self::Json(err) => write!(f, "invalid record tags: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored record: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Record source and sink used by drive/folder services.
///
/// Implementations decide replacement order between versions of one
/// coordinate; services never compare timestamps themselves.
pub trait EventStore {
    /// Latest record published under `coordinate`.
    fn get_latest_by_coordinate(&self, coordinate: &Coordinate) -> StoreResult<Option<Record>>;

    /// Latest record for each coordinate that has one.
    ///
    /// Coordinates without a record are absent from the map.
    fn get_latest_by_coordinates(
        &self,
        coordinates: &[Coordinate],
    ) -> StoreResult<HashMap<Coordinate, Record>> {
        let mut found = HashMap::with_capacity(coordinates.len());
        for coordinate in coordinates {
            if found.contains_key(coordinate) {
                continue;
            }
            if let Some(record) = self.get_latest_by_coordinate(coordinate)? {
                found.insert(coordinate.clone(), record);
            }
        }
        Ok(found)
    }

    /// Record with the given id, whatever its version status.
    fn get_by_id(&self, record_id: &str) -> StoreResult<Option<Record>>;

    /// Publishes one record. Returns `false` when the store refuses it.
    fn publish(&self, record: &Record) -> StoreResult<bool>;
}

impl<S: EventStore + ?Sized> EventStore for &S {
    fn get_latest_by_coordinate(&self, coordinate: &Coordinate) -> StoreResult<Option<Record>> {
        (**self).get_latest_by_coordinate(coordinate)
    }

    fn get_latest_by_coordinates(
        &self,
        coordinates: &[Coordinate],
    ) -> StoreResult<HashMap<Coordinate, Record>> {
        (**self).get_latest_by_coordinates(coordinates)
    }

    fn get_by_id(&self, record_id: &str) -> StoreResult<Option<Record>> {
        (**self).get_by_id(record_id)
    }

    fn publish(&self, record: &Record) -> StoreResult<bool> {
        (**self).publish(record)
    }
}

/// Generates a store-local record id.
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
