//! Domain model for drives, folders and their coordinates.
//!
//! # Responsibility
//! - Define the value types (`Coordinate`, `Address`, `FolderEntry`).
//! - Define the mutable aggregates (`Folder`, `Drive`) and their
//!   kind/membership invariants.
//!
//! # Invariants
//! - Every aggregate is identified by a coordinate of its own fixed kind.
//! - Membership order is significant and preserved by every mutator.
//! - Aggregates never perform I/O; publication belongs to services.

use crate::model::coordinate::Coordinate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod address;
pub mod coordinate;
pub mod drive;
pub mod entry;
pub mod folder;

/// Record kind of a drive.
pub const DRIVE_KIND: u32 = 30_042;
/// Record kind of a folder.
pub const FOLDER_KIND: u32 = 30_045;

/// Aggregate invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Aggregate coordinate has the wrong kind.
    KindMismatch { expected: u32, actual: Coordinate },
    /// Drive root is not a folder coordinate.
    RootNotFolder(Coordinate),
    /// Coordinate is already a member.
    DuplicateMember(Coordinate),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindMismatch { expected, actual } => write!(
                f,
                "coordinate {actual} has kind {}, expected {expected}",
                actual.kind()
            ),
            Self::RootNotFolder(coordinate) => write!(
                f,
                "drive root {coordinate} is not a folder (kind {FOLDER_KIND})"
            ),
            Self::DuplicateMember(coordinate) => {
                write!(f, "coordinate is already a member: {coordinate}")
            }
        }
    }
}

impl Error for ModelError {}

pub(crate) fn ensure_kind(coordinate: &Coordinate, expected: u32) -> Result<(), ModelError> {
    if coordinate.kind() != expected {
        return Err(ModelError::KindMismatch {
            expected,
            actual: coordinate.clone(),
        });
    }
    Ok(())
}
