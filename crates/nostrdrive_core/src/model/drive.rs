//! Drive aggregate.
//!
//! # Invariants
//! - The drive coordinate always has kind `DRIVE_KIND`.
//! - Every root is a folder coordinate, at construction and after every
//!   mutation.
//! - Root order is significant.

use crate::model::coordinate::Coordinate;
use crate::model::{ensure_kind, ModelError, DRIVE_KIND, FOLDER_KIND};
use serde::Serialize;

/// Root of one user namespace: an ordered list of top-level folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drive {
    coordinate: Coordinate,
    title: Option<String>,
    description: Option<String>,
    roots: Vec<Coordinate>,
    record_id: Option<String>,
    created_at: i64,
    archived: bool,
}

impl Drive {
    /// Creates a drive with the given root folders.
    ///
    /// # Errors
    /// - `KindMismatch` when `coordinate` is not a drive coordinate.
    /// - `RootNotFolder` when any root is not a folder coordinate.
    pub fn new(coordinate: Coordinate, roots: Vec<Coordinate>) -> Result<Self, ModelError> {
        ensure_kind(&coordinate, DRIVE_KIND)?;
        ensure_folder_roots(&roots)?;
        Ok(Self {
            coordinate,
            title: None,
            description: None,
            roots,
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

    pub fn roots(&self) -> &[Coordinate] {
        &self.roots
    }

    /// Replaces all roots. Nothing changes when any root is invalid.
    pub fn set_roots(&mut self, roots: Vec<Coordinate>) -> Result<(), ModelError> {
        ensure_folder_roots(&roots)?;
        self.roots = roots;
        Ok(())
    }

    /// Appends one root folder.
    pub fn add_root(&mut self, root: Coordinate) -> Result<(), ModelError> {
        ensure_folder_roots(std::slice::from_ref(&root))?;
        if self.has_root(&root) {
            return Err(ModelError::DuplicateMember(root));
        }
        self.roots.push(root);
        Ok(())
    }

    /// Removes `root`; returns `false` when it was not present.
    pub fn remove_root(&mut self, root: &Coordinate) -> bool {
        let before = self.roots.len();
        self.roots.retain(|current| current != root);
        self.roots.len() != before
    }

    pub fn has_root(&self, root: &Coordinate) -> bool {
        self.roots.iter().any(|current| current == root)
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn set_record_id(&mut self, record_id: Option<String>) {
        self.record_id = record_id;
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn set_created_at(&mut self, created_at: i64) {
        self.created_at = created_at;
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn archive(&mut self) {
        self.archived = true;
    }
}

fn ensure_folder_roots(roots: &[Coordinate]) -> Result<(), ModelError> {
    match roots.iter().find(|root| root.kind() != FOLDER_KIND) {
        Some(root) => Err(ModelError::RootNotFolder(root.clone())),
        None => Ok(()),
    }
}
