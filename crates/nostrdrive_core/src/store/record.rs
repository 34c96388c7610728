//! Wire record envelope.

use crate::model::coordinate::{Coordinate, CoordinateError};
use serde::{Deserialize, Serialize};

/// One structured field of a record: a discriminator followed by values.
pub type Tag = Vec<String>;

/// Tag discriminator carrying the record identifier.
pub const TAG_IDENTIFIER: &str = "d";

/// Timestamped envelope published to and read from an event store.
///
/// Field names follow the protocol's JSON form (`pubkey`, `created_at`).
/// Signatures are outside this crate, so no `sig` field is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: u32,
    /// Owner public key, hex encoded.
    #[serde(rename = "pubkey")]
    pub owner: String,
    /// Unix seconds.
    pub created_at: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Record {
    /// Creates an unpublished record (no id, empty content).
    pub fn new(kind: u32, owner: impl Into<String>, created_at: i64, tags: Vec<Tag>) -> Self {
        Self {
            id: None,
            kind,
            owner: owner.into(),
            created_at,
            content: String::new(),
            tags,
        }
    }

    /// First value of the first tag named `name`.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().map(String::as_str) == Some(name))
            .and_then(|tag| tag.get(1))
            .map(String::as_str)
    }

    /// Value of the identifier tag.
    ///
    /// `None` when the `d` tag is absent or carries no value. Such records
    /// have no coordinate and are never returned by coordinate lookups.
    pub fn identifier(&self) -> Option<&str> {
        self.tag_value(TAG_IDENTIFIER)
    }

    /// Coordinate this record replaces under, when it has one.
    pub fn coordinate(&self) -> Option<Result<Coordinate, CoordinateError>> {
        self.identifier()
            .map(|identifier| Coordinate::new(self.kind, self.owner.as_str(), identifier))
    }

    /// Returns whether this record is a version of `coordinate`.
    pub fn is_version_of(&self, coordinate: &Coordinate) -> bool {
        self.kind == coordinate.kind()
            && self.owner == coordinate.owner()
            && self.identifier() == Some(coordinate.identifier())
    }
}
