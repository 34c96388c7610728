//! Tag codec between aggregates and wire records.
//!
//! # Responsibility
//! - Shape `Folder`/`Drive` aggregates into ordered tag arrays.
//! - Rebuild aggregates from records, tolerating malformed membership tags.
//!
//! # Invariants
//! - The identifier tag is always the first tag of an encoded record.
//! - Membership tags keep aggregate order in both directions.
//! - `a` tags whose value does not parse as a coordinate are dropped; every
//!   other decode failure is an error.
//! - Owner and `created_at` are read from the envelope, never from tags.

use crate::model::coordinate::{Coordinate, CoordinateError};
use crate::model::ModelError;
use crate::store::record::TAG_IDENTIFIER;
use crate::store::{Record, Tag};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod drive;
mod folder;

pub use drive::{decode_drive, encode_drive};
pub use folder::{decode_folder, encode_folder};

pub const TAG_TITLE: &str = "title";
pub const TAG_DESCRIPTION: &str = "description";
pub const TAG_ADDRESS: &str = "a";
pub const TAG_STATUS: &str = "status";
/// `status` value marking an archived aggregate.
pub const STATUS_ARCHIVED: &str = "archived";

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Record kind differs from the aggregate being decoded.
    KindMismatch { expected: u32, actual: u32 },
    /// Record has no `d` tag.
    MissingIdentifier,
    /// Envelope kind/owner/identifier do not form a valid coordinate.
    InvalidCoordinate(CoordinateError),
    /// Decoded values violate an aggregate invariant.
    Model(ModelError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindMismatch { expected, actual } => {
                write!(f, "record kind {actual} cannot be decoded as kind {expected}")
            }
            Self::MissingIdentifier => write!(f, "record has no `{TAG_IDENTIFIER}` tag value"),
            Self::InvalidCoordinate(err) => write!(f, "record coordinate is invalid: {err}"),
            Self::Model(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCoordinate(err) => Some(err),
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoordinateError> for CodecError {
    fn from(value: CoordinateError) -> Self {
        Self::InvalidCoordinate(value)
    }
}

impl From<ModelError> for CodecError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Fields shared by every aggregate record.
struct Header {
    coordinate: Coordinate,
    title: Option<String>,
    description: Option<String>,
    archived: bool,
}

fn decode_header(record: &Record, expected_kind: u32) -> CodecResult<Header> {
    if record.kind != expected_kind {
        return Err(CodecError::KindMismatch {
            expected: expected_kind,
            actual: record.kind,
        });
    }
    let identifier = record.identifier().ok_or(CodecError::MissingIdentifier)?;
    let coordinate = Coordinate::new(record.kind, record.owner.as_str(), identifier)?;

    Ok(Header {
        coordinate,
        title: record.tag_value(TAG_TITLE).map(str::to_string),
        description: record.tag_value(TAG_DESCRIPTION).map(str::to_string),
        archived: record.tags.iter().any(is_archived_tag),
    })
}

fn encode_header(
    identifier: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> Vec<Tag> {
    let mut tags = vec![tag(TAG_IDENTIFIER, [identifier])];
    if let Some(title) = title {
        tags.push(tag(TAG_TITLE, [title]));
    }
    if let Some(description) = description {
        tags.push(tag(TAG_DESCRIPTION, [description]));
    }
    tags
}

fn archived_tag() -> Tag {
    tag(TAG_STATUS, [STATUS_ARCHIVED])
}

fn is_archived_tag(tag: &Tag) -> bool {
    tag_name(tag) == Some(TAG_STATUS) && tag.get(1).map(String::as_str) == Some(STATUS_ARCHIVED)
}

fn tag<'a>(name: &'a str, values: impl IntoIterator<Item = &'a str>) -> Tag {
    std::iter::once(name)
        .chain(values)
        .map(str::to_string)
        .collect()
}

fn tag_name(tag: &Tag) -> Option<&str> {
    tag.first().map(String::as_str)
}

/// Coordinates of every well-formed `a` tag, paired with the tag.
fn address_tags<'r>(record: &'r Record) -> impl Iterator<Item = (Coordinate, &'r Tag)> + 'r {
    record
        .tags
        .iter()
        .filter(|tag| tag_name(tag) == Some(TAG_ADDRESS))
        .filter_map(|tag| {
            let coordinate = Coordinate::parse(tag.get(1)?).ok()?;
            Some((coordinate, tag))
        })
}

/// Value at `index`, with empty slots read as absent.
fn optional_slot(tag: &Tag, index: usize) -> Option<String> {
    tag.get(index).filter(|value| !value.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::{encode_header, optional_slot, tag};

    #[test]
    fn header_skips_absent_metadata() {
        let tags = encode_header("docs", None, Some(""));
        assert_eq!(
            tags,
            vec![
                vec!["d".to_string(), "docs".to_string()],
                vec!["description".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn empty_slots_read_as_absent() {
        let tag = tag("a", ["30023:x:y", "", "abc"]);
        assert_eq!(optional_slot(&tag, 2), None);
        assert_eq!(optional_slot(&tag, 3).as_deref(), Some("abc"));
        assert_eq!(optional_slot(&tag, 4), None);
    }
}
