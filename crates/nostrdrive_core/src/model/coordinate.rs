//! Coordinate value type for addressable records.
//!
//! # Responsibility
//! - Identify one replaceable object by `(kind, owner, identifier)`.
//! - Parse and render the canonical `kind:owner:identifier` string form.
//!
//! # Invariants
//! - `kind` is inside the addressable range `30000..=39999`.
//! - `owner` is a 64-character hex public key (case-insensitive).
//! - `identifier` may be empty; it names the unnamed instance of a kind.
//! - `Coordinate::parse(&c.to_string()) == Ok(c)` for every valid `c`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;
use std::str::FromStr;

/// Lowest addressable kind (inclusive).
pub const ADDRESSABLE_KIND_MIN: u32 = 30_000;
/// Highest addressable kind (inclusive).
pub const ADDRESSABLE_KIND_MAX: u32 = 39_999;

static OWNER_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[0-9a-f]{64}$").expect("valid owner key regex"));

/// Errors from coordinate construction and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    /// Input does not split into `kind:owner:identifier`.
    MalformedCoordinate(String),
    /// Kind segment is not an integer.
    NonNumericKind(String),
    /// Kind is outside the addressable range.
    NonAddressableKind(i64),
    /// Owner key is empty.
    EmptyOwner,
    /// Owner key is not 64 hex characters.
    InvalidOwner(String),
}

impl CoordinateError {
    /// Returns `true` for errors about the string shape rather than the values.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::MalformedCoordinate(_) | Self::NonNumericKind(_))
    }
}

impl Display for CoordinateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedCoordinate(input) => write!(
                f,
                "invalid coordinate format, expected `kind:owner:identifier`, got `{input}`"
            ),
            Self::NonNumericKind(input) => {
                write!(f, "kind must be numeric in coordinate `{input}`")
            }
            Self::NonAddressableKind(kind) => write!(
                f,
                "kind {kind} is not addressable (must be {ADDRESSABLE_KIND_MIN}-{ADDRESSABLE_KIND_MAX})"
            ),
            Self::EmptyOwner => write!(f, "owner key cannot be empty"),
            Self::InvalidOwner(owner) => write!(
                f,
                "owner key must be a 64-character hex string, got `{owner}`"
            ),
        }
    }
}

impl Error for CoordinateError {}

/// Canonical identity of one addressable (replaceable) object.
///
/// Equality is exact on all three fields; no case folding is applied to the
/// owner key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    kind: u32,
    owner: String,
    identifier: String,
}

impl Coordinate {
    /// Builds a validated coordinate.
    ///
    /// # Errors
    /// - `NonAddressableKind` when `kind` is outside `30000..=39999`.
    /// - `EmptyOwner` / `InvalidOwner` when `owner` is not a 64-hex key.
    pub fn new(
        kind: u32,
        owner: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Result<Self, CoordinateError> {
        let owner = owner.into();
        validate_kind(i64::from(kind))?;
        validate_owner(&owner)?;
        Ok(Self {
            kind,
            owner,
            identifier: identifier.into(),
        })
    }

    /// Parses `kind:owner:identifier`.
    ///
    /// The split is capped at three segments, so colons inside the
    /// identifier are preserved.
    pub fn parse(input: &str) -> Result<Self, CoordinateError> {
        let mut parts = input.splitn(3, ':');
        let (kind, owner, identifier) = match (parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(owner), Some(identifier)) => (kind, owner, identifier),
            _ => return Err(CoordinateError::MalformedCoordinate(input.to_string())),
        };

        let kind = parse_kind(kind)
            .ok_or_else(|| CoordinateError::NonNumericKind(input.to_string()))?;
        validate_kind(kind)?;
        validate_owner(owner)?;

        Ok(Self {
            kind: kind as u32,
            owner: owner.to_string(),
            identifier: identifier.to_string(),
        })
    }

    pub fn kind(&self) -> u32 {
        self.kind
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.owner, self.identifier)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}

/// Returns whether `kind` is in the addressable range.
pub fn is_addressable_kind(kind: u32) -> bool {
    (ADDRESSABLE_KIND_MIN..=ADDRESSABLE_KIND_MAX).contains(&kind)
}

/// Returns whether `owner` is a well-formed 64-hex public key.
pub fn is_valid_owner_key(owner: &str) -> bool {
    OWNER_KEY_RE.is_match(owner)
}

/// Parses a kind segment. Integers too large for `i64` saturate, so they
/// still fail as out of range rather than as non-numeric.
fn parse_kind(segment: &str) -> Option<i64> {
    match segment.parse::<i64>() {
        Ok(kind) => Some(kind),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn validate_kind(kind: i64) -> Result<(), CoordinateError> {
    if kind < i64::from(ADDRESSABLE_KIND_MIN) || kind > i64::from(ADDRESSABLE_KIND_MAX) {
        return Err(CoordinateError::NonAddressableKind(kind));
    }
    Ok(())
}

fn validate_owner(owner: &str) -> Result<(), CoordinateError> {
    if owner.is_empty() {
        return Err(CoordinateError::EmptyOwner);
    }
    if !is_valid_owner_key(owner) {
        return Err(CoordinateError::InvalidOwner(owner.to_string()));
    }
    Ok(())
}
