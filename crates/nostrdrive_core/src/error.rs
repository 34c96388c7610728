//! Service-level error taxonomy.
//!
//! Lower layers keep their own error enums; this module folds them into the
//! categories callers branch on.

use crate::codec::CodecError;
use crate::model::coordinate::{Coordinate, CoordinateError};
use crate::model::ModelError;
use crate::store::StoreError;
use crate::validation::kind::KindError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DriveResult<T> = Result<T, DriveError>;

#[derive(Debug)]
pub enum DriveError {
    /// Coordinate string does not have the `kind:owner:identifier` shape.
    InvalidFormat(CoordinateError),
    /// Coordinate parts are well formed but out of range.
    InvalidValue(CoordinateError),
    /// Member kind is not allow-listed.
    InvalidKind(KindError),
    /// Precondition failed on otherwise valid input.
    Validation(String),
    /// No record exists for the requested coordinate or id.
    NotFound(String),
    /// Coordinate is already a member of the folder or drive.
    DuplicateEntry(Coordinate),
    /// Stored record cannot be decoded.
    Codec(CodecError),
    /// Store read or publish failed.
    Store(StoreError),
    /// Store refused the published record.
    PublishRejected(Coordinate),
}

impl DriveError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(what: impl Display) -> Self {
        Self::NotFound(what.to_string())
    }
}

impl Display for DriveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(err) => write!(f, "invalid format: {err}"),
            Self::InvalidValue(err) => write!(f, "invalid value: {err}"),
            Self::InvalidKind(err) => write!(f, "invalid kind: {err}"),
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::DuplicateEntry(coordinate) => write!(f, "duplicate entry: {coordinate}"),
            Self::Codec(err) => write!(f, "codec error: {err}"),
            Self::Store(err) => write!(f, "store error: {err}"),
            Self::PublishRejected(coordinate) => {
                write!(f, "store rejected record for {coordinate}")
            }
        }
    }
}

impl Error for DriveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFormat(err) | Self::InvalidValue(err) => Some(err),
            Self::InvalidKind(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::DuplicateEntry(_)
            | Self::PublishRejected(_) => None,
        }
    }
}

impl From<CoordinateError> for DriveError {
    fn from(value: CoordinateError) -> Self {
        if value.is_format_error() {
            Self::InvalidFormat(value)
        } else {
            Self::InvalidValue(value)
        }
    }
}

impl From<ModelError> for DriveError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::DuplicateMember(coordinate) => Self::DuplicateEntry(coordinate),
            other @ (ModelError::KindMismatch { .. } | ModelError::RootNotFolder(_)) => {
                Self::Validation(other.to_string())
            }
        }
    }
}

impl From<KindError> for DriveError {
    fn from(value: KindError) -> Self {
        Self::InvalidKind(value)
    }
}

impl From<CodecError> for DriveError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<StoreError> for DriveError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
