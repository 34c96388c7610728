//! Drive and folder use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, codec and store calls into use-case APIs.
//! - Keep callers decoupled from tag shapes and store details.
//!
//! # Invariants
//! - Every mutation is fetch-latest, validate, mutate, encode, publish.
//! - Precondition failures are reported before anything is published.
//! - A new version never carries a `created_at` older than the version it
//!   replaces.

use crate::codec::TAG_TITLE;
use crate::error::{DriveError, DriveResult};
use crate::model::coordinate::Coordinate;
use crate::store::{EventStore, Record};
use log::{error, info, warn};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub mod drive_service;
pub mod folder_service;

/// Source of record timestamps, in Unix seconds.
pub type Clock = fn() -> i64;

/// Current wall-clock time in Unix seconds.
pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

fn next_created_at(clock: Clock, previous: i64) -> i64 {
    clock().max(previous)
}

fn ensure_kind(coordinate: &Coordinate, expected: u32, aggregate: &str) -> DriveResult<()> {
    if coordinate.kind() != expected {
        return Err(DriveError::validation(format!(
            "{coordinate} is not a {aggregate} coordinate (expected kind {expected})"
        )));
    }
    Ok(())
}

fn validate_identifier(identifier: &str) -> DriveResult<()> {
    if identifier.trim().is_empty() {
        return Err(DriveError::validation("identifier must not be blank"));
    }
    Ok(())
}

fn validate_title(title: Option<&str>) -> DriveResult<()> {
    match title {
        Some(value) if value.trim().is_empty() => {
            Err(DriveError::validation("title must not be blank"))
        }
        _ => Ok(()),
    }
}

/// Blank-title check for a title replacing the one stored in `previous`.
///
/// A title carried over unchanged from the stored version passes.
fn validate_replacement_title(title: Option<&str>, previous: Option<&Record>) -> DriveResult<()> {
    if title.is_some() && previous.and_then(|record| record.tag_value(TAG_TITLE)) == title {
        return Ok(());
    }
    validate_title(title)
}

fn fetch_latest<S: EventStore>(store: &S, coordinate: &Coordinate) -> DriveResult<Record> {
    store
        .get_latest_by_coordinate(coordinate)?
        .ok_or_else(|| DriveError::not_found(coordinate))
}

/// Publishes one encoded aggregate and maps a refusal to `PublishRejected`.
fn publish_record<S: EventStore>(
    store: &S,
    record: &Record,
    coordinate: &Coordinate,
    aggregate: &'static str,
) -> DriveResult<()> {
    let started_at = Instant::now();
    match store.publish(record) {
        Ok(true) => {
            info!(
                "event={aggregate}_publish module=service status=ok coordinate={coordinate} tags={} duration_ms={}",
                record.tags.len(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Ok(false) => {
            warn!(
                "event={aggregate}_publish module=service status=rejected coordinate={coordinate} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Err(DriveError::PublishRejected(coordinate.clone()))
        }
        Err(err) => {
            error!(
                "event={aggregate}_publish module=service status=error coordinate={coordinate} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err.into())
        }
    }
}
