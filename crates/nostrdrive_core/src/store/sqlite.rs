//! SQLite-backed append-only record log.
//!
//! # Responsibility
//! - Persist published records with their tags as JSON.
//! - Answer latest-version lookups by coordinate.
//!
//! # Invariants
//! - Rows are never updated or deleted.
//! - `record_id` is unique; re-publishing an id is refused, not an error.
//! - Ties on `created_at` resolve to the row inserted last (`seq`).

use crate::db::migrations::latest_version;
use crate::model::coordinate::Coordinate;
use crate::store::{new_record_id, EventStore, Record, StoreError, StoreResult, Tag};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const RECORD_SELECT_SQL: &str = "SELECT
    record_id,
    kind,
    owner,
    created_at,
    content,
    tags_json
FROM records";

/// Event store over a migrated SQLite connection.
pub struct SqliteEventStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventStore<'conn> {
    /// Constructs a store from a connection opened via `open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the `records` table is absent.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Number of stored rows, all versions included.
    pub fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count {count}")))
    }
}

impl EventStore for SqliteEventStore<'_> {
    fn get_latest_by_coordinate(&self, coordinate: &Coordinate) -> StoreResult<Option<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE kind = ?1
               AND owner = ?2
               AND identifier = ?3
             ORDER BY created_at DESC, seq DESC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![
            coordinate.kind(),
            coordinate.owner(),
            coordinate.identifier(),
        ])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_record_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_by_id(&self, record_id: &str) -> StoreResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE record_id = ?1;"))?;

        let mut rows = stmt.query([record_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_record_row(row)?)),
            None => Ok(None),
        }
    }

    fn publish(&self, record: &Record) -> StoreResult<bool> {
        let Some(identifier) = record.identifier() else {
            warn!(
                "event=record_publish module=store status=rejected backend=sqlite reason=missing_identifier kind={}",
                record.kind
            );
            return Ok(false);
        };
        let record_id = record.id.clone().unwrap_or_else(new_record_id);
        let tags_json = serde_json::to_string(&record.tags)?;

        let changed = self.conn.execute(
            "INSERT INTO records (
                record_id,
                kind,
                owner,
                identifier,
                created_at,
                content,
                tags_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(record_id) DO NOTHING;",
            params![
                record_id,
                record.kind,
                record.owner,
                identifier,
                record.created_at,
                record.content,
                tags_json,
            ],
        )?;

        if changed == 0 {
            warn!(
                "event=record_publish module=store status=rejected backend=sqlite reason=duplicate_id record_id={record_id}"
            );
            return Ok(false);
        }

        debug!(
            "event=record_publish module=store status=ok backend=sqlite kind={} record_id={record_id}",
            record.kind
        );
        Ok(true)
    }
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let tags_json: String = row.get("tags_json")?;
    let tags: Vec<Tag> = serde_json::from_str(&tags_json)?;

    Ok(Record {
        id: Some(row.get("record_id")?),
        kind: row.get("kind")?,
        owner: row.get("owner")?,
        created_at: row.get("created_at")?,
        content: row.get("content")?,
        tags,
    })
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'records';",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(StoreError::MissingRequiredTable("records"));
    }

    Ok(())
}
