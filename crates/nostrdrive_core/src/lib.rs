//! Core domain logic for nostrdrive.
//! Drives, folders and their coordinates, the tag codec, and the services
//! that publish them through an event store.

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod validation;

pub use codec::{decode_drive, decode_folder, encode_drive, encode_folder, CodecError};
pub use config::{ConfigError, DriveConfig};
pub use error::{DriveError, DriveResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::address::Address;
pub use model::coordinate::{Coordinate, CoordinateError};
pub use model::drive::Drive;
pub use model::entry::FolderEntry;
pub use model::folder::Folder;
pub use model::{ModelError, DRIVE_KIND, FOLDER_KIND};
pub use service::drive_service::{DriveService, NewDrive};
pub use service::folder_service::{FolderService, MovedEntry, NewFolder, ResolvedEntry};
pub use store::{
    EventStore, MemoryEventStore, Record, SqliteEventStore, StoreError, StoreResult, Tag,
};
pub use validation::kind::{KindError, KindValidator};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
