//! Command-line front end over `nostrdrive_core`.
//!
//! # Responsibility
//! - Inspect and edit drives and folders in a local SQLite record store.
//! - Print results as JSON and errors as a `caused by` chain.

use clap::{Parser, Subcommand};
use log::info;
use nostrdrive_core::db::{open_db, open_db_in_memory, Connection};
use nostrdrive_core::{
    Address, Coordinate, DriveConfig, DriveError, DriveService, FolderEntry, FolderService,
    NewDrive, NewFolder, SqliteEventStore,
};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "nostrdrive", author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage
    Ping,
    /// Print the core version
    Version,
    /// Parse a `kind:owner:identifier` coordinate
    Coordinate { value: String },
    /// Folder operations
    #[command(subcommand)]
    Folder(FolderCommand),
    /// Drive operations
    #[command(subcommand)]
    Drive(DriveCommand),
}

#[derive(Subcommand)]
enum FolderCommand {
    /// Print the latest version of a folder
    Show { coordinate: String },
    /// Create a folder
    Create {
        identifier: String,
        #[arg(long, help = "Owner public key (64 hex chars)")]
        owner: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Append a member to a folder
    Add {
        folder: String,
        member: String,
        #[arg(long, help = "Relay hint for the member")]
        relay: Option<String>,
        #[arg(long, help = "Display name hint for the member")]
        name: Option<String>,
    },
    /// Remove a member from a folder
    Remove { folder: String, member: String },
    /// Move a member between folders
    Move {
        member: String,
        source: String,
        destination: String,
    },
    /// Reorder folder members
    Reorder {
        folder: String,
        #[arg(required = true, help = "Every member coordinate, in the new order")]
        order: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DriveCommand {
    /// Print the latest version of a drive
    Show { coordinate: String },
    /// Create a drive
    Create {
        identifier: String,
        #[arg(long, help = "Owner public key (64 hex chars)")]
        owner: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "root", help = "Root folder coordinate, repeatable")]
        roots: Vec<String>,
    },
    /// Append a root folder to a drive
    AddRoot { drive: String, root: String },
}

impl FolderCommand {
    fn publishes(&self) -> bool {
        !matches!(self, Self::Show { .. })
    }
}

impl DriveCommand {
    fn publishes(&self) -> bool {
        !matches!(self, Self::Show { .. })
    }
}

#[derive(Serialize)]
struct CoordinateView<'a> {
    kind: u32,
    owner: &'a str,
    identifier: &'a str,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => DriveConfig::load_from_file(path)?,
        None => DriveConfig::default(),
    };
    if nostrdrive_core::init_from_config(&config.logging)? {
        info!(
            "event=cli_start module=cli status=ok version={}",
            nostrdrive_core::core_version()
        );
    }

    match cli.command {
        Command::Ping => println!("nostrdrive_core ping={}", nostrdrive_core::ping()),
        Command::Version => {
            println!("nostrdrive_core version={}", nostrdrive_core::core_version())
        }
        Command::Coordinate { value } => {
            let coordinate = parse_coordinate(&value)?;
            print_json(&CoordinateView {
                kind: coordinate.kind(),
                owner: coordinate.owner(),
                identifier: coordinate.identifier(),
            })?;
        }
        Command::Folder(command) => {
            let conn = open_store(&config, command.publishes())?;
            let store = SqliteEventStore::try_new(&conn)?;
            run_folder(FolderService::with_kinds(store, config.kind_validator()), command)?;
        }
        Command::Drive(command) => {
            let conn = open_store(&config, command.publishes())?;
            let store = SqliteEventStore::try_new(&conn)?;
            run_drive(DriveService::new(store), command)?;
        }
    }
    Ok(())
}

fn run_folder(
    service: FolderService<SqliteEventStore<'_>>,
    command: FolderCommand,
) -> CliResult<()> {
    match command {
        FolderCommand::Show { coordinate } => {
            print_json(&service.get(&parse_coordinate(&coordinate)?)?)
        }
        FolderCommand::Create {
            identifier,
            owner,
            title,
            description,
        } => {
            let request = NewFolder {
                title,
                description,
                ..NewFolder::new(identifier)
            };
            print_json(&service.create(&Address::new(owner), request)?)
        }
        FolderCommand::Add {
            folder,
            member,
            relay,
            name,
        } => {
            let entry = FolderEntry::with_all_hints(parse_coordinate(&member)?, relay, None, name);
            print_json(&service.add_entry(&parse_coordinate(&folder)?, entry)?)
        }
        FolderCommand::Remove { folder, member } => print_json(
            &service.remove_entry(&parse_coordinate(&folder)?, &parse_coordinate(&member)?)?,
        ),
        FolderCommand::Move {
            member,
            source,
            destination,
        } => {
            let moved = service.move_entry(
                &parse_coordinate(&member)?,
                &parse_coordinate(&source)?,
                &parse_coordinate(&destination)?,
            )?;
            print_json(&[moved.source, moved.destination])
        }
        FolderCommand::Reorder { folder, order } => {
            let order = order
                .iter()
                .map(|value| parse_coordinate(value))
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&service.reorder_entries(&parse_coordinate(&folder)?, &order)?)
        }
    }
}

fn run_drive(service: DriveService<SqliteEventStore<'_>>, command: DriveCommand) -> CliResult<()> {
    match command {
        DriveCommand::Show { coordinate } => {
            print_json(&service.get(&parse_coordinate(&coordinate)?)?)
        }
        DriveCommand::Create {
            identifier,
            owner,
            title,
            description,
            roots,
        } => {
            let roots = roots
                .iter()
                .map(|value| parse_coordinate(value))
                .collect::<Result<Vec<_>, _>>()?;
            let request = NewDrive {
                title,
                description,
                roots,
                ..NewDrive::new(identifier)
            };
            print_json(&service.create(&Address::new(owner), request)?)
        }
        DriveCommand::AddRoot { drive, root } => print_json(
            &service.add_root(&parse_coordinate(&drive)?, parse_coordinate(&root)?)?,
        ),
    }
}

/// Opens the configured store. Without `store.path` only read commands run,
/// against an empty in-memory database.
fn open_store(config: &DriveConfig, publishes: bool) -> CliResult<Connection> {
    let conn = match &config.store.path {
        Some(path) => open_db(path)?,
        None if publishes => {
            return Err(
                "this command publishes records; set `store.path` in the --config file".into(),
            )
        }
        None => open_db_in_memory()?,
    };
    Ok(conn)
}

fn parse_coordinate(value: &str) -> Result<Coordinate, DriveError> {
    Coordinate::parse(value).map_err(DriveError::from)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
