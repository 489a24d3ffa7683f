//! Persistence for the appointment ledger and the client directory
//!
//! Both stores sit behind traits so backends can be swapped without touching
//! the planner:
//! - `CsvLedger` / `CsvClientBook`: flat files compatible with the existing
//!   `agenda_db.csv` / `clientes_db.csv` exports
//! - `InMemoryLedger` / `InMemoryClientBook`: tests and ephemeral sessions

mod clients;
mod ledger;

pub use clients::{CsvClientBook, InMemoryClientBook};
pub use ledger::{CsvLedger, InMemoryLedger};

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::types::{Appointment, Client};

/// Append-only store of confirmed appointments keyed by date.
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
pub trait LedgerStore: Send + Sync {
    /// All appointments on `date`, sorted ascending by time (stable for ties).
    /// Empty when the date has no bookings or the store does not exist yet.
    fn load(&self, date: NaiveDate) -> Result<Vec<Appointment>, StorageError>;

    /// Durably append a confirmed appointment.
    fn append(&self, appointment: &Appointment) -> Result<(), StorageError>;

    /// Distinct dates with at least one appointment, ascending.
    fn dates(&self) -> Result<Vec<NaiveDate>, StorageError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Client directory.
pub trait ClientBook: Send + Sync {
    /// All clients in insertion order.
    fn list(&self) -> Result<Vec<Client>, StorageError>;

    /// First client with exactly this name.
    fn find(&self, name: &str) -> Result<Option<Client>, StorageError> {
        Ok(self.list()?.into_iter().find(|c| c.name == name))
    }

    fn add(&self, client: &Client) -> Result<(), StorageError>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("storage lock poisoned: {0}")]
    Lock(String),
}

impl StorageError {
    fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Whether a CSV file already has content (and therefore a header row).
fn has_content(path: &std::path::Path) -> Result<bool, StorageError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

/// Open `path` for appending, creating parent directories as needed.
fn open_for_append(path: &std::path::Path) -> Result<std::fs::File, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::io(path, e))
}
