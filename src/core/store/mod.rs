//! SQLite-backed occupancy store
//!
//! One table, `paletes`, maps a rack position id (`R524_1`) to the pallet
//! stored there. A position missing from the table is empty.
//!
//! The store never holds a connection between calls: every operation opens
//! the database file, runs, and drops the connection before returning,
//! including on error paths. Mutations commit before the call returns.

mod queries;
mod schema;
mod types;

pub use types::*;

pub(crate) use queries::{all_records, update_fields};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

/// Default database file name
pub const DEFAULT_DB_FILE: &str = "camara.db";

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// How long a call waits on a locked database file
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the occupancy database file
#[derive(Debug, Clone)]
pub struct OccupancyStore {
    path: PathBuf,
}

impl OccupancyStore {
    /// Open (creating if needed) the database at `path` and ensure the schema
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let store = Self {
            path: path.to_path_buf(),
        };
        store.with_connection(schema::init_schema)?;
        tracing::debug!(path = %path.display(), "occupancy store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with a fresh connection that is released when `f` returns
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let result = f(&mut conn);
        if let Err((_, e)) = conn.close() {
            tracing::warn!(error = %e, "failed to close database connection cleanly");
        }
        result
    }
}
