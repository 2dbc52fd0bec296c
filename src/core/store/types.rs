//! Store type definitions
//!
//! Row types returned by the occupancy store and its error enum.

use std::path::PathBuf;

use chrono::NaiveDate;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// A pallet occupying one rack position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletRecord {
    pub id: i64,
    pub position: String,
    pub lot: String,
    pub product: String,
    pub stock: String,
    pub notes: String,
    /// Date the pallet was registered (UTC); absent on legacy rows
    pub entry_date: Option<NaiveDate>,
}

/// Minimal view of an occupied slot, used to draw the map and search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedSlot {
    pub position: String,
    pub lot: String,
    pub product: String,
}

impl From<PalletRecord> for OccupiedSlot {
    fn from(record: PalletRecord) -> Self {
        Self {
            position: record.position,
            lot: record.lot,
            product: record.product,
        }
    }
}

/// Occupancy counts
#[derive(Debug, Default, Clone, Serialize)]
pub struct StoreStats {
    pub total_records: usize,
    pub upper_floor: usize,
    pub lower_floor: usize,
    /// Rows whose position id does not parse (legacy data)
    pub unrecognized: usize,
    pub db_size_bytes: u64,
}

/// Errors from the occupancy store
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("position {position} is already occupied by lot {lot}")]
    #[diagnostic(
        code(camara::store::position_occupied),
        help("remove the pallet first or choose an empty position")
    )]
    PositionOccupied { position: String, lot: String },

    #[error("lot {lot} is already allocated at position {position}")]
    #[diagnostic(
        code(camara::store::lot_allocated),
        help("a lot can only occupy one position at a time")
    )]
    LotAllocated { lot: String, position: String },

    #[error("cannot prepare database directory {}", .path.display())]
    #[diagnostic(code(camara::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error")]
    #[diagnostic(code(camara::store::database))]
    Database(#[from] rusqlite::Error),
}
