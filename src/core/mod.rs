//! Core module - rack layout, catalog, storage and session

pub mod catalog;
pub mod config;
pub mod map;
pub mod position;
pub mod reconcile;
pub mod session;
pub mod store;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use config::{Config, ConfigError};
pub use map::{CellShade, MapCell, OccupancyMap};
pub use position::{compute_block, rack_label, Floor, Position, PositionError};
pub use reconcile::{reconcile, ReconcileStats};
pub use session::{Registration, Session, SessionError};
pub use store::{OccupancyStore, OccupiedSlot, PalletRecord, StoreError, StoreStats};
