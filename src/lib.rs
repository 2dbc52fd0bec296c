//! Camara: rack occupancy tracking for a two-floor cold storage room
//!
//! Names rack positions, keeps the pallets stored at each position in a
//! SQLite file, and keeps product data in sync with the lot spreadsheet.

pub mod cli;
pub mod core;
