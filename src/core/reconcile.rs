//! Reconcile stored pallets against the product catalog
//!
//! Every stored record whose lot appears in the catalog gets its product,
//! stock and notes overwritten with the catalog values. Position, lot and
//! entry date never change. Records with no catalog match are left alone.

use serde::Serialize;

use crate::core::catalog::Catalog;
use crate::core::store::{self, OccupancyStore, StoreError};

/// Outcome of a reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Records read from the store
    pub examined: usize,
    /// Records whose lot was found in the catalog and rewritten
    pub updated: usize,
    /// Records whose lot is not in the catalog
    pub unmatched: usize,
    pub duration_ms: u64,
}

/// Rewrite product/stock/notes of every stored record found in `catalog`
///
/// All updates run in a single transaction on one connection.
pub fn reconcile(store: &OccupancyStore, catalog: &Catalog) -> Result<ReconcileStats, StoreError> {
    let start = std::time::Instant::now();

    let mut stats = store.with_connection(|conn| {
        let tx = conn.transaction()?;
        let mut stats = ReconcileStats::default();

        for record in store::all_records(&tx)? {
            stats.examined += 1;
            match catalog.get(&record.lot) {
                Some(entry) => {
                    store::update_fields(&tx, record.id, &entry.product, &entry.stock, &entry.notes)?;
                    stats.updated += 1;
                }
                None => {
                    tracing::debug!(lot = %record.lot, position = %record.position, "lot not in catalog");
                    stats.unmatched += 1;
                }
            }
        }

        tx.commit()?;
        Ok(stats)
    })?;

    stats.duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        examined = stats.examined,
        updated = stats.updated,
        unmatched = stats.unmatched,
        "reconciliation finished"
    );
    Ok(stats)
}
