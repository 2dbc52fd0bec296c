//! Store operations
//!
//! Insert, delete, lookup and scan over the `paletes` table.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};

use super::{OccupancyStore, OccupiedSlot, PalletRecord, StoreError, StoreStats};
use crate::core::position::{Floor, Position};

const RECORD_COLUMNS: &str =
    "id, posicao, lote, produto, estoque, observacoes, data_entrada";

impl OccupancyStore {
    /// Register a pallet at `position`
    ///
    /// Fails without writing anything if the position is taken or the lot
    /// already sits at another position.
    pub fn insert(
        &self,
        position: &str,
        lot: &str,
        product: &str,
        stock: &str,
        notes: &str,
    ) -> Result<PalletRecord, StoreError> {
        let entry_date = Utc::now().date_naive();

        let record = self.with_connection(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if let Some(existing) = find_by_lot(&tx, lot)? {
                return Err(StoreError::LotAllocated {
                    lot: lot.to_string(),
                    position: existing.position,
                });
            }
            if let Some(existing) = get(&tx, position)? {
                return Err(StoreError::PositionOccupied {
                    position: position.to_string(),
                    lot: existing.lot,
                });
            }

            tx.execute(
                "INSERT INTO paletes (posicao, lote, produto, estoque, observacoes, data_entrada)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    position,
                    lot,
                    product,
                    stock,
                    notes,
                    entry_date.format("%Y-%m-%d").to_string()
                ],
            )
            .map_err(|e| constraint_error(e, position, lot))?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(PalletRecord {
                id,
                position: position.to_string(),
                lot: lot.to_string(),
                product: product.to_string(),
                stock: stock.to_string(),
                notes: notes.to_string(),
                entry_date: Some(entry_date),
            })
        })?;

        tracing::info!(position, lot, "pallet registered");
        Ok(record)
    }

    /// Remove the pallet at `position`; returns whether one was there
    pub fn delete(&self, position: &str) -> Result<bool, StoreError> {
        let removed = self.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM paletes WHERE posicao = ?1", params![position])?)
        })?;
        if removed > 0 {
            tracing::info!(position, "pallet removed");
        } else {
            tracing::debug!(position, "remove on empty position");
        }
        Ok(removed > 0)
    }

    pub fn get(&self, position: &str) -> Result<Option<PalletRecord>, StoreError> {
        self.with_connection(|conn| get(conn, position))
    }

    /// Record holding `lot`, if the lot is currently stored
    pub fn find_by_lot(&self, lot: &str) -> Result<Option<PalletRecord>, StoreError> {
        self.with_connection(|conn| find_by_lot(conn, lot))
    }

    /// Position, lot and product of every occupied slot, ordered by position
    pub fn scan_all(&self) -> Result<Vec<OccupiedSlot>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT posicao, lote, produto FROM paletes ORDER BY posicao")?;
            let rows = stmt.query_map([], |row| {
                Ok(OccupiedSlot {
                    position: text(row, 0)?,
                    lot: text(row, 1)?,
                    product: text(row, 2)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    /// Full rows for every occupied slot, ordered by position
    pub fn records(&self) -> Result<Vec<PalletRecord>, StoreError> {
        self.with_connection(|conn| all_records(conn))
    }

    /// Overwrite product, stock and notes of record `id`
    ///
    /// Position, lot and entry date are left as they are. Returns whether
    /// the record exists.
    pub fn update_fields(
        &self,
        id: i64,
        product: &str,
        stock: &str,
        notes: &str,
    ) -> Result<bool, StoreError> {
        self.with_connection(|conn| update_fields(conn, id, product, stock, notes))
    }

    /// Occupied slots whose lot or product contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Result<Vec<OccupiedSlot>, StoreError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .scan_all()?
            .into_iter()
            .filter(|slot| {
                slot.lot.to_lowercase().contains(&term)
                    || slot.product.to_lowercase().contains(&term)
            })
            .collect())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.with_connection(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM paletes", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }

    pub fn statistics(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        for slot in self.scan_all()? {
            stats.total_records += 1;
            match slot.position.parse::<Position>().map(|p| p.floor()) {
                Ok(Floor::Upper) => stats.upper_floor += 1,
                Ok(Floor::Lower) => stats.lower_floor += 1,
                Err(_) => stats.unrecognized += 1,
            }
        }
        stats.db_size_bytes = std::fs::metadata(self.path())
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(stats)
    }
}

pub(crate) fn get(conn: &Connection, position: &str) -> Result<Option<PalletRecord>, StoreError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM paletes WHERE posicao = ?1");
    Ok(conn
        .query_row(&sql, params![position], record_from_row)
        .optional()?)
}

pub(crate) fn find_by_lot(conn: &Connection, lot: &str) -> Result<Option<PalletRecord>, StoreError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM paletes WHERE lote = ?1 LIMIT 1");
    Ok(conn
        .query_row(&sql, params![lot], record_from_row)
        .optional()?)
}

pub(crate) fn all_records(conn: &Connection) -> Result<Vec<PalletRecord>, StoreError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM paletes ORDER BY posicao");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], record_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn update_fields(
    conn: &Connection,
    id: i64,
    product: &str,
    stock: &str,
    notes: &str,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE paletes SET produto = ?1, estoque = ?2, observacoes = ?3 WHERE id = ?4",
        params![product, stock, notes, id],
    )?;
    Ok(changed > 0)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PalletRecord> {
    let entry_date: Option<String> = row.get(6)?;
    Ok(PalletRecord {
        id: row.get(0)?,
        position: text(row, 1)?,
        lot: text(row, 2)?,
        product: text(row, 3)?,
        stock: text(row, 4)?,
        notes: text(row, 5)?,
        entry_date: entry_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
    })
}

/// Nullable text column read as an empty string when NULL
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

/// Translate a unique-constraint failure into the matching conflict error
fn constraint_error(err: rusqlite::Error, position: &str, lot: &str) -> StoreError {
    let message = match &err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            Some(msg.clone())
        }
        _ => None,
    };

    match message {
        Some(msg) if msg.contains("paletes.lote") => StoreError::LotAllocated {
            lot: lot.to_string(),
            position: "?".to_string(),
        },
        Some(msg) if msg.contains("paletes.posicao") => StoreError::PositionOccupied {
            position: position.to_string(),
            lot: "?".to_string(),
        },
        _ => StoreError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn test_store() -> (TempDir, OccupancyStore) {
        let tmp = tempdir().unwrap();
        let store = OccupancyStore::open(&tmp.path().join("camara.db")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_insert_get_delete_round_trip() {
        let (_tmp, store) = test_store();

        let inserted = store
            .insert("R524_1", "L100", "Queijo Minas", "42", "frágil")
            .unwrap();
        let fetched = store.get("R524_1").unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.lot, "L100");
        assert_eq!(fetched.product, "Queijo Minas");
        assert_eq!(fetched.stock, "42");
        assert_eq!(fetched.notes, "frágil");
        assert_eq!(fetched.entry_date, Some(Utc::now().date_naive()));

        assert!(store.delete("R524_1").unwrap());
        assert!(store.get("R524_1").unwrap().is_none());
    }

    #[test]
    fn test_insert_into_occupied_position_fails_closed() {
        let (_tmp, store) = test_store();
        store.insert("R524_1", "L1", "A", "1", "").unwrap();

        let err = store.insert("R524_1", "L2", "B", "2", "").unwrap_err();
        match err {
            StoreError::PositionOccupied { position, lot } => {
                assert_eq!(position, "R524_1");
                assert_eq!(lot, "L1");
            }
            other => panic!("expected PositionOccupied, got {other:?}"),
        }
        assert_eq!(store.get("R524_1").unwrap().unwrap().lot, "L1");
        assert!(store.find_by_lot("L2").unwrap().is_none());
    }

    #[test]
    fn test_lot_cannot_occupy_two_positions() {
        let (_tmp, store) = test_store();
        store.insert("R524_1", "L1", "A", "1", "").unwrap();
        let before = store.scan_all().unwrap().len();

        let err = store.insert("R113_3", "L1", "A", "1", "").unwrap_err();
        match err {
            StoreError::LotAllocated { lot, position } => {
                assert_eq!(lot, "L1");
                assert_eq!(position, "R524_1");
            }
            other => panic!("expected LotAllocated, got {other:?}"),
        }
        assert_eq!(store.scan_all().unwrap().len(), before);
        assert!(store.get("R113_3").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_position_is_noop() {
        let (_tmp, store) = test_store();
        store.insert("R524_1", "L1", "A", "1", "").unwrap();

        assert!(!store.delete("R999_9").unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_scan_all_ordered_by_position() {
        let (_tmp, store) = test_store();
        store.insert("R914_1", "L3", "C", "", "").unwrap();
        store.insert("R114_1", "L1", "A", "", "").unwrap();
        store.insert("R524_2", "L2", "B", "", "").unwrap();

        let positions: Vec<String> = store
            .scan_all()
            .unwrap()
            .into_iter()
            .map(|s| s.position)
            .collect();
        assert_eq!(positions, vec!["R114_1", "R524_2", "R914_1"]);
    }

    #[test]
    fn test_update_fields_keeps_identity() {
        let (_tmp, store) = test_store();
        let rec = store.insert("R524_1", "L1", "Old", "1", "old").unwrap();

        assert!(store.update_fields(rec.id, "New", "99", "fresh").unwrap());
        let updated = store.get("R524_1").unwrap().unwrap();
        assert_eq!(updated.product, "New");
        assert_eq!(updated.stock, "99");
        assert_eq!(updated.notes, "fresh");
        assert_eq!(updated.lot, rec.lot);
        assert_eq!(updated.position, rec.position);
        assert_eq!(updated.entry_date, rec.entry_date);

        assert!(!store.update_fields(rec.id + 100, "X", "X", "X").unwrap());
    }

    #[test]
    fn test_search_matches_lot_or_product_case_insensitive() {
        let (_tmp, store) = test_store();
        store.insert("R524_1", "ABC-1", "Queijo", "", "").unwrap();
        store.insert("R524_2", "XYZ-2", "Manteiga", "", "").unwrap();
        store.insert("R524_3", "QQQ-3", "Requeijão", "", "").unwrap();

        let hits: Vec<String> = store
            .search("abc")
            .unwrap()
            .into_iter()
            .map(|s| s.position)
            .collect();
        assert_eq!(hits, vec!["R524_1"]);

        assert_eq!(store.search("QUEIJ").unwrap().len(), 2);
        assert_eq!(store.search("REQUEIJÃO").unwrap().len(), 1);
        assert!(store.search("   ").unwrap().is_empty());
        assert!(store.search("nothing").unwrap().is_empty());
    }

    #[test]
    fn test_statistics_by_floor() {
        let (_tmp, store) = test_store();
        store.insert("R524_1", "L1", "", "", "").unwrap();
        store.insert("R921_12", "L2", "", "", "").unwrap();
        store.insert("R113_3", "L3", "", "", "").unwrap();
        store.insert("legacy", "L4", "", "", "").unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.upper_floor, 2);
        assert_eq!(stats.lower_floor, 1);
        assert_eq!(stats.unrecognized, 1);
        assert!(stats.db_size_bytes > 0);
    }

    #[test]
    fn test_null_columns_read_as_empty() {
        let (_tmp, store) = test_store();
        store
            .with_connection(|conn| {
                conn.execute("INSERT INTO paletes (posicao, lote) VALUES ('R524_1', 'L1')", [])?;
                Ok(())
            })
            .unwrap();

        let rec = store.get("R524_1").unwrap().unwrap();
        assert_eq!(rec.product, "");
        assert_eq!(rec.stock, "");
        assert_eq!(rec.notes, "");
        assert_eq!(rec.entry_date, None);
        assert_eq!(store.records().unwrap().len(), 1);
    }
}
