//! Operator session
//!
//! Holds everything the map and the commands act on: the store handle, the
//! catalog snapshot with where it came from, and the floor being viewed.
//!
//! A catalog that exists but cannot be read does not stop the session from
//! opening. The error is kept and raised only by the operations that need
//! product data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::catalog::{Catalog, CatalogError};
use crate::core::config::{Config, ConfigError};
use crate::core::map::OccupancyMap;
use crate::core::position::{Floor, Position};
use crate::core::reconcile::{reconcile, ReconcileStats};
use crate::core::store::{OccupancyStore, OccupiedSlot, PalletRecord, StoreError};

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("lot number is empty")]
    #[diagnostic(code(camara::session::empty_lot))]
    EmptyLot,

    #[error("catalog {} is empty or was not found", .path.display())]
    #[diagnostic(
        code(camara::session::empty_catalog),
        help("provide the product spreadsheet (.xlsx or CSV) with Lote, Produto, Estoque and Observacoes columns")
    )]
    EmptyCatalog { path: PathBuf },

    #[error("catalog {} could not be read", .path.display())]
    #[diagnostic(
        code(camara::session::catalog_unavailable),
        help("fix or replace the catalog file; commands that do not need product data keep working")
    )]
    CatalogUnavailable {
        path: PathBuf,
        #[source]
        source: Arc<CatalogError>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Result of registering a pallet
#[derive(Debug, Clone)]
pub struct Registration {
    pub record: PalletRecord,
    /// False when the lot was not in the catalog and fields were left empty
    pub catalog_match: bool,
}

pub struct Session {
    store: OccupancyStore,
    catalog: Result<Catalog, Arc<CatalogError>>,
    catalog_path: PathBuf,
    delimiter: u8,
    active_floor: Floor,
}

impl Session {
    pub fn new(
        store: OccupancyStore,
        catalog: Result<Catalog, CatalogError>,
        catalog_path: PathBuf,
        delimiter: u8,
        active_floor: Floor,
    ) -> Self {
        Self {
            store,
            catalog: catalog.map_err(Arc::new),
            catalog_path,
            delimiter,
            active_floor,
        }
    }

    /// Open the store and load the catalog named by `config`
    ///
    /// Only configuration and store errors fail here; a broken catalog is
    /// logged and deferred to [`Session::catalog`].
    pub fn open(config: &Config) -> Result<Self, SessionError> {
        let delimiter = config.delimiter()?;
        let active_floor = config.floor()?;
        let store = OccupancyStore::open(&config.database_path())?;
        let catalog_path = config.catalog_path();
        let catalog = Catalog::load_with_delimiter(&catalog_path, delimiter);
        if let Err(e) = &catalog {
            tracing::warn!(path = %catalog_path.display(), error = %e, "catalog unavailable");
        }
        Ok(Self::new(store, catalog, catalog_path, delimiter, active_floor))
    }

    pub fn store(&self) -> &OccupancyStore {
        &self.store
    }

    /// The catalog snapshot, or the error that kept it from loading
    pub fn catalog(&self) -> Result<&Catalog, SessionError> {
        self.catalog
            .as_ref()
            .map_err(|source| SessionError::CatalogUnavailable {
                path: self.catalog_path.clone(),
                source: Arc::clone(source),
            })
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn active_floor(&self) -> Floor {
        self.active_floor
    }

    pub fn set_active_floor(&mut self, floor: Floor) {
        self.active_floor = floor;
    }

    /// Switch to the other floor and return it
    pub fn toggle_floor(&mut self) -> Floor {
        self.active_floor = self.active_floor.toggle();
        self.active_floor
    }

    /// Occupancy grid of `floor`
    pub fn occupancy_map(&self, floor: Floor) -> Result<OccupancyMap, SessionError> {
        let occupied = self.store.scan_all()?;
        Ok(OccupancyMap::build(floor, &occupied))
    }

    /// Register `lot` at `position`, copying product data from the catalog
    ///
    /// A lot missing from the catalog is registered with empty product,
    /// stock and notes so they can be filled in by hand. An unreadable
    /// catalog is an error.
    pub fn register_entry(&self, position: &Position, lot: &str) -> Result<Registration, SessionError> {
        let lot = lot.trim();
        if lot.is_empty() {
            return Err(SessionError::EmptyLot);
        }

        let entry = self.catalog()?.get(lot);
        let (product, stock, notes) = entry
            .map(|e| (e.product.as_str(), e.stock.as_str(), e.notes.as_str()))
            .unwrap_or_default();

        let record = self
            .store
            .insert(&position.id(), lot, product, stock, notes)?;
        if entry.is_none() {
            tracing::info!(lot, position = %position, "lot not in catalog, registered for manual entry");
        }

        Ok(Registration {
            record,
            catalog_match: entry.is_some(),
        })
    }

    pub fn details(&self, position: &Position) -> Result<Option<PalletRecord>, SessionError> {
        Ok(self.store.get(&position.id())?)
    }

    /// Remove the pallet at `position`; an empty position is not an error
    pub fn remove(&self, position: &Position) -> Result<bool, SessionError> {
        Ok(self.store.delete(&position.id())?)
    }

    pub fn search(&self, term: &str) -> Result<Vec<OccupiedSlot>, SessionError> {
        Ok(self.store.search(term)?)
    }

    /// Re-read the catalog file, replacing the snapshot
    ///
    /// On failure the previous snapshot (or error) is kept.
    pub fn reload_catalog(&mut self) -> Result<&Catalog, SessionError> {
        let catalog = Catalog::load_with_delimiter(&self.catalog_path, self.delimiter)?;
        self.catalog = Ok(catalog);
        self.catalog()
    }

    /// Reload the catalog and reconcile every stored record against it
    ///
    /// Refuses to run when the reloaded catalog is empty so that a missing
    /// spreadsheet never looks like a successful refresh.
    pub fn refresh(&mut self) -> Result<ReconcileStats, SessionError> {
        self.reload_catalog()?;
        let catalog = self.catalog()?;
        if catalog.is_empty() {
            return Err(SessionError::EmptyCatalog {
                path: self.catalog_path.clone(),
            });
        }
        Ok(reconcile(&self.store, catalog)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const CATALOG: &str =
        "Lote,Produto,Estoque,Observacoes\nL100,Queijo,12,Refrigerar\nL200,Manteiga,4,\n";

    fn session_with_catalog(csv: Option<&str>) -> (TempDir, Session) {
        let tmp = tempdir().unwrap();
        let catalog_path = tmp.path().join("produtos.csv");
        if let Some(csv) = csv {
            fs::write(&catalog_path, csv).unwrap();
        }
        let config = Config {
            database: Some(tmp.path().join("camara.db")),
            catalog: Some(catalog_path),
            ..Default::default()
        };
        let session = Session::open(&config).unwrap();
        (tmp, session)
    }

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn test_register_copies_catalog_fields() {
        let (_tmp, session) = session_with_catalog(Some(CATALOG));

        let reg = session.register_entry(&pos("R524_1"), " L100 ").unwrap();
        assert!(reg.catalog_match);
        assert_eq!(reg.record.lot, "L100");
        assert_eq!(reg.record.product, "Queijo");
        assert_eq!(reg.record.stock, "12");
        assert_eq!(reg.record.notes, "Refrigerar");
        assert_eq!(session.details(&pos("R524_1")).unwrap().unwrap(), reg.record);
    }

    #[test]
    fn test_missing_catalog_registers_manual_entry() {
        let (_tmp, session) = session_with_catalog(None);
        assert!(session.catalog().unwrap().is_empty());

        let reg = session.register_entry(&pos("R113_3"), "ANY-LOT").unwrap();
        assert!(!reg.catalog_match);
        assert_eq!(reg.record.product, "");
        assert_eq!(reg.record.stock, "");
        assert_eq!(reg.record.notes, "");
    }

    #[test]
    fn test_duplicate_lot_rejected_without_changes() {
        let (_tmp, session) = session_with_catalog(Some(CATALOG));
        session.register_entry(&pos("R524_1"), "L100").unwrap();
        let before = session.store().scan_all().unwrap();

        let err = session.register_entry(&pos("R524_2"), "L100").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Store(StoreError::LotAllocated { .. })
        ));
        assert_eq!(session.store().scan_all().unwrap(), before);
    }

    #[test]
    fn test_blank_lot_rejected() {
        let (_tmp, session) = session_with_catalog(Some(CATALOG));
        assert!(matches!(
            session.register_entry(&pos("R524_1"), "   "),
            Err(SessionError::EmptyLot)
        ));
        assert_eq!(session.store().count().unwrap(), 0);
    }

    #[test]
    fn test_remove_and_remove_again() {
        let (_tmp, session) = session_with_catalog(Some(CATALOG));
        session.register_entry(&pos("R524_1"), "L100").unwrap();

        assert!(session.remove(&pos("R524_1")).unwrap());
        assert!(!session.remove(&pos("R524_1")).unwrap());
        assert!(session.details(&pos("R524_1")).unwrap().is_none());
    }

    #[test]
    fn test_refresh_reconciles_after_catalog_change() {
        let (tmp, mut session) = session_with_catalog(Some(CATALOG));
        session.register_entry(&pos("R524_1"), "L100").unwrap();
        session.register_entry(&pos("R524_2"), "L999").unwrap();

        fs::write(
            tmp.path().join("produtos.csv"),
            "Lote,Produto,Estoque,Observacoes\nL100,Queijo Curado,7,Vencendo\n",
        )
        .unwrap();

        let stats = session.refresh().unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.unmatched, 1);
        let rec = session.details(&pos("R524_1")).unwrap().unwrap();
        assert_eq!(rec.product, "Queijo Curado");
        assert_eq!(rec.stock, "7");
        assert_eq!(session.catalog().unwrap().len(), 1);
    }

    #[test]
    fn test_refresh_refuses_empty_catalog() {
        let (_tmp, mut session) = session_with_catalog(None);
        session.register_entry(&pos("R524_1"), "L100").unwrap();

        let err = session.refresh().unwrap_err();
        assert!(matches!(err, SessionError::EmptyCatalog { .. }));
    }

    #[test]
    fn test_toggle_floor_and_map() {
        let (_tmp, mut session) = session_with_catalog(Some(CATALOG));
        assert_eq!(session.active_floor(), Floor::Upper);
        session.register_entry(&pos("R114_1"), "L200").unwrap();

        assert_eq!(session.toggle_floor(), Floor::Lower);
        let map = session.occupancy_map(session.active_floor()).unwrap();
        assert_eq!(map.occupied(), 1);
        assert_eq!(map.cell(1, 1).unwrap().lot.as_deref(), Some("L200"));

        session.set_active_floor(Floor::Upper);
        assert_eq!(session.occupancy_map(Floor::Upper).unwrap().occupied(), 0);
    }

    #[test]
    fn test_search_through_session() {
        let (_tmp, session) = session_with_catalog(Some(CATALOG));
        session.register_entry(&pos("R524_1"), "L100").unwrap();
        session.register_entry(&pos("R524_2"), "L200").unwrap();

        let hits = session.search("manteiga").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, "R524_2");
    }

    fn session_with_catalog_bytes(bytes: &[u8]) -> (TempDir, Session) {
        let tmp = tempdir().unwrap();
        let catalog_path = tmp.path().join("produtos.csv");
        fs::write(&catalog_path, bytes).unwrap();
        let config = Config {
            database: Some(tmp.path().join("camara.db")),
            catalog: Some(catalog_path),
            delimiter: Some(";".to_string()),
            ..Default::default()
        };
        let session = Session::open(&config).unwrap();
        (tmp, session)
    }

    #[test]
    fn test_cp1252_catalog_opens_session() {
        let (_tmp, session) =
            session_with_catalog_bytes(b"Lote;Produto;Estoque;Observacoes\nL1;Requeij\xE3o;5;x\n");

        let reg = session.register_entry(&pos("R524_1"), "L1").unwrap();
        assert!(reg.catalog_match);
        assert_eq!(reg.record.product, "Requeijão");
    }

    #[test]
    fn test_broken_catalog_only_blocks_catalog_operations() {
        let (tmp, mut session) =
            session_with_catalog_bytes(b"Codigo;Descricao\nL1;Requeij\xE3o\n");
        session
            .store()
            .insert("R524_1", "L100", "Queijo", "12", "")
            .unwrap();

        // Map, details, search and remove do not touch the catalog
        assert_eq!(session.occupancy_map(Floor::Upper).unwrap().occupied(), 1);
        assert!(session.details(&pos("R524_1")).unwrap().is_some());
        assert_eq!(session.search("queijo").unwrap().len(), 1);
        assert!(session.remove(&pos("R524_1")).unwrap());

        let err = session.catalog().unwrap_err();
        assert!(matches!(
            &err,
            SessionError::CatalogUnavailable { source, .. }
                if matches!(source.as_ref(), CatalogError::Schema { .. })
        ));
        assert!(matches!(
            session.register_entry(&pos("R524_2"), "L1"),
            Err(SessionError::CatalogUnavailable { .. })
        ));
        assert_eq!(session.store().count().unwrap(), 0);
        assert!(matches!(
            session.refresh(),
            Err(SessionError::Catalog(CatalogError::Schema { .. }))
        ));

        // Fixing the file brings the catalog back on refresh
        fs::write(
            tmp.path().join("produtos.csv"),
            "Lote;Produto;Estoque;Observacoes\nL1;Requeijão;5;\n",
        )
        .unwrap();
        session.refresh().unwrap();
        assert_eq!(session.catalog().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let (tmp, mut session) = session_with_catalog(Some(CATALOG));
        fs::write(tmp.path().join("produtos.csv"), "Codigo,Descricao\nL100,Queijo\n").unwrap();

        assert!(session.reload_catalog().is_err());
        assert_eq!(session.catalog().unwrap().len(), 2);
        let reg = session.register_entry(&pos("R524_1"), "L100").unwrap();
        assert_eq!(reg.record.product, "Queijo");
    }
}
