//! Product catalog loaded from the lot spreadsheet
//!
//! The catalog is the product spreadsheet (`.xlsx`, read with calamine) or
//! a delimited text export of it, with at least the columns `Lote`,
//! `Produto`, `Estoque` and `Observacoes`. Every cell is kept as a string;
//! blank or missing cells become empty strings. Text exports that are not
//! valid UTF-8 are read as Windows-1252, the encoding spreadsheet programs
//! commonly use for CSV.
//!
//! A lot that appears on several rows resolves to its first row. Later rows
//! for the same lot are counted in [`Catalog::duplicates`] and otherwise
//! ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Column holding the lot identifier
pub const COL_LOT: &str = "lote";
/// Column holding the product name
pub const COL_PRODUCT: &str = "produto";
/// Column holding the stock quantity
pub const COL_STOCK: &str = "estoque";
/// Column holding free-form notes
pub const COL_NOTES: &str = "observacoes";

const REQUIRED_COLUMNS: [&str; 4] = [COL_LOT, COL_PRODUCT, COL_STOCK, COL_NOTES];

/// Header spellings accepted for the canonical columns
const COLUMN_ALIASES: [(&str, &str); 2] = [("observações", COL_NOTES), ("observacao", COL_NOTES)];

/// File extensions read as workbooks rather than delimited text
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Product metadata for one lot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub lot: String,
    pub product: String,
    pub stock: String,
    pub notes: String,
}

/// Errors raised while reading the catalog file
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("cannot read catalog {}", .path.display())]
    #[diagnostic(code(camara::catalog::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "catalog {} is missing required column(s): {}",
        .path.display(),
        .missing.join(", ")
    )]
    #[diagnostic(
        code(camara::catalog::schema),
        help("the header row must contain Lote, Produto, Estoque and Observacoes")
    )]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("catalog {}: parse error at row {row}", .path.display())]
    #[diagnostic(code(camara::catalog::parse))]
    Parse {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read workbook {}", .path.display())]
    #[diagnostic(
        code(camara::catalog::workbook),
        help("the catalog is read from the first sheet of the workbook")
    )]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
}

/// In-memory snapshot of the catalog, keyed by lot
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    /// Lots in file order, for stable listing
    order: Vec<String>,
    duplicates: usize,
    source: Option<PathBuf>,
}

impl Catalog {
    /// An empty catalog, as used when no spreadsheet is available
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the catalog at `path` using `,` for delimited text
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Self::load_with_delimiter(path, b',')
    }

    /// Load the catalog at `path`
    ///
    /// Workbooks are recognized by extension; anything else is read as
    /// delimited text split on `delimiter`. A missing file is not an error:
    /// the tool stays usable without the spreadsheet, so an empty catalog
    /// is returned instead.
    pub fn load_with_delimiter(path: &Path, delimiter: u8) -> Result<Self, CatalogError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "catalog file not found, using empty catalog");
            return Ok(Self::empty());
        }

        let mut catalog = if is_workbook(path) {
            Self::from_workbook(path)?
        } else {
            let file = File::open(path).map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_reader(BufReader::new(file), delimiter, path)?
        };
        catalog.source = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            lots = catalog.len(),
            duplicates = catalog.duplicates,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse delimited text from any reader; `origin` is only used in errors
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, origin: &Path) -> Result<Self, CatalogError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()
            .map_err(|source| CatalogError::Parse {
                path: origin.to_path_buf(),
                row: 1,
                source,
            })?
            .iter()
            .map(decode_field)
            .collect();
        let columns = ColumnMap::from_headers(&headers, origin)?;

        let mut catalog = Self::empty();
        for (row_idx, result) in rdr.byte_records().enumerate() {
            // +2 for 1-indexed and header row
            let row_num = row_idx + 2;
            let record = result.map_err(|source| CatalogError::Parse {
                path: origin.to_path_buf(),
                row: row_num,
                source,
            })?;
            let cells: Vec<String> = record.iter().map(decode_field).collect();
            catalog.insert_first(columns.entry(&cells), row_num);
        }

        Ok(catalog)
    }

    /// Read the first sheet of the workbook at `path`
    pub fn from_workbook(path: &Path) -> Result<Self, CatalogError> {
        let workbook_error = |source: calamine::Error| CatalogError::Workbook {
            path: path.to_path_buf(),
            source,
        };
        let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(workbook_error)?,
            None => calamine::Range::empty(),
        };

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default();
        let columns = ColumnMap::from_headers(&headers, path)?;

        // Sheet rows are 1-indexed; the header sits on the range's first row
        let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let mut catalog = Self::empty();
        for (row_idx, row) in rows.enumerate() {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            catalog.insert_first(columns.entry(&cells), first_row + row_idx + 1);
        }

        Ok(catalog)
    }

    fn insert_first(&mut self, entry: CatalogEntry, row_num: usize) {
        if entry.lot.is_empty() {
            return;
        }
        if self.entries.contains_key(&entry.lot) {
            tracing::warn!(lot = %entry.lot, row = row_num, "duplicate lot in catalog ignored");
            self.duplicates += 1;
            return;
        }
        self.order.push(entry.lot.clone());
        self.entries.insert(entry.lot.clone(), entry);
    }

    pub fn get(&self, lot: &str) -> Option<&CatalogEntry> {
        self.entries.get(lot.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows skipped because their lot was already seen
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// File this catalog was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Entries in file order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.order.iter().filter_map(|lot| self.entries.get(lot))
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Cell as text; empty cells and errors read as ""
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Field bytes as text: UTF-8 when valid, otherwise Windows-1252
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim().to_string(),
        Err(_) => bytes
            .iter()
            .map(|&b| decode_cp1252(b))
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

/// Windows-1252 byte to char; 0xA0..=0xFF match Latin-1
fn decode_cp1252(byte: u8) -> char {
    const HIGH: [char; 32] = [
        '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8d}', 'Ž',
        '\u{8f}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ',
        '\u{9d}', 'ž', 'Ÿ',
    ];
    match byte {
        0x80..=0x9f => HIGH[usize::from(byte - 0x80)],
        b => char::from(b),
    }
}

/// Header name to column index for the four catalog columns
struct ColumnMap {
    lot: usize,
    product: usize,
    stock: usize,
    notes: usize,
}

impl ColumnMap {
    fn from_headers(headers: &[String], origin: &Path) -> Result<Self, CatalogError> {
        let mut header_map: HashMap<String, usize> = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            header_map.entry(canonical_header(h)).or_insert(i);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !header_map.contains_key(**col))
            .map(|col| display_column(col).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::Schema {
                path: origin.to_path_buf(),
                missing,
            });
        }

        Ok(Self {
            lot: header_map[COL_LOT],
            product: header_map[COL_PRODUCT],
            stock: header_map[COL_STOCK],
            notes: header_map[COL_NOTES],
        })
    }

    fn entry(&self, cells: &[String]) -> CatalogEntry {
        let field = |idx: usize| cells.get(idx).cloned().unwrap_or_default();
        CatalogEntry {
            lot: field(self.lot),
            product: field(self.product),
            stock: field(self.stock),
            notes: field(self.notes),
        }
    }
}

fn canonical_header(header: &str) -> String {
    let lower = header.trim().trim_start_matches('\u{feff}').to_lowercase();
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

fn display_column(col: &str) -> &'static str {
    match col {
        COL_LOT => "Lote",
        COL_PRODUCT => "Produto",
        COL_STOCK => "Estoque",
        _ => "Observacoes",
    }
}
