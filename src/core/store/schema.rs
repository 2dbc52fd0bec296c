//! Database schema initialization

use rusqlite::{params, Connection, OptionalExtension};

use super::{StoreError, SCHEMA_VERSION};

/// Create the `paletes` table and its indexes if they are missing
///
/// Databases created before the lot index existed may already hold the same
/// lot at two positions; the unique index is skipped for those and the
/// insert-time check remains the only guard.
pub(super) fn init_schema(conn: &mut Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS paletes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            posicao TEXT UNIQUE,
            lote TEXT,
            produto TEXT,
            estoque TEXT,
            observacoes TEXT,
            data_entrada TEXT
        );
        "#,
    )?;

    let duplicated_lots: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (SELECT lote FROM paletes WHERE lote IS NOT NULL GROUP BY lote HAVING COUNT(*) > 1)",
        [],
        |row| row.get(0),
    )?;
    if duplicated_lots == 0 {
        conn.execute_batch(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_paletes_lote ON paletes(lote);",
        )?;
    } else {
        tracing::warn!(
            lots = duplicated_lots,
            "lots allocated at more than one position; unique lot index not created"
        );
    }

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    if version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
    }

    Ok(())
}
