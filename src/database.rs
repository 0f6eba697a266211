//! Database connection and schema
//!
//! Uses parameterized queries exclusively for security (no SQL string
//! concatenation). All importer writes are transactional.

use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Open (or create) the catalog database and initialize its schema
///
/// Creates the parent directory if it does not exist.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("Created directory: {}", parent.display());
        }
    }

    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    log::info!("Opened database: {}", path.display());
    Ok(conn)
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `artists`: card artists, de-duplicated by exact name during import
/// - `cards`: the card catalog, one row per uuid
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            external_id TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name);

        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            mana_value REAL,
            mana_cost TEXT,
            rarity TEXT,
            set_code TEXT,
            subtype TEXT,
            type TEXT,
            text TEXT,
            artist_id INTEGER REFERENCES artists(id)
        );

        CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(name);
        CREATE INDEX IF NOT EXISTS idx_cards_set_code ON cards(set_code);
        CREATE INDEX IF NOT EXISTS idx_cards_artist ON cards(artist_id);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}
