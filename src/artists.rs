//! Artist repository
//!
//! Artists are created lazily by the importer and never updated. The
//! paginated queries back the `/api/artist` endpoints.

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::database::DbResult;
use crate::models::ArtistDto;
use crate::pagination::{self, Page};

/// Page size for artist listings
pub const ARTISTS_PER_PAGE: u64 = 50;

/// Derive the external id for an artist name (lowercase hex content hash)
///
/// Deterministic: the same name always yields the same id.
pub fn artist_external_id(name: &str) -> String {
    format!("{:x}", Sha256::digest(name.as_bytes()))
}

/// Look up an artist id by exact name
pub fn find_artist_by_name(conn: &Connection, name: &str) -> DbResult<Option<i64>> {
    conn.query_row(
        "SELECT id FROM artists WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
}

/// Get an artist by database id
pub fn find_artist_by_id(conn: &Connection, id: i64) -> DbResult<Option<ArtistDto>> {
    conn.query_row(
        "SELECT id, name, external_id FROM artists WHERE id = ?1",
        params![id],
        |row| {
            Ok(ArtistDto {
                id: row.get(0)?,
                name: row.get(1)?,
                artist_external_id: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Insert a new artist and return its id
pub fn insert_artist(conn: &Connection, name: &str, external_id: &str) -> DbResult<i64> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO artists (name, external_id) VALUES (?1, ?2)")?;
    stmt.execute(params![name, external_id])?;
    Ok(conn.last_insert_rowid())
}

/// Get a paginated list of all artists, ordered by name
pub fn paginated_artists(conn: &Connection, page: u64) -> DbResult<Page<ArtistDto>> {
    log::debug!("Fetching paginated artists: page={}", page);

    let total: i64 = conn.query_row("SELECT COUNT(*) FROM artists", [], |row| row.get(0))?;
    let total_items = total as u64;

    let total_pages = pagination::total_pages(total_items, ARTISTS_PER_PAGE);
    let current_page = pagination::clamp_page(page, total_pages);
    let offset = pagination::offset(current_page, ARTISTS_PER_PAGE);

    let mut stmt = conn.prepare_cached(
        "SELECT id, name, external_id FROM artists
         ORDER BY name ASC LIMIT ?1 OFFSET ?2",
    )?;
    let items: DbResult<Vec<ArtistDto>> = stmt
        .query_map(params![ARTISTS_PER_PAGE as i64, offset as i64], |row| {
            Ok(ArtistDto {
                id: row.get(0)?,
                name: row.get(1)?,
                artist_external_id: row.get(2)?,
            })
        })?
        .collect();
    let items = items?;

    log::info!(
        "Retrieved paginated artists: total_items={} current_page={} total_pages={} returned={}",
        total_items,
        current_page,
        total_pages,
        items.len()
    );

    Ok(Page {
        items,
        total_items,
        items_per_page: ARTISTS_PER_PAGE,
        total_pages,
        current_page,
    })
}

/// Search artists by name (case-insensitive substring match), paginated
///
/// Assumes the caller has already validated the query (the API layer
/// rejects queries shorter than 3 characters).
pub fn search_artists_by_name(conn: &Connection, query: &str, page: u64) -> DbResult<Page<ArtistDto>> {
    log::debug!("Searching artists by name: query={} page={}", query, page);

    let pattern = format!("%{}%", query);
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM artists WHERE name LIKE ?1 COLLATE NOCASE",
        params![pattern],
        |row| row.get(0),
    )?;
    let total_items = total as u64;

    let total_pages = pagination::total_pages(total_items, ARTISTS_PER_PAGE);
    let current_page = pagination::clamp_page(page, total_pages);
    let offset = pagination::offset(current_page, ARTISTS_PER_PAGE);

    let mut stmt = conn.prepare_cached(
        "SELECT id, name, external_id FROM artists
         WHERE name LIKE ?1 COLLATE NOCASE
         ORDER BY name ASC LIMIT ?2 OFFSET ?3",
    )?;
    let items: DbResult<Vec<ArtistDto>> = stmt
        .query_map(
            params![pattern, ARTISTS_PER_PAGE as i64, offset as i64],
            |row| {
                Ok(ArtistDto {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    artist_external_id: row.get(2)?,
                })
            },
        )?
        .collect();
    let items = items?;

    log::info!(
        "Artist search results: query={} total_items={} current_page={} returned={}",
        query,
        total_items,
        current_page,
        items.len()
    );

    Ok(Page {
        items,
        total_items,
        items_per_page: ARTISTS_PER_PAGE,
        total_pages,
        current_page,
    })
}
