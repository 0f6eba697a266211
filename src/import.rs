//! CSV card importer
//!
//! Streams card rows from a CSV export and loads new ones into the
//! database in batched transactions. Re-running on an unchanged file is a
//! no-op: existing uuids are skipped, never updated. Artists are created
//! lazily on first sight of a name, memoized per run.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::artists::{artist_external_id, find_artist_by_name, insert_artist};
use crate::cards::{all_uuids, insert_card};
use crate::error::Result;
use crate::models::CardRecord;

/// Rows per transaction. Bounds both memory and the work lost if a run
/// aborts mid-file: committed batches stay committed.
pub const BATCH_SIZE: usize = 100;

/// Counts reported after an import run. Observability only, no
/// correctness contract.
#[derive(Debug)]
pub struct ImportSummary {
    /// Rows read from the CSV
    pub processed: usize,
    /// New cards inserted
    pub imported: usize,
    /// Rows skipped because their uuid already existed
    pub skipped: usize,
    /// New artist rows created
    pub artists_created: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Import cards from a CSV file
///
/// `limit` stops the scan early after that many processed rows. Any
/// failure rolls back the in-flight batch and aborts the run; the error
/// is logged with the failing row index and returned to the caller.
pub fn run_import(
    conn: &mut Connection,
    csv_path: &Path,
    limit: Option<usize>,
) -> Result<ImportSummary> {
    let start = Instant::now();
    log::info!(
        "Starting card import: file={} limit={:?}",
        csv_path.display(),
        limit
    );

    let mut seen: HashSet<String> = all_uuids(conn)?;
    let mut reader = csv::Reader::from_path(csv_path)?;

    // Run-local memo of artist name -> id, so one name is looked up (or
    // created) at most once per run
    let mut artist_cache: HashMap<String, i64> = HashMap::new();

    let mut processed = 0usize;
    let mut imported = 0usize;
    let mut skipped = 0usize;
    let mut artists_created = 0usize;

    let mut tx = conn.transaction()?;

    for result in reader.deserialize::<CardRecord>() {
        processed += 1;

        let outcome = result.map_err(Into::into).and_then(|record| {
            import_row(
                &tx,
                record,
                &mut seen,
                &mut artist_cache,
                &mut artists_created,
            )
        });

        match outcome {
            Ok(true) => imported += 1,
            Ok(false) => skipped += 1,
            Err(e) => {
                // Dropping the transaction rolls back the current batch
                log::error!("Import failed: error={} row={}", e, processed);
                return Err(e);
            }
        }

        if processed % BATCH_SIZE == 0 {
            tx.commit()?;
            log::info!(
                "Import progress: processed={} imported={} skipped={} artists_created={}",
                processed,
                imported,
                skipped,
                artists_created
            );
            tx = conn.transaction()?;
        }

        if let Some(limit) = limit {
            if processed >= limit {
                log::info!("Import limit reached: limit={}", limit);
                break;
            }
        }
    }

    tx.commit()?;

    let elapsed = start.elapsed();
    let summary = ImportSummary {
        processed,
        imported,
        skipped,
        artists_created,
        elapsed,
    };
    log::info!(
        "Import completed: processed={} imported={} skipped={} artists_created={} elapsed={:.2}s",
        summary.processed,
        summary.imported,
        summary.skipped,
        summary.artists_created,
        summary.elapsed.as_secs_f64()
    );

    Ok(summary)
}

/// Import a single row. Returns true if a card was inserted, false if the
/// uuid was already present.
fn import_row(
    conn: &Connection,
    record: CardRecord,
    seen: &mut HashSet<String>,
    artist_cache: &mut HashMap<String, i64>,
    artists_created: &mut usize,
) -> Result<bool> {
    if seen.contains(&record.uuid) {
        return Ok(false);
    }

    let artist_id = match record.artist.as_deref() {
        Some(name) if !name.is_empty() => {
            Some(resolve_artist(conn, name, artist_cache, artists_created)?)
        }
        _ => None,
    };

    insert_card(conn, &record, artist_id)?;
    seen.insert(record.uuid);
    Ok(true)
}

/// Resolve an artist name to a row id: run cache first, then the store,
/// then create a new row
fn resolve_artist(
    conn: &Connection,
    name: &str,
    cache: &mut HashMap<String, i64>,
    created: &mut usize,
) -> Result<i64> {
    if let Some(&id) = cache.get(name) {
        return Ok(id);
    }

    let id = match find_artist_by_name(conn, name)? {
        Some(id) => id,
        None => {
            let id = insert_artist(conn, name, &artist_external_id(name))?;
            *created += 1;
            log::debug!("Created new artist: {}", name);
            id
        }
    };

    cache.insert(name.to_string(), id);
    Ok(id)
}
