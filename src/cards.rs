//! Card repository
//!
//! Cards are written only by the importer and read-only through the API.
//! All reads join the owning artist explicitly; there is no lazy loading.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::database::DbResult;
use crate::models::{unescape_text, ArtistRef, CardDto, CardRecord, SetCodeCount};
use crate::pagination::{self, Page};

/// Page size for card listings
pub const CARDS_PER_PAGE: u64 = 100;

const CARD_COLUMNS: &str = "c.uuid, c.name, c.mana_value, c.mana_cost, c.rarity, c.set_code, \
                            c.subtype, c.type, c.text, a.id, a.name";

/// Map a joined card row to its DTO, unescaping stored newline sequences
fn map_card_row(row: &Row<'_>) -> rusqlite::Result<CardDto> {
    let text: Option<String> = row.get(8)?;
    let artist_id: Option<i64> = row.get(9)?;
    let artist_name: Option<String> = row.get(10)?;

    Ok(CardDto {
        uuid: row.get(0)?,
        name: row.get(1)?,
        mana_value: row.get(2)?,
        mana_cost: row.get(3)?,
        rarity: row.get(4)?,
        set_code: row.get(5)?,
        subtype: row.get(6)?,
        type_line: row.get(7)?,
        text: text.map(|t| unescape_text(&t)),
        artist: match (artist_id, artist_name) {
            (Some(id), Some(name)) => Some(ArtistRef { id, name }),
            _ => None,
        },
    })
}

/// Fetch the set of all card uuids (used by the importer for dedup)
pub fn all_uuids(conn: &Connection) -> DbResult<HashSet<String>> {
    log::debug!("Fetching all card UUIDs");

    let mut stmt = conn.prepare("SELECT uuid FROM cards")?;
    let uuids: DbResult<HashSet<String>> = stmt.query_map([], |row| row.get(0))?.collect();
    let uuids = uuids?;

    log::info!("Found {} card UUIDs", uuids.len());
    Ok(uuids)
}

/// Get a single card by uuid, with its artist joined in
pub fn find_card_by_uuid(conn: &Connection, uuid: &str) -> DbResult<Option<CardDto>> {
    let sql = format!(
        "SELECT {CARD_COLUMNS} FROM cards c
         LEFT JOIN artists a ON a.id = c.artist_id
         WHERE c.uuid = ?1"
    );
    conn.query_row(&sql, params![uuid], map_card_row).optional()
}

/// Insert a card row (importer write path)
pub fn insert_card(conn: &Connection, record: &CardRecord, artist_id: Option<i64>) -> DbResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO cards
         (uuid, name, mana_value, mana_cost, rarity, set_code, subtype, type, text, artist_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    stmt.execute(params![
        &record.uuid,
        &record.name,
        record.mana_value,
        &record.mana_cost,
        &record.rarity,
        &record.set_code,
        &record.subtype,
        &record.type_line,
        &record.text,
        artist_id,
    ])?;
    Ok(())
}

/// Get a paginated list of all cards, ordered by name, optionally
/// filtered by exact set code
pub fn paginated_cards(conn: &Connection, page: u64, set_code: Option<&str>) -> DbResult<Page<CardDto>> {
    log::debug!("Fetching paginated cards: page={} set_code={:?}", page, set_code);

    let total: i64 = match set_code {
        Some(code) => conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE set_code = ?1",
            params![code],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?,
    };
    let total_items = total as u64;

    let total_pages = pagination::total_pages(total_items, CARDS_PER_PAGE);
    let current_page = pagination::clamp_page(page, total_pages);
    let offset = pagination::offset(current_page, CARDS_PER_PAGE);

    let items = match set_code {
        Some(code) => {
            let sql = format!(
                "SELECT {CARD_COLUMNS} FROM cards c
                 LEFT JOIN artists a ON a.id = c.artist_id
                 WHERE c.set_code = ?1
                 ORDER BY c.name ASC LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows: DbResult<Vec<CardDto>> = stmt
                .query_map(
                    params![code, CARDS_PER_PAGE as i64, offset as i64],
                    map_card_row,
                )?
                .collect();
            rows?
        }
        None => {
            let sql = format!(
                "SELECT {CARD_COLUMNS} FROM cards c
                 LEFT JOIN artists a ON a.id = c.artist_id
                 ORDER BY c.name ASC LIMIT ?1 OFFSET ?2"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows: DbResult<Vec<CardDto>> = stmt
                .query_map(params![CARDS_PER_PAGE as i64, offset as i64], map_card_row)?
                .collect();
            rows?
        }
    };

    log::info!(
        "Retrieved paginated cards: total_items={} current_page={} total_pages={} returned={} set_code={:?}",
        total_items,
        current_page,
        total_pages,
        items.len(),
        set_code
    );

    Ok(Page {
        items,
        total_items,
        items_per_page: CARDS_PER_PAGE,
        total_pages,
        current_page,
    })
}

/// Search cards by name (case-insensitive substring match), paginated,
/// optionally filtered by exact set code
///
/// Assumes a validated non-empty query; the API layer rejects queries
/// shorter than 3 characters before calling this.
pub fn search_cards_by_name(
    conn: &Connection,
    query: &str,
    set_code: Option<&str>,
    page: u64,
) -> DbResult<Page<CardDto>> {
    log::debug!(
        "Searching cards by name: query={} set_code={:?} page={}",
        query,
        set_code,
        page
    );

    let pattern = format!("%{}%", query);
    let total: i64 = match set_code {
        Some(code) => conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE name LIKE ?1 COLLATE NOCASE AND set_code = ?2",
            params![pattern, code],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE name LIKE ?1 COLLATE NOCASE",
            params![pattern],
            |row| row.get(0),
        )?,
    };
    let total_items = total as u64;

    let total_pages = pagination::total_pages(total_items, CARDS_PER_PAGE);
    let current_page = pagination::clamp_page(page, total_pages);
    let offset = pagination::offset(current_page, CARDS_PER_PAGE);

    let items = match set_code {
        Some(code) => {
            let sql = format!(
                "SELECT {CARD_COLUMNS} FROM cards c
                 LEFT JOIN artists a ON a.id = c.artist_id
                 WHERE c.name LIKE ?1 COLLATE NOCASE AND c.set_code = ?2
                 ORDER BY c.name ASC LIMIT ?3 OFFSET ?4"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows: DbResult<Vec<CardDto>> = stmt
                .query_map(
                    params![pattern, code, CARDS_PER_PAGE as i64, offset as i64],
                    map_card_row,
                )?
                .collect();
            rows?
        }
        None => {
            let sql = format!(
                "SELECT {CARD_COLUMNS} FROM cards c
                 LEFT JOIN artists a ON a.id = c.artist_id
                 WHERE c.name LIKE ?1 COLLATE NOCASE
                 ORDER BY c.name ASC LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows: DbResult<Vec<CardDto>> = stmt
                .query_map(
                    params![pattern, CARDS_PER_PAGE as i64, offset as i64],
                    map_card_row,
                )?
                .collect();
            rows?
        }
    };

    log::info!(
        "Card search results: query={} total_items={} current_page={} returned={} set_code={:?}",
        query,
        total_items,
        current_page,
        items.len(),
        set_code
    );

    Ok(Page {
        items,
        total_items,
        items_per_page: CARDS_PER_PAGE,
        total_pages,
        current_page,
    })
}

/// Get all distinct set codes with their card counts, ordered by set code
pub fn set_codes(conn: &Connection) -> DbResult<Vec<SetCodeCount>> {
    log::debug!("Fetching all set codes");

    let mut stmt = conn.prepare(
        "SELECT set_code, COUNT(*) FROM cards GROUP BY set_code ORDER BY set_code ASC",
    )?;
    let results: DbResult<Vec<SetCodeCount>> = stmt
        .query_map([], |row| {
            Ok(SetCodeCount {
                set_code: row.get(0)?,
                card_count: row.get(1)?,
            })
        })?
        .collect();
    let results = results?;

    log::info!("Found {} unique set codes", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_schema;
    use crate::models::make_test_card;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_find_by_uuid() {
        let conn = test_db();
        let record = make_test_card("uuid-1", "Llanowar Elves", "LEA");
        insert_card(&conn, &record, None).unwrap();

        let card = find_card_by_uuid(&conn, "uuid-1").unwrap().unwrap();
        assert_eq!(card.name, "Llanowar Elves");
        assert_eq!(card.set_code.as_deref(), Some("LEA"));
        assert!(card.artist.is_none());
    }

    #[test]
    fn find_by_uuid_returns_none_for_unknown() {
        let conn = test_db();
        assert!(find_card_by_uuid(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn card_text_is_unescaped_on_read() {
        let conn = test_db();
        let mut record = make_test_card("uuid-1", "Serra Angel", "LEA");
        record.text = Some("Flying\\nVigilance".to_string());
        insert_card(&conn, &record, None).unwrap();

        let card = find_card_by_uuid(&conn, "uuid-1").unwrap().unwrap();
        assert_eq!(card.text.as_deref(), Some("Flying\nVigilance"));

        // Stored value keeps the escaped form
        let stored: String = conn
            .query_row("SELECT text FROM cards WHERE uuid = 'uuid-1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(stored, "Flying\\nVigilance");
    }

    #[test]
    fn card_carries_its_artist() {
        let conn = test_db();
        let artist_id = crate::artists::insert_artist(&conn, "Mark Poole", "abc").unwrap();
        let record = make_test_card("uuid-1", "Ancestral Recall", "LEA");
        insert_card(&conn, &record, Some(artist_id)).unwrap();

        let card = find_card_by_uuid(&conn, "uuid-1").unwrap().unwrap();
        let artist = card.artist.unwrap();
        assert_eq!(artist.id, artist_id);
        assert_eq!(artist.name, "Mark Poole");
    }

    #[test]
    fn all_uuids_collects_every_card() {
        let conn = test_db();
        insert_card(&conn, &make_test_card("a", "Card A", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("b", "Card B", "LEB"), None).unwrap();

        let uuids = all_uuids(&conn).unwrap();
        assert_eq!(uuids.len(), 2);
        assert!(uuids.contains("a"));
        assert!(uuids.contains("b"));
    }

    #[test]
    fn paginated_cards_orders_by_name() {
        let conn = test_db();
        insert_card(&conn, &make_test_card("a", "Wrath of God", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("b", "Black Lotus", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("c", "Mox Pearl", "LEA"), None).unwrap();

        let page = paginated_cards(&conn, 1, None).unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.items[0].name, "Black Lotus");
        assert_eq!(page.items[2].name, "Wrath of God");
    }

    #[test]
    fn paginated_cards_filters_by_set_code() {
        let conn = test_db();
        insert_card(&conn, &make_test_card("a", "Black Lotus", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("b", "Black Lotus", "LEB"), None).unwrap();

        let page = paginated_cards(&conn, 1, Some("LEB")).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].uuid, "b");
    }

    #[test]
    fn paginated_cards_clamps_past_last_page() {
        let conn = test_db();
        // 110 cards, two pages of 100
        for i in 0..110 {
            let record = make_test_card(&format!("uuid-{i}"), &format!("Card {:03}", i), "LEA");
            insert_card(&conn, &record, None).unwrap();
        }

        let page = paginated_cards(&conn, 50, None).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].name, "Card 100");
    }

    #[test]
    fn paginated_cards_empty_table_yields_one_page() {
        let conn = test_db();
        let page = paginated_cards(&conn, 1, None).unwrap();
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let conn = test_db();
        insert_card(&conn, &make_test_card("a", "Lightning Bolt", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("b", "Lightning Strike", "M19"), None).unwrap();
        insert_card(&conn, &make_test_card("c", "Shock", "M19"), None).unwrap();

        let page = search_cards_by_name(&conn, "lightning", None, 1).unwrap();
        assert_eq!(page.total_items, 2);

        let page = search_cards_by_name(&conn, "BOLT", None, 1).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].name, "Lightning Bolt");
    }

    #[test]
    fn search_combines_query_and_set_filter() {
        let conn = test_db();
        insert_card(&conn, &make_test_card("a", "Lightning Bolt", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("b", "Lightning Strike", "M19"), None).unwrap();

        let page = search_cards_by_name(&conn, "lightning", Some("M19"), 1).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].uuid, "b");
    }

    #[test]
    fn set_codes_counts_each_set_once_ascending() {
        let conn = test_db();
        insert_card(&conn, &make_test_card("a", "Card A", "M19"), None).unwrap();
        insert_card(&conn, &make_test_card("b", "Card B", "LEA"), None).unwrap();
        insert_card(&conn, &make_test_card("c", "Card C", "LEA"), None).unwrap();

        let codes = set_codes(&conn).unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].set_code.as_deref(), Some("LEA"));
        assert_eq!(codes[0].card_count, 2);
        assert_eq!(codes[1].set_code.as_deref(), Some("M19"));
        assert_eq!(codes[1].card_count, 1);
    }
}
