//! Row and API types for cards and artists
//!
//! Card fields are camelCase on the wire, matching the import CSV header;
//! pagination envelope fields are snake_case (see `pagination`).

use serde::{Deserialize, Serialize};

/// One card row from the import CSV
///
/// Field names match the CSV header exactly. Empty CSV fields
/// deserialize to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct CardRecord {
    pub uuid: String,
    #[serde(rename = "manaValue")]
    pub mana_value: Option<f64>,
    #[serde(rename = "manaCost")]
    pub mana_cost: Option<String>,
    pub name: String,
    pub rarity: Option<String>,
    #[serde(rename = "setCode")]
    pub set_code: Option<String>,
    #[serde(rename = "subtypes")]
    pub subtype: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub type_line: Option<String>,
    pub artist: Option<String>,
}

/// Card as returned by the API
///
/// `text` carries literal newlines; the escaped `\n` sequences from the
/// CSV are unescaped when the row is mapped (part of the read contract).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDto {
    pub uuid: String,
    pub name: String,
    pub mana_value: Option<f64>,
    pub mana_cost: Option<String>,
    pub rarity: Option<String>,
    pub set_code: Option<String>,
    pub subtype: Option<String>,
    #[serde(rename = "type")]
    pub type_line: Option<String>,
    pub text: Option<String>,
    pub artist: Option<ArtistRef>,
}

/// Minimal artist reference embedded in a card response
#[derive(Debug, Clone, Serialize)]
pub struct ArtistRef {
    pub id: i64,
    pub name: String,
}

/// Artist as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDto {
    pub id: i64,
    pub name: String,
    /// Derived content hash of the name, not a database identity
    pub artist_external_id: String,
}

/// One entry of the set-code aggregate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCodeCount {
    pub set_code: Option<String>,
    pub card_count: i64,
}

/// Replace escaped newline sequences with literal newlines
pub fn unescape_text(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Build a minimal card record for tests
#[cfg(test)]
pub fn make_test_card(uuid: &str, name: &str, set_code: &str) -> CardRecord {
    CardRecord {
        uuid: uuid.to_string(),
        mana_value: Some(2.0),
        mana_cost: Some("{1}{G}".to_string()),
        name: name.to_string(),
        rarity: Some("common".to_string()),
        set_code: Some(set_code.to_string()),
        subtype: Some("Elf".to_string()),
        text: Some("Vigilance\\nReach".to_string()),
        type_line: Some("Creature".to_string()),
        artist: None,
    }
}
