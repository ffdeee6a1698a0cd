//! Position persistence: one canonical save row per character, written through
//! an idempotent upsert keyed on character id.

use crate::movement::is_walkable;
use crate::{now_ms, Engine, WorldError};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// The slice of the character record the travel engine reads.
#[derive(Debug, Clone)]
pub struct CharacterSummary {
    pub id: String,
    pub name: String,
    pub level: i64,
    pub gold: i64,
}

/// A character's save row. `state_json` is an opaque blob owned by other
/// subsystems (quest flags, starter kit); position writes never touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRow {
    pub character_id: String,
    pub region_id: String,
    pub x: i64,
    pub y: i64,
    pub last_seen_at_ms: i64,
    pub state_json: String,
}

impl SaveRow {
    /// Parsed view of the state blob. Malformed JSON reads as empty.
    pub fn state(&self) -> CharacterState {
        serde_json::from_str(&self.state_json).unwrap_or_default()
    }
}

/// Minimal documented schema of the state blob; anything else rides along in
/// `extra` untouched.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterState {
    pub starter_kit_id: Option<String>,
    pub objectives: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Ownership check: the character must belong to the calling account. A
/// mismatch reads the same as a missing character.
pub(crate) fn require_character(
    conn: &Connection,
    character_id: &str,
    account_id: &str,
) -> Result<CharacterSummary, WorldError> {
    conn.query_row(
        "SELECT id, name, level, gold FROM characters WHERE id = ?1 AND account_id = ?2",
        [character_id, account_id],
        |row| {
            Ok(CharacterSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                level: row.get(2)?,
                gold: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or(WorldError::CharacterNotFound)
}

pub(crate) fn read_save(
    conn: &Connection,
    character_id: &str,
) -> Result<Option<SaveRow>, WorldError> {
    Ok(conn
        .query_row(
            "SELECT character_id, region_id, x, y, last_seen_at_ms, state_json
             FROM saves WHERE character_id = ?1",
            [character_id],
            |row| {
                Ok(SaveRow {
                    character_id: row.get(0)?,
                    region_id: row.get(1)?,
                    x: row.get(2)?,
                    y: row.get(3)?,
                    last_seen_at_ms: row.get(4)?,
                    state_json: row.get(5)?,
                })
            },
        )
        .optional()?)
}

/// Upsert the save row, preserving `state_json` on conflict. Safe to call in
/// quick succession; the primary key keeps the row unique and the last write
/// wins.
pub(crate) fn upsert_save(
    conn: &Connection,
    character_id: &str,
    region_id: &str,
    x: i64,
    y: i64,
    now: i64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO saves (character_id, region_id, x, y, last_seen_at_ms, state_json)
         VALUES (?1, ?2, ?3, ?4, ?5, '{}')
         ON CONFLICT(character_id) DO UPDATE SET
           region_id = excluded.region_id,
           x = excluded.x,
           y = excluded.y,
           last_seen_at_ms = excluded.last_seen_at_ms",
        (character_id, region_id, x, y, now),
    )?;
    Ok(())
}

impl Engine {
    /// Persist a character's position. The position is validated against the
    /// composed region before anything is written; the client's own bounds
    /// check is advisory only.
    pub fn save_position(
        &self,
        account_id: &str,
        character_id: &str,
        region_id: &str,
        x: i64,
        y: i64,
    ) -> Result<SaveRow, WorldError> {
        let region = self.load_region(region_id)?;
        if !region.in_bounds(x, y) {
            return Err(WorldError::PositionOutOfBounds {
                region_id: region_id.to_string(),
                x,
                y,
            });
        }
        if !is_walkable(region.symbol_at(x, y)) {
            return Err(WorldError::PositionBlocked { x, y });
        }

        let conn = self.open()?;
        require_character(&conn, character_id, account_id)?;
        upsert_save(&conn, character_id, &region.id, x, y, now_ms())?;

        let save = read_save(&conn, character_id)?.ok_or(WorldError::CharacterNotFound)?;
        tracing::debug!(character_id, region_id, x, y, "position saved");
        Ok(save)
    }

    /// Character summary plus the save row, for resuming a session.
    pub fn load_game(
        &self,
        account_id: &str,
        character_id: &str,
    ) -> Result<(CharacterSummary, Option<SaveRow>), WorldError> {
        let conn = self.open()?;
        let character = require_character(&conn, character_id, account_id)?;
        let save = read_save(&conn, character_id)?;
        Ok((character, save))
    }
}
