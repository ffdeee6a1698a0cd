//! SQLite-backed world & travel engine for Wayfarer.
//!
//! The engine owns the game's persistent state (characters, saves, settlement
//! and point-of-interest registries) and the read-only terrain descriptions on
//! disk. Every operation is a single bounded read-modify-write against one
//! `rusqlite::Connection`; the fast-travel gold debit and position upsert share
//! one SQLite transaction so they commit or fail together.

use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

mod error;
mod index;
mod movement;
mod saves;
mod travel;
mod viewport;
mod world;

pub use error::WorldError;
pub use index::SpatialIndex;
pub use movement::{is_walkable, validate_move, Delta, MoveOutcome};
pub use saves::{CharacterState, CharacterSummary, SaveRow};
pub use travel::TravelReceipt;
pub use viewport::{compute_viewport, Viewport, ViewportCell, VIEW_H, VIEW_W};
pub use world::{
    Coord, NamedRegion, PoiKind, PointOfInterest, Region, Settlement, SettlementKind,
};


pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Handle on the game store plus the terrain directory.
///
/// Cheap to clone; each operation opens its own connection (the db lives on
/// local disk and requests are short).
#[derive(Debug, Clone)]
pub struct Engine {
    db_path: PathBuf,
    world_dir: PathBuf,
}

impl Engine {
    pub fn new(db_path: impl Into<PathBuf>, world_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            world_dir: world_dir.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn world_dir(&self) -> &Path {
        &self.world_dir
    }

    pub fn open(&self) -> anyhow::Result<Connection> {
        let path = self.db_path.clone();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create db dir: {}", dir.display()))?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("open sqlite db: {}", path.display()))?;

        // Durable + fast defaults.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        migrate(&conn)?;
        Ok(conn)
    }
}

fn migrate(conn: &Connection) -> anyhow::Result<()> {
    // Lightweight migrations: `user_version` + IF NOT EXISTS keeps installs
    // resilient while the schema is young.
    let v: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if v < 1 {
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS accounts (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL UNIQUE,
  created_at_ms INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
  id TEXT PRIMARY KEY,
  account_id TEXT NOT NULL REFERENCES accounts(id),
  created_at_ms INTEGER NOT NULL,
  expires_at_ms INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS characters (
  id TEXT PRIMARY KEY,
  account_id TEXT NOT NULL REFERENCES accounts(id),
  name TEXT NOT NULL,
  level INTEGER NOT NULL DEFAULT 1,
  gold INTEGER NOT NULL DEFAULT 0 CHECK (gold >= 0),
  created_at_ms INTEGER NOT NULL,
  updated_at_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_characters_account ON characters(account_id);

-- One canonical save row per character; the PRIMARY KEY is the uniqueness
-- guarantee, not any client-side throttling.
CREATE TABLE IF NOT EXISTS saves (
  character_id TEXT PRIMARY KEY REFERENCES characters(id) ON DELETE CASCADE,
  region_id TEXT NOT NULL,
  x INTEGER NOT NULL,
  y INTEGER NOT NULL,
  last_seen_at_ms INTEGER NOT NULL,
  state_json TEXT NOT NULL DEFAULT '{}'
);

-- Live entity registries. Terrain lives in versioned JSON files on disk;
-- these tables are the source of truth for what exists in a region.
CREATE TABLE IF NOT EXISTS settlements (
  id TEXT PRIMARY KEY,
  region_id TEXT NOT NULL,
  name TEXT NOT NULL,
  kind TEXT NOT NULL,
  x INTEGER NOT NULL,
  y INTEGER NOT NULL,
  tier INTEGER,
  prosperity INTEGER,
  meta_json TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_settlements_region ON settlements(region_id);

CREATE TABLE IF NOT EXISTS pois (
  id TEXT PRIMARY KEY,
  region_id TEXT NOT NULL,
  name TEXT NOT NULL,
  kind TEXT NOT NULL,
  x INTEGER NOT NULL,
  y INTEGER NOT NULL,
  min_level INTEGER,
  meta_json TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_pois_region ON pois(region_id);
"#,
        )?;

        conn.pragma_update(None, "user_version", 1_i64)?;
    }

    Ok(())
}
