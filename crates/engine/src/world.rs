//! World catalog: composes a region's terrain description with the live
//! settlement and point-of-interest registries.
//!
//! Terrain is a slow-changing cache on disk (`<region_id>_v1.json`); the
//! entity tables are the source of truth and are re-queried on every load, so
//! a `Region` is always a fresh, immutable merge of both sources.

use crate::{Engine, WorldError};
use anyhow::Context;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A grid coordinate. `y` grows downward, matching the terrain rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Settlement kinds, ordered by prestige. The ordering drives the default
/// travel fee table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementKind {
    Village,
    Town,
    City,
    Capital,
}

impl SettlementKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "town" => Self::Town,
            "city" => Self::City,
            "capital" => Self::Capital,
            "village" => Self::Village,
            other => {
                tracing::warn!(kind = other, "unknown settlement kind, treating as village");
                Self::Village
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Village => "village",
            Self::Town => "town",
            Self::City => "city",
            Self::Capital => "capital",
        }
    }

    /// Canonical cart-fee table, cheapest to most expensive.
    pub fn default_fee(self) -> i64 {
        match self {
            Self::Village => 10,
            Self::Town => 25,
            Self::City => 40,
            Self::Capital => 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub id: String,
    pub name: String,
    pub kind: SettlementKind,
    pub x: i64,
    pub y: i64,
    /// Secondary coordinate a traveller arrives at; also indexed on the map.
    pub signpost: Option<Coord>,
    /// Explicit fee override; beats the kind default when present.
    pub travel_fee: Option<i64>,
    pub tier: Option<i64>,
    pub prosperity: Option<i64>,
}

impl Settlement {
    pub fn fee(&self) -> i64 {
        self.travel_fee.unwrap_or_else(|| self.kind.default_fee())
    }

    /// Where fast travel drops the character: the signpost if one exists,
    /// otherwise the settlement's own coordinate.
    pub fn arrival(&self) -> Coord {
        self.signpost.unwrap_or(Coord::new(self.x, self.y))
    }
}

/// Optional settlement fields stored in `meta_json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettlementMeta {
    #[serde(default)]
    signpost: Option<Coord>,
    #[serde(default)]
    travel_fee: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Ruins,
    Cave,
    EnemyCamp,
    MountainSummit,
}

impl PoiKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "cave" => Self::Cave,
            "enemy_camp" => Self::EnemyCamp,
            "mountain_summit" => Self::MountainSummit,
            "ruins" => Self::Ruins,
            other => {
                tracing::warn!(kind = other, "unknown poi kind, treating as ruins");
                Self::Ruins
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ruins => "ruins",
            Self::Cave => "cave",
            Self::EnemyCamp => "enemy_camp",
            Self::MountainSummit => "mountain_summit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub kind: PoiKind,
    pub x: i64,
    pub y: i64,
    pub min_level: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PoiMeta {
    #[serde(default)]
    note: Option<String>,
}

/// Axis-aligned labelled rectangle; only used to name the area containing a
/// coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRegion {
    pub name: String,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl NamedRegion {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// On-disk terrain description, versioned independently of entity data.
#[derive(Debug, Deserialize)]
struct TerrainFile {
    id: String,
    name: String,
    width: i64,
    height: i64,
    #[serde(default)]
    legend: HashMap<String, String>,
    tiles: Vec<String>,
    #[serde(default, rename = "namedRegions")]
    named_regions: Vec<NamedRegion>,
}

/// A composed region: immutable terrain plus the entity lists current at load
/// time. Rebuilt wholesale on every load, never mutated in place.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub width: i64,
    pub height: i64,
    pub legend: HashMap<String, String>,
    pub tiles: Vec<String>,
    pub named_regions: Vec<NamedRegion>,
    pub settlements: Vec<Settlement>,
    pub points_of_interest: Vec<PointOfInterest>,
}

impl Region {
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Terrain symbol at a coordinate. Out-of-range lookups and short rows
    /// fall back to `.` (grass).
    pub fn symbol_at(&self, x: i64, y: i64) -> char {
        if x < 0 || y < 0 {
            return '.';
        }
        self.tiles
            .get(y as usize)
            .and_then(|row| row.chars().nth(x as usize))
            .unwrap_or('.')
    }

    /// Human label for a terrain symbol; unknown symbols read as "grass".
    pub fn tile_label(&self, symbol: char) -> &str {
        self.legend
            .get(&symbol.to_string())
            .map(String::as_str)
            .unwrap_or("grass")
    }

    pub fn named_region_at(&self, x: i64, y: i64) -> Option<&str> {
        self.named_regions
            .iter()
            .find(|r| r.contains(x, y))
            .map(|r| r.name.as_str())
    }

    pub fn settlement(&self, settlement_id: &str) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.id == settlement_id)
    }
}

fn region_id_is_sane(region_id: &str) -> bool {
    // The id becomes a file name; keep it to a conservative charset.
    !region_id.is_empty()
        && region_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Engine {
    /// Compose a region from its terrain file and the current entity tables.
    pub fn load_region(&self, region_id: &str) -> Result<Region, WorldError> {
        if !region_id_is_sane(region_id) {
            return Err(WorldError::RegionNotFound(region_id.to_string()));
        }

        let terrain_path = self.world_dir().join(format!("{region_id}_v1.json"));
        if !terrain_path.exists() {
            return Err(WorldError::RegionNotFound(region_id.to_string()));
        }

        let raw = std::fs::read_to_string(&terrain_path)
            .with_context(|| format!("read terrain file: {}", terrain_path.display()))
            .map_err(WorldError::Internal)?;
        let terrain: TerrainFile = serde_json::from_str(&raw)
            .with_context(|| format!("parse terrain file: {}", terrain_path.display()))
            .map_err(WorldError::Internal)?;

        if terrain.height != terrain.tiles.len() as i64
            || terrain
                .tiles
                .iter()
                .any(|row| row.chars().count() as i64 != terrain.width)
        {
            return Err(WorldError::Internal(anyhow::anyhow!(
                "malformed terrain grid in {}",
                terrain_path.display()
            )));
        }

        let conn = self.open()?;
        let settlements = load_settlements(&conn, region_id)?;
        let points_of_interest = load_pois(&conn, region_id)?;

        tracing::debug!(
            region_id,
            settlements = settlements.len(),
            pois = points_of_interest.len(),
            "composed region"
        );

        Ok(Region {
            id: terrain.id,
            name: terrain.name,
            width: terrain.width,
            height: terrain.height,
            legend: terrain.legend,
            tiles: terrain.tiles,
            named_regions: terrain.named_regions,
            settlements,
            points_of_interest,
        })
    }
}

fn load_settlements(conn: &Connection, region_id: &str) -> Result<Vec<Settlement>, WorldError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, x, y, tier, prosperity, meta_json
         FROM settlements
         WHERE region_id = ?1
         ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([region_id], |row| {
        let meta_json: String = row.get(7)?;
        // Malformed meta is tolerated as empty rather than failing the load.
        let meta: SettlementMeta = serde_json::from_str(&meta_json).unwrap_or_default();
        Ok(Settlement {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: SettlementKind::parse(&row.get::<_, String>(2)?),
            x: row.get(3)?,
            y: row.get(4)?,
            signpost: meta.signpost,
            travel_fee: meta.travel_fee,
            tier: row.get(5)?,
            prosperity: row.get(6)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_pois(conn: &Connection, region_id: &str) -> Result<Vec<PointOfInterest>, WorldError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, x, y, min_level, meta_json
         FROM pois
         WHERE region_id = ?1
         ORDER BY min_level ASC, name ASC",
    )?;
    let rows = stmt.query_map([region_id], |row| {
        let meta_json: String = row.get(6)?;
        let meta: PoiMeta = serde_json::from_str(&meta_json).unwrap_or_default();
        Ok(PointOfInterest {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: PoiKind::parse(&row.get::<_, String>(2)?),
            x: row.get(3)?,
            y: row.get(4)?,
            min_level: row.get(5)?,
            note: meta.note,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
