//! Wire types shared by the Wayfarer server and its clients.
//!
//! Everything here is plain serde data; the engine's richer types are mapped
//! into these at the HTTP boundary. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordDto {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i64,
    pub y: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signpost: Option<CoordDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_fee: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosperity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i64,
    pub y: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRegionDto {
    pub name: String,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Marks which backing source each part of a region payload came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSources {
    pub tiles: String,
    pub settlements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDto {
    pub id: String,
    pub name: String,
    pub width: i64,
    pub height: i64,
    pub legend: HashMap<String, String>,
    pub tiles: Vec<String>,
    #[serde(default)]
    pub named_regions: Vec<NamedRegionDto>,
    pub settlements: Vec<SettlementDto>,
    pub points_of_interest: Vec<PoiDto>,
    #[serde(rename = "_sources")]
    pub sources: RegionSources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDto {
    pub id: String,
    pub name: String,
    pub level: i64,
    pub gold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDto {
    pub region_id: String,
    pub x: i64,
    pub y: i64,
    pub last_seen_at: i64,
    pub state_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePositionInput {
    pub region_id: String,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastTravelInput {
    pub region_id: String,
    pub settlement_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastTravelOutcome {
    pub ok: bool,
    pub fee: i64,
    pub gold: i64,
    pub settlement_name: String,
    pub save: SaveDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadGameOutcome {
    pub character: CharacterDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveDto>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}
