//! HTTP layer for the Wayfarer game server.
//!
//! Handlers are thin: resolve the session, call one engine operation, map the
//! result onto the wire types. They are free functions so tests can invoke
//! them directly with axum extractors.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use rusqlite::OptionalExtension;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use wayfarer_engine::{Engine, Region, SaveRow, WorldError};
use wayfarer_protocol::{
    CharacterDto, CoordDto, FastTravelInput, FastTravelOutcome, LoadGameOutcome, NamedRegionDto,
    OkResponse, PoiDto, RegionDto, RegionSources, SaveDto, SavePositionInput, SettlementDto,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

pub type ApiError = (StatusCode, String);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/world/regions/{region_id}", get(api_region))
        .route("/game/load/{character_id}", get(api_load_game))
        .route("/game/save-position/{character_id}", post(api_save_position))
        .route("/game/fast-travel/{character_id}", post(api_fast_travel))
        .with_state(Arc::new(state))
        // The game client is a separate origin (dev server or packaged app);
        // the session header is the actual gate, so CORS stays permissive.
        .layer(
            CorsLayer::new()
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_origin(Any),
        )
}

async fn health() -> &'static str {
    "ok"
}

/// Resolve the caller's account from the session header. The core trusts this
/// ownership context; issuing sessions is someone else's job.
fn require_session(engine: &Engine, headers: &HeaderMap) -> Result<String, ApiError> {
    let session_id = headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .ok_or((StatusCode::UNAUTHORIZED, "Missing session".to_string()))?;

    let conn = engine.open().map_err(internal)?;
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT account_id, expires_at_ms FROM sessions WHERE id = ?1",
            [&session_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()
        .map_err(internal)?;

    match row {
        Some((account_id, expires_at_ms)) if expires_at_ms >= now_ms() => Ok(account_id),
        _ => Err((StatusCode::UNAUTHORIZED, "Invalid session".to_string())),
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    tracing::error!(%err, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
}

fn map_world_error(err: WorldError) -> ApiError {
    match err {
        WorldError::RegionNotFound(_) => (StatusCode::NOT_FOUND, "Region not found".to_string()),
        WorldError::CharacterNotFound => {
            (StatusCode::NOT_FOUND, "Character not found".to_string())
        }
        WorldError::SettlementNotFound(_) => {
            (StatusCode::NOT_FOUND, "Settlement not found".to_string())
        }
        WorldError::InsufficientFunds { .. }
        | WorldError::PositionOutOfBounds { .. }
        | WorldError::PositionBlocked { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        WorldError::Storage(_) | WorldError::Internal(_) => internal(err),
    }
}

fn save_dto(save: &SaveRow) -> SaveDto {
    SaveDto {
        region_id: save.region_id.clone(),
        x: save.x,
        y: save.y,
        last_seen_at: save.last_seen_at_ms,
        state_json: save.state_json.clone(),
    }
}

fn region_dto(region: &Region) -> RegionDto {
    RegionDto {
        id: region.id.clone(),
        name: region.name.clone(),
        width: region.width,
        height: region.height,
        legend: region.legend.clone(),
        tiles: region.tiles.clone(),
        named_regions: region
            .named_regions
            .iter()
            .map(|r| NamedRegionDto {
                name: r.name.clone(),
                x1: r.x1,
                y1: r.y1,
                x2: r.x2,
                y2: r.y2,
            })
            .collect(),
        settlements: region
            .settlements
            .iter()
            .map(|s| SettlementDto {
                id: s.id.clone(),
                name: s.name.clone(),
                kind: s.kind.as_str().to_string(),
                x: s.x,
                y: s.y,
                signpost: s.signpost.map(|c| CoordDto { x: c.x, y: c.y }),
                travel_fee: s.travel_fee,
                tier: s.tier,
                prosperity: s.prosperity,
            })
            .collect(),
        points_of_interest: region
            .points_of_interest
            .iter()
            .map(|p| PoiDto {
                id: p.id.clone(),
                name: p.name.clone(),
                kind: p.kind.as_str().to_string(),
                x: p.x,
                y: p.y,
                min_level: p.min_level,
                note: p.note.clone(),
            })
            .collect(),
        sources: RegionSources {
            tiles: "json".to_string(),
            settlements: "db".to_string(),
        },
    }
}

pub async fn api_region(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RegionDto>, ApiError> {
    let _account_id = require_session(&state.engine, &headers)?;
    let region = state.engine.load_region(&region_id).map_err(map_world_error)?;
    Ok(Json(region_dto(&region)))
}

pub async fn api_load_game(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LoadGameOutcome>, ApiError> {
    let account_id = require_session(&state.engine, &headers)?;
    let (character, save) = state
        .engine
        .load_game(&account_id, &character_id)
        .map_err(map_world_error)?;
    Ok(Json(LoadGameOutcome {
        character: CharacterDto {
            id: character.id,
            name: character.name,
            level: character.level,
            gold: character.gold,
        },
        save: save.as_ref().map(save_dto),
    }))
}

pub async fn api_save_position(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<SavePositionInput>,
) -> Result<Json<OkResponse>, ApiError> {
    let account_id = require_session(&state.engine, &headers)?;
    state
        .engine
        .save_position(&account_id, &character_id, &input.region_id, input.x, input.y)
        .map_err(map_world_error)?;
    Ok(Json(OkResponse::default()))
}

pub async fn api_fast_travel(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<FastTravelInput>,
) -> Result<Json<FastTravelOutcome>, ApiError> {
    let account_id = require_session(&state.engine, &headers)?;
    let receipt = state
        .engine
        .fast_travel(
            &account_id,
            &character_id,
            &input.region_id,
            &input.settlement_id,
        )
        .map_err(map_world_error)?;
    Ok(Json(FastTravelOutcome {
        ok: true,
        fee: receipt.fee,
        gold: receipt.gold,
        settlement_name: receipt.settlement_name,
        save: save_dto(&receipt.save),
    }))
}

pub async fn serve(addr: SocketAddr, db_path: PathBuf, world_dir: PathBuf) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_listener(listener, db_path, world_dir, async {
        std::future::pending::<()>().await
    })
    .await?;
    Ok(())
}

pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    db_path: PathBuf,
    world_dir: PathBuf,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<SocketAddr> {
    let state = AppState {
        engine: Engine::new(db_path, world_dir),
    };
    // Fail fast if sqlite is unavailable.
    let _ = state.engine.open()?;
    let app = build_router(state);
    let addr = listener.local_addr()?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(addr)
}

#[cfg(test)]
mod tests;
