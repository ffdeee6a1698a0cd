use super::*;
use axum::http::HeaderValue;
use wayfarer_engine::Engine;

fn temp_state() -> Arc<AppState> {
    let stamp = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    let db = std::env::temp_dir().join(format!("wayfarer-server-test-{stamp}.db"));
    let world = std::env::temp_dir().join(format!("wayfarer-server-test-world-{stamp}"));
    std::fs::create_dir_all(&world).unwrap();
    let engine = Engine::new(db, world);
    let _ = engine.open().expect("open db");
    Arc::new(AppState { engine })
}

fn write_hearthlands(engine: &Engine) {
    let tiles: Vec<String> = (0..30).map(|_| ".".repeat(40)).collect();
    let world = serde_json::json!({
        "id": "hearthlands",
        "name": "The Hearthlands",
        "width": 40,
        "height": 30,
        "legend": { ".": "grass" },
        "tiles": tiles,
        "namedRegions": []
    });
    std::fs::write(
        engine.world_dir().join("hearthlands_v1.json"),
        world.to_string(),
    )
    .unwrap();
}

fn seed_player(engine: &Engine, account_id: &str, character_id: &str, gold: i64) {
    let conn = engine.open().unwrap();
    conn.execute(
        "INSERT INTO accounts (id, name, created_at_ms) VALUES (?1, ?1, 1)",
        [account_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO characters (id, account_id, name, level, gold, created_at_ms, updated_at_ms)
         VALUES (?1, ?2, ?1, 1, ?3, 1, 1)",
        (character_id, account_id, gold),
    )
    .unwrap();
}

fn seed_session(engine: &Engine, session_id: &str, account_id: &str, expires_at_ms: i64) {
    let conn = engine.open().unwrap();
    conn.execute(
        "INSERT INTO sessions (id, account_id, created_at_ms, expires_at_ms)
         VALUES (?1, ?2, 1, ?3)",
        (session_id, account_id, expires_at_ms),
    )
    .unwrap();
}

fn seed_brindlewick(engine: &Engine) {
    let conn = engine.open().unwrap();
    conn.execute(
        "INSERT INTO settlements (id, region_id, name, kind, x, y, meta_json)
         VALUES ('brindlewick', 'hearthlands', 'Brindlewick', 'town', 22, 18, ?1)",
        [r#"{"signpost":{"x":21,"y":18}}"#],
    )
    .unwrap();
}

fn far_future() -> i64 {
    i64::MAX / 2
}

fn session_headers(session_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-session-id", HeaderValue::from_str(session_id).unwrap());
    headers
}

#[tokio::test]
async fn missing_session_is_unauthorized() {
    let state = temp_state();
    write_hearthlands(&state.engine);

    let err = api_region(
        State(state),
        Path("hearthlands".to_string()),
        HeaderMap::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 0);
    seed_session(&state.engine, "sess-old", "acct-1", 1);

    let err = api_region(
        State(state),
        Path("hearthlands".to_string()),
        session_headers("sess-old"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_token_is_accepted_too() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 7);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("Bearer sess-1"));

    let out = api_load_game(State(state), Path("char-1".to_string()), headers)
        .await
        .unwrap();
    assert_eq!(out.0.character.gold, 7);
    assert!(out.0.save.is_none());
}

#[tokio::test]
async fn region_payload_merges_both_sources() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_brindlewick(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 0);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    let out = api_region(
        State(state),
        Path("hearthlands".to_string()),
        session_headers("sess-1"),
    )
    .await
    .unwrap();
    let region = out.0;
    assert_eq!(region.width, 40);
    assert_eq!(region.settlements.len(), 1);
    assert_eq!(region.settlements[0].kind, "town");
    assert_eq!(region.sources.settlements, "db");
    assert_eq!(region.sources.tiles, "json");
}

#[tokio::test]
async fn unknown_region_is_not_found() {
    let state = temp_state();
    seed_player(&state.engine, "acct-1", "char-1", 0);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    let err = api_region(
        State(state),
        Path("netherwild".to_string()),
        session_headers("sess-1"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fast_travel_round_trip_through_the_handler() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_brindlewick(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 100);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    let out = api_fast_travel(
        State(state),
        Path("char-1".to_string()),
        session_headers("sess-1"),
        Json(FastTravelInput {
            region_id: "hearthlands".to_string(),
            settlement_id: "brindlewick".to_string(),
        }),
    )
    .await
    .unwrap();
    let outcome = out.0;
    assert!(outcome.ok);
    assert_eq!(outcome.fee, 25);
    assert_eq!(outcome.gold, 75);
    assert_eq!(outcome.settlement_name, "Brindlewick");
    assert_eq!((outcome.save.x, outcome.save.y), (21, 18));
    assert_eq!(outcome.save.region_id, "hearthlands");
}

#[tokio::test]
async fn insufficient_funds_surface_the_required_fee() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_brindlewick(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 24);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    let err = api_fast_travel(
        State(state),
        Path("char-1".to_string()),
        session_headers("sess-1"),
        Json(FastTravelInput {
            region_id: "hearthlands".to_string(),
            settlement_id: "brindlewick".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
    assert!(err.1.contains("25g"), "message should carry the fee: {}", err.1);
}

#[tokio::test]
async fn save_position_upserts_and_acknowledges() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 0);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    for (x, y) in [(4, 4), (5, 4)] {
        let out = api_save_position(
            State(state.clone()),
            Path("char-1".to_string()),
            session_headers("sess-1"),
            Json(SavePositionInput {
                region_id: "hearthlands".to_string(),
                x,
                y,
            }),
        )
        .await
        .unwrap();
        assert!(out.0.ok);
    }

    let conn = state.engine.open().unwrap();
    let (count, x): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), MAX(x) FROM saves WHERE character_id='char-1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(x, 5);
}

#[tokio::test]
async fn save_position_out_of_bounds_is_a_bad_request() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 0);
    seed_session(&state.engine, "sess-1", "acct-1", far_future());

    let err = api_save_position(
        State(state),
        Path("char-1".to_string()),
        session_headers("sess-1"),
        Json(SavePositionInput {
            region_id: "hearthlands".to_string(),
            x: -1,
            y: 0,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn someone_elses_character_reads_as_missing() {
    let state = temp_state();
    write_hearthlands(&state.engine);
    seed_player(&state.engine, "acct-1", "char-1", 0);
    seed_player(&state.engine, "acct-2", "char-2", 0);
    seed_session(&state.engine, "sess-2", "acct-2", far_future());

    let err = api_load_game(
        State(state),
        Path("char-1".to_string()),
        session_headers("sess-2"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}
