use actix_files::Files;
use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::time::Duration;
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};

use crate::error::DraftError;
use crate::roster::{
    add_roster_slot, clear_selections, draft_to_my_team, remove_roster_slot, reset_all,
    roster_view, set_my_team_state, set_taken_state, release_player, Position, RosterRow,
};
use crate::status::{is_in_my_team, is_taken, my_team_names, status, taken_players, PlayerStatus, TakenPlayer};
use crate::store::{DraftRegistry, StateStore};
use crate::workbook::{find_position, seed_drafted_column, Workbook};

pub const SESSION_COOKIE: &str = "draft";
const DRAFT_ID_KEY: &str = "draftId";

/// Shared across workers: the rankings workbook (or the reason it could not be loaded)
/// and every browser's draft
pub struct AppState {
    pub workbook: std::result::Result<Workbook, String>,
    pub drafts: DraftRegistry,
}

#[derive(Deserialize)]
pub struct MyTeamRequest {
    player: String,
    position: Option<String>,
    on: bool,
}

#[derive(Deserialize)]
pub struct TakenRequest {
    player: String,
    on: bool,
}

#[derive(Deserialize)]
pub struct PlayerRequest {
    player: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    slot_type: String,
}

/// Everything a renderer needs after any mutation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    roster: Vec<RosterRow>,
    my_team: Vec<String>,
    taken: Vec<TakenPlayer>,
}

#[derive(Serialize)]
pub struct ActionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    state: StateResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    player: String,
    in_my_team: bool,
    is_taken: bool,
    status: PlayerStatus,
}

fn snapshot<S: StateStore + ?Sized>(store: &mut S) -> StateResponse {
    StateResponse {
        roster: roster_view(store),
        my_team: my_team_names(store),
        taken: taken_players(store),
    }
}

fn ok<S: StateStore + ?Sized>(store: &mut S) -> HttpResponse {
    HttpResponse::Ok().json(ActionResponse {
        success: true,
        slot: None,
        error: None,
        state: snapshot(store),
    })
}

/// The draft this browser works on; the first visit mints one and stores its id in the cookie
fn draft_id(session: &Session) -> Result<String> {
    match session.get::<String>(DRAFT_ID_KEY) {
        Ok(Some(id)) if DraftRegistry::is_valid_id(&id) => return Ok(id),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "unreadable draft id in session"),
    }
    let id = DraftRegistry::new_id();
    session
        .insert(DRAFT_ID_KEY, &id)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    tracing::debug!(draft = %id, "new draft started");
    Ok(id)
}

// Workbook endpoint; also carries legacy "drafted" marks into this browser's draft
async fn get_workbook(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    match &state.workbook {
        Ok(workbook) => {
            let id = draft_id(&session)?;
            state.drafts.with_draft(&id, |store| seed_drafted_column(store, workbook));
            Ok(HttpResponse::Ok()
                .insert_header(("Cache-Control", "no-store"))
                .json(workbook))
        }
        Err(message) => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": message}))),
    }
}

async fn get_state(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| HttpResponse::Ok().json(snapshot(store))))
}

async fn get_player(name: web::Path<String>, session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    let player = name.into_inner();
    let response = state.drafts.with_draft(&id, |store| PlayerResponse {
        in_my_team: is_in_my_team(&*store, &player),
        is_taken: is_taken(&*store, &player),
        status: status(&*store, &player),
        player: player.clone(),
    });
    Ok(HttpResponse::Ok().json(response))
}

async fn post_my_team(
    req: web::Json<MyTeamRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = draft_id(&session)?;

    if !req.on {
        return Ok(state.drafts.with_draft(&id, |store| {
            set_my_team_state(store, &req.player, false);
            ok(store)
        }));
    }

    let position = match &req.position {
        Some(pos) => Position::parse(pos),
        None => state
            .workbook
            .as_ref()
            .ok()
            .and_then(|wb| find_position(wb, &req.player))
            .unwrap_or(Position::Other),
    };

    Ok(state.drafts.with_draft(&id, |store| match draft_to_my_team(store, &req.player, position) {
        Ok(slot) => HttpResponse::Ok().json(ActionResponse {
            success: true,
            slot: Some(slot),
            error: None,
            state: snapshot(store),
        }),
        Err(e) => {
            let mut response = match e {
                DraftError::RosterFull { .. } => HttpResponse::Conflict(),
                DraftError::EmptyPlayerName => HttpResponse::BadRequest(),
            };
            response.json(ActionResponse {
                success: false,
                slot: None,
                error: Some(e.to_string()),
                state: snapshot(store),
            })
        }
    }))
}

async fn post_taken(req: web::Json<TakenRequest>, session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if req.player.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": DraftError::EmptyPlayerName.to_string()})));
    }
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| {
        set_taken_state(store, &req.player, req.on);
        ok(store)
    }))
}

async fn release(req: web::Json<PlayerRequest>, session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| {
        release_player(store, &req.player);
        ok(store)
    }))
}

async fn add_slot(req: web::Json<SlotRequest>, session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| {
        add_roster_slot(store, &req.slot_type);
        ok(store)
    }))
}

async fn remove_slot(req: web::Json<SlotRequest>, session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| {
        remove_roster_slot(store, &req.slot_type);
        ok(store)
    }))
}

async fn reset(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| {
        reset_all(store);
        ok(store)
    }))
}

async fn clear(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = draft_id(&session)?;
    Ok(state.drafts.with_draft(&id, |store| {
        clear_selections(store);
        ok(store)
    }))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Signed cookie session; it carries only the browser's draft id
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        // served over plain http on localhost
        .cookie_secure(false)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::days(365)))
        .build()
}

/// Builds the signing key from configuration, falling back to a random one
pub fn session_key(configured: Option<&str>) -> Key {
    match configured.map(|k| Key::try_from(k.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "SESSION_KEY rejected (needs at least 64 bytes), using a random key");
            Key::generate()
        }
        None => {
            tracing::warn!("no SESSION_KEY set, browsers lose their draft on restart");
            Key::generate()
        }
    }
}

/// API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/favicon.ico", web::get().to(favicon))
        .route("/api/workbook", web::get().to(get_workbook))
        .route("/api/state", web::get().to(get_state))
        .service(web::resource("/api/player/{name}").route(web::get().to(get_player)))
        .route("/api/myteam", web::post().to(post_my_team))
        .route("/api/taken", web::post().to(post_taken))
        .route("/api/release", web::post().to(release))
        .route("/api/roster/add", web::post().to(add_slot))
        .route("/api/roster/remove", web::post().to(remove_slot))
        .route("/api/reset", web::post().to(reset))
        .route("/api/clear", web::post().to(clear));
}

pub async fn start_server(
    port: u16,
    workbook: std::result::Result<Workbook, String>,
    drafts: DraftRegistry,
    key: Key,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { workbook, drafts });

    tracing::info!(port, "starting web server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Sheet;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    fn workbook() -> Workbook {
        let rows = [
            ["Rank", "Player Name", "POS", "Drafted"],
            ["1", "Josh Allen", "QB", ""],
            ["2", "Lamar Jackson", "QB", ""],
            ["3", "Bijan Robinson", "RB", "yes"],
        ];
        Workbook {
            file_name: "rankings.csv".into(),
            sheets: vec![Sheet::new(
                "PPR",
                rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
            )],
        }
    }

    macro_rules! app {
        ($workbook:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState { workbook: $workbook, drafts: DraftRegistry::in_memory() }))
                    .wrap(session_middleware(Key::from(&[7u8; 64])))
                    .configure(configure),
            )
            .await
        };
    }

    // Sends a request carrying the session cookie and keeps whatever cookie comes back
    macro_rules! call {
        ($app:expr, $cookie:expr, $req:expr) => {{
            let mut req = $req;
            if let Some(c) = $cookie.clone() {
                req = req.cookie(c);
            }
            let resp = test::call_service(&$app, req.to_request()).await;
            if let Some(c) = resp.response().cookies().find(|c| c.name() == SESSION_COOKIE) {
                $cookie = Some(c.into_owned());
            }
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    fn occupants(body: &Value, slot: &str) -> Value {
        body["state"]["roster"]
            .as_array()
            .and_then(|rows| rows.iter().find(|r| r["type"] == slot))
            .map(|r| r["occupants"].clone())
            .unwrap_or(Value::Null)
    }

    #[actix_web::test]
    async fn drafting_looks_up_position_and_fills_slots() {
        let app = app!(Ok(workbook()));
        let mut cookie: Option<Cookie<'static>> = None;

        let (status, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/myteam")
            .set_json(json!({"player": "Josh Allen", "on": true})));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slot"], "QB");

        let (_, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/myteam")
            .set_json(json!({"player": "Lamar Jackson", "on": true})));
        assert_eq!(body["slot"], "BENCH");
        assert_eq!(occupants(&body, "QB"), json!(["Josh Allen"]));
        assert_eq!(body["state"]["myTeam"], json!(["Josh Allen", "Lamar Jackson"]));

        let (_, body) = call!(app, cookie, test::TestRequest::get().uri("/api/player/Josh%20Allen"));
        assert_eq!(body, json!({"player": "Josh Allen", "inMyTeam": true, "isTaken": false, "status": {"state": "onTeam"}}));
    }

    #[actix_web::test]
    async fn full_roster_is_a_conflict() {
        let app = app!(Ok(workbook()));
        let mut cookie: Option<Cookie<'static>> = None;

        let (_, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/myteam")
            .set_json(json!({"player": "Tony Pollard", "position": "LB", "on": true})));
        assert_eq!(body["slot"], "BENCH");

        for slot in ["K", "DST", "BENCH", "BENCH", "BENCH", "BENCH", "BENCH", "BENCH", "BENCH"] {
            call!(app, cookie, test::TestRequest::post()
                .uri("/api/roster/remove")
                .set_json(json!({"slotType": slot})));
        }

        let (status, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/myteam")
            .set_json(json!({"player": "Brandon Aubrey", "position": "K", "on": true})));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("roster full"));
        assert_eq!(body["state"]["myTeam"], json!([]));
    }

    #[actix_web::test]
    async fn taken_players_leave_my_team_and_can_be_released() {
        let app = app!(Ok(workbook()));
        let mut cookie: Option<Cookie<'static>> = None;

        call!(app, cookie, test::TestRequest::post()
            .uri("/api/myteam")
            .set_json(json!({"player": "Josh Allen", "on": true})));
        let (_, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/taken")
            .set_json(json!({"player": "Josh Allen", "on": true})));

        assert_eq!(body["state"]["myTeam"], json!([]));
        assert_eq!(body["state"]["taken"][0]["name"], "Josh Allen");
        assert_eq!(occupants(&body, "QB"), json!([null]));

        let (_, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/release")
            .set_json(json!({"player": "Josh Allen"})));
        assert_eq!(body["state"]["taken"], json!([]));
    }

    #[actix_web::test]
    async fn roster_edits_and_reset() {
        let app = app!(Ok(workbook()));
        let mut cookie: Option<Cookie<'static>> = None;

        call!(app, cookie, test::TestRequest::post()
            .uri("/api/myteam")
            .set_json(json!({"player": "Josh Allen", "on": true})));
        let (_, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/roster/remove")
            .set_json(json!({"slotType": "QB"})));
        assert!(body["state"]["roster"].as_array().unwrap().iter().all(|r| r["type"] != "QB"));
        assert_eq!(body["state"]["myTeam"], json!([]));

        let (_, body) = call!(app, cookie, test::TestRequest::post()
            .uri("/api/roster/add")
            .set_json(json!({"slotType": "SFLX"})));
        assert_eq!(occupants(&body, "SFLX"), json!([null]));

        let (_, body) = call!(app, cookie, test::TestRequest::post().uri("/api/reset"));
        assert_eq!(body["state"]["roster"].as_array().unwrap().len(), 9);
        assert_eq!(occupants(&body, "SFLX"), json!([]));
    }

    #[actix_web::test]
    async fn sessions_are_isolated() {
        let app = app!(Ok(workbook()));
        let mut first: Option<Cookie<'static>> = None;
        let mut second: Option<Cookie<'static>> = None;

        call!(app, first, test::TestRequest::post()
            .uri("/api/taken")
            .set_json(json!({"player": "Lamar Jackson", "on": true})));
        let (_, body) = call!(app, second, test::TestRequest::get().uri("/api/state"));
        assert_eq!(body["taken"], json!([]));
    }

    #[actix_web::test]
    async fn a_full_draft_of_taken_players_keeps_saving() {
        let app = app!(Ok(workbook()));
        let mut cookie: Option<Cookie<'static>> = None;

        for i in 0..220 {
            let (status, _) = call!(app, cookie, test::TestRequest::post()
                .uri("/api/taken")
                .set_json(json!({"player": format!("Taken Player Number {i:03}"), "on": true})));
            assert_eq!(status, StatusCode::OK, "pick {i}");
        }

        let (_, body) = call!(app, cookie, test::TestRequest::get().uri("/api/state"));
        assert_eq!(body["taken"].as_array().unwrap().len(), 220);
        assert!(cookie.as_ref().unwrap().value().len() < 512);
    }

    #[actix_web::test]
    async fn workbook_seeds_drafted_marks() {
        let app = app!(Ok(workbook()));
        let mut cookie: Option<Cookie<'static>> = None;

        let (status, body) = call!(app, cookie, test::TestRequest::get().uri("/api/workbook"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fileName"], "rankings.csv");

        let (_, body) = call!(app, cookie, test::TestRequest::get().uri("/api/state"));
        assert_eq!(body["myTeam"], json!(["Bijan Robinson"]));
    }

    #[actix_web::test]
    async fn missing_workbook_is_reported() {
        let app = app!(Err("workbook not found at rankings.csv".to_string()));
        let mut cookie: Option<Cookie<'static>> = None;

        let (status, body) = call!(app, cookie, test::TestRequest::get().uri("/api/workbook"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "workbook not found at rankings.csv");
    }
}
