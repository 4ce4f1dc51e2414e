//! Single binary web server: index from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), STORE_PATH
//! (snapshot file, default data/state.json), ADMIN_CODE (enables the admin
//! reset endpoints).

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    get, post,
    web::{self, Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;
use tourney_sim_web::logic::{leaderboard, rating};
use tourney_sim_web::{
    available_matches, commit_series, create_tournament, gamble, load_state, pick_match,
    save_state, start_match, GambleSettings, MatchRef, Phase, SavedState, TeamCatalog,
};

/// In-memory application state: the one live session plus its persistence
/// wiring. The whole struct sits behind a single RwLock so every mutating
/// endpoint serializes on the write guard.
struct AppData {
    catalog: TeamCatalog,
    state: SavedState,
    store_path: PathBuf,
    gamble: GambleSettings,
}

type AppState = Data<RwLock<AppData>>;

/// Snapshot interval for the background autosave task.
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct PickBody {
    match_ref: MatchRef,
    team_id: String,
}

#[derive(Deserialize)]
struct StartMatchBody {
    match_ref: MatchRef,
}

#[derive(Deserialize)]
struct AdminLoginBody {
    code: String,
}

#[derive(Deserialize)]
struct ResetPlacingsBody {
    /// Placings survive everything else; wiping them needs an explicit yes.
    #[serde(default)]
    confirm: bool,
}

/// Persist after a state transition; a failed write is logged, not fatal.
fn persist(data: &AppData) {
    if let Err(e) = save_state(&data.store_path, &data.state) {
        log::error!("snapshot save failed: {}", e);
    }
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>("admin").ok().flatten().unwrap_or(false)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tourney-sim-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Full persisted state: ratings, placings, and the tournament (if any).
#[get("/api/state")]
async fn api_state(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&g.state)
}

/// The fixed team catalog (id, name, color, default rating).
#[get("/api/teams")]
async fn api_teams(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&g.catalog)
}

/// Current standings: rating points descending, catalog order on ties.
#[get("/api/leaderboard")]
async fn api_leaderboard(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(leaderboard::standings(&g.state.ratings, &g.catalog))
}

/// Pick'em totals of the running tournament (zeros when there is none).
#[get("/api/pickem")]
async fn api_pickem(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match &g.state.tournament {
        Some(t) => HttpResponse::Ok().json(&t.pickem),
        None => HttpResponse::Ok().json(tourney_sim_web::PickemTotals::default()),
    }
}

/// Matches currently open for play, in board order.
#[get("/api/matches/available")]
async fn api_available_matches(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match &g.state.tournament {
        Some(t) => HttpResponse::Ok().json(available_matches(t)),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Start a tournament. Refused while one is still running; a completed one
/// is replaced. Ratings and placings carry over either way.
#[post("/api/tournament/start")]
async fn api_tournament_start(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if let Some(t) = &g.state.tournament {
        if t.phase != Phase::Completed {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "A tournament is already running" }));
        }
    }
    let mut rng = rand::thread_rng();
    match create_tournament(&g.catalog, &g.state.ratings, &mut rng) {
        Ok(t) => {
            g.state.tournament = Some(t);
            persist(&g);
            HttpResponse::Ok().json(&g.state.tournament)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Drop the current tournament and start over. Ratings and placings stay.
#[post("/api/tournament/restart")]
async fn api_tournament_restart(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut rng = rand::thread_rng();
    match create_tournament(&g.catalog, &g.state.ratings, &mut rng) {
        Ok(t) => {
            g.state.tournament = Some(t);
            persist(&g);
            HttpResponse::Ok().json(&g.state.tournament)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Record a predicted winner on a match.
#[post("/api/matches/pick")]
async fn api_pick_match(state: AppState, body: Json<PickBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.state.tournament.as_mut() {
        Some(t) => t,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
        }
    };
    match pick_match(t, &body.match_ref, &body.team_id) {
        Ok(()) => {
            persist(&g);
            HttpResponse::Ok().json(&g.state.tournament)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Start the series for a picked, open match.
#[post("/api/matches/start")]
async fn api_start_match(state: AppState, body: Json<StartMatchBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.state.tournament.as_mut() {
        Some(t) => t,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
        }
    };
    match start_match(t, &body.match_ref) {
        Ok(()) => {
            persist(&g);
            HttpResponse::Ok().json(&g.state.tournament)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// One gamble step on the live series: returns the multiplier and the
/// updated series state.
#[post("/api/series/gamble")]
async fn api_gamble(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let settings = g.gamble;
    let t = match g.state.tournament.as_mut() {
        Some(t) => t,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
        }
    };
    let mut rng = rand::thread_rng();
    match gamble(t, &mut rng, &settings) {
        Ok(multiplier) => {
            let series = t.series.clone();
            persist(&g);
            HttpResponse::Ok().json(serde_json::json!({
                "multiplier": multiplier,
                "series": series,
            }))
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Commit the decided series into its match. Returns what changed: result,
/// rating movement, and any phase advancement.
#[post("/api/series/commit")]
async fn api_commit_series(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let data = &mut *g;
    let t = match data.state.tournament.as_mut() {
        Some(t) => t,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
        }
    };
    let mut rng = rand::thread_rng();
    match commit_series(
        t,
        &mut data.state.ratings,
        &mut data.state.placings,
        &data.catalog,
        &mut rng,
    ) {
        Ok(outcome) => {
            persist(data);
            HttpResponse::Ok().json(outcome)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Admin login: compares against the ADMIN_CODE env var and marks the
/// cookie session. With no ADMIN_CODE configured every login is refused.
#[post("/api/admin/login")]
async fn api_admin_login(session: Session, body: Json<AdminLoginBody>) -> HttpResponse {
    let expected = std::env::var("ADMIN_CODE").unwrap_or_default();
    if expected.is_empty() || body.code != expected {
        log::warn!("rejected admin login attempt");
        return HttpResponse::Forbidden()
            .json(serde_json::json!({ "error": "Invalid admin code" }));
    }
    if session.insert("admin", true).is_err() {
        return HttpResponse::InternalServerError().body("session error");
    }
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

/// Reset every team to its catalog default rating (admin only).
#[post("/api/admin/reset-ratings")]
async fn api_admin_reset_ratings(state: AppState, session: Session) -> HttpResponse {
    if !is_admin(&session) {
        return HttpResponse::Forbidden().json(serde_json::json!({ "error": "Admin login required" }));
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.state.ratings = rating::default_book(&g.catalog);
    persist(&g);
    HttpResponse::Ok().json(&g.state.ratings)
}

/// Wipe the all-time placings (admin only, separate confirmation flag).
#[post("/api/admin/reset-placings")]
async fn api_admin_reset_placings(
    state: AppState,
    session: Session,
    body: Json<ResetPlacingsBody>,
) -> HttpResponse {
    if !is_admin(&session) {
        return HttpResponse::Forbidden().json(serde_json::json!({ "error": "Admin login required" }));
    }
    if !body.confirm {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Confirmation required to reset placings" }));
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.state.placings.clear();
    persist(&g);
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/state.json")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let catalog = TeamCatalog::embedded()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    let store_path = std::env::var("STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_store_path());
    let saved = load_state(&store_path, &catalog);

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    let state = Data::new(RwLock::new(AppData {
        catalog,
        state: saved,
        store_path,
        gamble: GambleSettings::default(),
    }));

    // Background task: periodic snapshot, in case a crash beats the
    // per-mutation writes.
    let state_autosave = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(AUTOSAVE_INTERVAL);
        loop {
            interval.tick().await;
            let g = match state_autosave.read() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            if let Err(e) = save_state(&g.store_path, &g.state) {
                log::warn!("autosave failed: {}", e);
            }
        }
    });

    let session_key = Key::generate();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_state)
            .service(api_teams)
            .service(api_leaderboard)
            .service(api_pickem)
            .service(api_available_matches)
            .service(api_tournament_start)
            .service(api_tournament_restart)
            .service(api_pick_match)
            .service(api_start_match)
            .service(api_gamble)
            .service(api_commit_series)
            .service(api_admin_login)
            .service(api_admin_reset_ratings)
            .service(api_admin_reset_placings)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
