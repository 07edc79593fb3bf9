//! Single binary web server: JSON API for organizers and spectators.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST, PORT, INACTIVITY_HOURS, CLEANUP_INTERVAL_MINUTES, SESSION_SECRET.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use football_cup_web::config::ServerConfig;
use football_cup_web::export::standings_csv;
use football_cup_web::sync::changed_since;
use football_cup_web::{
    apply_all, create_tournament, Access, AdvancementPolicy, Clock, Command, ErrorKind, MatchId,
    MemoryStore, OrganizerId, StoreError, SystemClock, Tournament, TournamentError,
    TournamentFormat, TournamentId, TournamentSettings, TournamentStore,
};
use serde::Deserialize;
use uuid::Uuid;

/// All tournaments, in memory. Entries are evicted after a period of inactivity.
type AppState = Data<MemoryStore>;

/// Session key holding the organizer id of this browser.
const ORGANIZER_KEY: &str = "organizer_id";

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTournamentBody {
    player_names: Vec<String>,
    #[serde(default)]
    tournament_name: Option<String>,
    #[serde(default)]
    num_groups: Option<usize>,
    #[serde(default)]
    format: TournamentFormat,
    #[serde(default)]
    advancement: Option<AdvancementPolicy>,
}

#[derive(Deserialize)]
struct ScoreBody {
    score1: i64,
    score2: i64,
}

#[derive(Deserialize)]
struct SinceQuery {
    since: Option<DateTime<Utc>>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id (e.g. /api/tournaments/{id}/matches/{match_id}/score)
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: String,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e.kind() {
        ErrorKind::Validation | ErrorKind::DrawNotAllowed => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Forbidden => HttpResponse::Forbidden().json(body),
        ErrorKind::IllegalPhase | ErrorKind::IllegalState => HttpResponse::Conflict().json(body),
    }
}

fn store_error_response(e: &StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound(_) => HttpResponse::NotFound()
            .json(serde_json::json!({ "error": e.to_string(), "kind": ErrorKind::NotFound })),
        StoreError::Conflict(_) | StoreError::AlreadyExists(_) => HttpResponse::Conflict()
            .json(serde_json::json!({ "error": e.to_string(), "kind": ErrorKind::IllegalState })),
        StoreError::Poisoned => {
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

fn session_organizer(session: &Session) -> Option<OrganizerId> {
    session.get::<OrganizerId>(ORGANIZER_KEY).ok().flatten()
}

/// Organizer id of this session, assigning one on first use.
fn ensure_organizer(session: &Session) -> Result<OrganizerId, HttpResponse> {
    if let Some(id) = session_organizer(session) {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    session
        .insert(ORGANIZER_KEY, id)
        .map_err(|_| HttpResponse::InternalServerError().body("session error"))?;
    Ok(id)
}

/// Only the session that created a tournament may change it.
fn access_for(session: &Session, tournament: &Tournament) -> Access {
    let may_mutate = tournament.owner.is_some() && session_organizer(session) == tournament.owner;
    Access { may_mutate }
}

/// Load, apply the commands as one transition, save with a version check.
fn run_commands(
    state: &AppState,
    session: &Session,
    id: TournamentId,
    commands: &[Command],
) -> HttpResponse {
    let current = match state.load(id) {
        Ok(t) => t,
        Err(e) => return store_error_response(&e),
    };
    let access = access_for(session, &current);
    let next = match apply_all(
        &current,
        commands,
        access,
        &mut rand::thread_rng(),
        &SystemClock,
    ) {
        Ok(t) => t,
        Err(e) => {
            log::info!("Tournament {}: {:?} refused: {}", id, commands, e);
            return error_response(&e);
        }
    };
    match state.save(next, current.updated_at) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => store_error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "football-cup-web",
    })
}

/// Create a tournament; groups are drawn immediately. The caller becomes its organizer.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    session: Session,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let owner = match ensure_organizer(&session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    let settings = TournamentSettings {
        name: body.tournament_name,
        player_names: body.player_names,
        num_groups: body.num_groups,
        format: body.format,
        advancement: body.advancement,
    };
    let tournament = match create_tournament(
        settings,
        Some(owner),
        &mut rand::thread_rng(),
        SystemClock.now(),
    ) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    match state.insert(tournament) {
        Ok(t) => HttpResponse::Created().json(t),
        Err(e) => store_error_response(&e),
    }
}

/// Latest tournaments, newest first.
#[get("/api/tournaments/public")]
async fn api_public_tournaments(state: AppState) -> HttpResponse {
    match state.list_public() {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => store_error_response(&e),
    }
}

/// Tournaments created from this session.
#[get("/api/tournaments/mine")]
async fn api_my_tournaments(state: AppState, session: Session) -> HttpResponse {
    let Some(owner) = session_organizer(&session) else {
        return HttpResponse::Ok().json(Vec::<Tournament>::new());
    };
    match state.list_owned_by(owner) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => store_error_response(&e),
    }
}

/// Get a tournament by id. With `?since=<rfc3339>` answers 304 when nothing newer exists.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<SinceQuery>,
) -> HttpResponse {
    match state.load(path.id) {
        Ok(t) if !changed_since(&t, query.since) => HttpResponse::NotModified().finish(),
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => store_error_response(&e),
    }
}

/// Delete a tournament (organizer only).
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let current = match state.load(path.id) {
        Ok(t) => t,
        Err(e) => return store_error_response(&e),
    };
    if !access_for(&session, &current).may_mutate {
        return error_response(&TournamentError::Forbidden);
    }
    match state.delete(path.id) {
        Ok(()) => {
            log::info!("Tournament {} deleted", path.id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => store_error_response(&e),
    }
}

/// Group tables as CSV.
#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let t = match state.load(path.id) {
        Ok(t) => t,
        Err(e) => return store_error_response(&e),
    };
    match standings_csv(&t) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => {
            log::warn!("Standings export for {} failed: {}", path.id, e);
            HttpResponse::InternalServerError().body("export error")
        }
    }
}

/// Record or correct a group or knockout score.
#[post("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_record_score(
    state: AppState,
    session: Session,
    path: Path<TournamentMatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let command = Command::RecordScore {
        match_id: MatchId::from(path.match_id.as_str()),
        score1: body.score1,
        score2: body.score2,
    };
    run_commands(&state, &session, path.id, &[command])
}

/// Close the group stage and draw the bracket in one step.
#[post("/api/tournaments/{id}/complete-groups")]
async fn api_complete_groups(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    run_commands(
        &state,
        &session,
        path.id,
        &[Command::CompleteGroupStage, Command::DrawBracket],
    )
}

/// Re-draw the bracket before any knockout match is played.
#[post("/api/tournaments/{id}/redraw")]
async fn api_redraw(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    run_commands(&state, &session, path.id, &[Command::Redraw])
}

/// Draw the next knockout round (reshuffle policy).
#[post("/api/tournaments/{id}/next-round")]
async fn api_next_round(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    run_commands(&state, &session, path.id, &[Command::GenerateNextRound])
}

/// Back to config, same competitors.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    run_commands(&state, &session, path.id, &[Command::Reset])
}

/// Draw groups again after a reset.
#[post("/api/tournaments/{id}/draw-groups")]
async fn api_draw_groups(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    run_commands(&state, &session, path.id, &[Command::DrawGroups])
}

fn session_key(secret: Option<&str>) -> Key {
    match secret.map(|s| Key::try_from(s.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(_)) => {
            log::warn!("SESSION_SECRET is shorter than 64 bytes, using a random key");
            Key::generate()
        }
        None => {
            log::warn!("SESSION_SECRET not set, organizer sessions end when the server restarts");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(MemoryStore::new(config.inactivity_timeout));
    let key = session_key(config.session_secret.as_deref());

    // Background task: periodically remove tournaments nobody has touched for a while
    let state_cleanup = state.clone();
    let every = config.cleanup_interval;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match state_cleanup.evict_inactive() {
                Ok(0) => {}
                Ok(removed) => log::info!("Cleaned up {} inactive tournament(s)", removed),
                Err(e) => log::warn!("Cleanup skipped: {}", e),
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_public_tournaments)
            .service(api_my_tournaments)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_standings_csv)
            .service(api_record_score)
            .service(api_complete_groups)
            .service(api_redraw)
            .service(api_next_round)
            .service(api_reset)
            .service(api_draw_groups)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
