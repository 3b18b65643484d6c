//! HTTP front for the bracket engine, standing in for the chat command handlers.
//! Run with: cargo run --bin web
//! Env: HOST (default 0.0.0.0), PORT (8080), MIN_PARTICIPANTS (4), INACTIVITY_HOURS (12).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tournament_brackets::{
    available_opponents, compute_standings, place_labels, round_robin_table, start_tournament,
    submit_result, write_standings_csv, MatchId, Participant, ParticipantId, Tournament,
    TournamentError, TournamentFormat, TournamentId,
};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// One lock per tournament; the map lock is only held to look entries up.
type SharedEntry = Arc<Mutex<TournamentEntry>>;

struct AppData {
    tournaments: RwLock<HashMap<TournamentId, SharedEntry>>,
    config: ServerConfig,
}

type AppState = Data<AppData>;

#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    min_participants: usize,
    inactivity_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        fn var<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.parse().ok())
        }
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var("PORT").unwrap_or(8080),
            min_participants: var("MIN_PARTICIPANTS")
                .unwrap_or(tournament_brackets::DEFAULT_MIN_PARTICIPANTS),
            inactivity_timeout: Duration::from_secs(var::<u64>("INACTIVITY_HOURS").unwrap_or(12) * 3600),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    min_participants: Option<usize>,
}

#[derive(Deserialize)]
struct AddParticipantBody {
    id: ParticipantId,
    name: String,
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct SeedingBody {
    order: Vec<ParticipantId>,
}

#[derive(Deserialize, Default)]
struct StartBody {
    /// Fixed RNG seed for a reproducible draw.
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct SubmitResultBody {
    match_id: MatchId,
    winner_id: ParticipantId,
    score: String,
}

#[derive(Serialize)]
struct StandingsResponse<'a> {
    placements: &'a [tournament_brackets::Placement],
    labels: std::collections::BTreeMap<ParticipantId, String>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id
#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Look a tournament up without holding the map lock past the call.
fn find_entry(state: &AppState, id: TournamentId) -> Result<SharedEntry, HttpResponse> {
    let g = state.tournaments.read().map_err(|_| lock_error())?;
    g.get(&id)
        .cloned()
        .ok_or_else(|| error_response(&TournamentError::TournamentNotFound(id)))
}

/// Run `f` on the tournament while holding its lock; answer with the tournament on success.
async fn mutate<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    let entry = match find_entry(state, id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let mut entry = entry.lock().await;
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match f(t) {
        Ok(()) => HttpResponse::Ok().json(&*t),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-brackets",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut tournament = Tournament::new(body.name.trim(), body.format);
    let min = body.min_participants.unwrap_or(state.config.min_participants);
    if let Err(e) = tournament.set_min_participants(min) {
        return error_response(&e);
    }
    let response = HttpResponse::Ok().json(&tournament);
    let id = tournament.id;
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.insert(
        id,
        Arc::new(Mutex::new(TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        })),
    );
    log::info!("Created tournament {}", id);
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |_| Ok(())).await
}

/// Register a participant (tournament must be Pending).
#[post("/api/tournaments/{id}/participants")]
async fn api_add_participant(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut participant = Participant::new(body.id, body.name);
    participant.avatar = body.avatar;
    mutate(&state, path.id, move |t| t.add_participant(participant)).await
}

/// Unregister a participant (tournament must be Pending).
#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_remove_participant(
    state: AppState,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    mutate(&state, path.id, |t| t.remove_participant(&path.participant_id)).await
}

/// Set the draw order (tournament must be Pending).
#[put("/api/tournaments/{id}/seeding")]
async fn api_set_seeding(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SeedingBody>,
) -> HttpResponse {
    let order = body.into_inner().order;
    mutate(&state, path.id, move |t| t.set_seeding(order)).await
}

/// Draw the bracket (Pending -> Started).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<StartBody>>,
) -> HttpResponse {
    let seed = body.and_then(|b| b.seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    mutate(&state, path.id, |t| start_tournament(t, &mut rng)).await
}

/// Submit a score: record, rebuild the bracket and advance rounds under one lock.
#[post("/api/tournaments/{id}/results")]
async fn api_submit_result(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SubmitResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    mutate(&state, path.id, |t| {
        let progress = submit_result(t, &body.match_id, &body.winner_id, body.score.trim())?;
        if !progress.new_matches.is_empty() {
            log::info!(
                "Tournament {}: new matches {:?}",
                t.id,
                progress.new_matches
            );
        }
        Ok(())
    })
    .await
}

/// Opponents a participant may still report a game against.
#[get("/api/tournaments/{id}/participants/{participant_id}/opponents")]
async fn api_available_opponents(
    state: AppState,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    let entry = match find_entry(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let entry = entry.lock().await;
    match available_opponents(&entry.tournament, &path.participant_id) {
        Ok(opponents) => HttpResponse::Ok().json(opponents),
        Err(e) => error_response(&e),
    }
}

/// Final placements and notification labels (400 while matches are pending).
#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let entry = match find_entry(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let entry = entry.lock().await;
    match compute_standings(&entry.tournament) {
        Ok(placements) => HttpResponse::Ok().json(StandingsResponse {
            labels: place_labels(&placements),
            placements: &placements,
        }),
        Err(e) => error_response(&e),
    }
}

/// Live round-robin table.
#[get("/api/tournaments/{id}/table")]
async fn api_table(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let entry = match find_entry(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let entry = entry.lock().await;
    HttpResponse::Ok().json(round_robin_table(&entry.tournament))
}

/// Final placements as CSV.
#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let entry = match find_entry(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let entry = entry.lock().await;
    let placements = match compute_standings(&entry.tournament) {
        Ok(placements) => placements,
        Err(e) => return error_response(&e),
    };
    let mut buf = Vec::new();
    if let Err(e) = write_standings_csv(&placements, &mut buf) {
        log::error!("CSV export failed for {}: {}", path.id, e);
        return HttpResponse::InternalServerError().body("csv error");
    }
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .body(buf)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);
    let bind = (config.host.clone(), config.port);
    let inactivity_timeout = config.inactivity_timeout;

    let state = Data::new(AppData {
        tournaments: RwLock::new(HashMap::new()),
        config,
    });

    // Background task: every 30 minutes, remove tournaments idle past the timeout.
    // Entries locked by a request are busy, so they are kept.
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.tournaments.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| match entry.try_lock() {
                Ok(e) => e.last_activity.elapsed() < inactivity_timeout,
                Err(_) => true,
            });
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_participant)
            .service(api_remove_participant)
            .service(api_set_seeding)
            .service(api_start_tournament)
            .service(api_submit_result)
            .service(api_available_opponents)
            .service(api_standings_csv)
            .service(api_standings)
            .service(api_table)
    })
    .bind(bind)?
    .run()
    .await
}
