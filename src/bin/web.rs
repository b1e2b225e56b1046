//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), STATE_FILE (e.g. tournament.json).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use cue_league_web::{
    champion, generate_playoff, max_rounds, persistence, rank_players, reopen_match, reopen_playoff_slot,
    reorder_tied_player, reset_tournament, round_choices, start_tournament, submit_playoff_score,
    submit_score, third_place, write_standings_csv, Club, Direction, MatchId, MatchStatus,
    PlayoffBracket, Side, SlotStatus, Stage, TableNumber, TournamentConfig, TournamentError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use tokio::sync::Mutex;

/// The one club this server manages, and where it is saved after every change.
struct ClubState {
    club: RwLock<Club>,
    state_file: PathBuf,
    /// Held across encode and write so saves land in order.
    save_lock: Mutex<()>,
}

type AppState = Data<ClubState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct TableCountBody {
    count: usize,
}

#[derive(Deserialize)]
struct TableNumberBody {
    number: TableNumber,
}

#[derive(Deserialize)]
struct StartBody {
    #[serde(default = "default_rounds")]
    rounds: u32,
    #[serde(default = "default_win_threshold")]
    win_threshold: u32,
}

fn default_rounds() -> u32 {
    TournamentConfig::default().rounds
}

fn default_win_threshold() -> u32 {
    TournamentConfig::default().win_threshold
}

#[derive(Deserialize)]
struct ScoreBody {
    side: Side,
    value: i64,
}

#[derive(Deserialize)]
struct PlayoffScoreBody {
    side: Side,
    value: Option<u32>,
}

#[derive(Deserialize)]
struct MoveBody {
    direction: Direction,
}

#[derive(Serialize)]
struct RoundsResponse {
    choices: Vec<u32>,
    max: u32,
}

#[derive(Serialize)]
struct FixtureView {
    id: MatchId,
    participant_1: String,
    participant_2: String,
    score_1: u32,
    score_2: u32,
    status: MatchStatus,
    label: String,
}

#[derive(Serialize)]
struct RoundView {
    round: u32,
    win_threshold: u32,
    matches: Vec<FixtureView>,
}

#[derive(Serialize)]
struct SlotView {
    index: usize,
    participants: [String; 2],
    scores: [Option<u32>; 2],
    status: SlotStatus,
    label: String,
}

#[derive(Serialize)]
struct StageView {
    stage: Stage,
    title: &'static str,
    slots: Vec<SlotView>,
}

#[derive(Serialize)]
struct BracketView {
    stages: Vec<StageView>,
    champion: Option<String>,
    third_place: Option<String>,
}

fn error_response(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn bracket_view(bracket: &PlayoffBracket) -> BracketView {
    let stages = Stage::ALL
        .into_iter()
        .map(|stage| StageView {
            stage,
            title: stage.title(),
            slots: bracket
                .stage(stage)
                .iter()
                .enumerate()
                .map(|(index, slot)| SlotView {
                    index,
                    participants: [slot.participants[0].to_string(), slot.participants[1].to_string()],
                    scores: slot.scores,
                    status: slot.status(),
                    label: slot.status().to_string(),
                })
                .collect(),
        })
        .collect();
    BracketView {
        stages,
        champion: champion(bracket).map(|p| p.to_string()),
        third_place: third_place(bracket).map(|p| p.to_string()),
    }
}

/// Run a mutation under the write lock; on success answer with its result and save the club.
async fn apply<T, F>(state: &AppState, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&mut Club) -> Result<T, TournamentError>,
{
    let response = {
        let mut club = match state.club.write() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        match f(&mut *club) {
            Ok(value) => HttpResponse::Ok().json(value),
            Err(e) => return error_response(e),
        }
    };
    save_club(state).await;
    response
}

/// Save the current club. Saves run one at a time, each with the latest state.
async fn save_club(state: &AppState) {
    let _saving = state.save_lock.lock().await;
    let snapshot = match state.club.read() {
        Ok(club) => persistence::encode(&club),
        Err(_) => {
            log::error!("Could not save state: lock error");
            return;
        }
    };
    match snapshot {
        Ok(json) => {
            if let Err(e) = persistence::write_snapshot(&state.state_file, &json).await {
                log::error!("Could not save state to {}: {}", state.state_file.display(), e);
            }
        }
        Err(e) => log::error!("Could not encode state: {}", e),
    }
}

/// Run a read-only view under the read lock.
fn view<T, F>(state: &AppState, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&Club) -> Result<T, TournamentError>,
{
    let club = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match f(&*club) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "cue-league-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Whole club state (roster, tournament, playoff).
#[get("/api/state")]
async fn api_get_state(state: AppState) -> HttpResponse {
    view(&state, |club| Ok(club.clone()))
}

/// Add a player to the roster.
#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<AddPlayerBody>) -> HttpResponse {
    apply(&state, |club| {
        club.add_player(body.name.as_str())?;
        Ok(club.roster.clone())
    })
    .await
}

/// Remove a player from the roster and the tournament selection.
#[delete("/api/players/{name}")]
async fn api_remove_player(state: AppState, path: Path<String>) -> HttpResponse {
    apply(&state, |club| {
        club.remove_player(&path)?;
        Ok(club.roster.clone())
    })
    .await
}

/// Select or deselect a roster player for the tournament (Setup only).
#[post("/api/players/{name}/toggle")]
async fn api_toggle_player(state: AppState, path: Path<String>) -> HttpResponse {
    apply(&state, |club| {
        club.toggle_player(&path)?;
        Ok(club.tournament.players.clone())
    })
    .await
}

/// Round counts to offer for the current selection.
#[get("/api/rounds")]
async fn api_round_choices(state: AppState) -> HttpResponse {
    view(&state, |club| {
        let n = club.tournament.players.len();
        Ok(RoundsResponse {
            choices: round_choices(n),
            max: max_rounds(n),
        })
    })
}

/// Resize the table pool (Setup only).
#[put("/api/tables/count")]
async fn api_set_table_count(state: AppState, body: Json<TableCountBody>) -> HttpResponse {
    apply(&state, |club| {
        club.tournament.set_table_count(body.count)?;
        Ok(club.tournament.tables.clone())
    })
    .await
}

/// Choose the table number at one position (Setup only).
#[put("/api/tables/{position}")]
async fn api_set_table_number(state: AppState, path: Path<usize>, body: Json<TableNumberBody>) -> HttpResponse {
    apply(&state, |club| {
        club.tournament.set_table_number(*path, body.number)?;
        Ok(club.tournament.tables.clone())
    })
    .await
}

/// Start the league: generate fixtures and seat the first matches.
#[post("/api/tournament/start")]
async fn api_start_tournament(state: AppState, body: Json<StartBody>) -> HttpResponse {
    let config = TournamentConfig {
        rounds: body.rounds,
        win_threshold: body.win_threshold,
    };
    apply(&state, |club| start_tournament(club, config)).await
}

/// Back to Setup, keeping selection and tables.
#[post("/api/tournament/reset")]
async fn api_reset_tournament(state: AppState) -> HttpResponse {
    apply(&state, |club| {
        reset_tournament(club);
        Ok(club.tournament.clone())
    })
    .await
}

/// Fixtures by round, with table / status labels.
#[get("/api/fixtures")]
async fn api_fixtures(state: AppState) -> HttpResponse {
    view(&state, |club| {
        let t = &club.tournament;
        let rounds: Vec<RoundView> = t
            .rounds_view()
            .into_iter()
            .map(|(round, matches)| RoundView {
                round,
                win_threshold: t.win_threshold,
                matches: matches
                    .into_iter()
                    .map(|m| FixtureView {
                        id: m.id,
                        participant_1: m.participant_1.to_string(),
                        participant_2: m.participant_2.to_string(),
                        score_1: m.score_1,
                        score_2: m.score_2,
                        status: m.status(),
                        label: m.status().to_string(),
                    })
                    .collect(),
            })
            .collect();
        Ok(rounds)
    })
}

/// Set one side's score of a league match.
#[put("/api/matches/{id}/score")]
async fn api_submit_score(state: AppState, path: Path<u32>, body: Json<ScoreBody>) -> HttpResponse {
    apply(&state, |club| {
        submit_score(&mut club.tournament, MatchId(*path), body.side, body.value)
    })
    .await
}

/// Reopen a completed league match.
#[post("/api/matches/{id}/reopen")]
async fn api_reopen_match(state: AppState, path: Path<u32>) -> HttpResponse {
    apply(&state, |club| reopen_match(&mut club.tournament, MatchId(*path))).await
}

/// Current standings.
#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    view(&state, |club| Ok(rank_players(&club.tournament)))
}

/// Standings as a CSV download.
#[get("/api/standings.csv")]
async fn api_standings_csv(state: AppState) -> HttpResponse {
    let entries = match state.club.read() {
        Ok(club) => rank_players(&club.tournament),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut out = Vec::new();
    if let Err(e) = write_standings_csv(&entries, &mut out) {
        log::error!("Could not write standings CSV: {}", e);
        return HttpResponse::InternalServerError().body("export error");
    }
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"standings.csv\""))
        .body(out)
}

/// Move a tied player up or down inside its tie group.
#[post("/api/standings/{name}/move")]
async fn api_move_tied_player(state: AppState, path: Path<String>, body: Json<MoveBody>) -> HttpResponse {
    apply(&state, |club| {
        reorder_tied_player(&mut club.tournament, &path, body.direction)?;
        Ok(rank_players(&club.tournament))
    })
    .await
}

/// Generate a fresh playoff bracket from the standings.
#[post("/api/playoff")]
async fn api_generate_playoff(state: AppState) -> HttpResponse {
    apply(&state, |club| generate_playoff(club).map(bracket_view)).await
}

/// Bracket with per-slot status.
#[get("/api/playoff")]
async fn api_playoff(state: AppState) -> HttpResponse {
    view(&state, |club| {
        club.playoff
            .as_ref()
            .map(bracket_view)
            .ok_or(TournamentError::NoPlayoffBracket)
    })
}

/// Set one side's score of a playoff slot (`null` clears it).
#[put("/api/playoff/{stage}/{index}/score")]
async fn api_submit_playoff_score(
    state: AppState,
    path: Path<(Stage, usize)>,
    body: Json<PlayoffScoreBody>,
) -> HttpResponse {
    let (stage, index) = path.into_inner();
    apply(&state, |club| {
        submit_playoff_score(club, stage, index, body.side, body.value)?;
        club.playoff
            .as_ref()
            .map(bracket_view)
            .ok_or(TournamentError::NoPlayoffBracket)
    })
    .await
}

/// Reopen a completed playoff slot for correction.
#[post("/api/playoff/{stage}/{index}/reopen")]
async fn api_reopen_playoff_slot(state: AppState, path: Path<(Stage, usize)>) -> HttpResponse {
    let (stage, index) = path.into_inner();
    apply(&state, |club| {
        reopen_playoff_slot(club, stage, index)?;
        club.playoff
            .as_ref()
            .map(bracket_view)
            .ok_or(TournamentError::NoPlayoffBracket)
    })
    .await
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_state_file() -> PathBuf {
    PathBuf::from("tournament.json")
}

/// Load the saved club, or start empty when there is no save yet.
async fn load_club(path: &std::path::Path) -> Club {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let snapshot = persistence::decode(&text);
            log::info!(
                "Loaded state from {} ({} players on roster)",
                path.display(),
                snapshot.club.roster.len()
            );
            snapshot.club
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Club::new(),
        Err(e) => {
            log::warn!("Could not read {}: {}; starting fresh", path.display(), e);
            Club::new()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let state_file = std::env::var("STATE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_state_file());
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let club = load_club(&state_file).await;
    let state = Data::new(ClubState {
        club: RwLock::new(club),
        state_file,
        save_lock: Mutex::new(()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_get_state)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_toggle_player)
            .service(api_round_choices)
            .service(api_set_table_count)
            .service(api_set_table_number)
            .service(api_start_tournament)
            .service(api_reset_tournament)
            .service(api_fixtures)
            .service(api_submit_score)
            .service(api_reopen_match)
            .service(api_standings_csv)
            .service(api_standings)
            .service(api_move_tied_player)
            .service(api_generate_playoff)
            .service(api_playoff)
            .service(api_submit_playoff_score)
            .service(api_reopen_playoff_slot)
            .service(Files::new("/static", "static"))
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
