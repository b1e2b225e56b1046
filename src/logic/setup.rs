//! Setup phase: start the league (Setup -> Active) and reset it back.

use crate::logic::fixtures::generate_fixtures;
use crate::logic::league::assign_tables;
use crate::models::{
    Club, PlayerStats, TablePool, Tournament, TournamentConfig, TournamentError, TournamentState,
};
use rand::Rng;
use serde::Serialize;

/// What `start_tournament` actually scheduled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct StartReport {
    pub requested_rounds: u32,
    pub rounds: u32,
    pub matches: usize,
    pub tables_assigned: usize,
}

impl StartReport {
    pub fn was_clamped(&self) -> bool {
        self.rounds < self.requested_rounds
    }
}

/// Start the league with a fresh shuffle.
pub fn start_tournament(club: &mut Club, config: TournamentConfig) -> Result<StartReport, TournamentError> {
    start_tournament_with_rng(club, config, &mut rand::thread_rng())
}

/// Start the league: generate fixtures, zero the stats, record byes and seat the first matches.
///
/// Needs at least 2 selected players, a positive race-to-N and at least one round.
pub fn start_tournament_with_rng<R: Rng + ?Sized>(
    club: &mut Club,
    config: TournamentConfig,
    rng: &mut R,
) -> Result<StartReport, TournamentError> {
    let t = &mut club.tournament;
    if t.is_active() {
        return Err(TournamentError::TournamentAlreadyActive);
    }
    if t.players.len() < 2 {
        return Err(TournamentError::NotEnoughPlayersToStart {
            selected: t.players.len(),
        });
    }
    if config.win_threshold == 0 {
        return Err(TournamentError::InvalidWinThreshold(config.win_threshold));
    }
    if config.rounds == 0 {
        return Err(TournamentError::InvalidRounds(config.rounds));
    }

    t.next_match_id = 1;
    let players = t.players.clone();
    let list = generate_fixtures(&players, config.rounds, rng, || t.allocate_match_id());

    t.rounds = list.rounds;
    t.win_threshold = config.win_threshold;
    t.fixtures = list.matches;
    t.used_pairs = list.used_pairs;
    t.manual_order.clear();
    t.stats = players.iter().map(|p| (p.clone(), PlayerStats::default())).collect();

    for m in t.fixtures.iter_mut().filter(|m| m.is_bye) {
        m.completed = true;
        if let Some(name) = m.bye_recipient() {
            t.stats.entry(name.to_string()).or_default().record_bye();
        }
    }

    t.state = TournamentState::Active;
    t.scheduler = TablePool::new(&t.tables);
    let tables_assigned = assign_tables(t).len();
    club.playoff = None;

    let report = StartReport {
        requested_rounds: config.rounds,
        rounds: t.rounds,
        matches: t.fixtures.len(),
        tables_assigned,
    };
    log::info!(
        "Tournament started: {} players, {} rounds, race to {}, {} tables",
        players.len(),
        report.rounds,
        t.win_threshold,
        t.tables.count()
    );
    Ok(report)
}

/// Back to Setup with the same selected players, match length and tables. Drops all results.
pub fn reset_tournament(club: &mut Club) {
    let old = std::mem::take(&mut club.tournament);
    club.tournament = Tournament {
        players: old.players,
        rounds: old.rounds,
        win_threshold: old.win_threshold,
        tables: old.tables,
        ..Tournament::new()
    };
    club.playoff = None;
    log::info!("Tournament reset");
}
