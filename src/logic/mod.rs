//! Tournament business logic: fixtures, league scoring and tables, standings, playoff.

mod fixtures;
mod league;
mod playoff;
mod setup;
mod standings;

pub use fixtures::{generate_fixtures, max_rounds, round_choices, FixtureList};
pub use league::{reopen_match, submit_score, ScoreOutcome, TableEvent};
pub use playoff::{
    champion, generate_playoff, reopen_playoff_slot, slot_winner, submit_playoff_score, third_place,
    MIN_PLAYOFF_PLAYERS, PLAYOFF_SEEDS,
};
pub use setup::{reset_tournament, start_tournament, start_tournament_with_rng, StartReport};
pub use standings::{
    collate, rank_players, reorder_tied_player, tie_group, write_standings_csv, Direction, StandingsEntry,
};
