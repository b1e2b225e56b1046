//! Cue-sports league organizer: library with models and business logic.
//!
//! A round-robin league with live table allocation, followed by a 12-seed
//! single-elimination playoff.

pub mod logic;
pub mod models;
pub mod persistence;

pub use logic::{
    champion, collate, generate_fixtures, generate_playoff, max_rounds, rank_players, reopen_match, reopen_playoff_slot,
    reorder_tied_player, reset_tournament, round_choices, slot_winner, start_tournament, start_tournament_with_rng,
    submit_playoff_score, submit_score, third_place, tie_group, write_standings_csv, Direction, FixtureList,
    ScoreOutcome, StandingsEntry, StartReport, TableEvent,
};
pub use models::{
    BracketSlot, Club, GameMatch, MatchId, MatchStatus, PairKey, Participant, PlayerName, PlayerStats,
    PlayoffBracket, Side, SlotId, SlotStatus, Stage, TableConfig, TableNumber, TablePool, Tournament,
    TournamentConfig, TournamentError, TournamentState,
};
