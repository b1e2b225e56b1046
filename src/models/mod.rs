//! Data structures for the cue-sports league: players, fixtures, tables, bracket, tournament state.

mod bracket;
mod club;
mod game;
mod player;
mod tables;
mod tournament;

pub(crate) use bracket::side_index;
pub use bracket::{BracketSlot, PlayoffBracket, SlotId, SlotStatus, Stage};
pub use club::Club;
pub use game::{GameMatch, MatchId, MatchStatus, PairKey, Participant, Side};
pub use player::{PlayerName, PlayerStats};
pub use tables::{
    TableConfig, TableNumber, TablePool, HIGHEST_TABLE_NUMBER, LOWEST_TABLE_NUMBER, MAX_TABLES, MIN_TABLES,
};
pub use tournament::{Tournament, TournamentConfig, TournamentError, TournamentState};
