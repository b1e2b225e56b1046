//! Tournament, TournamentConfig and TournamentError.

use crate::models::bracket::SlotId;
use crate::models::game::{GameMatch, MatchId, PairKey};
use crate::models::player::{PlayerName, PlayerStats};
use crate::models::tables::{TableConfig, TableNumber, TablePool};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Player name is empty after trimming.
    BlankPlayerName,
    /// A player with this name is already on the roster.
    DuplicatePlayerName(String),
    /// No such player on the roster.
    PlayerNotFound(String),
    /// Need at least 2 selected players to start the league.
    NotEnoughPlayersToStart { selected: usize },
    /// Race-to-N must be a positive number.
    InvalidWinThreshold(u32),
    /// At least one round must be played.
    InvalidRounds(u32),
    /// The action needs a running tournament.
    TournamentNotActive,
    /// The action is only allowed before the tournament starts.
    TournamentAlreadyActive,
    MatchNotFound(MatchId),
    /// Bye matches have nothing to score or reopen.
    ByeMatch(MatchId),
    /// The match is not seated at a table, so it is not being played.
    NoTableAssigned(MatchId),
    MatchNotCompleted(MatchId),
    /// The player shares no tie group with anyone else.
    PlayerNotTied(String),
    /// Playoff needs at least 8 ranked players.
    NotEnoughPlayersForPlayoff { found: usize },
    NoPlayoffBracket,
    SlotNotFound(SlotId),
    /// Slot is neither being played at a table nor reopened for editing.
    SlotNotEditable(SlotId),
    SlotNotCompleted(SlotId),
    /// Table position or number out of range.
    InvalidTableConfig,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::BlankPlayerName => write!(f, "Enter a player name"),
            TournamentError::DuplicatePlayerName(name) => write!(f, "Player {} already exists", name),
            TournamentError::PlayerNotFound(name) => write!(f, "Player {} not found", name),
            TournamentError::NotEnoughPlayersToStart { selected } => {
                write!(f, "Need at least 2 players to start (selected {})", selected)
            }
            TournamentError::InvalidWinThreshold(n) => write!(f, "Race to {} is not a valid match length", n),
            TournamentError::InvalidRounds(n) => write!(f, "{} rounds is not a valid round count", n),
            TournamentError::TournamentNotActive => write!(f, "No tournament is running"),
            TournamentError::TournamentAlreadyActive => write!(f, "Not allowed while the tournament is running"),
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::ByeMatch(id) => write!(f, "Match {} is a bye", id),
            TournamentError::NoTableAssigned(id) => write!(f, "Match {} is waiting for a table", id),
            TournamentError::MatchNotCompleted(id) => write!(f, "Match {} is not completed", id),
            TournamentError::PlayerNotTied(name) => write!(f, "Player {} is not tied with anyone", name),
            TournamentError::NotEnoughPlayersForPlayoff { found } => {
                write!(f, "Not enough players for the playoff: need at least 8, have {}", found)
            }
            TournamentError::NoPlayoffBracket => write!(f, "No playoff bracket has been generated"),
            TournamentError::SlotNotFound(slot) => write!(f, "Playoff match {} not found", slot),
            TournamentError::SlotNotEditable(slot) => write!(f, "Playoff match {} cannot be scored now", slot),
            TournamentError::SlotNotCompleted(slot) => write!(f, "Playoff match {} is not completed", slot),
            TournamentError::InvalidTableConfig => write!(f, "Invalid table selection"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Current phase of the league.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Selecting players and tables; not started.
    #[default]
    Setup,
    /// Fixtures generated, scores being entered.
    Active,
}

/// Parameters chosen when starting the league.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub rounds: u32,
    /// Race-to-N: first to this many game wins takes the match.
    pub win_threshold: u32,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            win_threshold: 3,
        }
    }
}

/// Full league state: selection, fixtures, statistics, tie-breaks and tables.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    /// Roster players selected for this tournament.
    pub players: Vec<PlayerName>,
    /// Rounds actually scheduled (after clamping).
    pub rounds: u32,
    pub win_threshold: u32,
    pub state: TournamentState,
    pub fixtures: Vec<GameMatch>,
    pub stats: BTreeMap<PlayerName, PlayerStats>,
    pub used_pairs: BTreeSet<PairKey>,
    /// Hand-set order inside a tie group; only compared within the group.
    pub manual_order: BTreeMap<PlayerName, u32>,
    pub tables: TableConfig,
    pub scheduler: TablePool<MatchId>,
    pub next_match_id: u32,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

impl Tournament {
    /// Create a tournament in Setup state with no players and three tables.
    pub fn new() -> Self {
        let config = TournamentConfig::default();
        Self {
            id: Uuid::new_v4(),
            players: Vec::new(),
            rounds: config.rounds,
            win_threshold: config.win_threshold,
            state: TournamentState::Setup,
            fixtures: Vec::new(),
            stats: BTreeMap::new(),
            used_pairs: BTreeSet::new(),
            manual_order: BTreeMap::new(),
            tables: TableConfig::default(),
            scheduler: TablePool::default(),
            next_match_id: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == TournamentState::Active
    }

    /// Hand out the next match id.
    pub fn allocate_match_id(&mut self) -> MatchId {
        let id = MatchId(self.next_match_id);
        self.next_match_id += 1;
        id
    }

    pub fn fixture(&self, id: MatchId) -> Option<&GameMatch> {
        self.fixtures.iter().find(|m| m.id == id)
    }

    pub fn fixture_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.fixtures.iter_mut().find(|m| m.id == id)
    }

    /// Fixtures grouped by round, in round order.
    pub fn rounds_view(&self) -> Vec<(u32, Vec<&GameMatch>)> {
        let mut rounds: BTreeMap<u32, Vec<&GameMatch>> = BTreeMap::new();
        for m in &self.fixtures {
            rounds.entry(m.round).or_default().push(m);
        }
        rounds.into_iter().collect()
    }

    /// Stats for a player; zeroes if the player has none yet.
    pub fn stats_for(&self, name: &str) -> PlayerStats {
        self.stats.get(name).cloned().unwrap_or_default()
    }

    /// Resize the table pool (Setup only).
    pub fn set_table_count(&mut self, count: usize) -> Result<(), TournamentError> {
        if self.is_active() {
            return Err(TournamentError::TournamentAlreadyActive);
        }
        self.tables = self.tables.with_count(count);
        Ok(())
    }

    /// Choose the table number at one position of the pool (Setup only).
    pub fn set_table_number(&mut self, position: usize, number: TableNumber) -> Result<(), TournamentError> {
        if self.is_active() {
            return Err(TournamentError::TournamentAlreadyActive);
        }
        self.tables = self
            .tables
            .with_number_at(position, number)
            .ok_or(TournamentError::InvalidTableConfig)?;
        Ok(())
    }
}
