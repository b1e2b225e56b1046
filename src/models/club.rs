//! Club: the roster of known players plus the current tournament and its playoff.

use crate::models::bracket::PlayoffBracket;
use crate::models::player::PlayerName;
use crate::models::tournament::{Tournament, TournamentError};
use serde::{Deserialize, Serialize};

/// Everything the application owns. One instance per running app; no globals.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Club {
    /// All known players, in the order they were added.
    pub roster: Vec<PlayerName>,
    pub tournament: Tournament,
    pub playoff: Option<PlayoffBracket>,
}

impl Club {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player to the roster. Names are trimmed and must be unique.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<(), TournamentError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::BlankPlayerName);
        }
        if self.roster.iter().any(|p| p == name) {
            return Err(TournamentError::DuplicatePlayerName(name.to_string()));
        }
        self.roster.push(name.to_string());
        Ok(())
    }

    /// Remove a player from the roster and from the tournament selection.
    ///
    /// Fixtures and stats already recorded for the player are left as they are.
    pub fn remove_player(&mut self, name: &str) -> Result<(), TournamentError> {
        let idx = self
            .roster
            .iter()
            .position(|p| p == name)
            .ok_or_else(|| TournamentError::PlayerNotFound(name.to_string()))?;
        self.roster.remove(idx);
        self.tournament.players.retain(|p| p != name);
        Ok(())
    }

    /// Select or deselect a roster player for the tournament (Setup only).
    /// Returns whether the player is selected afterwards.
    pub fn toggle_player(&mut self, name: &str) -> Result<bool, TournamentError> {
        if self.tournament.is_active() {
            return Err(TournamentError::TournamentAlreadyActive);
        }
        if !self.roster.iter().any(|p| p == name) {
            return Err(TournamentError::PlayerNotFound(name.to_string()));
        }
        let players = &mut self.tournament.players;
        match players.iter().position(|p| p == name) {
            Some(idx) => {
                players.remove(idx);
                Ok(false)
            }
            None => {
                players.push(name.to_string());
                Ok(true)
            }
        }
    }
}
