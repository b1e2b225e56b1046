//! Per-player league statistics.

use serde::{Deserialize, Serialize};

/// Players are identified by their (unique) name.
pub type PlayerName = String;

/// Aggregated league statistics for one player.
///
/// Kept up to date by applying score deltas, never by replaying every fixture.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    #[serde(alias = "matches")]
    pub matches_completed: u32,
    #[serde(alias = "wonGames")]
    pub games_won: u32,
    #[serde(alias = "totalGames")]
    pub games_total: u32,
    #[serde(alias = "byes")]
    pub bye_count: u32,
}

impl PlayerStats {
    /// Share of games won, 0 when no game has been played yet.
    pub fn win_ratio(&self) -> f64 {
        if self.games_total == 0 {
            0.0
        } else {
            f64::from(self.games_won) / f64::from(self.games_total)
        }
    }

    /// Win ratio in percent, formatted with one decimal (e.g. `"66.7"`).
    pub fn win_percentage(&self) -> String {
        format!("{:.1}", self.win_ratio() * 100.0)
    }

    /// Replace a previously counted result `(own, opponent)` with a new one.
    pub fn apply_score_delta(&mut self, previous: (u32, u32), current: (u32, u32)) {
        self.games_won = self.games_won.saturating_sub(previous.0) + current.0;
        self.games_total = self.games_total.saturating_sub(previous.0 + previous.1) + current.0 + current.1;
    }

    pub fn record_completion(&mut self) {
        self.matches_completed += 1;
    }

    pub fn revert_completion(&mut self) {
        self.matches_completed = self.matches_completed.saturating_sub(1);
    }

    pub fn record_bye(&mut self) {
        self.bye_count += 1;
    }
}
