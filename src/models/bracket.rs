//! Playoff bracket: fixed single-elimination topology over the top league standings.

use crate::models::game::{Participant, Side};
use crate::models::tables::{TableNumber, TablePool};
use crate::models::tournament::TournamentConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bracket stages, in table-scheduling priority order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PlayIn,
    Quarterfinals,
    Semifinals,
    Final,
    ThirdPlace,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::PlayIn,
        Stage::Quarterfinals,
        Stage::Semifinals,
        Stage::Final,
        Stage::ThirdPlace,
    ];

    pub fn slot_count(self) -> usize {
        match self {
            Stage::PlayIn | Stage::Quarterfinals => 4,
            Stage::Semifinals => 2,
            Stage::Final | Stage::ThirdPlace => 1,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::PlayIn => "Play-in",
            Stage::Quarterfinals => "Quarterfinals",
            Stage::Semifinals => "Semifinals",
            Stage::Final => "Final",
            Stage::ThirdPlace => "Third place",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Identifies one bracket slot.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SlotId {
    pub stage: Stage,
    pub index: usize,
}

impl SlotId {
    pub fn new(stage: Stage, index: usize) -> Self {
        Self { stage, index }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.stage, self.index + 1)
    }
}

/// One bracket match: two participants, entered scores and scheduling metadata.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketSlot {
    pub participants: [Participant; 2],
    /// `None` until a score is entered; an empty score is not the same as 0.
    pub scores: [Option<u32>; 2],
    pub table: Option<TableNumber>,
    pub completed: bool,
    /// Reopened by hand after completion: editable without holding a table.
    pub manually_reopened: bool,
}

impl BracketSlot {
    pub fn new(first: Participant, second: Participant) -> Self {
        Self {
            participants: [first, second],
            ..Self::default()
        }
    }

    pub fn participant(&self, side: Side) -> &Participant {
        &self.participants[side_index(side)]
    }

    /// Both sides known and neither is a BYE, so the match must actually be played.
    pub fn has_two_players(&self) -> bool {
        self.participants.iter().all(|p| matches!(p, Participant::Player(_)))
    }

    /// Playable and not finished.
    pub fn is_ready(&self) -> bool {
        self.has_two_players() && !self.completed
    }

    /// Whether new scores are accepted right now.
    pub fn is_editable(&self) -> bool {
        !self.completed && (self.table.is_some() || self.manually_reopened)
    }

    pub fn status(&self) -> SlotStatus {
        if self.completed {
            SlotStatus::Completed
        } else if self.manually_reopened {
            SlotStatus::Editing
        } else if let Some(table) = self.table {
            SlotStatus::Playing { table }
        } else if self.is_ready() {
            SlotStatus::Waiting
        } else {
            SlotStatus::NotReady
        }
    }
}

pub(crate) fn side_index(side: Side) -> usize {
    match side {
        Side::One => 0,
        Side::Two => 1,
    }
}

/// Display status of a bracket slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SlotStatus {
    Completed,
    Playing { table: TableNumber },
    Editing,
    Waiting,
    NotReady,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Completed => write!(f, "Completed"),
            SlotStatus::Playing { table } => write!(f, "Table {}", table),
            SlotStatus::Editing => write!(f, "Editing"),
            SlotStatus::Waiting => write!(f, "Waiting"),
            SlotStatus::NotReady => write!(f, "Not ready"),
        }
    }
}

/// Full playoff state. Rebuilt from scratch on every generation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    #[serde(default)]
    pub play_in: Vec<BracketSlot>,
    #[serde(default)]
    pub quarterfinals: Vec<BracketSlot>,
    #[serde(default)]
    pub semifinals: Vec<BracketSlot>,
    #[serde(rename = "final", default)]
    pub final_match: Vec<BracketSlot>,
    #[serde(default)]
    pub third_place: Vec<BracketSlot>,
    #[serde(default = "default_win_threshold")]
    pub win_threshold: u32,
    #[serde(default)]
    pub scheduler: TablePool<SlotId>,
}

fn default_win_threshold() -> u32 {
    TournamentConfig::default().win_threshold
}

impl PlayoffBracket {
    /// Empty bracket with every participant unresolved.
    pub fn empty(win_threshold: u32) -> Self {
        let slots = |stage: Stage| vec![BracketSlot::default(); stage.slot_count()];
        Self {
            play_in: slots(Stage::PlayIn),
            quarterfinals: slots(Stage::Quarterfinals),
            semifinals: slots(Stage::Semifinals),
            final_match: slots(Stage::Final),
            third_place: slots(Stage::ThirdPlace),
            win_threshold,
            scheduler: TablePool::default(),
        }
    }

    pub fn stage(&self, stage: Stage) -> &[BracketSlot] {
        match stage {
            Stage::PlayIn => &self.play_in,
            Stage::Quarterfinals => &self.quarterfinals,
            Stage::Semifinals => &self.semifinals,
            Stage::Final => &self.final_match,
            Stage::ThirdPlace => &self.third_place,
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut Vec<BracketSlot> {
        match stage {
            Stage::PlayIn => &mut self.play_in,
            Stage::Quarterfinals => &mut self.quarterfinals,
            Stage::Semifinals => &mut self.semifinals,
            Stage::Final => &mut self.final_match,
            Stage::ThirdPlace => &mut self.third_place,
        }
    }

    pub fn slot(&self, id: SlotId) -> Option<&BracketSlot> {
        self.stage(id.stage).get(id.index)
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut BracketSlot> {
        self.stage_mut(id.stage).get_mut(id.index)
    }

    /// Every slot id in scheduling priority order.
    pub fn slot_ids() -> impl Iterator<Item = SlotId> {
        Stage::ALL
            .into_iter()
            .flat_map(|stage| (0..stage.slot_count()).map(move |index| SlotId::new(stage, index)))
    }
}
