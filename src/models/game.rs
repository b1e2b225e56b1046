//! League match (fixture), its participants and the pair identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, monotonically increasing identifier for a league match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u32);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a match: a real player, the BYE sentinel, or a bracket
/// position whose occupant is not known yet.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "ParticipantRepr")]
pub enum Participant {
    Player(String),
    Bye,
    #[default]
    Unresolved,
}

/// Accepts the current tagged shape as well as older saves, where a
/// participant was a bare name and a missing opponent was `null`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParticipantRepr {
    Tagged(TaggedParticipant),
    Legacy(Option<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedParticipant {
    Player(String),
    Bye,
    Unresolved,
}

impl From<ParticipantRepr> for Participant {
    fn from(repr: ParticipantRepr) -> Self {
        match repr {
            ParticipantRepr::Tagged(TaggedParticipant::Player(name)) => Participant::Player(name),
            ParticipantRepr::Tagged(TaggedParticipant::Bye) => Participant::Bye,
            ParticipantRepr::Tagged(TaggedParticipant::Unresolved) => Participant::Unresolved,
            ParticipantRepr::Legacy(None) => Participant::Bye,
            ParticipantRepr::Legacy(Some(name)) => Participant::Player(name),
        }
    }
}

impl Participant {
    pub fn player(name: impl Into<String>) -> Self {
        Participant::Player(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Participant::Player(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Participant::Bye)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Participant::Unresolved)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Player(name) => f.write_str(name),
            Participant::Bye => f.write_str("BYE"),
            Participant::Unresolved => f.write_str("???"),
        }
    }
}

/// Unordered pair identity: the two names in canonical (sorted) order.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            PairKey(a.to_string(), b.to_string())
        } else {
            PairKey(b.to_string(), a.to_string())
        }
    }

    pub fn names(&self) -> (&str, &str) {
        (&self.0, &self.1)
    }
}

/// Which participant a score belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

/// A single league fixture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    /// Position in the flattened, round-ordered fixture list; the queueing order for tables.
    #[serde(alias = "globalIndex")]
    pub sequence_index: usize,
    #[serde(alias = "player1")]
    pub participant_1: Participant,
    #[serde(alias = "player2")]
    pub participant_2: Participant,
    #[serde(default, alias = "score1")]
    pub score_1: u32,
    #[serde(default, alias = "score2")]
    pub score_2: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, alias = "isBye")]
    pub is_bye: bool,
    /// None for bye matches.
    #[serde(default)]
    pub pair_key: Option<PairKey>,
    #[serde(default)]
    pub table: Option<u8>,
}

impl GameMatch {
    pub fn new(id: MatchId, round: u32, sequence_index: usize, participant_1: Participant, participant_2: Participant) -> Self {
        let is_bye = participant_1.is_bye() || participant_2.is_bye();
        let pair_key = match (participant_1.name(), participant_2.name()) {
            (Some(a), Some(b)) if !is_bye => Some(PairKey::new(a, b)),
            _ => None,
        };
        Self {
            id,
            round,
            sequence_index,
            participant_1,
            participant_2,
            score_1: 0,
            score_2: 0,
            completed: false,
            is_bye,
            pair_key,
            table: None,
        }
    }

    pub fn participant(&self, side: Side) -> &Participant {
        match side {
            Side::One => &self.participant_1,
            Side::Two => &self.participant_2,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::One => self.score_1,
            Side::Two => self.score_2,
        }
    }

    /// The real player of a bye match.
    pub fn bye_recipient(&self) -> Option<&str> {
        if !self.is_bye {
            return None;
        }
        self.participant_1.name().or_else(|| self.participant_2.name())
    }

    /// Whether the scores reach the race-to-N threshold on either side.
    pub fn scores_reach(&self, win_threshold: u32) -> bool {
        self.score_1 == win_threshold || self.score_2 == win_threshold
    }

    /// Eligible to receive a table: a real match, not finished, not already seated.
    pub fn is_waiting_for_table(&self) -> bool {
        !self.is_bye && !self.completed && self.table.is_none()
    }

    pub fn status(&self) -> MatchStatus {
        if self.is_bye {
            MatchStatus::Bye
        } else if self.completed {
            MatchStatus::Completed
        } else if let Some(table) = self.table {
            MatchStatus::Playing { table }
        } else {
            MatchStatus::WaitingForTable
        }
    }
}

/// Display status of a league fixture.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MatchStatus {
    Bye,
    Playing { table: u8 },
    WaitingForTable,
    Completed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Bye => write!(f, "BYE"),
            MatchStatus::Playing { table } => write!(f, "Table {}", table),
            MatchStatus::WaitingForTable => write!(f, "Waiting for table"),
            MatchStatus::Completed => write!(f, "Completed"),
        }
    }
}
