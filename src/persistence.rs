//! Saving and restoring the club as JSON.
//!
//! Decoding never fails: each field falls back to its default on its own, and
//! an unreadable document gives a fresh club. Saves written by older versions
//! (bare-name participants, `null` for the bye, camelCase keys) are migrated.

use crate::models::{
    BracketSlot, Club, GameMatch, MatchId, PairKey, PlayerStats, PlayoffBracket, Stage, TableConfig, TableNumber,
    TablePool, Tournament, TournamentState,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

/// A decoded save.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: Option<DateTime<Utc>>,
    pub club: Club,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    roster: &'a [String],
    tournament: &'a Tournament,
    playoff: &'a Option<PlayoffBracket>,
}

/// Encode the club, stamped with the current time.
pub fn encode(club: &Club) -> serde_json::Result<String> {
    encode_at(club, Utc::now())
}

pub fn encode_at(club: &Club, saved_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        saved_at,
        roster: &club.roster,
        tournament: &club.tournament,
        playoff: &club.playoff,
    })
}

/// Replace the save at `path` with `text`.
///
/// The text goes to `<path>.tmp` first and is then renamed over `path`, so the
/// file always holds either the previous save or the new one.
pub async fn write_snapshot(path: &Path, text: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, text).await?;
    tokio::fs::rename(&tmp, path).await
}

/// Decode a save. Never fails.
pub fn decode(text: &str) -> Snapshot {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(root)) => decode_root(&root),
        Ok(_) => {
            log::warn!("Saved state is not a JSON object; starting fresh");
            fresh()
        }
        Err(e) => {
            log::warn!("Saved state is unreadable ({}); starting fresh", e);
            fresh()
        }
    }
}

fn fresh() -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        saved_at: None,
        club: Club::new(),
    }
}

/// First of `keys` present in `obj` that parses as `T`.
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| serde_json::from_value(v.clone()).ok())
}

fn decode_root(root: &Map<String, Value>) -> Snapshot {
    let tournament = match root.get("tournament") {
        Some(Value::Object(t)) => decode_tournament(t),
        _ => Tournament::new(),
    };
    let playoff = match root.get("playoff") {
        Some(Value::Object(p)) => decode_bracket(p, tournament.win_threshold),
        _ => None,
    }
    .map(|bracket| normalize_bracket(bracket, &tournament.tables));

    Snapshot {
        version: field(root, &["version"]).unwrap_or(SNAPSHOT_VERSION),
        saved_at: field(root, &["saved_at"]),
        club: Club {
            roster: field(root, &["roster", "playerPool"]).unwrap_or_default(),
            tournament,
            playoff,
        },
    }
}

fn decode_tournament(obj: &Map<String, Value>) -> Tournament {
    let defaults = Tournament::new();

    let state = field(obj, &["state"]).unwrap_or_else(|| match field::<bool>(obj, &["isActive"]) {
        Some(true) => TournamentState::Active,
        _ => TournamentState::Setup,
    });

    let fixtures: Vec<GameMatch> = field::<Vec<Value>>(obj, &["fixtures", "allMatches"])
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("Dropping unreadable fixture: {}", e);
                None
            }
        })
        .collect();

    let stats: BTreeMap<String, PlayerStats> = field::<Map<String, Value>>(obj, &["stats", "playerStats"])
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, v)| serde_json::from_value(v).ok().map(|s| (name, s)))
        .collect();

    let mut t = Tournament {
        id: field(obj, &["id"]).unwrap_or(defaults.id),
        players: field(obj, &["players"]).unwrap_or_default(),
        rounds: field(obj, &["rounds"]).unwrap_or(defaults.rounds),
        win_threshold: field(obj, &["win_threshold", "gameType"]).unwrap_or(defaults.win_threshold),
        state,
        fixtures,
        stats,
        used_pairs: field(obj, &["used_pairs"]).unwrap_or_default(),
        manual_order: field(obj, &["manual_order", "manualOrder"]).unwrap_or_default(),
        tables: decode_tables(obj),
        scheduler: field(obj, &["scheduler", "tableScheduler"]).unwrap_or_default(),
        next_match_id: field(obj, &["next_match_id", "nextMatchId"]).unwrap_or(defaults.next_match_id),
    };
    normalize_tournament(&mut t);
    t
}

/// Current shape `{count, numbers}`, or the older `tables: [..]` plus `tableCount`.
fn decode_tables(obj: &Map<String, Value>) -> TableConfig {
    if let Some(config) = field::<TableConfig>(obj, &["tables"]) {
        return TableConfig::new(config.count(), config.numbers());
    }
    let numbers: Vec<TableNumber> = field(obj, &["tables"]).unwrap_or_else(|| vec![1, 2, 3]);
    let count: usize = field(obj, &["tableCount"]).unwrap_or(numbers.len());
    TableConfig::new(count, &numbers)
}

fn normalize_tournament(t: &mut Tournament) {
    if t.win_threshold == 0 {
        t.win_threshold = Tournament::new().win_threshold;
    }
    for m in &mut t.fixtures {
        m.is_bye = m.participant_1.is_bye() || m.participant_2.is_bye();
        if m.is_bye {
            m.pair_key = None;
        } else if m.pair_key.is_none() {
            if let (Some(a), Some(b)) = (m.participant_1.name(), m.participant_2.name()) {
                m.pair_key = Some(PairKey::new(a, b));
            }
        }
        if m.is_bye || m.completed {
            m.table = None;
        }
    }

    if t.used_pairs.is_empty() {
        t.used_pairs = t.fixtures.iter().filter_map(|m| m.pair_key.clone()).collect::<BTreeSet<_>>();
    }

    let max_id = t.fixtures.iter().map(|m| m.id.0).max().unwrap_or(0);
    t.next_match_id = t.next_match_id.max(max_id.saturating_add(1));

    if !t.is_active() {
        t.scheduler = TablePool::default();
        return;
    }
    let seated: Vec<(TableNumber, MatchId)> = t.fixtures.iter().filter_map(|m| Some((m.table?, m.id))).collect();
    t.scheduler = t.scheduler.reconcile(&t.tables, seated);
    for m in &mut t.fixtures {
        if let Some(table) = m.table {
            if t.scheduler.busy.get(&table) != Some(&m.id) {
                m.table = None;
            }
        }
    }
}

/// Each field of a saved bracket falls back on its own. Stages are required:
/// a stage that is missing or has the wrong number of slots drops the bracket.
fn decode_bracket(obj: &Map<String, Value>, win_threshold: u32) -> Option<PlayoffBracket> {
    let mut bracket = PlayoffBracket::empty(field(obj, &["win_threshold"]).unwrap_or(win_threshold));
    for stage in Stage::ALL {
        match field::<Vec<BracketSlot>>(obj, &[stage_key(stage)]) {
            Some(slots) if slots.len() == stage.slot_count() => *bracket.stage_mut(stage) = slots,
            _ => {
                log::warn!("Dropping playoff bracket with unreadable {} stage", stage);
                return None;
            }
        }
    }
    bracket.scheduler = field(obj, &["scheduler"]).unwrap_or_default();
    Some(bracket)
}

fn stage_key(stage: Stage) -> &'static str {
    match stage {
        Stage::PlayIn => "play_in",
        Stage::Quarterfinals => "quarterfinals",
        Stage::Semifinals => "semifinals",
        Stage::Final => "final",
        Stage::ThirdPlace => "third_place",
    }
}

fn normalize_bracket(mut bracket: PlayoffBracket, tables: &TableConfig) -> PlayoffBracket {
    let seated: Vec<_> = PlayoffBracket::slot_ids()
        .filter_map(|id| Some((bracket.slot(id)?.table?, id)))
        .collect();
    bracket.scheduler = bracket.scheduler.reconcile(tables, seated);
    for id in PlayoffBracket::slot_ids() {
        let holder = bracket.slot(id).and_then(|s| s.table);
        if let Some(table) = holder {
            if bracket.scheduler.busy.get(&table) != Some(&id) {
                if let Some(slot) = bracket.slot_mut(id) {
                    slot.table = None;
                }
            }
        }
    }
    bracket
}
