//! League standings: ranking, tie groups, manual tie-break and CSV export.

use crate::models::{PlayerStats, Tournament, TournamentError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io;

/// One row of the standings table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandingsEntry {
    /// 1-based position.
    pub rank: usize,
    pub name: String,
    pub stats: PlayerStats,
    pub win_ratio: f64,
    /// Shares win ratio and games won with at least one other player.
    pub tied: bool,
}

/// Direction to move a player inside its tie group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Statistical tie identity: win ratio rounded to 6 decimals, and games won.
fn tie_key(stats: &PlayerStats) -> (i64, u32) {
    ((stats.win_ratio() * 1_000_000.0).round() as i64, stats.games_won)
}

/// Order two players: win ratio desc, games won desc, manual order, then name.
fn compare(
    a: (&str, &PlayerStats),
    b: (&str, &PlayerStats),
    manual_order: &BTreeMap<String, u32>,
) -> Ordering {
    b.1.win_ratio()
        .total_cmp(&a.1.win_ratio())
        .then_with(|| b.1.games_won.cmp(&a.1.games_won))
        .then_with(|| match (manual_order.get(a.0), manual_order.get(b.0)) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| collate(a.0, b.0))
}

/// Name comparison in dictionary order: letters compare case-insensitively with
/// Polish diacritics sorting right after their base letter, then lowercase
/// before uppercase, then code points.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| s.chars().map(fold).collect::<Vec<_>>();
    primary(a)
        .cmp(&primary(b))
        .then_with(|| {
            let case = |s: &str| s.chars().map(char::is_uppercase).collect::<Vec<_>>();
            case(a).cmp(&case(b))
        })
        .then_with(|| a.cmp(b))
}

fn fold(c: char) -> (char, u8) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'ą' => ('a', 1),
        'ć' => ('c', 1),
        'ę' => ('e', 1),
        'ł' => ('l', 1),
        'ń' => ('n', 1),
        'ó' => ('o', 1),
        'ś' => ('s', 1),
        'ź' => ('z', 1),
        'ż' => ('z', 2),
        other => (other, 0),
    }
}

/// Rank every selected player. The result is a strict total order.
pub fn rank_players(tournament: &Tournament) -> Vec<StandingsEntry> {
    let mut rows: Vec<(String, PlayerStats)> = tournament
        .players
        .iter()
        .map(|p| (p.clone(), tournament.stats_for(p)))
        .collect();
    rows.sort_by(|a, b| compare((&a.0, &a.1), (&b.0, &b.1), &tournament.manual_order));

    let mut group_sizes: BTreeMap<(i64, u32), usize> = BTreeMap::new();
    for (_, stats) in &rows {
        *group_sizes.entry(tie_key(stats)).or_default() += 1;
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, stats))| StandingsEntry {
            rank: i + 1,
            tied: group_sizes[&tie_key(&stats)] > 1,
            win_ratio: stats.win_ratio(),
            name,
            stats,
        })
        .collect()
}

/// Players sharing `name`'s tie group, in current standings order.
pub fn tie_group(tournament: &Tournament, name: &str) -> Result<Vec<String>, TournamentError> {
    let ranked = rank_players(tournament);
    let key = ranked
        .iter()
        .find(|e| e.name == name)
        .map(|e| tie_key(&e.stats))
        .ok_or_else(|| TournamentError::PlayerNotFound(name.to_string()))?;
    Ok(ranked
        .into_iter()
        .filter(|e| tie_key(&e.stats) == key)
        .map(|e| e.name)
        .collect())
}

/// Move a player one place up or down inside its tie group.
///
/// Members without a manual value first get their position in the group. The
/// player swaps values with its neighbour and the group is renumbered 1..k.
/// Returns `false` when the player is already at that end of the group.
/// Players outside the group are never touched.
pub fn reorder_tied_player(
    tournament: &mut Tournament,
    name: &str,
    direction: Direction,
) -> Result<bool, TournamentError> {
    let group = tie_group(tournament, name)?;
    if group.len() < 2 {
        return Err(TournamentError::PlayerNotTied(name.to_string()));
    }

    let order = &mut tournament.manual_order;
    for (pos, member) in group.iter().enumerate() {
        order.entry(member.clone()).or_insert(pos as u32 + 1);
    }

    let mut members = group;
    members.sort_by_key(|m| order[m]);
    let Some(i) = members.iter().position(|m| m == name) else {
        return Ok(false);
    };
    let j = match direction {
        Direction::Up if i > 0 => i - 1,
        Direction::Down if i + 1 < members.len() => i + 1,
        _ => return Ok(false),
    };

    let (a, b) = (order[&members[i]], order[&members[j]]);
    order.insert(members[i].clone(), b);
    order.insert(members[j].clone(), a);

    members.sort_by_key(|m| order[m]);
    for (pos, member) in members.iter().enumerate() {
        order.insert(member.clone(), pos as u32 + 1);
    }
    Ok(true)
}

/// Write the standings as CSV: rank, name, matches, games won, games total, win %.
pub fn write_standings_csv<W: io::Write>(entries: &[StandingsEntry], writer: W) -> csv::Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(["rank", "name", "matches", "games_won", "games_total", "win_pct"])?;
    for e in entries {
        w.write_record([
            e.rank.to_string(),
            e.name.clone(),
            e.stats.matches_completed.to_string(),
            e.stats.games_won.to_string(),
            e.stats.games_total.to_string(),
            e.stats.win_percentage(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
