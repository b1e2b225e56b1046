//! League phase: score entry, reopening, and the live table scheduler.

use crate::models::{GameMatch, MatchId, Side, TableNumber, Tournament, TournamentError};
use serde::Serialize;

/// Table movement caused by one operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TableEvent<K> {
    Released { table: TableNumber, holder: K },
    Assigned { table: TableNumber, holder: K },
}

/// Result of a score edit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub score_1: u32,
    pub score_2: u32,
    pub completed: bool,
    pub table_events: Vec<TableEvent<MatchId>>,
}

/// Seat waiting matches at free tables, lowest `sequence_index` first.
pub(crate) fn assign_tables(tournament: &mut Tournament) -> Vec<(TableNumber, MatchId)> {
    let fixtures = &mut tournament.fixtures;
    tournament.scheduler.fill(|table| {
        let next = fixtures
            .iter_mut()
            .filter(|m| m.is_waiting_for_table())
            .min_by_key(|m| m.sequence_index)?;
        next.table = Some(table);
        Some(next.id)
    })
}

/// Set one side's score of a league match.
///
/// The value is clamped to `[0, win_threshold]`. Only matches seated at a table
/// can be scored. When the edit completes the match its table is released and
/// handed to the earliest waiting match in the same call.
pub fn submit_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    side: Side,
    value: i64,
) -> Result<ScoreOutcome, TournamentError> {
    if !tournament.is_active() {
        return Err(TournamentError::TournamentNotActive);
    }
    let win_threshold = tournament.win_threshold;
    let m = tournament
        .fixture_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_bye {
        return Err(TournamentError::ByeMatch(match_id));
    }
    if m.table.is_none() {
        return Err(TournamentError::NoTableAssigned(match_id));
    }

    let was_completed = m.completed;
    let previous = (m.score_1, m.score_2);
    let value = value.clamp(0, i64::from(win_threshold)) as u32;
    match side {
        Side::One => m.score_1 = value,
        Side::Two => m.score_2 = value,
    }
    m.completed = m.scores_reach(win_threshold);
    let edited = m.clone();

    apply_stats_delta(tournament, &edited, previous);

    let mut table_events = Vec::new();
    if !was_completed && edited.completed {
        table_events = release_and_reassign(tournament, match_id);
    }

    Ok(ScoreOutcome {
        score_1: edited.score_1,
        score_2: edited.score_2,
        completed: edited.completed,
        table_events,
    })
}

/// Replace the contribution of `previous` scores with the match's current scores.
///
/// Completion for the matches-played counter is judged from the scores, so a
/// reopened match that is scored again is not counted twice.
fn apply_stats_delta(tournament: &mut Tournament, m: &GameMatch, previous: (u32, u32)) {
    let win_threshold = tournament.win_threshold;
    let was_complete = previous.0 == win_threshold || previous.1 == win_threshold;
    let is_complete = m.scores_reach(win_threshold);

    let sides = [
        (&m.participant_1, previous, (m.score_1, m.score_2)),
        (&m.participant_2, (previous.1, previous.0), (m.score_2, m.score_1)),
    ];
    for (participant, before, after) in sides {
        let Some(name) = participant.name() else {
            continue;
        };
        let stats = tournament.stats.entry(name.to_string()).or_default();
        stats.apply_score_delta(before, after);
        match (was_complete, is_complete) {
            (false, true) => stats.record_completion(),
            (true, false) => stats.revert_completion(),
            _ => {}
        }
    }
}

fn release_and_reassign(tournament: &mut Tournament, match_id: MatchId) -> Vec<TableEvent<MatchId>> {
    let mut events = Vec::new();
    let Some(m) = tournament.fixture_mut(match_id) else {
        return events;
    };
    let Some(table) = m.table.take() else {
        return events;
    };
    if tournament.scheduler.release(table, &match_id) {
        events.push(TableEvent::Released { table, holder: match_id });
    }
    events.extend(
        assign_tables(tournament)
            .into_iter()
            .map(|(table, holder)| TableEvent::Assigned { table, holder }),
    );
    events
}

/// Reopen a completed match for editing.
///
/// Only the completion flag is cleared. The match does not get a table back, so
/// until a later release seats it again, score edits are refused with
/// [`TournamentError::NoTableAssigned`].
pub fn reopen_match(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    if !tournament.is_active() {
        return Err(TournamentError::TournamentNotActive);
    }
    let m = tournament
        .fixture_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_bye {
        return Err(TournamentError::ByeMatch(match_id));
    }
    if !m.completed {
        return Err(TournamentError::MatchNotCompleted(match_id));
    }
    m.completed = false;
    Ok(())
}
