//! Playoff: seeding from the league standings, result entry, winner propagation and table scheduling.
//!
//! Topology (12 seeds):
//!
//! ```text
//! play-in 0: 5 v 12 -> QF 1      QF 0: 1 v W(8 v 9)   \
//! play-in 1: 6 v 11 -> QF 3      QF 1: 4 v W(5 v 12)  / SF 0 \
//! play-in 2: 7 v 10 -> QF 2      QF 2: 2 v W(7 v 10)  \       final / third place
//! play-in 3: 8 v 9  -> QF 0      QF 3: 3 v W(6 v 11)  / SF 1 /
//! ```

use crate::logic::league::TableEvent;
use crate::logic::standings::rank_players;
use crate::models::{
    side_index, BracketSlot, Club, Participant, PlayoffBracket, Side, SlotId, Stage, TableNumber,
    TablePool, TournamentError,
};

/// Fewest ranked players a playoff can be built from.
pub const MIN_PLAYOFF_PLAYERS: usize = 8;
/// Seeds taken from the standings.
pub const PLAYOFF_SEEDS: usize = 12;

/// Play-in pairs as 0-based seed positions.
const PLAY_IN_PAIRS: [(usize, usize); 4] = [(4, 11), (5, 10), (6, 9), (7, 8)];
/// Quarterfinal each play-in winner moves into (as its second participant).
const PLAY_IN_TARGET: [usize; 4] = [1, 3, 2, 0];
/// Seed positions placed directly into quarterfinals 0..4.
const QUARTERFINAL_SEEDS: [usize; 4] = [0, 3, 1, 2];

/// Build a new bracket from the current standings and seat the first matches.
///
/// Replaces any previous bracket. Fails without touching state when fewer than
/// 8 players are ranked.
pub fn generate_playoff(club: &mut Club) -> Result<&PlayoffBracket, TournamentError> {
    let standings = rank_players(&club.tournament);
    if standings.len() < MIN_PLAYOFF_PLAYERS {
        return Err(TournamentError::NotEnoughPlayersForPlayoff {
            found: standings.len(),
        });
    }
    let seeds: Vec<Participant> = standings
        .into_iter()
        .take(PLAYOFF_SEEDS)
        .map(|e| Participant::Player(e.name))
        .collect();
    let seed = |pos: usize| seeds.get(pos).cloned().unwrap_or(Participant::Bye);

    let mut bracket = PlayoffBracket::empty(club.tournament.win_threshold);
    for (i, &(a, b)) in PLAY_IN_PAIRS.iter().enumerate() {
        bracket.play_in[i] = BracketSlot::new(seed(a), seed(b));
    }
    for (i, &pos) in QUARTERFINAL_SEEDS.iter().enumerate() {
        bracket.quarterfinals[i] = BracketSlot::new(seed(pos), Participant::Unresolved);
    }
    bracket.scheduler = TablePool::new(&club.tournament.tables);

    refresh(&mut bracket);
    log::info!("Playoff bracket generated from {} seeds", seeds.len());
    Ok(&*club.playoff.insert(bracket))
}

/// Winner of a slot, if it can be decided.
///
/// Unknown participants decide nothing. A BYE loses automatically. Otherwise
/// both scores must be entered, one equal to the threshold and the other below it.
pub fn slot_winner(slot: &BracketSlot, win_threshold: u32) -> Option<Participant> {
    let [a, b] = &slot.participants;
    if !a.is_resolved() || !b.is_resolved() {
        return None;
    }
    if a.is_bye() {
        return Some(b.clone());
    }
    if b.is_bye() {
        return Some(a.clone());
    }
    let [Some(sa), Some(sb)] = slot.scores else {
        return None;
    };
    if sa == win_threshold && sb < win_threshold {
        Some(a.clone())
    } else if sb == win_threshold && sa < win_threshold {
        Some(b.clone())
    } else {
        None
    }
}

fn slot_loser(slot: &BracketSlot, winner: &Participant) -> Participant {
    let [a, b] = &slot.participants;
    if winner == a {
        b.clone()
    } else {
        a.clone()
    }
}

/// Set one side's score of a bracket slot and propagate.
///
/// The slot must be at a table or reopened by hand. `None` clears the entry.
pub fn submit_playoff_score(
    club: &mut Club,
    stage: Stage,
    index: usize,
    side: Side,
    value: Option<u32>,
) -> Result<Vec<TableEvent<SlotId>>, TournamentError> {
    let id = SlotId::new(stage, index);
    let bracket = club.playoff.as_mut().ok_or(TournamentError::NoPlayoffBracket)?;
    let slot = bracket.slot_mut(id).ok_or(TournamentError::SlotNotFound(id))?;
    if !slot.is_editable() {
        return Err(TournamentError::SlotNotEditable(id));
    }
    slot.scores[side_index(side)] = value;
    Ok(refresh(bracket))
}

/// Reopen a completed slot so its result can be corrected without a table.
///
/// Nothing is propagated until a score is entered.
pub fn reopen_playoff_slot(club: &mut Club, stage: Stage, index: usize) -> Result<(), TournamentError> {
    let id = SlotId::new(stage, index);
    let bracket = club.playoff.as_mut().ok_or(TournamentError::NoPlayoffBracket)?;
    let slot = bracket.slot_mut(id).ok_or(TournamentError::SlotNotFound(id))?;
    if !slot.completed {
        return Err(TournamentError::SlotNotCompleted(id));
    }
    slot.completed = false;
    slot.manually_reopened = true;
    Ok(())
}

/// Tournament winner, once the final is decided.
pub fn champion(bracket: &PlayoffBracket) -> Option<Participant> {
    slot_winner(&bracket.final_match[0], bracket.win_threshold)
}

/// Third place, once that match is decided.
pub fn third_place(bracket: &PlayoffBracket) -> Option<Participant> {
    slot_winner(&bracket.third_place[0], bracket.win_threshold)
}

/// Recompute the whole bracket from entered scores, then reschedule tables.
///
/// Winners flow play-in -> quarterfinals -> semifinals -> final, semifinal
/// losers to the third-place match. Downstream positions whose feeder no longer
/// has a winner go back to unresolved, so nothing stale stays advanced.
/// A slot that receives a different participant loses its entered result.
fn refresh(bracket: &mut PlayoffBracket) -> Vec<TableEvent<SlotId>> {
    let threshold = bracket.win_threshold;
    let mut events = Vec::new();

    for i in 0..Stage::PlayIn.slot_count() {
        let winner = settle(bracket, SlotId::new(Stage::PlayIn, i), threshold, &mut events);
        place(&mut bracket.quarterfinals[PLAY_IN_TARGET[i]], 1, winner.unwrap_or_default());
    }
    for i in 0..Stage::Quarterfinals.slot_count() {
        let winner = settle(bracket, SlotId::new(Stage::Quarterfinals, i), threshold, &mut events);
        place(&mut bracket.semifinals[i / 2], i % 2, winner.unwrap_or_default());
    }
    for i in 0..Stage::Semifinals.slot_count() {
        let id = SlotId::new(Stage::Semifinals, i);
        let winner = settle(bracket, id, threshold, &mut events);
        let loser = winner.as_ref().map(|w| slot_loser(&bracket.semifinals[i], w));
        place(&mut bracket.final_match[0], i, winner.unwrap_or_default());
        place(&mut bracket.third_place[0], i, loser.unwrap_or_default());
    }
    settle(bracket, SlotId::new(Stage::Final, 0), threshold, &mut events);
    settle(bracket, SlotId::new(Stage::ThirdPlace, 0), threshold, &mut events);

    for id in PlayoffBracket::slot_ids() {
        let Some(slot) = bracket.slot_mut(id) else {
            continue;
        };
        if slot.completed || slot.has_two_players() {
            continue;
        }
        if let Some(table) = slot.table.take() {
            if bracket.scheduler.release(table, &id) {
                events.push(TableEvent::Released { table, holder: id });
            }
        }
    }

    events.extend(
        assign_playoff_tables(bracket)
            .into_iter()
            .map(|(table, holder)| TableEvent::Assigned { table, holder }),
    );
    events
}

/// Write a propagated participant. Scores entered against someone else are dropped.
fn place(slot: &mut BracketSlot, position: usize, participant: Participant) {
    if slot.participants[position] == participant {
        return;
    }
    slot.participants[position] = participant;
    slot.scores = [None, None];
    slot.completed = false;
    slot.manually_reopened = false;
}

/// Sync a slot's completion with its decidability; returns the winner.
fn settle(
    bracket: &mut PlayoffBracket,
    id: SlotId,
    threshold: u32,
    events: &mut Vec<TableEvent<SlotId>>,
) -> Option<Participant> {
    let slot = bracket.slot_mut(id)?;
    let winner = slot_winner(slot, threshold);
    if winner.is_some() {
        if !slot.completed {
            slot.completed = true;
            slot.manually_reopened = false;
            if let Some(table) = slot.table.take() {
                if bracket.scheduler.release(table, &id) {
                    events.push(TableEvent::Released { table, holder: id });
                }
            }
        }
    } else if slot.completed {
        slot.completed = false;
        slot.manually_reopened = true;
    }
    winner
}

/// Seat ready slots at free tables, earliest stage first. A slot reopened for a
/// correction is seated like any other and plays on at its table.
fn assign_playoff_tables(bracket: &mut PlayoffBracket) -> Vec<(TableNumber, SlotId)> {
    let mut scheduler = std::mem::take(&mut bracket.scheduler);
    let assigned = scheduler.fill(|table| {
        let id = PlayoffBracket::slot_ids()
            .find(|&id| bracket.slot(id).is_some_and(|s| s.table.is_none() && s.is_ready()))?;
        let slot = bracket.slot_mut(id)?;
        slot.table = Some(table);
        slot.manually_reopened = false;
        Some(id)
    });
    bracket.scheduler = scheduler;
    assigned
}
