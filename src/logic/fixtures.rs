//! League fixtures: round-robin generation with the circle method.

use crate::models::{GameMatch, MatchId, PairKey, Participant, PlayerName};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Generated league schedule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixtureList {
    /// Flattened, round-ordered; `sequence_index` equals the position here.
    pub matches: Vec<GameMatch>,
    pub used_pairs: BTreeSet<PairKey>,
    pub rounds: u32,
    pub requested_rounds: u32,
}

impl FixtureList {
    /// Whether more rounds were requested than can be played without a repeat pairing.
    pub fn was_clamped(&self) -> bool {
        self.rounds < self.requested_rounds
    }
}

/// Most rounds playable without repeating a pairing: N-1 for even N, N for odd N
/// (the BYE pads the roster to N+1).
pub fn max_rounds(player_count: usize) -> u32 {
    if player_count < 2 {
        return 0;
    }
    let n = if player_count % 2 == 0 { player_count } else { player_count + 1 };
    (n - 1) as u32
}

/// Round counts offered for a roster of `player_count` selected players.
///
/// Small rosters get every count from 3 up to a full round robin; otherwise 3–5.
pub fn round_choices(player_count: usize) -> Vec<u32> {
    let max = max_rounds(player_count);
    let choices: Vec<u32> = if player_count > 0 && player_count < 10 {
        (3..=max).collect()
    } else {
        Vec::new()
    };
    if choices.is_empty() {
        vec![3, 4, 5]
    } else {
        choices
    }
}

/// Build the full round-robin fixture list.
///
/// 1. Shuffle the roster once for the whole tournament.
/// 2. Pad an odd roster with a BYE so N is even.
/// 3. Each round pairs position `i` with `N-1-i`.
/// 4. Between rounds position 0 stays put and positions 1..N-1 rotate by one.
///
/// Rounds beyond the maximum are clamped with a warning.
pub fn generate_fixtures<R, F>(players: &[PlayerName], requested_rounds: u32, rng: &mut R, mut next_id: F) -> FixtureList
where
    R: Rng + ?Sized,
    F: FnMut() -> MatchId,
{
    let max = max_rounds(players.len());
    let rounds = requested_rounds.min(max);
    if requested_rounds > max {
        log::warn!(
            "Too many rounds requested ({}); at most {} without repeat pairings, scheduling {}",
            requested_rounds,
            max,
            rounds
        );
    }

    let mut order: Vec<Participant> = players.iter().cloned().map(Participant::Player).collect();
    order.shuffle(rng);
    if order.len() % 2 != 0 {
        order.push(Participant::Bye);
    }
    let n = order.len();

    let mut matches = Vec::with_capacity(rounds as usize * n / 2);
    let mut used_pairs = BTreeSet::new();
    for round in 1..=rounds {
        for i in 0..n / 2 {
            let m = GameMatch::new(next_id(), round, matches.len(), order[i].clone(), order[n - 1 - i].clone());
            if let Some(key) = &m.pair_key {
                let fresh = used_pairs.insert(key.clone());
                debug_assert!(fresh, "circle method repeated a pairing");
            }
            matches.push(m);
        }
        order[1..].rotate_right(1);
    }

    FixtureList {
        matches,
        used_pairs,
        rounds,
        requested_rounds,
    }
}
