//! Integration tests for standings: ranking order, tie groups, manual tie-break and CSV export.

use cue_league_web::{
    collate, rank_players, reorder_tied_player, tie_group, write_standings_csv, Direction, PlayerStats, Tournament,
    TournamentError,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

fn stats(won: u32, total: u32) -> PlayerStats {
    PlayerStats {
        games_won: won,
        games_total: total,
        ..PlayerStats::default()
    }
}

fn tournament_with(rows: &[(&str, u32, u32)]) -> Tournament {
    let mut t = Tournament::new();
    for &(name, won, total) in rows {
        t.players.push(name.to_string());
        t.stats.insert(name.to_string(), stats(won, total));
    }
    t
}

fn order(t: &Tournament) -> Vec<String> {
    rank_players(t).into_iter().map(|e| e.name).collect()
}

#[test]
fn ranks_by_ratio_then_games_won_then_name() {
    let t = tournament_with(&[
        ("Ewa", 2, 4),
        ("Bartek", 6, 8),
        ("Adam", 3, 4),
        ("Celina", 0, 0),
        ("Dawid", 4, 8),
    ]);
    assert_eq!(order(&t), vec!["Bartek", "Adam", "Dawid", "Ewa", "Celina"]);
    let ranked = rank_players(&t);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[4].rank, 5);
    assert!(!ranked[0].tied);
    assert_eq!(ranked[4].win_ratio, 0.0);
}

#[test]
fn two_thirds_tie_is_broken_by_name_then_by_hand() {
    let mut t = tournament_with(&[("Zenon", 5, 6), ("Ola", 4, 6), ("Ala", 4, 6)]);
    assert_eq!(order(&t), vec!["Zenon", "Ala", "Ola"]);
    let ranked = rank_players(&t);
    assert!(!ranked[0].tied);
    assert!(ranked[1].tied && ranked[2].tied);
    assert_eq!(tie_group(&t, "Ola").unwrap(), vec!["Ala", "Ola"]);

    assert_eq!(reorder_tied_player(&mut t, "Ola", Direction::Up), Ok(true));
    assert_eq!(order(&t), vec!["Zenon", "Ola", "Ala"]);
    assert_eq!(t.manual_order.get("Ola"), Some(&1));
    assert_eq!(t.manual_order.get("Ala"), Some(&2));
    assert!(!t.manual_order.contains_key("Zenon"));
}

#[test]
fn reorder_at_the_edge_of_the_group_changes_nothing() {
    let mut t = tournament_with(&[("Ala", 2, 4), ("Ola", 2, 4)]);
    assert_eq!(reorder_tied_player(&mut t, "Ala", Direction::Up), Ok(false));
    assert_eq!(reorder_tied_player(&mut t, "Ola", Direction::Down), Ok(false));
    assert_eq!(order(&t), vec!["Ala", "Ola"]);
}

#[test]
fn reorder_needs_a_tied_known_player() {
    let mut t = tournament_with(&[("Ala", 3, 4), ("Ola", 2, 4)]);
    assert_eq!(
        reorder_tied_player(&mut t, "Ala", Direction::Down),
        Err(TournamentError::PlayerNotTied("Ala".into()))
    );
    assert_eq!(
        reorder_tied_player(&mut t, "Nobody", Direction::Up),
        Err(TournamentError::PlayerNotFound("Nobody".into()))
    );
    assert!(t.manual_order.is_empty());
}

#[test]
fn group_is_renumbered_densely_after_each_move() {
    let mut t = tournament_with(&[("A", 1, 2), ("B", 1, 2), ("C", 1, 2), ("D", 1, 2), ("Top", 2, 2)]);
    reorder_tied_player(&mut t, "D", Direction::Up).unwrap();
    reorder_tied_player(&mut t, "D", Direction::Up).unwrap();
    reorder_tied_player(&mut t, "A", Direction::Down).unwrap();
    assert_eq!(order(&t), vec!["Top", "D", "A", "B", "C"]);

    let mut values: Vec<u32> = ["A", "B", "C", "D"].iter().map(|n| t.manual_order[*n]).collect();
    values.sort();
    assert_eq!(values, vec![1, 2, 3, 4]);
    assert!(!t.manual_order.contains_key("Top"));
}

#[test]
fn manual_order_only_matters_inside_a_tie() {
    let mut t = tournament_with(&[("Ala", 1, 4), ("Ola", 3, 4)]);
    t.manual_order.insert("Ala".into(), 1);
    assert_eq!(order(&t), vec!["Ola", "Ala"]);
}

#[test]
fn ranking_is_a_strict_total_order_independent_of_input_order() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..20 {
        let mut t = Tournament::new();
        for i in 0..10 {
            let total = rng.gen_range(0..6);
            let won = if total == 0 { 0 } else { rng.gen_range(0..=total) };
            let name = format!("Gracz{i}");
            t.players.push(name.clone());
            t.stats.insert(name, stats(won, total));
        }
        let expected = order(&t);
        let mut unique = expected.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), expected.len());

        t.players.shuffle(&mut rng);
        assert_eq!(order(&t), expected);

        let ranked = rank_players(&t);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.win_ratio >= b.win_ratio);
            if a.win_ratio == b.win_ratio {
                assert!(a.stats.games_won >= b.stats.games_won);
            }
        }
    }
}

#[test]
fn names_collate_in_dictionary_order() {
    assert_eq!(collate("ala", "Ala"), Ordering::Less);
    assert_eq!(collate("Ala", "bartek"), Ordering::Less);
    assert_eq!(collate("Lena", "Łukasz"), Ordering::Less);
    assert_eq!(collate("Łukasz", "Mateusz"), Ordering::Less);
    assert_eq!(collate("Źdźbło", "Żaneta"), Ordering::Less);
    assert_eq!(collate("Ola", "Ola"), Ordering::Equal);
}

#[test]
fn standings_export_as_csv() {
    let t = tournament_with(&[("Zenon", 5, 6), ("Ala", 4, 6)]);
    let mut out = Vec::new();
    write_standings_csv(&rank_players(&t), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "rank,name,matches,games_won,games_total,win_pct");
    assert_eq!(lines[1], "1,Zenon,0,5,6,83.3");
    assert_eq!(lines[2], "2,Ala,0,4,6,66.7");
    assert_eq!(lines.len(), 3);
}
