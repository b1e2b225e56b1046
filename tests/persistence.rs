//! Integration tests for saving and restoring the club.

use chrono::{TimeZone, Utc};
use cue_league_web::persistence::{decode, encode_at, write_snapshot, SNAPSHOT_VERSION};
use cue_league_web::{
    generate_playoff, reorder_tied_player, start_tournament_with_rng, submit_playoff_score, submit_score, Club,
    Direction, MatchId, Participant, Side, Stage, TournamentConfig, TournamentState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn busy_club() -> Club {
    let mut club = Club::new();
    for name in ["Ala", "Bartek", "Celina", "Dawid", "Ewa", "Filip", "Gosia", "Henryk", "Iza"] {
        club.add_player(name).unwrap();
        club.toggle_player(name).unwrap();
    }
    club.tournament.set_table_count(4).unwrap();
    club.tournament.set_table_number(0, 7).unwrap();
    let config = TournamentConfig {
        rounds: 4,
        win_threshold: 2,
    };
    start_tournament_with_rng(&mut club, config, &mut StdRng::seed_from_u64(31)).unwrap();

    let seated: Vec<MatchId> = club
        .tournament
        .fixtures
        .iter()
        .filter(|m| m.table.is_some())
        .map(|m| m.id)
        .collect();
    submit_score(&mut club.tournament, seated[0], Side::One, 2).unwrap();
    submit_score(&mut club.tournament, seated[1], Side::Two, 2).unwrap();
    submit_score(&mut club.tournament, seated[2], Side::One, 1).unwrap();

    let tied = cue_league_web::rank_players(&club.tournament)
        .into_iter()
        .find(|e| e.tied)
        .map(|e| e.name)
        .unwrap();
    reorder_tied_player(&mut club.tournament, &tied, Direction::Down).unwrap();

    generate_playoff(&mut club).unwrap();
    submit_playoff_score(&mut club, Stage::PlayIn, 3, Side::One, Some(2)).unwrap();
    club
}

#[test]
fn save_and_restore_round_trips() {
    let club = busy_club();
    let saved_at = Utc.with_ymd_and_hms(2026, 5, 1, 18, 30, 0).unwrap();
    let text = encode_at(&club, saved_at).unwrap();

    let snapshot = decode(&text);
    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert_eq!(snapshot.saved_at, Some(saved_at));
    assert_eq!(snapshot.club.tournament.fixtures, club.tournament.fixtures);
    assert_eq!(snapshot.club.tournament.stats, club.tournament.stats);
    assert_eq!(snapshot.club.tournament.manual_order, club.tournament.manual_order);
    assert_eq!(snapshot.club.tournament.scheduler, club.tournament.scheduler);
    assert_eq!(snapshot.club.playoff, club.playoff);
    assert_eq!(snapshot.club, club);
}

#[test]
fn unreadable_state_starts_fresh() {
    for text in ["", "not json", "[1, 2, 3]", "42", "null"] {
        let snapshot = decode(text);
        assert!(snapshot.club.roster.is_empty(), "input {text:?}");
        assert_eq!(snapshot.club.tournament.state, TournamentState::Setup);
        assert!(snapshot.club.playoff.is_none());
        assert_eq!(snapshot.saved_at, None);
    }
}

#[test]
fn broken_fields_fall_back_one_by_one() {
    let text = r#"{
        "roster": ["Ala", "Ola"],
        "tournament": {
            "players": ["Ala", "Ola"],
            "rounds": "many",
            "win_threshold": 5,
            "fixtures": [
                {"id": 1, "round": 1, "sequence_index": 0,
                 "participant_1": {"player": "Ala"}, "participant_2": {"player": "Ola"}},
                {"id": "broken"}
            ],
            "stats": {"Ala": {"games_won": 1, "games_total": 2}, "Ola": "oops"}
        },
        "playoff": {"play_in": []}
    }"#;
    let club = decode(text).club;
    assert_eq!(club.roster, vec!["Ala", "Ola"]);
    assert_eq!(club.tournament.rounds, 3);
    assert_eq!(club.tournament.win_threshold, 5);
    assert_eq!(club.tournament.fixtures.len(), 1);
    assert_eq!(club.tournament.stats.len(), 1);
    assert_eq!(club.tournament.stats["Ala"].games_won, 1);
    assert_eq!(club.tournament.next_match_id, 2);
    assert_eq!(club.tournament.used_pairs.len(), 1);
    assert!(club.playoff.is_none());
}

#[test]
fn older_saves_are_migrated() {
    let text = r#"{
        "playerPool": ["Ala", "Ola", "Ewa"],
        "tournament": {
            "players": ["Ala", "Ola", "Ewa"],
            "rounds": 3,
            "gameType": 3,
            "isActive": true,
            "allMatches": [
                {"id": 1, "round": 1, "globalIndex": 0, "player1": "Ala", "player2": "Ola",
                 "score1": 3, "score2": 1, "completed": true},
                {"id": 2, "round": 1, "globalIndex": 1, "player1": "Ewa", "player2": null,
                 "completed": true, "isBye": false},
                {"id": 3, "round": 2, "globalIndex": 2, "player1": "Ala", "player2": "Ewa",
                 "score1": 1, "score2": 0, "completed": false, "table": 2},
                {"id": 4, "round": 2, "globalIndex": 3, "player1": "bye", "player2": "Ola",
                 "completed": true}
            ],
            "playerStats": {
                "Ala": {"matches": 1, "wonGames": 4, "totalGames": 5, "byes": 0},
                "Ewa": {"matches": 0, "wonGames": 0, "totalGames": 1, "byes": 1}
            },
            "manualOrder": {"Ala": 1},
            "tableCount": 3,
            "tables": [2, 4, 6],
            "tableScheduler": {"free": [4, 6], "busy": {"2": 3}},
            "nextMatchId": 2
        }
    }"#;
    let club = decode(text).club;
    let t = &club.tournament;

    assert_eq!(club.roster, vec!["Ala", "Ola", "Ewa"]);
    assert!(t.is_active());
    assert_eq!(t.win_threshold, 3);
    assert_eq!(t.tables.numbers(), &[2, 4, 6]);

    assert_eq!(t.fixtures[0].participant_1, Participant::player("Ala"));
    assert_eq!((t.fixtures[0].score_1, t.fixtures[0].score_2), (3, 1));
    assert_eq!(t.fixtures[0].table, None);
    assert_eq!(t.fixtures[1].participant_2, Participant::Bye);
    assert!(t.fixtures[1].is_bye);
    assert_eq!(t.fixtures[1].pair_key, None);
    assert_eq!(t.fixtures[3].participant_1, Participant::Bye);
    assert_eq!(t.fixtures[2].sequence_index, 2);
    assert_eq!(t.fixtures[2].table, Some(2));

    assert_eq!(t.scheduler.free, vec![4, 6]);
    assert_eq!(t.scheduler.busy.get(&2), Some(&MatchId(3)));
    assert_eq!(t.used_pairs.len(), 2);
    assert_eq!(t.next_match_id, 5);

    let ala = &t.stats["Ala"];
    assert_eq!((ala.matches_completed, ala.games_won, ala.games_total), (1, 4, 5));
    assert_eq!(t.stats["Ewa"].bye_count, 1);
    assert_eq!(t.manual_order.get("Ala"), Some(&1));
}

#[test]
fn stale_table_assignments_are_dropped() {
    let text = r#"{
        "roster": ["Ala", "Ola", "Ewa", "Iza"],
        "tournament": {
            "players": ["Ala", "Ola", "Ewa", "Iza"],
            "state": "active",
            "fixtures": [
                {"id": 1, "round": 1, "sequence_index": 0,
                 "participant_1": {"player": "Ala"}, "participant_2": {"player": "Ola"},
                 "completed": true, "table": 1},
                {"id": 2, "round": 1, "sequence_index": 1,
                 "participant_1": {"player": "Ewa"}, "participant_2": {"player": "Iza"},
                 "table": 9}
            ]
        }
    }"#;
    let t = decode(text).club.tournament;
    assert_eq!(t.fixtures[0].table, None);
    assert_eq!(t.fixtures[1].table, None);
    assert!(t.scheduler.busy.is_empty());
    assert_eq!(t.scheduler.free, vec![1, 2, 3]);
}

#[test]
fn saved_bracket_fields_fall_back_one_by_one() {
    let club = busy_club();
    let text = encode_at(&club, Utc::now()).unwrap();
    let mut saved: serde_json::Value = serde_json::from_str(&text).unwrap();
    let playoff = saved["playoff"].as_object_mut().unwrap();
    playoff.remove("scheduler");
    playoff.insert("win_threshold".into(), "two".into());

    let restored = decode(&saved.to_string()).club;
    assert_eq!(restored.playoff, club.playoff);

    saved["playoff"].as_object_mut().unwrap().remove("semifinals");
    let restored = decode(&saved.to_string()).club;
    assert!(restored.playoff.is_none());
    assert_eq!(restored.tournament.fixtures, club.tournament.fixtures);
}

#[test]
fn largest_fixture_id_does_not_overflow_the_next_id() {
    let text = r#"{
        "tournament": {
            "players": ["Ala", "Ola"],
            "fixtures": [
                {"id": 4294967295, "round": 1, "sequence_index": 0,
                 "participant_1": {"player": "Ala"}, "participant_2": {"player": "Ola"}}
            ]
        }
    }"#;
    let t = decode(text).club.tournament;
    assert_eq!(t.fixtures.len(), 1);
    assert_eq!(t.next_match_id, u32::MAX);
}

#[tokio::test]
async fn saving_replaces_the_previous_file() {
    let dir = std::env::temp_dir().join(format!("cue-league-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("tournament.json");
    tokio::fs::write(&path, r#"{"roster": ["Old"]}"#).await.unwrap();

    let club = busy_club();
    let text = encode_at(&club, Utc::now()).unwrap();
    write_snapshot(&path, &text).await.unwrap();

    let saved = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(decode(&saved).club, club);
    assert!(!dir.join("tournament.json.tmp").exists());
    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
