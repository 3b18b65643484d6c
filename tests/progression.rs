//! Integration tests for bracket progression: byes, next rounds, consolation games, errors.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tournament_brackets::{
    advance_round, compute_standings, derive_next_matches, rebuild_next_round, record_result,
    round_robin_table, start_tournament, submit_result, ConsolationTag, GameMatch, MatchId, Participant, Slot,
    Tournament, TournamentError, TournamentFormat, TournamentStatus,
};

/// Started tournament with participants p0..p{n-1}, drawn in roster order.
fn started(format: TournamentFormat, n: usize) -> Tournament {
    let participants: Vec<Participant> = (0..n)
        .map(|i| Participant::new(format!("p{i}"), format!("P{i}")))
        .collect();
    let mut t = Tournament::with_participants("Open", format, participants);
    t.set_min_participants(2).unwrap();
    t.set_seeding((0..n).map(|i| format!("p{i}")).collect()).unwrap();
    start_tournament(&mut t, &mut StdRng::seed_from_u64(0)).unwrap();
    t
}

fn id(s: &str) -> MatchId {
    MatchId::from(s)
}

/// Slot 1 wins `match_id` 6:3, 6:4.
fn slot_one_wins(t: &mut Tournament, match_id: &str) {
    let m = t.find_match(&id(match_id)).unwrap();
    let winner = m.slot_1.participant().unwrap().clone();
    submit_result(t, &id(match_id), &winner, "6:3, 6:4").unwrap();
}

/// Play every playable match with slot 1 winning until nothing is left.
fn play_out(t: &mut Tournament) {
    loop {
        let next = t
            .matches
            .iter()
            .find(|m| m.is_pending() && !m.is_bye && m.players().is_some())
            .map(|m| m.id.to_string());
        match next {
            Some(match_id) => slot_one_wins(t, &match_id),
            None => break,
        }
    }
}

fn players(m: &GameMatch) -> (String, String) {
    let (a, b) = m.players().unwrap();
    (a.clone(), b.clone())
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

#[test]
fn byes_resolve_at_start() {
    let t = started(TournamentFormat::SingleElimination, 5);
    assert!(t.matches.iter().filter(|m| m.is_bye).all(|m| m.is_completed()));
    assert_eq!(t.find_match(&id("r0-m1")).unwrap().winner.as_deref(), Some("p2"));
    assert!(t.find_match(&id("r0-m1")).unwrap().completed_at.is_none());

    // Winners of byes already wait in round 1.
    let semi_0 = t.find_match(&id("r1-m0")).unwrap();
    assert_eq!(semi_0.slot_1, Slot::Empty);
    assert_eq!(semi_0.slot_2, Slot::Player("p2".to_string()));
    assert_eq!(players(t.find_match(&id("r1-m1")).unwrap()), pair("p3", "p4"));
    assert_eq!(t.current_round, 0);
    assert_eq!(t.status, TournamentStatus::Started);
}

#[test]
fn rebuild_resolves_fresh_byes() {
    let mut t = started(TournamentFormat::SingleElimination, 3);
    t.matches.push(GameMatch::new(
        7,
        0,
        Slot::Bye,
        Slot::Player("p2".to_string()),
    ));
    let progress = rebuild_next_round(&mut t);
    assert_eq!(progress.byes_resolved, 1);
    assert!(t.matches.iter().filter(|m| m.is_bye).all(|m| m.is_completed()));
}

#[test]
fn rebuild_is_idempotent() {
    let mut t = started(TournamentFormat::SingleElimination, 6);
    slot_one_wins(&mut t, "r0-m0");

    let before = t.matches.clone();
    let progress = rebuild_next_round(&mut t);
    assert!(progress.new_matches.is_empty());
    assert_eq!(t.matches, before);
    rebuild_next_round(&mut t);
    assert_eq!(t.matches, before);

    let once = derive_next_matches(t.format, &t.matches);
    let twice = derive_next_matches(t.format, &once);
    assert_eq!(once, twice);
}

#[test]
fn record_result_errors() {
    let mut pending = Tournament::new("Open", TournamentFormat::SingleElimination);
    assert_eq!(
        record_result(&mut pending, &id("r0-m0"), "p0", "6:0"),
        Err(TournamentError::InvalidState)
    );

    let mut t = started(TournamentFormat::SingleElimination, 5);
    assert_eq!(
        record_result(&mut t, &id("r9-m9"), "p0", "6:0"),
        Err(TournamentError::MatchNotFound(id("r9-m9")))
    );
    assert_eq!(
        record_result(&mut t, &id("r0-m0"), "p4", "6:0"),
        Err(TournamentError::InvalidWinner {
            match_id: id("r0-m0"),
            winner: "p4".to_string()
        })
    );
    assert_eq!(
        record_result(&mut t, &id("r0-m1"), "p2", "6:0"),
        Err(TournamentError::MatchAlreadyCompleted(id("r0-m1")))
    );
    assert_eq!(
        record_result(&mut t, &id("r1-m0"), "p2", "6:0"),
        Err(TournamentError::MatchNotReady(id("r1-m0")))
    );

    record_result(&mut t, &id("r0-m0"), "p1", "3:6, 2:6").unwrap();
    let m = t.find_match(&id("r0-m0")).unwrap();
    assert!(m.is_completed());
    assert_eq!(m.winner.as_deref(), Some("p1"));
    assert_eq!(m.score.as_deref(), Some("3:6, 2:6"));
    assert!(m.completed_at.is_some());
    assert_eq!(t.games.len(), 1);
    assert_eq!(t.games[0].winner, "p1");
}

#[test]
fn score_must_agree_with_winner() {
    let mut t = started(TournamentFormat::RoundRobin, 4);
    // Round 0 pairs p0 (slot 1) with p3; the score is read from p0's side.
    assert_eq!(
        record_result(&mut t, &id("r0-m0"), "p3", "6:2, 6:4"),
        Err(TournamentError::InvalidScore {
            match_id: id("r0-m0"),
            winner: "p3".to_string(),
            score: "6:2, 6:4".to_string()
        })
    );
    assert!(t.find_match(&id("r0-m0")).unwrap().is_pending());
    assert!(t.games.is_empty());

    record_result(&mut t, &id("r0-m0"), "p3", "2:6, 4:6").unwrap();
    let table = round_robin_table(&t);
    let row = |who: &str| table.iter().find(|r| r.participant_id == who).unwrap().clone();
    assert_eq!((row("p3").wins, row("p3").points), (1, 3));
    assert_eq!((row("p0").losses, row("p0").points), (1, 0));

    // Level and free-form scores leave the winner to the caller.
    record_result(&mut t, &id("r0-m1"), "p2", "6:4, 4:6").unwrap();
    record_result(&mut t, &id("r1-m0"), "p0", "w/o").unwrap();
}

#[test]
fn results_out_of_order_keep_bracket_positions() {
    let mut t = started(TournamentFormat::SingleElimination, 8);
    slot_one_wins(&mut t, "r0-m3");
    slot_one_wins(&mut t, "r0-m1");

    let semi_0 = t.find_match(&id("r1-m0")).unwrap();
    assert_eq!(semi_0.slot_1, Slot::Empty);
    assert_eq!(semi_0.slot_2, Slot::Player("p2".to_string()));
    let semi_1 = t.find_match(&id("r1-m1")).unwrap();
    assert_eq!(semi_1.slot_1, Slot::Empty);
    assert_eq!(semi_1.slot_2, Slot::Player("p6".to_string()));

    slot_one_wins(&mut t, "r0-m0");
    assert_eq!(players(t.find_match(&id("r1-m0")).unwrap()), pair("p0", "p2"));
    assert_eq!(t.current_round, 0);
}

#[test]
fn four_player_semifinals_spawn_third_place_game() {
    let mut t = started(TournamentFormat::SingleElimination, 4);
    slot_one_wins(&mut t, "r0-m0");
    assert!(t.matches.iter().all(|m| !m.is_consolation()));
    slot_one_wins(&mut t, "r0-m1");

    let third: Vec<&GameMatch> = t
        .matches
        .iter()
        .filter(|m| m.consolation == Some(ConsolationTag::ThirdPlace))
        .collect();
    assert_eq!(third.len(), 1);
    assert_eq!(players(third[0]), pair("p1", "p3"));
    assert_eq!(third[0].round, 1);
    assert_eq!(third[0].id.as_str(), "c3-4-m0");
    assert_eq!(players(t.find_match(&id("r1-m0")).unwrap()), pair("p0", "p2"));
    assert_eq!(t.current_round, 1);

    assert_eq!(
        compute_standings(&t),
        Err(TournamentError::IncompleteTournament { pending: 2 })
    );

    slot_one_wins(&mut t, "r1-m0");
    assert_eq!(
        compute_standings(&t),
        Err(TournamentError::IncompleteTournament { pending: 1 })
    );
    assert_eq!(t.status, TournamentStatus::Started);
    slot_one_wins(&mut t, "c3-4-m0");
    assert_eq!(t.status, TournamentStatus::Finished);
    assert_eq!(
        t.matches.iter().filter(|m| m.is_consolation()).count(),
        1,
        "rebuilds never duplicate the 3-4 game"
    );
}

#[test]
fn eight_players_get_fifth_to_eighth_games() {
    let mut t = started(TournamentFormat::SingleElimination, 8);
    for m in ["r0-m0", "r0-m1", "r0-m2"] {
        slot_one_wins(&mut t, m);
    }
    assert!(t.matches.iter().all(|m| !m.is_consolation()));
    slot_one_wins(&mut t, "r0-m3");

    assert_eq!(
        players(t.find_match(&MatchId::consolation(ConsolationTag::FifthToEighth, 0)).unwrap()),
        pair("p1", "p3")
    );
    assert_eq!(
        players(t.find_match(&MatchId::consolation(ConsolationTag::FifthToEighth, 1)).unwrap()),
        pair("p5", "p7")
    );

    slot_one_wins(&mut t, "c5-8-m0");
    assert!(t.find_match(&id("c5-6-m0")).is_none());
    slot_one_wins(&mut t, "c5-8-m1");

    let fifth = t.find_match(&id("c5-6-m0")).unwrap();
    assert_eq!(players(fifth), pair("p1", "p5"));
    assert_eq!(fifth.round, 2);
    assert_eq!(players(t.find_match(&id("c7-8-m0")).unwrap()), pair("p3", "p7"));
    assert_eq!(t.current_round, 1, "semifinals still open");

    play_out(&mut t);
    assert_eq!(t.status, TournamentStatus::Finished);
    assert_eq!(t.current_round, 3);
    assert_eq!(t.matches.len(), 4 + 2 + 2 + 1 + 1 + 1 + 1);
}

#[test]
fn byes_in_quarterfinals_skip_fifth_place_games() {
    let mut t = started(TournamentFormat::SingleElimination, 6);
    play_out(&mut t);
    assert_eq!(t.status, TournamentStatus::Finished);
    assert!(t
        .matches
        .iter()
        .filter_map(|m| m.consolation)
        .all(|tag| tag == ConsolationTag::ThirdPlace));
}

#[test]
fn no_pair_plays_twice() {
    for format in [TournamentFormat::SingleElimination, TournamentFormat::RoundRobin] {
        for n in 2..=17 {
            let mut t = started(format, n);
            play_out(&mut t);
            assert_eq!(t.status, TournamentStatus::Finished, "{format:?} {n}");

            let mut pairs = HashSet::new();
            for m in t.matches.iter().filter(|m| m.is_completed() && !m.is_bye) {
                let (a, b) = players(m);
                let key = if a < b { (a, b) } else { (b, a) };
                assert!(pairs.insert(key), "{format:?} {n}: repeated pair");
            }
        }
    }
}

#[test]
fn finished_tournament_is_left_alone() {
    let mut t = started(TournamentFormat::SingleElimination, 4);
    play_out(&mut t);
    let snapshot = t.matches.clone();
    let progress = rebuild_next_round(&mut t);
    assert!(progress.finished);
    assert!(progress.new_matches.is_empty());
    assert_eq!(t.matches, snapshot);
    assert_eq!(
        record_result(&mut t, &id("r1-m0"), "p0", "6:0"),
        Err(TournamentError::InvalidState)
    );
}

#[test]
fn advance_round_waits_for_whole_round() {
    let mut t = started(TournamentFormat::RoundRobin, 4);
    assert_eq!(t.current_round, 0);
    assert!(!advance_round(&mut t));

    slot_one_wins(&mut t, "r0-m1");
    assert_eq!(t.current_round, 0);
    // A later round finishing first does not move the pointer.
    slot_one_wins(&mut t, "r2-m0");
    assert_eq!(t.current_round, 0);

    slot_one_wins(&mut t, "r0-m0");
    assert_eq!(t.current_round, 1);
    assert!(!advance_round(&mut t));
}

#[test]
fn round_robin_never_creates_matches() {
    let mut t = started(TournamentFormat::RoundRobin, 5);
    assert_eq!(t.matches.len(), 10);
    let first = t.matches[0].id.to_string();
    slot_one_wins(&mut t, &first);
    let progress = rebuild_next_round(&mut t);
    assert!(progress.new_matches.is_empty());
    assert_eq!(t.matches.len(), 10);
}

#[test]
fn submit_reports_new_matches() {
    let mut t = started(TournamentFormat::SingleElimination, 4);
    let progress = submit_result(&mut t, &id("r0-m0"), "p0", "6:1, 6:1").unwrap();
    assert_eq!(progress.new_matches, vec![id("r1-m0")]);
    let progress = submit_result(&mut t, &id("r0-m1"), "p3", "1:6, 1:6").unwrap();
    assert_eq!(progress.new_matches, vec![id("c3-4-m0")]);
    assert!(!progress.finished);
}
