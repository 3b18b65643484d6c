//! Bracket progression: record results, resolve byes, derive next-round and consolation
//! matches, advance the round pointer.

use crate::logic::duplicate_guard::has_existing_match;
use crate::logic::score::set_tally;
use crate::models::{
    ConsolationTag, GameMatch, GameRecord, MatchId, MatchStatus, ParticipantId, Slot, Tournament,
    TournamentError, TournamentFormat, TournamentStatus,
};
use chrono::Utc;
use serde::Serialize;
use std::cmp::Ordering;

/// What a rebuild changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Progress {
    /// Matches appended by this rebuild, in creation order.
    pub new_matches: Vec<MatchId>,
    pub byes_resolved: usize,
    /// True once no pending match remains.
    pub finished: bool,
}

/// Record the result of a pending, non-bye match.
///
/// `score` is stored as given, read from slot 1's side. When it parses and one side took
/// more sets, that side must be `winner`. Level or free-form scores are not checked.
/// Appends a [`GameRecord`] to the tournament's game history.
pub fn record_result(
    tournament: &mut Tournament,
    match_id: &MatchId,
    winner: &str,
    score: &str,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Started {
        return Err(TournamentError::InvalidState);
    }
    let idx = tournament
        .matches
        .iter()
        .position(|m| &m.id == match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.clone()))?;

    let m = &tournament.matches[idx];
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(match_id.clone()));
    }
    if m.is_bye {
        return Err(TournamentError::InvalidState);
    }
    let (side_a, side_b) = m
        .players()
        .map(|(a, b)| (a.clone(), b.clone()))
        .ok_or_else(|| TournamentError::MatchNotReady(match_id.clone()))?;
    if winner != side_a && winner != side_b {
        return Err(TournamentError::InvalidWinner {
            match_id: match_id.clone(),
            winner: winner.to_string(),
        });
    }
    if let Ok(tally) = set_tally(score) {
        let leader = match tally.side_1.cmp(&tally.side_2) {
            Ordering::Greater => Some(&side_a),
            Ordering::Less => Some(&side_b),
            Ordering::Equal => None,
        };
        if leader.is_some_and(|l| l.as_str() != winner) {
            return Err(TournamentError::InvalidScore {
                match_id: match_id.clone(),
                winner: winner.to_string(),
                score: score.to_string(),
            });
        }
    }
    if has_existing_match(&tournament.games, tournament.id, &side_a, &side_b) {
        return Err(TournamentError::DuplicateMatch {
            a: side_a,
            b: side_b,
        });
    }

    let now = Utc::now();
    let m = &mut tournament.matches[idx];
    m.status = MatchStatus::Completed;
    m.winner = Some(winner.to_string());
    m.score = Some(score.to_string());
    m.completed_at = Some(now);

    tournament.games.push(GameRecord {
        tournament_id: tournament.id,
        side_a,
        side_b,
        winner: winner.to_string(),
        score: score.to_string(),
        played_at: now,
    });
    log::info!(
        "Tournament {}: match {} won by {} ({})",
        tournament.id,
        match_id,
        winner,
        score
    );
    Ok(())
}

/// The match list after resolving byes and, for elimination brackets, filling the next
/// rounds and consolation games. Existing data is only ever completed or filled in.
pub fn derive_next_matches(format: TournamentFormat, matches: &[GameMatch]) -> Vec<GameMatch> {
    let mut next = matches.to_vec();
    let resolved = resolve_byes(&mut next);
    if resolved > 0 {
        log::debug!("Resolved {} bye matches", resolved);
    }
    if format == TournamentFormat::SingleElimination {
        extend_elimination(&mut next);
    }
    next
}

/// Apply [`derive_next_matches`] to the tournament and mark it finished when nothing is
/// left to play. Safe to call any number of times; a finished tournament is left as is.
pub fn rebuild_next_round(tournament: &mut Tournament) -> Progress {
    if tournament.status == TournamentStatus::Finished {
        return Progress {
            finished: true,
            ..Progress::default()
        };
    }

    let next = derive_next_matches(tournament.format, &tournament.matches);
    let byes_resolved = tournament
        .matches
        .iter()
        .filter(|m| m.is_bye && m.is_pending())
        .filter(|m| next.iter().any(|n| n.id == m.id && n.is_completed()))
        .count();
    let new_matches: Vec<MatchId> = next[tournament.matches.len()..]
        .iter()
        .map(|m| m.id.clone())
        .collect();
    tournament.matches = next;

    for id in &new_matches {
        log::debug!("Tournament {}: created match {}", tournament.id, id);
    }

    let finished = tournament.status == TournamentStatus::Started
        && !tournament.matches.iter().any(GameMatch::is_pending);
    if finished {
        tournament.status = TournamentStatus::Finished;
        log::info!("Tournament {} finished", tournament.id);
    }

    Progress {
        new_matches,
        byes_resolved,
        finished,
    }
}

/// Move the round pointer on when every match of the current round is completed.
pub fn advance_round(tournament: &mut Tournament) -> bool {
    let mut current = tournament
        .matches
        .iter()
        .filter(|m| m.round == tournament.current_round)
        .peekable();
    if current.peek().is_none() || current.any(GameMatch::is_pending) {
        return false;
    }
    tournament.current_round += 1;
    log::info!(
        "Tournament {}: advanced to round {}",
        tournament.id,
        tournament.current_round
    );
    true
}

/// Record a result and bring the bracket up to date in one step.
///
/// Callers hold the tournament's lock around this so that matches created by the rebuild
/// exist before the next result for the same tournament is accepted.
pub fn submit_result(
    tournament: &mut Tournament,
    match_id: &MatchId,
    winner: &str,
    score: &str,
) -> Result<Progress, TournamentError> {
    record_result(tournament, match_id, winner, score)?;
    let progress = rebuild_next_round(tournament);
    while advance_round(tournament) {}
    Ok(progress)
}

/// Complete every pending bye with its single real participant as winner.
fn resolve_byes(matches: &mut [GameMatch]) -> usize {
    let mut resolved = 0;
    for m in matches.iter_mut().filter(|m| m.is_bye && m.is_pending()) {
        if let Some(id) = m.bye_participant().cloned() {
            m.status = MatchStatus::Completed;
            m.winner = Some(id);
            resolved += 1;
        }
    }
    resolved
}

/// Main-bracket matches of one round, by match number.
fn main_round(matches: &[GameMatch], round: u32) -> Vec<GameMatch> {
    let mut main: Vec<GameMatch> = matches
        .iter()
        .filter(|m| m.round == round && !m.is_consolation())
        .cloned()
        .collect();
    main.sort_by_key(|m| m.match_number);
    main
}

/// Push `m` unless a match with the same id exists. Returns true if pushed.
fn ensure_match(matches: &mut Vec<GameMatch>, m: GameMatch) -> bool {
    if matches.iter().any(|existing| existing.id == m.id) {
        return false;
    }
    matches.push(m);
    true
}

/// Send winners forward round by round, spawning consolation games along the way.
///
/// Winner of match `k` in round `r` goes to round `r+1`, match `k/2`, slot `k%2`. Only
/// empty slots are filled.
fn extend_elimination(matches: &mut Vec<GameMatch>) {
    let mut round = 0;
    loop {
        let main = main_round(matches, round);
        if main.len() < 2 {
            break;
        }
        for m in main.iter().filter(|m| m.is_completed()) {
            let Some(winner) = m.winner.clone() else {
                continue;
            };
            let target = MatchId::bracket(round + 1, m.match_number / 2);
            let slot_index = m.match_number % 2;
            match matches.iter_mut().find(|n| n.id == target) {
                Some(existing) => {
                    let slot = existing.slot_mut(slot_index);
                    if slot.is_empty() {
                        *slot = Slot::Player(winner);
                    }
                }
                None => {
                    let (slot_1, slot_2) = if slot_index == 0 {
                        (Slot::Player(winner), Slot::Empty)
                    } else {
                        (Slot::Empty, Slot::Player(winner))
                    };
                    matches.push(GameMatch::new(
                        round + 1,
                        m.match_number / 2,
                        slot_1,
                        slot_2,
                    ));
                }
            }
        }
        spawn_consolation(matches, round, &main);
        round += 1;
    }
}

/// 3-4 after a completed semifinal round; 5-8 semis after a completed quarterfinal round,
/// then 5-6 and 7-8 once both 5-8 semis are done. Rounds with byes lack the losers and
/// spawn nothing.
fn spawn_consolation(matches: &mut Vec<GameMatch>, round: u32, main: &[GameMatch]) {
    if !main.iter().all(GameMatch::is_completed) {
        return;
    }
    let losers: Vec<ParticipantId> = main.iter().filter_map(|m| m.loser().cloned()).collect();
    match (main.len(), losers.as_slice()) {
        (2, [a, b]) => {
            ensure_match(
                matches,
                GameMatch::consolation(ConsolationTag::ThirdPlace, round + 1, 0, a.clone(), b.clone()),
            );
        }
        (4, [a, b, c, d]) => {
            let semis = [(a, b), (c, d)];
            for (number, (x, y)) in semis.into_iter().enumerate() {
                ensure_match(
                    matches,
                    GameMatch::consolation(
                        ConsolationTag::FifthToEighth,
                        round + 1,
                        number as u32,
                        x.clone(),
                        y.clone(),
                    ),
                );
            }
            spawn_fifth_place_games(matches, round + 2);
        }
        _ => {}
    }
}

fn spawn_fifth_place_games(matches: &mut Vec<GameMatch>, round: u32) {
    let semis: Vec<&GameMatch> = (0..2)
        .filter_map(|number| {
            let id = MatchId::consolation(ConsolationTag::FifthToEighth, number);
            matches.iter().find(|m| m.id == id)
        })
        .collect();
    if semis.len() != 2 || !semis.iter().all(|m| m.is_completed()) {
        return;
    }
    let winners: Vec<ParticipantId> = semis.iter().filter_map(|m| m.winner.clone()).collect();
    let losers: Vec<ParticipantId> = semis.iter().filter_map(|m| m.loser().cloned()).collect();
    if let [a, b] = winners.as_slice() {
        let game = GameMatch::consolation(ConsolationTag::FifthPlace, round, 0, a.clone(), b.clone());
        ensure_match(matches, game);
    }
    if let [a, b] = losers.as_slice() {
        let game =
            GameMatch::consolation(ConsolationTag::SeventhPlace, round, 0, a.clone(), b.clone());
        ensure_match(matches, game);
    }
}
