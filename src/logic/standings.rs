//! Standings: round-robin table with head-to-head tie-break, elimination placements.

use crate::logic::score::{set_tally, SetTally};
use crate::models::{
    GameMatch, ParticipantId, Tournament, TournamentError, TournamentFormat, TournamentStatus,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;

const POINTS_WIN: u32 = 3;
const POINTS_DRAW: u32 = 1;

/// Final place: exact, or a range for the middle of an elimination bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaceLabel {
    Exact { place: u32 },
    Range { from: u32, to: u32 },
}

impl PlaceLabel {
    /// Best place covered by the label.
    pub fn best(self) -> u32 {
        match self {
            PlaceLabel::Exact { place } => place,
            PlaceLabel::Range { from, .. } => from,
        }
    }
}

impl fmt::Display for PlaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceLabel::Exact { place } => write!(f, "{} место", place),
            PlaceLabel::Range { from, to } => write!(f, "{}-{} место", from, to),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Placement {
    pub participant_id: ParticipantId,
    pub name: String,
    pub place: PlaceLabel,
}

/// One line of the round-robin table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StandingRow {
    pub participant_id: ParticipantId,
    pub name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub points: u32,
    /// Set differential against participants on the same points.
    pub head_to_head: i32,
}

impl StandingRow {
    pub fn set_difference(&self) -> i32 {
        self.sets_won as i32 - self.sets_lost as i32
    }
}

/// Sets won per side of a completed match. Unparsable scores count 1:0 for the winner.
fn match_tally(m: &GameMatch) -> SetTally {
    let parsed = m.score.as_deref().map(set_tally);
    match parsed {
        Some(Ok(tally)) => tally,
        other => {
            if let Some(Err(e)) = other {
                log::warn!("Match {}: {}; counting the recorded winner only", m.id, e);
            }
            let slot_1_won = m.winner.as_ref() == m.slot_1.participant();
            if slot_1_won {
                SetTally { side_1: 1, side_2: 0 }
            } else {
                SetTally { side_1: 0, side_2: 1 }
            }
        }
    }
}

/// Completed non-bye games with both players known: (slot 1, slot 2, tally).
fn played_games(tournament: &Tournament) -> Vec<(&ParticipantId, &ParticipantId, SetTally)> {
    tournament
        .matches
        .iter()
        .filter(|m| m.is_completed() && !m.is_bye)
        .filter_map(|m| m.players().map(|(a, b)| (a, b, match_tally(m))))
        .collect()
}

/// Roster in seeding order when one was set; unseeded participants follow.
fn ranked_roster(tournament: &Tournament) -> Vec<(&ParticipantId, &str)> {
    let seeding = tournament.seeding.as_deref().unwrap_or_default();
    let mut roster: Vec<_> = seeding
        .iter()
        .filter_map(|id| tournament.participant(id))
        .collect();
    for p in &tournament.participants {
        if !seeding.contains(&p.id) {
            roster.push(p);
        }
    }
    roster.into_iter().map(|p| (&p.id, p.name.as_str())).collect()
}

/// Live round-robin table, best first.
///
/// Sort keys: points; head-to-head set differential within the group on equal points;
/// overall set differential; sets won; roster order.
pub fn round_robin_table(tournament: &Tournament) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = ranked_roster(tournament)
        .into_iter()
        .map(|(id, name)| StandingRow {
            participant_id: id.clone(),
            name: name.to_string(),
            ..StandingRow::default()
        })
        .collect();
    let index: HashMap<ParticipantId, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.participant_id.clone(), i))
        .collect();

    let games = played_games(tournament);
    for (a, b, tally) in &games {
        let (Some(&ia), Some(&ib)) = (index.get(*a), index.get(*b)) else {
            continue;
        };
        apply_game(&mut rows[ia], *tally);
        apply_game(&mut rows[ib], tally.flipped());
    }
    for row in &mut rows {
        row.points = row.wins * POINTS_WIN + row.draws * POINTS_DRAW;
    }

    let points: HashMap<&ParticipantId, u32> =
        rows.iter().map(|r| (&r.participant_id, r.points)).collect();
    let mut head_to_head: HashMap<ParticipantId, i32> = HashMap::new();
    for (a, b, tally) in &games {
        if points.get(a).is_some() && points.get(a) == points.get(b) {
            let diff = tally.side_1 as i32 - tally.side_2 as i32;
            *head_to_head.entry((*a).clone()).or_default() += diff;
            *head_to_head.entry((*b).clone()).or_default() -= diff;
        }
    }
    for row in &mut rows {
        row.head_to_head = head_to_head.get(&row.participant_id).copied().unwrap_or(0);
    }

    rows.sort_by(|x, y| {
        y.points
            .cmp(&x.points)
            .then(y.head_to_head.cmp(&x.head_to_head))
            .then(y.set_difference().cmp(&x.set_difference()))
            .then(y.sets_won.cmp(&x.sets_won))
    });
    rows
}

fn apply_game(row: &mut StandingRow, tally: SetTally) {
    row.played += 1;
    row.sets_won += tally.side_1;
    row.sets_lost += tally.side_2;
    match tally.side_1.cmp(&tally.side_2) {
        std::cmp::Ordering::Greater => row.wins += 1,
        std::cmp::Ordering::Equal => row.draws += 1,
        std::cmp::Ordering::Less => row.losses += 1,
    }
}

fn round_robin_placements(tournament: &Tournament) -> Vec<Placement> {
    round_robin_table(tournament)
        .into_iter()
        .enumerate()
        .map(|(i, row)| Placement {
            participant_id: row.participant_id,
            name: row.name,
            place: PlaceLabel::Exact {
                place: i as u32 + 1,
            },
        })
        .collect()
}

/// Champion and runner-up from the final, exact places from consolation games, and a
/// range by elimination round for everyone else.
fn elimination_placements(tournament: &Tournament) -> Result<Vec<Placement>, TournamentError> {
    let n = tournament.participants.len();
    let mut places: HashMap<&ParticipantId, PlaceLabel> = HashMap::new();

    if n == 1 {
        places.insert(&tournament.participants[0].id, PlaceLabel::Exact { place: 1 });
    } else {
        let last_round = tournament
            .matches
            .iter()
            .filter(|m| !m.is_consolation())
            .map(|m| m.round)
            .max()
            .unwrap_or(0);
        let last_main: Vec<&GameMatch> = tournament
            .matches
            .iter()
            .filter(|m| !m.is_consolation() && m.round == last_round)
            .collect();
        let final_match = match last_main.as_slice() {
            [m] if m.is_completed() => *m,
            // No single completed final although nothing is pending: the match list is broken.
            _ => return Err(TournamentError::InvalidState),
        };
        if let (Some(champion), Some(runner_up)) = (&final_match.winner, final_match.loser()) {
            places.insert(champion, PlaceLabel::Exact { place: 1 });
            places.insert(runner_up, PlaceLabel::Exact { place: 2 });
        }

        for m in tournament.matches.iter().filter(|m| m.is_completed()) {
            let Some((win_place, lose_place)) = m.consolation.and_then(|tag| tag.places()) else {
                continue;
            };
            if let (Some(winner), Some(loser)) = (&m.winner, m.loser()) {
                places.insert(winner, PlaceLabel::Exact { place: win_place });
                places.insert(loser, PlaceLabel::Exact { place: lose_place });
            }
        }

        let size = tournament.bracket_size();
        for m in tournament.matches.iter().filter(|m| !m.is_consolation()) {
            let Some(loser) = m.loser() else {
                continue;
            };
            places
                .entry(loser)
                .or_insert_with(|| elimination_range(size, n, m.round));
        }
    }

    let mut placements = Vec::with_capacity(n);
    for p in &tournament.participants {
        let place = places
            .get(&p.id)
            .copied()
            .ok_or(TournamentError::InvalidState)?;
        placements.push(Placement {
            participant_id: p.id.clone(),
            name: p.name.clone(),
            place,
        });
    }
    placements.sort_by_key(|p| p.place.best());
    Ok(placements)
}

/// Places shared by everyone knocked out in `round`: `size / 2^round` down to half of that
/// plus one, capped at the participant count.
fn elimination_range(size: usize, participants: usize, round: u32) -> PlaceLabel {
    let upper = size.checked_shr(round).unwrap_or(0).min(participants) as u32;
    let lower = (size.checked_shr(round + 1).unwrap_or(0) + 1) as u32;
    if lower >= upper {
        PlaceLabel::Exact { place: upper.max(1) }
    } else {
        PlaceLabel::Range {
            from: lower,
            to: upper,
        }
    }
}

/// Final placements. Fails while results are outstanding.
pub fn compute_standings(tournament: &Tournament) -> Result<Vec<Placement>, TournamentError> {
    if tournament.status == TournamentStatus::Pending {
        return Err(TournamentError::InvalidState);
    }
    let pending = tournament.pending_matches().count();
    if pending > 0 {
        return Err(TournamentError::IncompleteTournament { pending });
    }
    match tournament.format {
        TournamentFormat::RoundRobin => Ok(round_robin_placements(tournament)),
        TournamentFormat::SingleElimination => elimination_placements(tournament),
    }
}

/// `{participant_id: "3 место"}` map handed to the notification layer.
pub fn place_labels(placements: &[Placement]) -> BTreeMap<ParticipantId, String> {
    placements
        .iter()
        .map(|p| (p.participant_id.clone(), p.place.to_string()))
        .collect()
}

#[derive(Serialize)]
struct CsvRow<'a> {
    place: String,
    participant_id: &'a str,
    name: &'a str,
}

/// Write placements as CSV with a `place,participant_id,name` header.
pub fn write_standings_csv<W: io::Write>(
    placements: &[Placement],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for p in placements {
        wtr.serialize(CsvRow {
            place: p.place.to_string(),
            participant_id: &p.participant_id,
            name: &p.name,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
