//! Bracket builder: roster + format to the initial match list.

use crate::models::{GameMatch, Participant, ParticipantId, Slot, TournamentFormat};
use rand::seq::SliceRandom;
use rand::Rng;

/// Participant count rounded up to the next power of two (0 stays 0).
pub fn bracket_size(participants: usize) -> usize {
    if participants == 0 {
        0
    } else {
        participants.next_power_of_two()
    }
}

/// Build the initial matches for `format`.
pub fn build_bracket<R: Rng + ?Sized>(
    format: TournamentFormat,
    participants: &[Participant],
    seeding: Option<&[ParticipantId]>,
    rng: &mut R,
) -> Vec<GameMatch> {
    match format {
        TournamentFormat::SingleElimination => build_single_elimination(participants, seeding, rng),
        TournamentFormat::RoundRobin => build_round_robin(participants, seeding, rng),
    }
}

/// Draw order: seeding first (unknown ids ignored), then roster members the seeding
/// left out in roster order. Without a seeding the roster is shuffled.
fn draw_order<R: Rng + ?Sized>(
    participants: &[Participant],
    seeding: Option<&[ParticipantId]>,
    rng: &mut R,
) -> Vec<ParticipantId> {
    let Some(seeding) = seeding else {
        let mut ids: Vec<_> = participants.iter().map(|p| p.id.clone()).collect();
        ids.shuffle(rng);
        return ids;
    };
    let mut ids: Vec<ParticipantId> = Vec::with_capacity(participants.len());
    for id in seeding {
        if participants.iter().any(|p| &p.id == id) && !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    for p in participants {
        if !ids.contains(&p.id) {
            ids.push(p.id.clone());
        }
    }
    ids
}

/// Round-0 matches of a single-elimination bracket.
///
/// 1. `bracket_size` = N rounded up to a power of two; `byes` = `bracket_size - N`.
/// 2. The first `bracket_size/2 - byes` matches take two consecutive entrants.
/// 3. Each remaining match takes one entrant and a BYE in slot 2, so no match is BYE-only.
///
/// Byes land on the tail of the draw order: with a seeding, the last seeds get them. This
/// is the roster padded with BYEs at the end, spread so no two byes share a match.
///
/// Bye matches start Pending with `is_bye` set; the progression engine completes them.
pub fn build_single_elimination<R: Rng + ?Sized>(
    participants: &[Participant],
    seeding: Option<&[ParticipantId]>,
    rng: &mut R,
) -> Vec<GameMatch> {
    let n = participants.len();
    if n < 2 {
        return Vec::new();
    }
    let order = draw_order(participants, seeding, rng);
    let size = bracket_size(n);
    let match_count = size / 2;
    let full_matches = match_count - (size - n);

    let mut entrants = order.into_iter();
    let mut matches = Vec::with_capacity(match_count);
    for number in 0..match_count {
        let slot_1 = entrants.next().map_or(Slot::Bye, Slot::Player);
        let slot_2 = if number < full_matches {
            entrants.next().map_or(Slot::Bye, Slot::Player)
        } else {
            Slot::Bye
        };
        matches.push(GameMatch::new(0, number as u32, slot_1, slot_2));
    }
    log::debug!(
        "Built elimination bracket: {} entrants, size {}, {} byes",
        n,
        size,
        size - n
    );
    matches
}

/// Every unordered pair once, grouped into rounds with the circle method.
///
/// Odd rosters get a phantom entrant; its pairings are the round's rest slot and are dropped.
pub fn build_round_robin<R: Rng + ?Sized>(
    participants: &[Participant],
    seeding: Option<&[ParticipantId]>,
    rng: &mut R,
) -> Vec<GameMatch> {
    if participants.len() < 2 {
        return Vec::new();
    }
    let mut ring: Vec<Option<ParticipantId>> = draw_order(participants, seeding, rng)
        .into_iter()
        .map(Some)
        .collect();
    if ring.len() % 2 == 1 {
        ring.push(None);
    }
    let n = ring.len();

    let mut matches = Vec::with_capacity(participants.len() * (participants.len() - 1) / 2);
    for round in 0..n - 1 {
        let mut number = 0;
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (&ring[i], &ring[n - 1 - i]) {
                matches.push(GameMatch::new(
                    round as u32,
                    number,
                    Slot::Player(a.clone()),
                    Slot::Player(b.clone()),
                ));
                number += 1;
            }
        }
        // Keep the first entrant fixed, rotate the rest one step.
        ring[1..].rotate_right(1);
    }
    log::debug!(
        "Built round robin: {} entrants, {} matches over {} rounds",
        participants.len(),
        matches.len(),
        n - 1
    );
    matches
}
