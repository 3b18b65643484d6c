//! Duplicate-match guard: no pair plays twice within one tournament.

use crate::models::{GameRecord, Participant, Tournament, TournamentError, TournamentId};

/// True if `history` holds a finished game between `a` and `b` (either order) in
/// `tournament_id`. Linear in the number of logged games.
pub fn has_existing_match(
    history: &[GameRecord],
    tournament_id: TournamentId,
    a: &str,
    b: &str,
) -> bool {
    history
        .iter()
        .any(|g| g.tournament_id == tournament_id && g.is_between(a, b))
}

/// Roster members `participant` may still report a game against: everyone except
/// themselves and opponents already logged in the tournament's game history.
pub fn available_opponents<'a>(
    tournament: &'a Tournament,
    participant: &str,
) -> Result<Vec<&'a Participant>, TournamentError> {
    if !tournament.is_participant(participant) {
        return Err(TournamentError::ParticipantNotFound(participant.to_string()));
    }
    Ok(tournament
        .participants
        .iter()
        .filter(|p| p.id != participant)
        .filter(|p| !has_existing_match(&tournament.games, tournament.id, participant, &p.id))
        .collect())
}
