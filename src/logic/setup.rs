//! Setup phase: start the tournament (Pending to Started) by drawing the bracket.

use crate::logic::builder::build_bracket;
use crate::logic::progression::{advance_round, rebuild_next_round};
use crate::models::{Tournament, TournamentError, TournamentStatus};
use rand::Rng;

/// Start the tournament: check the roster minimum, draw the bracket with `rng` (or the
/// seeding, when set), resolve byes. The roster is frozen from here on.
pub fn start_tournament<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Pending {
        return Err(TournamentError::InvalidState);
    }
    let actual = tournament.participants.len();
    let required = tournament.min_participants.max(2);
    if actual < required {
        return Err(TournamentError::InvalidRoster { required, actual });
    }

    tournament.matches = build_bracket(
        tournament.format,
        &tournament.participants,
        tournament.seeding.as_deref(),
        rng,
    );
    tournament.current_round = 0;
    tournament.status = TournamentStatus::Started;
    log::info!(
        "Tournament {} started: {:?}, {} participants, {} matches drawn",
        tournament.id,
        tournament.format,
        actual,
        tournament.matches.len()
    );

    rebuild_next_round(tournament);
    while advance_round(tournament) {}
    Ok(())
}
