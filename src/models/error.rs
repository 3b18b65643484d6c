//! Errors returned by tournament operations.

use crate::models::game::MatchId;
use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentId;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Fewer participants than the tournament's minimum.
    #[error("Need at least {required} participants to start (have {actual})")]
    InvalidRoster { required: usize, actual: usize },

    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("Match {0} not found")]
    MatchNotFound(MatchId),

    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    /// Reported winner is not one of the two slotted participants.
    #[error("Participant {winner} did not play in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        winner: ParticipantId,
    },

    /// Score's set count names the other side as the winner.
    #[error("Score {score} does not agree with winner {winner} of match {match_id}")]
    InvalidScore {
        match_id: MatchId,
        winner: ParticipantId,
        score: String,
    },

    /// Standings requested while matches are still open.
    #[error("Tournament is not finished ({pending} matches pending)")]
    IncompleteTournament { pending: usize },

    #[error("Invalid state for this action")]
    InvalidState,

    #[error("Participant {0} is already registered")]
    DuplicateParticipant(ParticipantId),

    #[error("Participant name must not be empty")]
    InvalidParticipantName,

    /// Seeding is not a permutation of the roster.
    #[error("Seeding must list every registered participant exactly once")]
    InvalidSeeding,

    #[error("Match {0} is already completed")]
    MatchAlreadyCompleted(MatchId),

    /// One side is still waiting for an earlier match.
    #[error("Match {0} does not have both participants yet")]
    MatchNotReady(MatchId),

    #[error("{a} and {b} have already played each other in this tournament")]
    DuplicateMatch { a: ParticipantId, b: ParticipantId },
}

impl TournamentError {
    /// True for errors caused by an unknown id (mapped to 404 by the HTTP layer).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TournamentError::TournamentNotFound(_)
                | TournamentError::MatchNotFound(_)
                | TournamentError::ParticipantNotFound(_)
        )
    }
}
