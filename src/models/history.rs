//! Finished-game history: the log the duplicate-match guard scans.

use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished game as logged by the score-entry flow.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub tournament_id: TournamentId,
    pub side_a: ParticipantId,
    pub side_b: ParticipantId,
    pub winner: ParticipantId,
    pub score: String,
    pub played_at: DateTime<Utc>,
}

impl GameRecord {
    /// True if this game was played between `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.side_a == a && self.side_b == b) || (self.side_a == b && self.side_b == a)
    }
}
