//! Data structures for the bracket engine: participants, matches, tournament record, history.

mod error;
mod game;
mod history;
mod participant;
mod tournament;

pub use error::TournamentError;
pub use game::{ConsolationTag, GameMatch, MatchId, MatchStatus, Slot};
pub use history::GameRecord;
pub use participant::{Participant, ParticipantId};
pub use tournament::{
    Tournament, TournamentFormat, TournamentId, TournamentStatus, DEFAULT_MIN_PARTICIPANTS,
};
