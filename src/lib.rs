//! Tournament bracket engine: single-elimination and round-robin draws, result
//! progression with byes and consolation games, standings.

pub mod logic;
pub mod models;

pub use logic::{
    advance_round, available_opponents, bracket_size, build_bracket, build_round_robin,
    build_single_elimination, compute_standings, derive_next_matches, has_existing_match,
    place_labels, rebuild_next_round, record_result, round_robin_table, start_tournament,
    submit_result, write_standings_csv, PlaceLabel, Placement, Progress, StandingRow,
};
pub use models::{
    ConsolationTag, GameMatch, GameRecord, MatchId, MatchStatus, Participant, ParticipantId,
    Slot, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
    DEFAULT_MIN_PARTICIPANTS,
};
