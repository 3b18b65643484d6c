//! Tournament business logic: bracket building, progression, standings, duplicate guard.

mod builder;
mod duplicate_guard;
mod progression;
pub mod score;
mod setup;
mod standings;

pub use builder::{bracket_size, build_bracket, build_round_robin, build_single_elimination};
pub use duplicate_guard::{available_opponents, has_existing_match};
pub use progression::{
    advance_round, derive_next_matches, rebuild_next_round, record_result, submit_result,
    Progress,
};
pub use setup::start_tournament;
pub use standings::{
    compute_standings, place_labels, round_robin_table, write_standings_csv, PlaceLabel,
    Placement, StandingRow,
};
