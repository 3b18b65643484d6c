//! Match (game), Slot, MatchStatus and ConsolationTag.

use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic match identifier, unique within one tournament.
///
/// Bracket and round-robin matches are `r{round}-m{number}`, consolation
/// matches are `c{tag}-m{number}`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn bracket(round: u32, match_number: u32) -> Self {
        Self(format!("r{round}-m{match_number}"))
    }

    pub fn consolation(tag: ConsolationTag, match_number: u32) -> Self {
        Self(format!("c{}-m{match_number}", tag.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One side of a match.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Slot {
    Player(ParticipantId),
    /// Padding for brackets whose size is not a power of two.
    Bye,
    /// Awaiting the winner of an earlier match.
    Empty,
}

impl Slot {
    pub fn participant(&self) -> Option<&ParticipantId> {
        match self {
            Slot::Player(id) => Some(id),
            Slot::Bye | Slot::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Completed,
}

/// Placement games played outside the main elimination bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ConsolationTag {
    /// Semifinal losers play for 3rd place.
    #[serde(rename = "3-4")]
    ThirdPlace,
    /// Quarterfinal losers: two semifinals for places 5-8.
    #[serde(rename = "5-8")]
    FifthToEighth,
    #[serde(rename = "5-6")]
    FifthPlace,
    #[serde(rename = "7-8")]
    SeventhPlace,
}

impl ConsolationTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsolationTag::ThirdPlace => "3-4",
            ConsolationTag::FifthToEighth => "5-8",
            ConsolationTag::FifthPlace => "5-6",
            ConsolationTag::SeventhPlace => "7-8",
        }
    }

    /// Places decided by this game (winner, loser). None for the 5-8 semis.
    pub fn places(self) -> Option<(u32, u32)> {
        match self {
            ConsolationTag::ThirdPlace => Some((3, 4)),
            ConsolationTag::FifthPlace => Some((5, 6)),
            ConsolationTag::SeventhPlace => Some((7, 8)),
            ConsolationTag::FifthToEighth => None,
        }
    }
}

impl fmt::Display for ConsolationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single match between two slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    pub match_number: u32,
    pub slot_1: Slot,
    pub slot_2: Slot,
    pub status: MatchStatus,
    /// Set-by-set score from slot 1's side, e.g. "6:2, 6:4". Stored as given.
    pub score: Option<String>,
    pub winner: Option<ParticipantId>,
    /// None for byes, which complete structurally.
    pub completed_at: Option<DateTime<Utc>>,
    pub is_bye: bool,
    pub consolation: Option<ConsolationTag>,
}

impl GameMatch {
    /// Main-bracket or round-robin match. Flags `is_bye` when either slot is a BYE.
    pub fn new(round: u32, match_number: u32, slot_1: Slot, slot_2: Slot) -> Self {
        let is_bye = slot_1 == Slot::Bye || slot_2 == Slot::Bye;
        Self {
            id: MatchId::bracket(round, match_number),
            round,
            match_number,
            slot_1,
            slot_2,
            status: MatchStatus::Pending,
            score: None,
            winner: None,
            completed_at: None,
            is_bye,
            consolation: None,
        }
    }

    pub fn consolation(
        tag: ConsolationTag,
        round: u32,
        match_number: u32,
        player_1: ParticipantId,
        player_2: ParticipantId,
    ) -> Self {
        Self {
            id: MatchId::consolation(tag, match_number),
            consolation: Some(tag),
            ..Self::new(round, match_number, Slot::Player(player_1), Slot::Player(player_2))
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MatchStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn is_consolation(&self) -> bool {
        self.consolation.is_some()
    }

    /// Both slotted participants, if the match is fully drawn.
    pub fn players(&self) -> Option<(&ParticipantId, &ParticipantId)> {
        Some((self.slot_1.participant()?, self.slot_2.participant()?))
    }

    pub fn involves(&self, id: &str) -> bool {
        self.slot_1.participant().is_some_and(|p| p == id)
            || self.slot_2.participant().is_some_and(|p| p == id)
    }

    /// The single real participant of a bye match.
    pub fn bye_participant(&self) -> Option<&ParticipantId> {
        match (&self.slot_1, &self.slot_2) {
            (Slot::Player(id), Slot::Bye) | (Slot::Bye, Slot::Player(id)) => Some(id),
            _ => None,
        }
    }

    /// The non-winner of a completed, non-bye match.
    pub fn loser(&self) -> Option<&ParticipantId> {
        if self.is_bye {
            return None;
        }
        let winner = self.winner.as_ref()?;
        let (a, b) = self.players()?;
        if a == winner {
            Some(b)
        } else if b == winner {
            Some(a)
        } else {
            None
        }
    }

    /// Mutable access to a slot by index (0 or 1).
    pub fn slot_mut(&mut self, index: u32) -> &mut Slot {
        if index == 0 {
            &mut self.slot_1
        } else {
            &mut self.slot_2
        }
    }
}
