//! Tournament record, format and status.

use crate::models::error::TournamentError;
use crate::models::game::{GameMatch, MatchId};
use crate::models::history::GameRecord;
use crate::models::participant::{roster_map, Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Roster minimum used when the caller does not pick one.
pub const DEFAULT_MIN_PARTICIPANTS: usize = 4;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentFormat {
    /// Olympic system: losers drop out, consolation games decide places 3-8.
    #[default]
    SingleElimination,
    RoundRobin,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Registering participants; roster and seeding can change.
    #[default]
    Pending,
    /// Bracket drawn; results are being entered.
    Started,
    /// No pending matches remain. Data is frozen.
    Finished,
}

fn default_min_participants() -> usize {
    DEFAULT_MIN_PARTICIPANTS
}

/// Full tournament record as handed to and from the storage collaborator.
///
/// Stored shape: `{id, type, participants: {id: {name}}, status, matches, current_round,
/// seeding?}`. The remaining fields fall back to defaults when a record lacks them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub format: TournamentFormat,
    /// Registration order; frozen at start.
    #[serde(with = "roster_map")]
    pub participants: Vec<Participant>,
    /// Optional draw order (a permutation of participant ids).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeding: Option<Vec<ParticipantId>>,
    pub status: TournamentStatus,
    pub matches: Vec<GameMatch>,
    /// Round shown as "current" by the UI.
    pub current_round: u32,
    #[serde(default = "default_min_participants")]
    pub min_participants: usize,
    /// Finished games, appended by `record_result`.
    #[serde(default)]
    pub games: Vec<GameRecord>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Pending state with no participants.
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            participants: Vec::new(),
            seeding: None,
            status: TournamentStatus::Pending,
            matches: Vec::new(),
            current_round: 0,
            min_participants: DEFAULT_MIN_PARTICIPANTS,
            games: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create a tournament with an initial roster. Still Pending until started.
    pub fn with_participants(
        name: impl Into<String>,
        format: TournamentFormat,
        participants: Vec<Participant>,
    ) -> Self {
        Self {
            participants,
            ..Self::new(name, format)
        }
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn is_participant(&self, id: &str) -> bool {
        self.participant(id).is_some()
    }

    pub fn find_match(&self, id: &MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| &m.id == id)
    }

    /// Pending matches that need an external result (byes excluded).
    pub fn pending_matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(|m| m.is_pending() && !m.is_bye)
    }

    /// Elimination bracket size: participant count rounded up to a power of two.
    pub fn bracket_size(&self) -> usize {
        crate::logic::bracket_size(self.participants.len())
    }

    /// Register a participant (Pending only). Ids must be unique, names non-empty.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Pending {
            return Err(TournamentError::InvalidState);
        }
        let name = participant.name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidParticipantName);
        }
        if self.is_participant(&participant.id) {
            return Err(TournamentError::DuplicateParticipant(participant.id));
        }
        self.participants.push(Participant {
            name: name.to_string(),
            ..participant
        });
        Ok(())
    }

    /// Unregister a participant (Pending only). Drops them from the seeding too.
    pub fn remove_participant(&mut self, id: &str) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Pending {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| TournamentError::ParticipantNotFound(id.to_string()))?;
        self.participants.remove(idx);
        if let Some(seeding) = self.seeding.as_mut() {
            seeding.retain(|s| s != id);
        }
        Ok(())
    }

    /// Set the draw order (Pending only). Must be a permutation of the roster.
    pub fn set_seeding(&mut self, order: Vec<ParticipantId>) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Pending {
            return Err(TournamentError::InvalidState);
        }
        let unique: HashSet<&str> = order.iter().map(String::as_str).collect();
        let is_permutation = order.len() == self.participants.len()
            && unique.len() == order.len()
            && order.iter().all(|id| self.is_participant(id));
        if !is_permutation {
            return Err(TournamentError::InvalidSeeding);
        }
        self.seeding = Some(order);
        Ok(())
    }

    /// Set the roster minimum checked at start (Pending only). At least 2.
    pub fn set_min_participants(&mut self, min: usize) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Pending || min < 2 {
            return Err(TournamentError::InvalidState);
        }
        self.min_participants = min;
        Ok(())
    }
}
