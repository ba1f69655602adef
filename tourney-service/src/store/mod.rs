//! Persistence gateways
//!
//! A store loads and saves whole tournament aggregates. Saves are checked
//! against the aggregate's `version` so a write based on a stale load is
//! rejected instead of silently overwriting newer state.

mod json_file;
mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tourney_core::{Round, Tournament, TournamentId, TournamentSystem, UserId};

use crate::application::Application;
use crate::error::StoreError;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Whole-aggregate persistence for tournaments and their applications
pub trait TournamentStore: Send + Sync {
    /// Persist a new tournament and return its assigned id
    fn create_tournament(&self, tournament: Tournament) -> Result<TournamentId, StoreError>;

    /// Load a full aggregate
    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError>;

    /// Replace a stored aggregate, returning the new version
    fn save(&self, tournament: &Tournament) -> Result<u64, StoreError>;

    /// One-line summaries of every tournament
    fn tournaments(&self) -> Result<Vec<TournamentSummary>, StoreError>;

    /// Tournaments `user` owns or plays in
    fn user_tournaments(&self, user: UserId) -> Result<Vec<TournamentSummary>, StoreError>;

    /// Store an application. Re-submitting replaces the earlier one.
    fn create_application(&self, application: Application) -> Result<(), StoreError>;

    fn applications(&self, tournament: TournamentId) -> Result<Vec<Application>, StoreError>;

    fn application(
        &self,
        tournament: TournamentId,
        user: UserId,
    ) -> Result<Option<Application>, StoreError>;

    fn delete_application(&self, tournament: TournamentId, user: UserId)
        -> Result<(), StoreError>;
}

/// Listing entry for a tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub title: String,
    pub owner_id: UserId,
    pub system: TournamentSystem,
    pub participants: usize,
    pub current_round: Round,
    pub total_rounds: Round,
    pub finished: bool,
}

impl From<&Tournament> for TournamentSummary {
    fn from(t: &Tournament) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            owner_id: t.owner_id,
            system: t.system,
            participants: t.participants.len(),
            current_round: t.current_round,
            total_rounds: t.total_rounds,
            finished: t.is_finished(),
        }
    }
}

// ============================================================================
// Shared state
// ============================================================================

/// Everything a store holds. Both gateways operate on this document; the JSON
/// store simply keeps it on disk between calls.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    next_tournament_id: u64,
    tournaments: BTreeMap<TournamentId, Tournament>,
    applications: Vec<Application>,
}

impl StoreState {
    pub(crate) fn create_tournament(&mut self, mut tournament: Tournament) -> TournamentId {
        self.next_tournament_id += 1;
        let id = TournamentId(self.next_tournament_id);
        tournament.id = id;
        for participant in &mut tournament.participants {
            participant.tournament_id = id;
        }
        tournament.version = 0;
        self.tournaments.insert(id, tournament);
        id
    }

    pub(crate) fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.tournaments
            .get(&id)
            .cloned()
            .ok_or(StoreError::TournamentNotFound(id))
    }

    pub(crate) fn save(&mut self, tournament: &Tournament) -> Result<u64, StoreError> {
        let stored = self
            .tournaments
            .get_mut(&tournament.id)
            .ok_or(StoreError::TournamentNotFound(tournament.id))?;
        if stored.version != tournament.version {
            return Err(StoreError::VersionConflict {
                tournament: tournament.id,
                stored: stored.version,
                attempted: tournament.version,
            });
        }

        *stored = tournament.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    pub(crate) fn tournaments(&self) -> Vec<TournamentSummary> {
        self.tournaments.values().map(TournamentSummary::from).collect()
    }

    pub(crate) fn user_tournaments(&self, user: UserId) -> Vec<TournamentSummary> {
        self.tournaments
            .values()
            .filter(|t| t.is_owner(user) || t.user_participates(user))
            .map(TournamentSummary::from)
            .collect()
    }

    pub(crate) fn create_application(&mut self, application: Application) {
        self.applications.retain(|a| {
            !(a.tournament_id == application.tournament_id && a.user_id == application.user_id)
        });
        self.applications.push(application);
    }

    pub(crate) fn applications(&self, tournament: TournamentId) -> Vec<Application> {
        self.applications
            .iter()
            .filter(|a| a.tournament_id == tournament)
            .cloned()
            .collect()
    }

    pub(crate) fn application(&self, tournament: TournamentId, user: UserId) -> Option<Application> {
        self.applications
            .iter()
            .find(|a| a.tournament_id == tournament && a.user_id == user)
            .cloned()
    }

    pub(crate) fn delete_application(
        &mut self,
        tournament: TournamentId,
        user: UserId,
    ) -> Result<(), StoreError> {
        let before = self.applications.len();
        self.applications
            .retain(|a| !(a.tournament_id == tournament && a.user_id == user));
        if self.applications.len() == before {
            return Err(StoreError::ApplicationNotFound { tournament, user });
        }
        Ok(())
    }
}
