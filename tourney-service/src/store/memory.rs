//! In-process store

use std::sync::{PoisonError, RwLock};

use tourney_core::{Tournament, TournamentId, UserId};

use super::{StoreState, TournamentStore, TournamentSummary};
use crate::application::Application;
use crate::error::StoreError;

/// Store backed by process memory. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl TournamentStore for MemoryStore {
    fn create_tournament(&self, tournament: Tournament) -> Result<TournamentId, StoreError> {
        Ok(self.write(|s| s.create_tournament(tournament)))
    }

    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.read(|s| s.load(id))
    }

    fn save(&self, tournament: &Tournament) -> Result<u64, StoreError> {
        self.write(|s| s.save(tournament))
    }

    fn tournaments(&self) -> Result<Vec<TournamentSummary>, StoreError> {
        Ok(self.read(StoreState::tournaments))
    }

    fn user_tournaments(&self, user: UserId) -> Result<Vec<TournamentSummary>, StoreError> {
        Ok(self.read(|s| s.user_tournaments(user)))
    }

    fn create_application(&self, application: Application) -> Result<(), StoreError> {
        self.write(|s| s.create_application(application));
        Ok(())
    }

    fn applications(&self, tournament: TournamentId) -> Result<Vec<Application>, StoreError> {
        Ok(self.read(|s| s.applications(tournament)))
    }

    fn application(
        &self,
        tournament: TournamentId,
        user: UserId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self.read(|s| s.application(tournament, user)))
    }

    fn delete_application(
        &self,
        tournament: TournamentId,
        user: UserId,
    ) -> Result<(), StoreError> {
        self.write(|s| s.delete_application(tournament, user))
    }
}
