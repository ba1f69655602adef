//! Single-document JSON store
//!
//! The whole store lives in one pretty-printed JSON file. Every call reads the
//! file, applies the change and writes it back through a temporary file that
//! is renamed over the original.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tourney_core::{Tournament, TournamentId, UserId};

use super::{StoreState, TournamentStore, TournamentSummary};
use crate::application::Application;
use crate::error::StoreError;

/// Store persisted to a JSON file on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process
    file_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store at `path`. The file is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Result<StoreState, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_state(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        let _guard = self.file_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let state = self.read_state()?;
        Ok(f(&state))
    }

    fn update<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.file_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.read_state()?;
        let value = f(&mut state)?;
        self.write_state(&state)?;
        Ok(value)
    }
}

impl TournamentStore for JsonFileStore {
    fn create_tournament(&self, tournament: Tournament) -> Result<TournamentId, StoreError> {
        let id = self.update(|s| Ok(s.create_tournament(tournament)))?;
        tracing::debug!("Created {} in {}", id, self.path.display());
        Ok(id)
    }

    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.read(|s| s.load(id))?
    }

    fn save(&self, tournament: &Tournament) -> Result<u64, StoreError> {
        self.update(|s| s.save(tournament))
    }

    fn tournaments(&self) -> Result<Vec<TournamentSummary>, StoreError> {
        self.read(StoreState::tournaments)
    }

    fn user_tournaments(&self, user: UserId) -> Result<Vec<TournamentSummary>, StoreError> {
        self.read(|s| s.user_tournaments(user))
    }

    fn create_application(&self, application: Application) -> Result<(), StoreError> {
        self.update(|s| {
            s.create_application(application);
            Ok(())
        })
    }

    fn applications(&self, tournament: TournamentId) -> Result<Vec<Application>, StoreError> {
        self.read(|s| s.applications(tournament))
    }

    fn application(
        &self,
        tournament: TournamentId,
        user: UserId,
    ) -> Result<Option<Application>, StoreError> {
        self.read(|s| s.application(tournament, user))
    }

    fn delete_application(
        &self,
        tournament: TournamentId,
        user: UserId,
    ) -> Result<(), StoreError> {
        self.update(|s| s.delete_application(tournament, user))
    }
}
