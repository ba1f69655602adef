//! Per-tournament mutual exclusion
//!
//! The engine cannot see concurrent loads, so every load-mutate-save cycle on
//! one tournament must hold that tournament's token.

use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tourney_core::TournamentId;

/// One lock token per tournament, created on first use
#[derive(Debug, Default)]
pub struct LockRegistry {
    tokens: Mutex<FxHashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock token for `tournament`
    pub fn token(&self, tournament: TournamentId) -> Arc<Mutex<()>> {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tokens.entry(tournament).or_default())
    }

    /// Run `f` while holding the lock of `tournament`
    pub fn with_lock<T>(&self, tournament: TournamentId, f: impl FnOnce() -> T) -> T {
        let token = self.token(tournament);
        let _guard = token.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
