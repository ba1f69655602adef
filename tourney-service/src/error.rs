//! Service and store errors

use tourney_core::{EngineError, TournamentId, UserId};

/// Error types for persistence gateways
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("No application from {user} to {tournament}")]
    ApplicationNotFound {
        tournament: TournamentId,
        user: UserId,
    },

    #[error("Stale write to {tournament}: stored version is {stored}, write was based on {attempted}")]
    VersionConflict {
        tournament: TournamentId,
        stored: u64,
        attempted: u64,
    },

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store document is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error types for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Tournament {0} has not started yet")]
    NotStarted(TournamentId),

    #[error("Tournament {0} has already started")]
    AlreadyStarted(TournamentId),

    #[error("Need at least {needed} participants to start, have {found}")]
    NotEnoughParticipants { needed: usize, found: usize },

    #[error("Only the tournament owner can do this ({0} is not the owner)")]
    NotOwner(UserId),

    #[error("{0} already participates in this tournament")]
    AlreadyParticipant(UserId),

    #[error("{0} has already applied to this tournament")]
    AlreadyApplied(UserId),

    #[error("{0} does not participate in this tournament")]
    NotParticipant(UserId),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
