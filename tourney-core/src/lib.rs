//! TOURNEY Core - Tournament entity model
//!
//! This crate provides the data model shared by every other crate:
//! - Identifier types
//! - Participants (single users or teams)
//! - Matches with two-sided result opinions
//! - The Tournament aggregate with opponent and bye histories
//! - The engine error type

pub mod error;
pub mod history;
pub mod ids;
pub mod matches;
pub mod participant;
pub mod tournament;

// Re-exports for convenient access
pub use error::EngineError;
pub use history::{ByeHistory, OpponentHistory, PairKey};
pub use ids::{MatchId, ParticipantId, Round, TournamentId, UserId};
pub use matches::{Match, MatchResult, MatchState, Outcome, Side};
pub use participant::{Participant, ParticipantKind};
pub use tournament::{Tournament, TournamentSystem};
