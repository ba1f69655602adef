//! Errors raised by the tournament engine

use crate::ids::{MatchId, ParticipantId, Round};
use crate::tournament::TournamentSystem;

/// Error types for engine operations.
///
/// Every variant leaves the aggregate unchanged.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Match {0} not found in the current round")]
    MatchNotFound(MatchId),

    #[error("Participant {participant} is not seated in match {match_id}")]
    ParticipantNotInMatch {
        match_id: MatchId,
        participant: ParticipantId,
    },

    #[error("Round {round} still has {pending} unfinished match(es)")]
    RoundIncomplete { round: Round, pending: usize },

    #[error("Match {0} is already completed")]
    MatchClosed(MatchId),

    #[error("Round {0} has already been scored")]
    RoundClosed(Round),

    #[error("Pairing for {0} tournaments is not implemented")]
    UnsupportedSystem(TournamentSystem),

    #[error("Tournament has already started")]
    AlreadyStarted,

    #[error("Participant {0} does not exist")]
    UnknownParticipant(ParticipantId),

    #[error("Participant roster must not be empty")]
    EmptyRoster,
}
