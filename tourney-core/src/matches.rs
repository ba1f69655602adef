//! Matches and their results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MatchId, ParticipantId, Round, TournamentId};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Result of a match, as reported by a player or set by the owner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "p1")]
    P1Won,
    #[serde(rename = "p2")]
    P2Won,
    #[serde(rename = "draw")]
    Draw,
}

impl MatchResult {
    /// Which side won, if anyone
    pub fn winner(self) -> Option<Side> {
        match self {
            MatchResult::P1Won => Some(Side::P1),
            MatchResult::P2Won => Some(Side::P2),
            MatchResult::Draw => None,
        }
    }
}

/// Seat in a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    P1,
    P2,
}

/// Result seen from one participant's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Match lifecycle state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    #[default]
    Scheduled,
    Completed,
    /// Both players reported and disagree; needs a correction or the owner
    Conflicted,
}

// ============================================================================
// MATCH
// ============================================================================

/// A pairing of two participants within a round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: Round,
    pub p1: ParticipantId,
    pub p2: ParticipantId,
    pub state: MatchState,
    pub opinion_p1: Option<MatchResult>,
    pub opinion_p2: Option<MatchResult>,
    /// Final result, present iff `state == Completed`
    pub result: Option<MatchResult>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Create a scheduled match with no opinions
    pub fn new(
        id: MatchId,
        tournament_id: TournamentId,
        round: Round,
        p1: ParticipantId,
        p2: ParticipantId,
    ) -> Self {
        debug_assert_ne!(p1, p2, "a participant cannot play itself");
        Self {
            id,
            tournament_id,
            round,
            p1,
            p2,
            state: MatchState::Scheduled,
            opinion_p1: None,
            opinion_p2: None,
            result: None,
            scheduled_at: None,
        }
    }

    /// Set the scheduling timestamp
    pub fn scheduled(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.p1 == participant || self.p2 == participant
    }

    /// Seat occupied by `participant`, if seated here
    pub fn side_of(&self, participant: ParticipantId) -> Option<Side> {
        if participant == self.p1 {
            Some(Side::P1)
        } else if participant == self.p2 {
            Some(Side::P2)
        } else {
            None
        }
    }

    pub fn participant_at(&self, side: Side) -> ParticipantId {
        match side {
            Side::P1 => self.p1,
            Side::P2 => self.p2,
        }
    }

    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        match self.side_of(participant)? {
            Side::P1 => Some(self.p2),
            Side::P2 => Some(self.p1),
        }
    }

    pub fn opinion(&self, side: Side) -> Option<MatchResult> {
        match side {
            Side::P1 => self.opinion_p1,
            Side::P2 => self.opinion_p2,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == MatchState::Completed
    }

    /// Final outcome for `participant`, or None while unresolved or not seated
    pub fn outcome_for(&self, participant: ParticipantId) -> Option<Outcome> {
        let side = self.side_of(participant)?;
        let result = self.result?;
        Some(match result.winner() {
            None => Outcome::Draw,
            Some(winner) if winner == side => Outcome::Win,
            Some(_) => Outcome::Loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Match {
        Match::new(MatchId(4), TournamentId(1), 2, ParticipantId(3), ParticipantId(7))
    }

    #[test]
    fn test_new_match_is_scheduled() {
        let m = sample();
        assert_eq!(m.state, MatchState::Scheduled);
        assert!(m.result.is_none());
        assert!(m.opinion_p1.is_none() && m.opinion_p2.is_none());
    }

    #[test]
    fn test_seating() {
        let m = sample();
        assert_eq!(m.side_of(ParticipantId(3)), Some(Side::P1));
        assert_eq!(m.side_of(ParticipantId(7)), Some(Side::P2));
        assert_eq!(m.side_of(ParticipantId(5)), None);
        assert_eq!(m.opponent_of(ParticipantId(7)), Some(ParticipantId(3)));
        assert_eq!(m.participant_at(Side::P2), ParticipantId(7));
    }

    #[test]
    fn test_outcome_for() {
        let mut m = sample();
        assert_eq!(m.outcome_for(ParticipantId(3)), None);

        m.result = Some(MatchResult::P2Won);
        m.state = MatchState::Completed;
        assert_eq!(m.outcome_for(ParticipantId(3)), Some(Outcome::Loss));
        assert_eq!(m.outcome_for(ParticipantId(7)), Some(Outcome::Win));

        m.result = Some(MatchResult::Draw);
        assert_eq!(m.outcome_for(ParticipantId(3)), Some(Outcome::Draw));
    }

    #[test]
    fn test_result_wire_names() {
        assert_eq!(serde_json::to_string(&MatchResult::P1Won).unwrap(), "\"p1\"");
        assert_eq!(serde_json::to_string(&MatchResult::Draw).unwrap(), "\"draw\"");
        assert_eq!(
            serde_json::to_string(&MatchState::Conflicted).unwrap(),
            "\"conflicted\""
        );
    }
}
