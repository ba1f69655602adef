//! The Tournament aggregate
//!
//! A tournament owns its participants, every match of every round and the
//! opponent/bye histories. It is loaded, mutated and saved as one unit.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::history::{ByeHistory, OpponentHistory};
use crate::ids::{MatchId, ParticipantId, Round, TournamentId, UserId};
use crate::matches::Match;
use crate::participant::{Participant, ParticipantKind};

/// Pairing system
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentSystem {
    /// Pair by score, avoid rematches
    #[default]
    Swiss,
    /// Knock-out bracket (not implemented)
    SingleElimination,
}

impl fmt::Display for TournamentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentSystem::Swiss => write!(f, "swiss"),
            TournamentSystem::SingleElimination => write!(f, "single_elimination"),
        }
    }
}

/// Tournament aggregate root
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub owner_id: UserId,
    pub title: String,
    pub system: TournamentSystem,
    /// 0 until the first round is drawn
    pub current_round: Round,
    /// Fixed when the tournament starts
    pub total_rounds: Round,
    /// Last round whose results were credited to participant scores
    pub scored_round: Round,
    /// Source of tournament-wide unique match ids
    pub next_match_id: u64,
    /// Matches keyed by round number
    pub rounds: BTreeMap<Round, Vec<Match>>,
    /// Participants in join order (`participants[i].id == ParticipantId(i)`)
    pub participants: Vec<Participant>,
    pub opponents: OpponentHistory,
    pub byes: ByeHistory,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped by the store on every save
    pub version: u64,
}

impl Tournament {
    /// Create an empty tournament. The store assigns the id.
    pub fn new(owner_id: UserId, title: impl Into<String>, system: TournamentSystem) -> Self {
        Self {
            id: TournamentId::default(),
            owner_id,
            title: title.into(),
            system,
            current_round: 0,
            total_rounds: 0,
            scored_round: 0,
            next_match_id: 0,
            rounds: BTreeMap::new(),
            participants: Vec::new(),
            opponents: OpponentHistory::default(),
            byes: ByeHistory::default(),
            created_at: Utc::now(),
            version: 0,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn is_started(&self) -> bool {
        self.current_round > 0
    }

    /// True once the final round has been played and scored
    pub fn is_finished(&self) -> bool {
        self.is_started()
            && self.current_round == self.total_rounds
            && self.scored_round == self.current_round
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Append a participant. Only allowed before the first round.
    pub fn add_participant(
        &mut self,
        name: impl Into<String>,
        handle: Option<String>,
        kind: ParticipantKind,
        roster: Vec<UserId>,
    ) -> Result<ParticipantId, EngineError> {
        if self.is_started() {
            return Err(EngineError::AlreadyStarted);
        }
        if roster.is_empty() {
            return Err(EngineError::EmptyRoster);
        }

        let id = ParticipantId(self.participants.len() as u32);
        self.participants.push(Participant {
            id,
            tournament_id: self.id,
            name: name.into(),
            handle,
            kind,
            roster,
            eliminated: false,
            score: 0.0,
            joined_at: Utc::now(),
        });
        Ok(id)
    }

    /// Hand out the next tournament-wide match id
    pub fn allocate_match_id(&mut self) -> MatchId {
        let id = MatchId(self.next_match_id);
        self.next_match_id += 1;
        id
    }

    // ========================================================================
    // Participant lookups
    // ========================================================================

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.index()).filter(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(id.index()).filter(|p| p.id == id)
    }

    /// Find the participant whose roster contains `user`
    pub fn participant_by_user(&self, user: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.has_member(user))
    }

    pub fn user_participates(&self, user: UserId) -> bool {
        self.participant_by_user(user).is_some()
    }

    pub fn participant_ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(|p| p.id)
    }

    pub fn had_bye(&self, participant: ParticipantId) -> bool {
        self.byes.contains(participant)
    }

    pub fn have_met(&self, a: ParticipantId, b: ParticipantId) -> bool {
        self.opponents.have_met(a, b)
    }

    // ========================================================================
    // Match lookups
    // ========================================================================

    pub fn round_matches(&self, round: Round) -> &[Match] {
        self.rounds.get(&round).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn current_matches(&self) -> &[Match] {
        self.round_matches(self.current_round)
    }

    pub fn match_in_round(&self, round: Round, id: MatchId) -> Option<&Match> {
        self.round_matches(round).iter().find(|m| m.id == id)
    }

    pub fn match_in_round_mut(&mut self, round: Round, id: MatchId) -> Option<&mut Match> {
        self.rounds.get_mut(&round)?.iter_mut().find(|m| m.id == id)
    }

    /// The participant's match in the current round (None on a bye)
    pub fn current_match(&self, participant: ParticipantId) -> Option<&Match> {
        self.current_matches().iter().find(|m| m.involves(participant))
    }

    /// All matches the participant has been scheduled in, in round order
    pub fn participant_matches(&self, participant: ParticipantId) -> Vec<&Match> {
        self.rounds
            .values()
            .flat_map(|matches| matches.iter())
            .filter(|m| m.involves(participant))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament_with(n: usize) -> Tournament {
        let mut t = Tournament::new(UserId(1), "Spring Open", TournamentSystem::Swiss);
        for i in 0..n {
            t.add_participant(
                format!("player-{i}"),
                None,
                ParticipantKind::User,
                vec![UserId(100 + i as i64)],
            )
            .unwrap();
        }
        t
    }

    #[test]
    fn test_new_tournament_is_empty() {
        let t = Tournament::new(UserId(9), "Cup", TournamentSystem::Swiss);
        assert_eq!(t.current_round, 0);
        assert!(!t.is_started());
        assert!(!t.is_finished());
        assert!(t.participants.is_empty());
        assert!(t.current_matches().is_empty());
        assert!(t.is_owner(UserId(9)));
    }

    #[test]
    fn test_participant_ids_are_dense() {
        let t = tournament_with(3);
        let ids: Vec<_> = t.participant_ids().collect();
        assert_eq!(ids, vec![ParticipantId(0), ParticipantId(1), ParticipantId(2)]);
        assert_eq!(t.participant(ParticipantId(2)).unwrap().name, "player-2");
        assert!(t.participant(ParticipantId(3)).is_none());
    }

    #[test]
    fn test_add_participant_rejected_after_start() {
        let mut t = tournament_with(2);
        t.current_round = 1;
        let err = t
            .add_participant("late", None, ParticipantKind::User, vec![UserId(7)])
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadyStarted);
    }

    #[test]
    fn test_add_participant_requires_roster() {
        let mut t = tournament_with(0);
        let err = t
            .add_participant("ghost", None, ParticipantKind::Team, vec![])
            .unwrap_err();
        assert_eq!(err, EngineError::EmptyRoster);
    }

    #[test]
    fn test_participant_by_user() {
        let t = tournament_with(3);
        assert_eq!(t.participant_by_user(UserId(101)).unwrap().id, ParticipantId(1));
        assert!(t.participant_by_user(UserId(5)).is_none());
        assert!(t.user_participates(UserId(102)));
    }

    #[test]
    fn test_match_lookups() {
        let mut t = tournament_with(4);
        t.current_round = 2;
        let first = t.allocate_match_id();
        let second = t.allocate_match_id();
        let third = t.allocate_match_id();
        t.rounds.insert(
            1,
            vec![Match::new(first, t.id, 1, ParticipantId(0), ParticipantId(1))],
        );
        t.rounds.insert(
            2,
            vec![
                Match::new(second, t.id, 2, ParticipantId(0), ParticipantId(2)),
                Match::new(third, t.id, 2, ParticipantId(1), ParticipantId(3)),
            ],
        );

        assert_eq!(t.current_match(ParticipantId(3)).unwrap().id, third);
        assert!(t.match_in_round(2, first).is_none());
        assert!(t.match_in_round(1, first).is_some());

        let history: Vec<_> = t
            .participant_matches(ParticipantId(0))
            .iter()
            .map(|m| m.round)
            .collect();
        assert_eq!(history, vec![1, 2]);
    }

    #[test]
    fn test_match_ids_are_unique_across_rounds() {
        let mut t = tournament_with(2);
        let ids: Vec<_> = (0..5).map(|_| t.allocate_match_id()).collect();
        assert_eq!(ids, (0..5).map(MatchId).collect::<Vec<_>>());
        assert_eq!(t.next_match_id, 5);
    }

    #[test]
    fn test_tournament_json_round_trip() {
        let mut t = tournament_with(2);
        t.opponents.record(ParticipantId(0), ParticipantId(1));
        t.byes.record(ParticipantId(1));
        let id = t.allocate_match_id();
        t.rounds
            .insert(1, vec![Match::new(id, t.id, 1, ParticipantId(0), ParticipantId(1))]);

        let json = serde_json::to_string(&t).unwrap();
        let back: Tournament = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
