//! Tournament service - the workflow callers drive
//!
//! Level 1 - Orchestration
//!
//! Every mutating call runs one load-mutate-save cycle under the tournament's
//! lock. A failing call saves nothing.

use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tourney_core::{
    EngineError, Match, MatchId, MatchResult, MatchState, ParticipantId, ParticipantKind, Round,
    Tournament, TournamentId, TournamentSystem, UserId,
};
use tourney_engine::{
    advance_round, compute_standings, report_opinion, swiss_round_count, RoundOutcome, Standing,
};

use crate::application::Application;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, StoreError};
use crate::locks::LockRegistry;
use crate::store::{TournamentStore, TournamentSummary};

/// Where the tournament stands after a result was recorded
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Progress {
    /// Matches of the current round are still open
    Pending { pending: usize },
    /// The round closed and the next one was drawn
    Advanced {
        round: Round,
        bye: Option<ParticipantId>,
    },
    /// The final round is scored
    Finished,
    /// The round was scored but `round` has no rematch-free pairing, so the
    /// event finished early
    EndedEarly {
        round: Round,
        unpaired: Vec<ParticipantId>,
    },
}

/// Result of a participant's report
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub state: MatchState,
    pub progress: Progress,
}

/// Tournament workflow over a store
pub struct Service<S: TournamentStore> {
    store: S,
    config: ServiceConfig,
    locks: LockRegistry,
    rng: Mutex<ChaCha8Rng>,
}

impl<S: TournamentStore> Service<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            store,
            config,
            locks: LockRegistry::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Create an empty Swiss tournament owned by `owner`
    pub fn create_tournament(
        &self,
        owner: UserId,
        title: impl Into<String>,
    ) -> Result<TournamentId, ServiceError> {
        let tournament = Tournament::new(owner, title, TournamentSystem::Swiss);
        let id = self.store.create_tournament(tournament)?;
        tracing::info!("{} created by {}", id, owner);
        Ok(id)
    }

    /// File a request to join a tournament that has not started
    pub fn apply(&self, application: Application) -> Result<(), ServiceError> {
        let id = application.tournament_id;
        let user = application.user_id;
        self.locks.with_lock(id, || {
            let tournament = self.store.load(id)?;
            if tournament.is_started() {
                return Err(ServiceError::AlreadyStarted(id));
            }
            if tournament.user_participates(user) {
                return Err(ServiceError::AlreadyParticipant(user));
            }
            if self.store.application(id, user)?.is_some() {
                return Err(ServiceError::AlreadyApplied(user));
            }

            self.store.create_application(application)?;
            tracing::info!("{} applied to {}", user, id);
            Ok(())
        })
    }

    /// Turn `user`'s application into a participant
    pub fn approve_application(
        &self,
        id: TournamentId,
        actor: UserId,
        user: UserId,
    ) -> Result<ParticipantId, ServiceError> {
        let participant = self.with_tournament(id, |t| {
            ensure_owner(t, actor)?;
            ensure_not_started(t)?;
            if t.user_participates(user) {
                return Err(ServiceError::AlreadyParticipant(user));
            }
            let application = self
                .store
                .application(id, user)?
                .ok_or(StoreError::ApplicationNotFound {
                    tournament: id,
                    user,
                })?;

            let participant = t.add_participant(
                application.name,
                application.handle,
                ParticipantKind::User,
                vec![user],
            )?;
            self.store.delete_application(id, user)?;
            Ok(participant)
        })?;

        tracing::info!("{} approved {} as {}", id, user, participant);
        Ok(participant)
    }

    pub fn reject_application(
        &self,
        id: TournamentId,
        actor: UserId,
        user: UserId,
    ) -> Result<(), ServiceError> {
        self.locks.with_lock(id, || {
            let tournament = self.store.load(id)?;
            ensure_owner(&tournament, actor)?;
            self.store.delete_application(id, user)?;
            tracing::info!("{} rejected application from {}", id, user);
            Ok(())
        })
    }

    /// Enter a team directly. Only the owner may do this, before the start.
    pub fn register_team(
        &self,
        id: TournamentId,
        actor: UserId,
        name: impl Into<String>,
        roster: Vec<UserId>,
    ) -> Result<ParticipantId, ServiceError> {
        let name = name.into();
        self.with_tournament(id, |t| {
            ensure_owner(t, actor)?;
            ensure_not_started(t)?;
            if let Some(&member) = roster.iter().find(|&&u| t.user_participates(u)) {
                return Err(ServiceError::AlreadyParticipant(member));
            }

            let participant = t.add_participant(name, None, ParticipantKind::Team, roster)?;
            tracing::info!("{}: team registered as {}", id, participant);
            Ok(participant)
        })
    }

    pub fn applications(&self, id: TournamentId) -> Result<Vec<Application>, ServiceError> {
        Ok(self.store.applications(id)?)
    }

    // ========================================================================
    // Play
    // ========================================================================

    /// Fix the number of rounds and draw round one
    pub fn start_tournament(
        &self,
        id: TournamentId,
        actor: UserId,
    ) -> Result<RoundOutcome, ServiceError> {
        self.with_tournament(id, |t| {
            ensure_owner(t, actor)?;
            ensure_not_started(t)?;
            let found = t.participants.len();
            if found < self.config.min_participants {
                return Err(ServiceError::NotEnoughParticipants {
                    needed: self.config.min_participants,
                    found,
                });
            }

            t.total_rounds = swiss_round_count(found);
            let outcome = self.draw(t)?;
            tracing::info!(
                "{} started: {} participants, {} rounds",
                id,
                found,
                t.total_rounds
            );
            Ok(outcome)
        })
    }

    /// Record `user`'s opinion on a match of the current round
    pub fn report_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        user: UserId,
        result: MatchResult,
    ) -> Result<ReportOutcome, ServiceError> {
        self.with_tournament(id, |t| {
            ensure_started(t)?;
            let participant = t
                .participant_by_user(user)
                .map(|p| p.id)
                .ok_or(ServiceError::NotParticipant(user))?;

            let state = report_opinion(t, match_id, participant, result)?;
            let progress = self.after_result(t)?;
            Ok(ReportOutcome { state, progress })
        })
    }

    /// Owner override of a match result
    pub fn set_result_by_admin(
        &self,
        id: TournamentId,
        match_id: MatchId,
        actor: UserId,
        result: MatchResult,
    ) -> Result<Progress, ServiceError> {
        self.with_tournament(id, |t| {
            ensure_owner(t, actor)?;
            ensure_started(t)?;
            tourney_engine::set_result_by_admin(t, match_id, result)?;
            self.after_result(t)
        })
    }

    /// Manually close the current round and draw the next one
    pub fn advance_round(
        &self,
        id: TournamentId,
        actor: UserId,
    ) -> Result<RoundOutcome, ServiceError> {
        self.with_tournament(id, |t| {
            ensure_owner(t, actor)?;
            ensure_started(t)?;
            Ok(self.draw(t)?)
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, ServiceError> {
        Ok(self.store.load(id)?)
    }

    pub fn tournaments(&self) -> Result<Vec<TournamentSummary>, ServiceError> {
        Ok(self.store.tournaments()?)
    }

    pub fn user_tournaments(&self, user: UserId) -> Result<Vec<TournamentSummary>, ServiceError> {
        Ok(self.store.user_tournaments(user)?)
    }

    pub fn standings(&self, id: TournamentId) -> Result<Vec<Standing>, ServiceError> {
        let tournament = self.store.load(id)?;
        Ok(compute_standings(&tournament))
    }

    /// Every match `user` has been scheduled in, in round order
    pub fn participant_history(
        &self,
        id: TournamentId,
        user: UserId,
    ) -> Result<Vec<Match>, ServiceError> {
        let tournament = self.store.load(id)?;
        let participant = tournament
            .participant_by_user(user)
            .ok_or(ServiceError::NotParticipant(user))?;
        Ok(tournament
            .participant_matches(participant.id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// `user`'s match in the current round; None while they sit out a bye
    pub fn current_match(
        &self,
        id: TournamentId,
        user: UserId,
    ) -> Result<Option<Match>, ServiceError> {
        let tournament = self.store.load(id)?;
        ensure_started(&tournament)?;
        let participant = tournament
            .participant_by_user(user)
            .ok_or(ServiceError::NotParticipant(user))?;
        Ok(tournament.current_match(participant.id).cloned())
    }

    pub fn round_matches(&self, id: TournamentId, round: Round) -> Result<Vec<Match>, ServiceError> {
        let tournament = self.store.load(id)?;
        Ok(tournament.round_matches(round).to_vec())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn with_tournament<T>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        self.locks.with_lock(id, || {
            let mut tournament = self.store.load(id)?;
            let value = f(&mut tournament)?;
            self.store.save(&tournament)?;
            Ok(value)
        })
    }

    fn draw(&self, tournament: &mut Tournament) -> Result<RoundOutcome, EngineError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        advance_round(tournament, &mut *rng)
    }

    /// Try to move on once a result changed. Open matches are reported, not
    /// raised: the result itself must still be saved.
    fn after_result(&self, tournament: &mut Tournament) -> Result<Progress, ServiceError> {
        if !self.config.auto_advance {
            let pending = tournament
                .current_matches()
                .iter()
                .filter(|m| !m.is_completed())
                .count();
            return Ok(Progress::Pending { pending });
        }

        match self.draw(tournament) {
            Ok(RoundOutcome::Advanced { round, bye, .. }) => Ok(Progress::Advanced { round, bye }),
            Ok(RoundOutcome::Finished) => Ok(Progress::Finished),
            Err(EngineError::RoundIncomplete { pending, .. }) => Ok(Progress::Pending { pending }),
            Ok(RoundOutcome::EndedEarly { round, unpaired }) => {
                Ok(Progress::EndedEarly { round, unpaired })
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn ensure_owner(tournament: &Tournament, actor: UserId) -> Result<(), ServiceError> {
    if tournament.is_owner(actor) {
        Ok(())
    } else {
        Err(ServiceError::NotOwner(actor))
    }
}

fn ensure_started(tournament: &Tournament) -> Result<(), ServiceError> {
    if tournament.is_started() {
        Ok(())
    } else {
        Err(ServiceError::NotStarted(tournament.id))
    }
}

fn ensure_not_started(tournament: &Tournament) -> Result<(), ServiceError> {
    if tournament.is_started() {
        Err(ServiceError::AlreadyStarted(tournament.id))
    } else {
        Ok(())
    }
}
