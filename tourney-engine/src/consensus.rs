//! Match consensus - resolving results from both players' opinions
//!
//! Level 2 - Phases
//!
//! `Scheduled -> Completed` when both opinions agree,
//! `Scheduled -> Conflicted` when they differ. A conflicted match is settled
//! by a corrected opinion or by the owner. Completed matches no longer accept
//! opinions; only the owner may overwrite them while the round is open.

use tourney_core::{
    EngineError, Match, MatchId, MatchResult, MatchState, ParticipantId, Side, Tournament,
};

/// Record `participant`'s opinion on a match of the current round.
///
/// Returns the match state after the opinion is applied.
pub fn report_opinion(
    tournament: &mut Tournament,
    match_id: MatchId,
    participant: ParticipantId,
    result: MatchResult,
) -> Result<MatchState, EngineError> {
    let round = tournament.current_round;
    let round_scored = tournament.scored_round >= round;

    let game = tournament
        .match_in_round_mut(round, match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;
    let side = game
        .side_of(participant)
        .ok_or(EngineError::ParticipantNotInMatch {
            match_id,
            participant,
        })?;

    if round_scored {
        return Err(EngineError::RoundClosed(round));
    }
    if game.is_completed() {
        return Err(EngineError::MatchClosed(match_id));
    }

    match side {
        Side::P1 => game.opinion_p1 = Some(result),
        Side::P2 => game.opinion_p2 = Some(result),
    }
    settle(game);

    tracing::debug!(
        "Match {} in round {}: {} reported {:?}, now {:?}",
        match_id,
        round,
        participant,
        result,
        game.state
    );
    Ok(game.state)
}

/// Force the result of a match of the current round, whatever its state.
///
/// Opinions already recorded are kept as reported.
pub fn set_result_by_admin(
    tournament: &mut Tournament,
    match_id: MatchId,
    result: MatchResult,
) -> Result<(), EngineError> {
    let round = tournament.current_round;
    let round_scored = tournament.scored_round >= round;

    let game = tournament
        .match_in_round_mut(round, match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;
    if round_scored {
        return Err(EngineError::RoundClosed(round));
    }

    game.result = Some(result);
    game.state = MatchState::Completed;

    tracing::info!("Match {} in round {} set to {:?} by owner", match_id, round, result);
    Ok(())
}

/// Move the match out of `Scheduled`/`Conflicted` once both opinions are in
fn settle(game: &mut Match) {
    let (Some(first), Some(second)) = (game.opinion_p1, game.opinion_p2) else {
        return;
    };

    if first == second {
        game.result = Some(first);
        game.state = MatchState::Completed;
    } else {
        game.result = None;
        game.state = MatchState::Conflicted;
        tracing::warn!(
            "Match {} conflicted: P1 says {:?}, P2 says {:?}",
            game.id,
            first,
            second
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_core::{ParticipantKind, TournamentSystem, UserId};

    const P0: ParticipantId = ParticipantId(0);
    const P1: ParticipantId = ParticipantId(1);
    const P2: ParticipantId = ParticipantId(2);

    /// Three participants, round 1 in progress with P0 vs P1
    fn round_in_progress() -> (Tournament, MatchId) {
        let mut t = Tournament::new(UserId(1), "test", TournamentSystem::Swiss);
        for i in 0..3 {
            t.add_participant(format!("p{i}"), None, ParticipantKind::User, vec![UserId(i)])
                .unwrap();
        }
        t.current_round = 1;
        t.total_rounds = 2;
        let id = t.allocate_match_id();
        t.rounds.insert(1, vec![Match::new(id, t.id, 1, P0, P1)]);
        (t, id)
    }

    fn current(t: &Tournament, id: MatchId) -> &Match {
        t.match_in_round(t.current_round, id).unwrap()
    }

    #[test]
    fn test_single_opinion_keeps_scheduled() {
        let (mut t, id) = round_in_progress();
        let state = report_opinion(&mut t, id, P0, MatchResult::P1Won).unwrap();

        assert_eq!(state, MatchState::Scheduled);
        assert_eq!(current(&t, id).opinion_p1, Some(MatchResult::P1Won));
        assert!(current(&t, id).result.is_none());
    }

    #[test]
    fn test_agreeing_opinions_complete_match() {
        let (mut t, id) = round_in_progress();
        report_opinion(&mut t, id, P0, MatchResult::Draw).unwrap();
        let state = report_opinion(&mut t, id, P1, MatchResult::Draw).unwrap();

        assert_eq!(state, MatchState::Completed);
        assert_eq!(current(&t, id).result, Some(MatchResult::Draw));
    }

    #[test]
    fn test_disagreeing_opinions_conflict() {
        let (mut t, id) = round_in_progress();
        report_opinion(&mut t, id, P0, MatchResult::P1Won).unwrap();
        let state = report_opinion(&mut t, id, P1, MatchResult::P2Won).unwrap();

        assert_eq!(state, MatchState::Conflicted);
        assert!(current(&t, id).result.is_none());
    }

    #[test]
    fn test_corrected_opinion_resolves_conflict() {
        let (mut t, id) = round_in_progress();
        report_opinion(&mut t, id, P0, MatchResult::P1Won).unwrap();
        report_opinion(&mut t, id, P1, MatchResult::P2Won).unwrap();
        let state = report_opinion(&mut t, id, P1, MatchResult::P1Won).unwrap();

        assert_eq!(state, MatchState::Completed);
        assert_eq!(current(&t, id).result, Some(MatchResult::P1Won));
    }

    #[test]
    fn test_completed_match_rejects_opinions() {
        let (mut t, id) = round_in_progress();
        report_opinion(&mut t, id, P0, MatchResult::P2Won).unwrap();
        report_opinion(&mut t, id, P1, MatchResult::P2Won).unwrap();

        let err = report_opinion(&mut t, id, P0, MatchResult::P1Won).unwrap_err();
        assert_eq!(err, EngineError::MatchClosed(id));
        assert_eq!(current(&t, id).result, Some(MatchResult::P2Won));
    }

    #[test]
    fn test_unknown_match() {
        let (mut t, _) = round_in_progress();
        let err = report_opinion(&mut t, MatchId(99), P0, MatchResult::Draw).unwrap_err();
        assert_eq!(err, EngineError::MatchNotFound(MatchId(99)));
        assert_eq!(
            set_result_by_admin(&mut t, MatchId(99), MatchResult::Draw).unwrap_err(),
            EngineError::MatchNotFound(MatchId(99))
        );
    }

    #[test]
    fn test_match_from_earlier_round_is_not_found() {
        let (mut t, id) = round_in_progress();
        t.current_round = 2;
        t.rounds.insert(2, Vec::new());
        let err = report_opinion(&mut t, id, P0, MatchResult::Draw).unwrap_err();
        assert_eq!(err, EngineError::MatchNotFound(id));
    }

    #[test]
    fn test_outsider_cannot_report() {
        let (mut t, id) = round_in_progress();
        let before = t.clone();
        let err = report_opinion(&mut t, id, P2, MatchResult::P1Won).unwrap_err();

        assert_eq!(
            err,
            EngineError::ParticipantNotInMatch {
                match_id: id,
                participant: P2
            }
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_admin_override_from_every_state() {
        // Scheduled
        let (mut t, id) = round_in_progress();
        set_result_by_admin(&mut t, id, MatchResult::P2Won).unwrap();
        assert_eq!(current(&t, id).state, MatchState::Completed);
        assert_eq!(current(&t, id).result, Some(MatchResult::P2Won));

        // Conflicted
        let (mut t, id) = round_in_progress();
        report_opinion(&mut t, id, P0, MatchResult::P1Won).unwrap();
        report_opinion(&mut t, id, P1, MatchResult::P2Won).unwrap();
        set_result_by_admin(&mut t, id, MatchResult::Draw).unwrap();
        assert_eq!(current(&t, id).state, MatchState::Completed);
        assert_eq!(current(&t, id).result, Some(MatchResult::Draw));

        // Completed
        let (mut t, id) = round_in_progress();
        report_opinion(&mut t, id, P0, MatchResult::P1Won).unwrap();
        report_opinion(&mut t, id, P1, MatchResult::P1Won).unwrap();
        set_result_by_admin(&mut t, id, MatchResult::P2Won).unwrap();
        assert_eq!(current(&t, id).state, MatchState::Completed);
        assert_eq!(current(&t, id).result, Some(MatchResult::P2Won));
    }

    #[test]
    fn test_scored_round_is_closed() {
        let (mut t, id) = round_in_progress();
        t.scored_round = 1;
        assert_eq!(
            report_opinion(&mut t, id, P0, MatchResult::Draw).unwrap_err(),
            EngineError::RoundClosed(1)
        );
        assert_eq!(
            set_result_by_admin(&mut t, id, MatchResult::Draw).unwrap_err(),
            EngineError::RoundClosed(1)
        );
    }
}
