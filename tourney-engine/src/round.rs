//! Round controller - scoring, byes and advancing to the next round
//!
//! Level 1 - Orchestration and Level 3 - Steps

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tourney_core::{EngineError, Match, MatchId, MatchResult, ParticipantId, Round, Tournament};

use crate::pairing::{pair_round, Pairing};

/// Points for a win
pub const WIN_POINTS: f64 = 1.0;
/// Points for each side of a draw
pub const DRAW_POINTS: f64 = 0.5;
/// Points for sitting out a round
pub const BYE_POINTS: f64 = 1.0;

/// What an `advance_round` call did
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// A new round was drawn
    Advanced {
        round: Round,
        matches: Vec<MatchId>,
        bye: Option<ParticipantId>,
    },
    /// The final round is scored; nothing left to draw
    Finished,
    /// The current round was scored but `round` could not be paired without
    /// rematches, so the event ends here
    EndedEarly {
        round: Round,
        unpaired: Vec<ParticipantId>,
    },
}

/// Number of Swiss rounds for `participants` entrants: one round for two,
/// otherwise floor(log2 n) + 1. A heuristic, not a guarantee of a unique winner.
pub fn swiss_round_count(participants: usize) -> Round {
    match participants {
        0 | 1 => 0,
        2 => 1,
        n => n.ilog2() + 1,
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Finish the current round and draw the next one (Level 1 orchestration)
///
/// 1. Require every match of the current round to be completed
/// 2. Credit the round's results to participant scores (once per round)
/// 3. Stop if the final round has been reached
/// 4. Pair the next round; end the event early if the scan leaves anybody
///    unpaired
/// 5. Create the new matches, credit the bye
/// 6. Record the new pairs in the opponent history
///
/// On error the tournament is left exactly as it was.
pub fn advance_round<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RoundOutcome, EngineError> {
    ensure_round_complete(tournament)?;
    if tournament.is_finished() {
        return Ok(RoundOutcome::Finished);
    }

    let mut staged = tournament.clone();
    let outcome = advance_staged(&mut staged, rng)?;
    *tournament = staged;
    Ok(outcome)
}

fn advance_staged<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RoundOutcome, EngineError> {
    if tournament.scored_round < tournament.current_round {
        apply_round_scores(tournament)?;
        tournament.scored_round = tournament.current_round;
    }

    if tournament.current_round >= tournament.total_rounds {
        tracing::info!(
            "{} finished after {} round(s)",
            tournament.id,
            tournament.current_round
        );
        return Ok(RoundOutcome::Finished);
    }

    let round = tournament.current_round + 1;
    let pairing = pair_round(tournament, round, rng)?;
    if !pairing.is_complete() {
        tracing::warn!(
            "{}: no rematch-free pairing for round {} (unpaired: {:?}), ending after round {}",
            tournament.id,
            round,
            pairing.unpaired,
            tournament.current_round
        );
        tournament.total_rounds = tournament.current_round;
        return Ok(RoundOutcome::EndedEarly {
            round,
            unpaired: pairing.unpaired,
        });
    }

    tournament.current_round = round;
    let matches = create_matches(tournament, round, &pairing);
    if let Some(bye) = pairing.bye {
        credit_bye(tournament, bye)?;
    }
    for &(p1, p2) in &pairing.pairs {
        tournament.opponents.record(p1, p2);
    }

    tracing::info!(
        "{}: round {} drawn with {} match(es){}",
        tournament.id,
        round,
        matches.len(),
        pairing
            .bye
            .map(|p| format!(", bye for {p}"))
            .unwrap_or_default()
    );

    Ok(RoundOutcome::Advanced {
        round,
        matches,
        bye: pairing.bye,
    })
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn ensure_round_complete(tournament: &Tournament) -> Result<(), EngineError> {
    let pending = tournament
        .current_matches()
        .iter()
        .filter(|m| !m.is_completed())
        .count();

    if pending > 0 {
        return Err(EngineError::RoundIncomplete {
            round: tournament.current_round,
            pending,
        });
    }
    Ok(())
}

/// Credit every result of the current round
fn apply_round_scores(tournament: &mut Tournament) -> Result<(), EngineError> {
    let credits: Vec<(ParticipantId, f64)> = tournament
        .current_matches()
        .iter()
        .filter_map(|m| m.result.map(|result| (m, result)))
        .flat_map(|(m, result)| match result {
            MatchResult::P1Won => vec![(m.p1, WIN_POINTS)],
            MatchResult::P2Won => vec![(m.p2, WIN_POINTS)],
            MatchResult::Draw => vec![(m.p1, DRAW_POINTS), (m.p2, DRAW_POINTS)],
        })
        .collect();

    for (participant, points) in credits {
        add_score(tournament, participant, points)?;
    }
    Ok(())
}

fn create_matches(tournament: &mut Tournament, round: Round, pairing: &Pairing) -> Vec<MatchId> {
    let now = Utc::now();
    let matches: Vec<Match> = pairing
        .pairs
        .iter()
        .map(|&(p1, p2)| {
            let id = tournament.allocate_match_id();
            Match::new(id, tournament.id, round, p1, p2).scheduled(now)
        })
        .collect();

    let ids = matches.iter().map(|m| m.id).collect();
    tournament.rounds.insert(round, matches);
    ids
}

fn credit_bye(tournament: &mut Tournament, participant: ParticipantId) -> Result<(), EngineError> {
    add_score(tournament, participant, BYE_POINTS)?;
    tournament.byes.record(participant);
    Ok(())
}

fn add_score(
    tournament: &mut Tournament,
    participant: ParticipantId,
    points: f64,
) -> Result<(), EngineError> {
    let entry = tournament
        .participant_mut(participant)
        .ok_or(EngineError::UnknownParticipant(participant))?;
    entry.score += points;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{report_opinion, set_result_by_admin};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tourney_core::{MatchState, ParticipantKind, PairKey, TournamentSystem, UserId};

    fn tournament_with(n: usize, total_rounds: Round) -> Tournament {
        let mut t = Tournament::new(UserId(1), "test", TournamentSystem::Swiss);
        for i in 0..n {
            t.add_participant(
                format!("p{i}"),
                None,
                ParticipantKind::User,
                vec![UserId(100 + i as i64)],
            )
            .unwrap();
        }
        t.total_rounds = total_rounds;
        t
    }

    fn resolve_current_round(t: &mut Tournament, result: MatchResult) {
        let ids: Vec<MatchId> = t.current_matches().iter().map(|m| m.id).collect();
        for id in ids {
            set_result_by_admin(t, id, result).unwrap();
        }
    }

    fn score(t: &Tournament, p: ParticipantId) -> f64 {
        t.participant(p).unwrap().score
    }

    #[test]
    fn test_swiss_round_count() {
        assert_eq!(swiss_round_count(0), 0);
        assert_eq!(swiss_round_count(1), 0);
        assert_eq!(swiss_round_count(2), 1);
        assert_eq!(swiss_round_count(3), 2);
        assert_eq!(swiss_round_count(4), 3);
        assert_eq!(swiss_round_count(8), 4);
        assert_eq!(swiss_round_count(15), 4);
        assert_eq!(swiss_round_count(16), 5);
    }

    #[test]
    fn test_first_round_even() {
        let mut t = tournament_with(6, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = advance_round(&mut t, &mut rng).unwrap();

        assert_eq!(t.current_round, 1);
        assert_eq!(t.round_matches(1).len(), 3);
        assert!(t.byes.is_empty());
        assert!(matches!(outcome, RoundOutcome::Advanced { round: 1, bye: None, .. }));
        assert!(t.participants.iter().all(|p| p.score == 0.0));
    }

    #[test]
    fn test_fifteen_participants_first_round() {
        let mut t = tournament_with(15, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let outcome = advance_round(&mut t, &mut rng).unwrap();

        assert_eq!(t.round_matches(1).len(), 7);
        assert_eq!(t.byes.len(), 1);

        let RoundOutcome::Advanced { bye: Some(bye), matches, .. } = outcome else {
            panic!("expected a bye in round 1");
        };
        assert_eq!(matches.len(), 7);
        assert!(t.had_bye(bye));
        // Bye is credited when the round is drawn
        assert_eq!(score(&t, bye), BYE_POINTS);
        assert!(t.current_match(bye).is_none());
    }

    #[test]
    fn test_incomplete_round_changes_nothing() {
        let mut t = tournament_with(4, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        advance_round(&mut t, &mut rng).unwrap();

        let first = t.current_matches()[0].clone();
        set_result_by_admin(&mut t, first.id, MatchResult::P1Won).unwrap();

        let snapshot = t.clone();
        let err = advance_round(&mut t, &mut rng).unwrap_err();
        assert_eq!(err, EngineError::RoundIncomplete { round: 1, pending: 1 });
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_conflicted_match_blocks_advance() {
        let mut t = tournament_with(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        advance_round(&mut t, &mut rng).unwrap();

        let m = t.current_matches()[0].clone();
        report_opinion(&mut t, m.id, m.p1, MatchResult::P1Won).unwrap();
        report_opinion(&mut t, m.id, m.p2, MatchResult::P2Won).unwrap();
        assert_eq!(t.current_matches()[0].state, MatchState::Conflicted);

        assert!(matches!(
            advance_round(&mut t, &mut rng),
            Err(EngineError::RoundIncomplete { round: 1, pending: 1 })
        ));
    }

    #[test]
    fn test_four_participants_second_round() {
        let mut t = tournament_with(4, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        advance_round(&mut t, &mut rng).unwrap();

        let round_one: Vec<Match> = t.current_matches().to_vec();
        for m in &round_one {
            report_opinion(&mut t, m.id, m.p1, MatchResult::P1Won).unwrap();
            report_opinion(&mut t, m.id, m.p2, MatchResult::P1Won).unwrap();
        }

        let outcome = advance_round(&mut t, &mut rng).unwrap();
        assert!(matches!(outcome, RoundOutcome::Advanced { round: 2, bye: None, .. }));

        for m in &round_one {
            assert_eq!(score(&t, m.p1), WIN_POINTS);
            assert_eq!(score(&t, m.p2), 0.0);
        }

        let round_two = t.round_matches(2);
        assert_eq!(round_two.len(), 2);
        for m in round_two {
            assert!(round_one
                .iter()
                .all(|old| PairKey::new(old.p1, old.p2) != PairKey::new(m.p1, m.p2)));
        }
    }

    #[test]
    fn test_match_ids_unique_across_rounds() {
        // Any round-1 pairing of four leaves a 4-cycle, which the scan always covers
        let mut t = tournament_with(4, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        advance_round(&mut t, &mut rng).unwrap();
        resolve_current_round(&mut t, MatchResult::Draw);
        advance_round(&mut t, &mut rng).unwrap();

        let mut ids: Vec<MatchId> = t.rounds.values().flatten().map(|m| m.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(t.round_matches(2).iter().all(|m| m.round == 2));
    }

    #[test]
    fn test_draws_score_half_point_each() {
        let mut t = tournament_with(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        advance_round(&mut t, &mut rng).unwrap();
        resolve_current_round(&mut t, MatchResult::Draw);
        advance_round(&mut t, &mut rng).unwrap();

        assert!(t.participants.iter().all(|p| p.score == DRAW_POINTS));
    }

    #[test]
    fn test_advance_after_final_round_is_noop() {
        let mut t = tournament_with(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        advance_round(&mut t, &mut rng).unwrap();
        resolve_current_round(&mut t, MatchResult::P2Won);

        assert_eq!(advance_round(&mut t, &mut rng).unwrap(), RoundOutcome::Finished);
        assert!(t.is_finished());
        let total: f64 = t.participants.iter().map(|p| p.score).sum();
        assert_eq!(total, WIN_POINTS);

        let snapshot = t.clone();
        for _ in 0..3 {
            assert_eq!(advance_round(&mut t, &mut rng).unwrap(), RoundOutcome::Finished);
        }
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_no_rematches_over_whole_tournament() {
        let mut t = tournament_with(9, swiss_round_count(9));
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let results = [MatchResult::P1Won, MatchResult::P2Won, MatchResult::Draw];

        advance_round(&mut t, &mut rng).unwrap();
        loop {
            let ids: Vec<MatchId> = t.current_matches().iter().map(|m| m.id).collect();
            for id in ids {
                let result = results[rng.gen_range(0..results.len())];
                set_result_by_admin(&mut t, id, result).unwrap();
            }
            match advance_round(&mut t, &mut rng) {
                Ok(RoundOutcome::Finished) | Ok(RoundOutcome::EndedEarly { .. }) => break,
                Ok(RoundOutcome::Advanced { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        let mut seen = std::collections::HashSet::new();
        for m in t.rounds.values().flatten() {
            assert!(seen.insert(PairKey::new(m.p1, m.p2)), "rematch {} vs {}", m.p1, m.p2);
        }
        assert_eq!(seen.len(), t.opponents.len());
    }

    #[test]
    fn test_unpairable_round_ends_event_with_scores_credited() {
        let mut t = tournament_with(4, 3);
        let (p0, p1, p2, p3) = (
            ParticipantId(0),
            ParticipantId(1),
            ParticipantId(2),
            ParticipantId(3),
        );
        t.current_round = 1;
        let first = t.allocate_match_id();
        let second = t.allocate_match_id();
        t.rounds.insert(
            1,
            vec![
                Match::new(first, t.id, 1, p0, p2),
                Match::new(second, t.id, 1, p1, p3),
            ],
        );
        t.opponents.record(p0, p2);
        t.opponents.record(p1, p3);
        // Pretend P2 and P3 met before so the greedy scan corners them
        t.opponents.record(p2, p3);
        resolve_current_round(&mut t, MatchResult::P1Won);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = advance_round(&mut t, &mut rng).unwrap();

        assert_eq!(
            outcome,
            RoundOutcome::EndedEarly {
                round: 2,
                unpaired: vec![p2, p3]
            }
        );
        // Round 1 results are credited and no partial round 2 exists
        assert_eq!(t.scored_round, 1);
        assert_eq!(score(&t, p0), WIN_POINTS);
        assert_eq!(score(&t, p1), WIN_POINTS);
        assert_eq!(score(&t, p2), 0.0);
        assert!(t.round_matches(2).is_empty());
        assert_eq!(t.current_round, 1);
        assert_eq!(t.total_rounds, 1);
        assert!(t.is_finished());

        // Retrying is a no-op instead of failing again
        let snapshot = t.clone();
        assert_eq!(advance_round(&mut t, &mut rng).unwrap(), RoundOutcome::Finished);
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_single_elimination_is_unsupported() {
        let mut t = tournament_with(4, 2);
        t.system = TournamentSystem::SingleElimination;
        let snapshot = t.clone();

        let err = advance_round(&mut t, &mut ChaCha8Rng::seed_from_u64(1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnsupportedSystem(TournamentSystem::SingleElimination)
        );
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_odd_field_rotates_byes() {
        let mut t = tournament_with(5, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        advance_round(&mut t, &mut rng).unwrap();

        loop {
            resolve_current_round(&mut t, MatchResult::P1Won);
            match advance_round(&mut t, &mut rng) {
                Ok(RoundOutcome::Advanced { bye, .. }) => assert!(bye.is_some()),
                Ok(RoundOutcome::Finished) | Ok(RoundOutcome::EndedEarly { .. }) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        // Every drawn round handed its bye to somebody new
        assert_eq!(t.byes.len() as Round, t.current_round);
        for round in 1..=t.current_round {
            assert_eq!(t.round_matches(round).len(), 2);
        }
    }
}
