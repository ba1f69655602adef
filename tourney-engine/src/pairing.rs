//! Pairing - who plays whom in a round
//!
//! Level 2 - Phases and Level 3 - Steps
//!
//! Round 1 is a random permutation. Later Swiss rounds rank participants by
//! score (ties by join order) and greedily pair each one with the next
//! unpaired participant it has not met yet. The greedy scan never
//! backtracks, so it can leave participants unpaired even when a
//! rematch-free pairing of everybody exists; those are reported in
//! [`Pairing::unpaired`] rather than silently dropped.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use tourney_core::{
    ByeHistory, EngineError, OpponentHistory, Participant, ParticipantId, Round, Tournament,
    TournamentSystem,
};

/// Pairings computed for one round
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pairing {
    /// Matches to create, in scheduling order
    pub pairs: Vec<(ParticipantId, ParticipantId)>,
    /// Participant sitting out this round (odd participant count only)
    pub bye: Option<ParticipantId>,
    /// Participants the greedy scan could not place
    pub unpaired: Vec<ParticipantId>,
}

impl Pairing {
    /// Everybody except the bye has an opponent
    pub fn is_complete(&self) -> bool {
        self.unpaired.is_empty()
    }

    /// Every participant mentioned by this pairing
    pub fn seated(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.pairs
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .chain(self.bye)
    }
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Compute pairings for `round` of the tournament's system
pub fn pair_round<R: Rng + ?Sized>(
    tournament: &Tournament,
    round: Round,
    rng: &mut R,
) -> Result<Pairing, EngineError> {
    match tournament.system {
        TournamentSystem::SingleElimination => {
            Err(EngineError::UnsupportedSystem(tournament.system))
        }
        TournamentSystem::Swiss if round <= 1 => {
            let ids: Vec<ParticipantId> = tournament.participant_ids().collect();
            Ok(pair_first_round(&ids, rng))
        }
        TournamentSystem::Swiss => Ok(pair_swiss(
            &tournament.participants,
            &tournament.opponents,
            &tournament.byes,
        )),
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Random pairing: shuffle, then pair neighbours. With an odd count the last
/// entry of the permutation gets the bye.
pub fn pair_first_round<R: Rng + ?Sized>(participants: &[ParticipantId], rng: &mut R) -> Pairing {
    let mut order = participants.to_vec();
    order.shuffle(rng);

    let bye = if order.len() % 2 == 1 { order.pop() } else { None };
    let pairs = order.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();

    Pairing {
        pairs,
        bye,
        unpaired: Vec::new(),
    }
}

/// Swiss pairing over participants given in join order
pub fn pair_swiss(
    participants: &[Participant],
    history: &OpponentHistory,
    byes: &ByeHistory,
) -> Pairing {
    let bye = if participants.len() % 2 == 1 {
        select_bye(participants, byes)
    } else {
        None
    };

    let ranked = rank_by_score(participants);
    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    let mut paired: FxHashSet<ParticipantId> = FxHashSet::default();

    for (i, &p1) in ranked.iter().enumerate() {
        if Some(p1) == bye || paired.contains(&p1) {
            continue;
        }

        // First lower-ranked participant p1 has not met yet
        let partner = ranked[i + 1..].iter().copied().find(|&p2| {
            Some(p2) != bye && !paired.contains(&p2) && !history.have_met(p1, p2)
        });

        if let Some(p2) = partner {
            pairs.push((p1, p2));
            paired.insert(p1);
            paired.insert(p2);
        }
    }

    let unpaired: Vec<ParticipantId> = ranked
        .iter()
        .copied()
        .filter(|&p| Some(p) != bye && !paired.contains(&p))
        .collect();

    if !unpaired.is_empty() {
        tracing::debug!("Greedy Swiss scan left {} participant(s) unpaired", unpaired.len());
    }

    Pairing {
        pairs,
        bye,
        unpaired,
    }
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// Participant ids ordered by score (descending), ties by join order
fn rank_by_score(participants: &[Participant]) -> Vec<ParticipantId> {
    let mut ranked: Vec<&Participant> = participants.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.into_iter().map(|p| p.id).collect()
}

/// Lowest scorer without a previous bye, earliest joined on ties.
/// Falls back to all participants once everybody has had a bye.
fn select_bye(participants: &[Participant], byes: &ByeHistory) -> Option<ParticipantId> {
    lowest_scorer(participants.iter().filter(|p| !byes.contains(p.id)))
        .or_else(|| lowest_scorer(participants.iter()))
}

fn lowest_scorer<'a>(candidates: impl Iterator<Item = &'a Participant>) -> Option<ParticipantId> {
    let mut best: Option<&Participant> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.score >= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|p| p.id)
}
