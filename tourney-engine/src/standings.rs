//! Standings - participants ordered by score
//!
//! Level 2 - Phases

use std::cmp::Ordering;

use serde::Serialize;
use tourney_core::{Outcome, Participant, ParticipantId, Tournament};

/// Standing of a participant in the tournament
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub participant: ParticipantId,
    /// Name with handle, as shown to users
    pub name: String,
    /// Total score (wins + byes + 0.5 * draws)
    pub score: f64,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    /// Completed matches
    pub played: u32,
    pub had_bye: bool,
    /// Buchholz score (sum of opponents' scores, for tiebreaking)
    pub buchholz: f64,
}

impl Standing {
    /// Win rate over completed matches
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            self.wins as f64 / self.played as f64
        }
    }
}

/// Compute standings sorted by score, then Buchholz (both descending), then
/// join order
pub fn compute_standings(tournament: &Tournament) -> Vec<Standing> {
    let mut standings: Vec<Standing> = tournament
        .participants
        .iter()
        .map(|p| standing_for(tournament, p))
        .collect();

    standings.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.buchholz.partial_cmp(&a.buchholz).unwrap_or(Ordering::Equal))
            .then_with(|| a.participant.cmp(&b.participant))
    });

    standings
}

fn standing_for(tournament: &Tournament, participant: &Participant) -> Standing {
    let (mut wins, mut draws, mut losses) = (0, 0, 0);
    for m in tournament.participant_matches(participant.id) {
        match m.outcome_for(participant.id) {
            Some(Outcome::Win) => wins += 1,
            Some(Outcome::Draw) => draws += 1,
            Some(Outcome::Loss) => losses += 1,
            None => {}
        }
    }

    Standing {
        participant: participant.id,
        name: participant.display_name(),
        score: participant.score,
        wins,
        draws,
        losses,
        played: wins + draws + losses,
        had_bye: tournament.had_bye(participant.id),
        buchholz: compute_buchholz(tournament, participant.id),
    }
}

/// Sum of the current scores of everyone `participant` has been paired with
fn compute_buchholz(tournament: &Tournament, participant: ParticipantId) -> f64 {
    tournament
        .opponents
        .opponents_of(participant)
        .filter_map(|opponent| tournament.participant(opponent))
        .map(|opponent| opponent.score)
        .sum()
}
