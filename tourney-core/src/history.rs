//! Opponent and bye histories

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ids::ParticipantId;

/// Unordered participant pair, stored as `(min, max)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: ParticipantId,
    high: ParticipantId,
}

impl PairKey {
    pub fn new(a: ParticipantId, b: ParticipantId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn members(self) -> (ParticipantId, ParticipantId) {
        (self.low, self.high)
    }

    /// The other member of the pair, if `participant` is one of them
    pub fn other(self, participant: ParticipantId) -> Option<ParticipantId> {
        if participant == self.low {
            Some(self.high)
        } else if participant == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Every pair of participants that has ever been matched.
///
/// Symmetric by construction and only ever grows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpponentHistory {
    pairs: FxHashSet<PairKey>,
}

impl OpponentHistory {
    /// Record a pairing. Returns false if the pair was already known.
    pub fn record(&mut self, a: ParticipantId, b: ParticipantId) -> bool {
        self.pairs.insert(PairKey::new(a, b))
    }

    pub fn have_met(&self, a: ParticipantId, b: ParticipantId) -> bool {
        self.pairs.contains(&PairKey::new(a, b))
    }

    /// Everyone `participant` has been matched against
    pub fn opponents_of(&self, participant: ParticipantId) -> impl Iterator<Item = ParticipantId> + '_ {
        self.pairs.iter().filter_map(move |pair| pair.other(participant))
    }

    pub fn iter(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Participants who have already received a bye
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByeHistory {
    participants: FxHashSet<ParticipantId>,
}

impl ByeHistory {
    pub fn record(&mut self, participant: ParticipantId) -> bool {
        self.participants.insert(participant)
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.participants.contains(&participant)
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
