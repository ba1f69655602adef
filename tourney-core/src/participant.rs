//! Tournament participants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ParticipantId, TournamentId, UserId};

/// Whether a participant is a single user or a team of users
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    #[default]
    User,
    Team,
}

/// A seat in the tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub tournament_id: TournamentId,
    /// Display name
    pub name: String,
    /// Optional chat handle, without the leading `@`
    pub handle: Option<String>,
    pub kind: ParticipantKind,
    /// Users playing under this participant (one for `User`, several for `Team`)
    pub roster: Vec<UserId>,
    /// Knock-out flag, unused by Swiss
    pub eliminated: bool,
    /// Cumulative score (1.0 per win or bye, 0.5 per draw)
    pub score: f64,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Does this participant play on behalf of `user`?
    pub fn has_member(&self, user: UserId) -> bool {
        self.roster.contains(&user)
    }

    /// Name with the handle appended, e.g. `Alice (@alice)`
    pub fn display_name(&self) -> String {
        match &self.handle {
            Some(handle) => format!("{} (@{})", self.name, handle),
            None => self.name.clone(),
        }
    }
}
