//! Join requests awaiting the owner's decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tourney_core::{TournamentId, UserId};

/// A user's request to join a tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    /// Name the participant will play under
    pub name: String,
    pub handle: Option<String>,
    /// Free-text message to the owner
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    pub fn new(tournament_id: TournamentId, user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            tournament_id,
            user_id,
            name: name.into(),
            handle: None,
            text: String::new(),
            submitted_at: Utc::now(),
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}
