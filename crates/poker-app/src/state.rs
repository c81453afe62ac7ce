//! View-local state that never leaves the App.

use std::fmt;

use poker_proto::{ClientMessage, intent};

/// A destructive action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Clear every participant's vote.
    ClearVotes,
    /// Remove a participant from the room.
    RemoveUser(String),
}

impl Confirmation {
    /// Intent sent once confirmed.
    pub fn intent(&self) -> ClientMessage {
        match self {
            Self::ClearVotes => intent::reset(),
            Self::RemoveUser(username) => intent::remove_user(username.clone()),
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearVotes => f.write_str("Clear all votes? This cannot be undone."),
            Self::RemoveUser(username) => write!(f, "Remove {username} from the room?"),
        }
    }
}

/// App configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Scheme used to reach relays.
    pub scheme: poker_client::Scheme,
    /// Origin shareable links are rooted at.
    pub origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { scheme: poker_client::Scheme::default(), origin: DEFAULT_ORIGIN.to_owned() }
    }
}

/// Default origin for shareable links.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
