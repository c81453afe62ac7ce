//! Outbound intent messages.

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Intent sent by a participant to the relay.
///
/// Serialized as a JSON object with a `type` discriminator, e.g.
/// `{"type":"vote","username":"alice","estimate":"5"}`.
///
/// # Invariants
///
/// - A `Vote` without an estimate is both "join without voting" and "retract
///   my vote". The relay keeps the entry with an absent estimate in both
///   cases, and the resulting snapshots are identical.
/// - `RemoveUser` deletes the entry entirely, which is a different snapshot
///   from a retracted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Cast, change, or retract a vote.
    Vote {
        /// Participant display name.
        username: String,
        /// Card value. `None` joins without voting or retracts a vote.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimate: Option<String>,
    },

    /// Clear every estimate and hide them, for all participants.
    Reset,

    /// Remove a participant's entry from the room.
    RemoveUser {
        /// Participant to remove.
        username: String,
    },

    /// Show or hide estimates for every participant.
    Reveal {
        /// New value of the room's reveal flag.
        #[serde(rename = "isVisible")]
        is_visible: bool,
    },
}

impl ClientMessage {
    /// Serialize into the text frame payload.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parse a text frame payload (relay side).
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }

    /// Wire discriminator, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vote { .. } => "vote",
            Self::Reset => "reset",
            Self::RemoveUser { .. } => "removeUser",
            Self::Reveal { .. } => "reveal",
        }
    }
}
