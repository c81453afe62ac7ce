//! Inbound session snapshot.
//!
//! The relay pushes a [`Session`] wholesale after every mutation. Clients never
//! compute deltas: each snapshot replaces the previous one.

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Authoritative state of a room.
///
/// Wire shape: `{"estimates":[{"username":"a","estimate":"3"}],"isVisible":false}`.
///
/// # Invariants
///
/// - Entries are ordered by arrival and unique by `username`; the relay
///   updates an existing entry on resubmission instead of appending.
/// - `is_visible` gates display only. Estimates are transmitted regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Vote entries in arrival order.
    pub estimates: Vec<Estimate>,
    /// Reveal flag: are estimates visible to every participant.
    pub is_visible: bool,
}

/// One participant's vote entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// Participant display name.
    pub username: String,
    /// Card value. `None` if present without a vote (or votes were cleared).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
}

impl Estimate {
    /// Entry for a participant who has not voted.
    pub fn absent(username: impl Into<String>) -> Self {
        Self { username: username.into(), estimate: None }
    }

    /// Entry carrying a vote.
    pub fn voted(username: impl Into<String>, estimate: impl Into<String>) -> Self {
        Self { username: username.into(), estimate: Some(estimate.into()) }
    }
}

impl Session {
    /// Parse an inbound text frame.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }

    /// Serialize into a text frame (relay side).
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Entry for `username`, if present.
    pub fn entry(&self, username: &str) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.username == username)
    }

    /// Participant names in arrival order.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.estimates.iter().map(|e| e.username.as_str())
    }

    /// Number of entries carrying a vote.
    pub fn vote_count(&self) -> usize {
        self.estimates.iter().filter(|e| e.estimate.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn decode_relay_snapshot() {
        let text = r#"{"estimates":[{"username":"alice","estimate":"5"},{"username":"bob"}],"isVisible":true}"#;
        let session = Session::decode(text).unwrap();

        assert_eq!(session.estimates, vec![Estimate::voted("alice", "5"), Estimate::absent("bob")]);
        assert!(session.is_visible);
        assert_eq!(session.vote_count(), 1);
    }

    #[test]
    fn decode_null_estimate_is_absent() {
        let text = r#"{"estimates":[{"username":"alice","estimate":null}],"isVisible":false}"#;
        let session = Session::decode(text).unwrap();
        assert_eq!(session.entry("alice"), Some(&Estimate::absent("alice")));
    }

    #[test]
    fn decode_rejects_missing_reveal_flag() {
        assert!(Session::decode(r#"{"estimates":[]}"#).is_err());
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(Session::decode("not json").is_err());
        assert!(Session::decode("").is_err());
    }

    #[test]
    fn encode_empty_session() {
        assert_snapshot!(Session::default().encode().unwrap(), @r#"{"estimates":[],"isVisible":false}"#);
    }

    #[test]
    fn usernames_preserve_arrival_order() {
        let session = Session {
            estimates: vec![Estimate::absent("zed"), Estimate::voted("amy", "8")],
            is_visible: false,
        };
        assert_eq!(session.usernames().collect::<Vec<_>>(), vec!["zed", "amy"]);
    }
}
