//! Intent builder.
//!
//! Pure constructors for the outbound messages a user action produces.
//! Validation (membership, blank names) happens before these are called, by
//! disabling the triggering action.

use crate::ClientMessage;

/// Vote `estimate` as `username`, or join/retract when `estimate` is `None`.
pub fn vote(username: impl Into<String>, estimate: Option<&str>) -> ClientMessage {
    ClientMessage::Vote { username: username.into(), estimate: estimate.map(str::to_owned) }
}

/// Clear all votes and hide estimates for every participant.
pub fn reset() -> ClientMessage {
    ClientMessage::Reset
}

/// Remove `username`'s entry from the room.
pub fn remove_user(username: impl Into<String>) -> ClientMessage {
    ClientMessage::RemoveUser { username: username.into() }
}

/// Set the room's reveal flag.
pub fn reveal(is_visible: bool) -> ClientMessage {
    ClientMessage::Reveal { is_visible }
}
