//! Frontend-agnostic user input.

use poker_client::{Deck, RoomLink};

/// User intent, decoupled from any particular frontend (stdin commands, a
/// terminal UI, or a scripted test).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Change the relay host.
    SetHostName(String),
    /// Change the room name.
    SetRoomName(String),
    /// Change the participant name.
    SetUsername(String),
    /// Change the card deck.
    SetDeck(Deck),
    /// Open a room from a shared link.
    OpenLink(RoomLink),
    /// Create a fresh room and connect to it.
    CreateRoom,
    /// Join the connected room without voting.
    JoinRoom,
    /// Vote a card, or retract it if it is the current vote.
    Vote(String),
    /// Show or hide estimates for everyone.
    ToggleVisibility,
    /// Ask to clear every vote.
    RequestClearVotes,
    /// Ask to remove a participant.
    RequestRemoveUser(String),
    /// Accept the pending confirmation.
    Confirm,
    /// Reject the pending confirmation.
    Cancel,
    /// Leave the room.
    Disconnect,
    /// Render again without changing anything.
    Redraw,
    /// Quit the application.
    Quit,
}
