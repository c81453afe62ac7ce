//! Application side-effects.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use poker_client::Endpoint;
use poker_proto::ClientMessage;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the view.
    Render,

    /// Quit the application.
    Quit,

    /// Connect the channel to a room.
    Connect {
        /// Relay room to target.
        endpoint: Endpoint,
    },

    /// Disconnect the channel.
    Disconnect,

    /// Send an intent to the relay.
    Send(ClientMessage),
}
