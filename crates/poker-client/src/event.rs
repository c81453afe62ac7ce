//! Channel events and actions.

use std::{fmt, time::Duration};

use poker_proto::Session;

use crate::Endpoint;

/// Connection state as observed by the view.
///
/// ```text
/// Closed --connect--> Connecting --link opened--> Open
/// Open --unexpected close--> Connecting
/// any --disconnect--> Closed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No connection and no retry scheduled.
    #[default]
    Closed,
    /// Opening a link, or waiting to retry one.
    Connecting,
    /// Link established; intents are transmitted immediately.
    Open,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
        })
    }
}

/// Identifies one link attempt.
///
/// Every open attempt gets a fresh id. Results from older attempts are
/// recognised as stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

/// Events the channel delivers to its consumer, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Connection state changed.
    State(ConnectionState),
    /// A session snapshot arrived from the relay.
    Snapshot(Session),
}

/// Actions returned by the [`Channel`](crate::Channel) state machine.
///
/// The driver ([`TransportChannel`](crate::TransportChannel) or a test)
/// executes these:
/// - `Open`: start a link attempt tagged with `link`
/// - `Close`: drop the current link, if any
/// - `Transmit`: write a text frame on the open link
/// - `ScheduleRetry`: call `retry_elapsed(link)` after `delay`
/// - `Emit`: hand the event to the consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAction {
    /// Open a link to `endpoint`.
    Open {
        /// Where to connect.
        endpoint: Endpoint,
        /// Attempt id to report back with.
        link: LinkId,
    },

    /// Close the current link.
    Close,

    /// Send a text frame on the open link.
    Transmit(String),

    /// Wake the channel after `delay`.
    ScheduleRetry {
        /// Backoff delay.
        delay: Duration,
        /// Attempt id the retry belongs to.
        link: LinkId,
    },

    /// Deliver an event to the consumer.
    Emit(ChannelEvent),
}
