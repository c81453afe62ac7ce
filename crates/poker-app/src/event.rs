//! Events the runtime feeds into the App.

use poker_client::{ChannelEvent, ConnectionState};
use poker_proto::Session;

/// Channel-originated events.
///
/// These are the only writers of the store's connection state and snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Transport state changed.
    ConnectionChanged(ConnectionState),

    /// The relay pushed a snapshot.
    SnapshotReceived(Session),
}

impl From<ChannelEvent> for AppEvent {
    fn from(event: ChannelEvent) -> Self {
        match event {
            ChannelEvent::State(state) => Self::ConnectionChanged(state),
            ChannelEvent::Snapshot(session) => Self::SnapshotReceived(session),
        }
    }
}
