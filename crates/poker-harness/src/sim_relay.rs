//! In-process relay for simulation tests.
//!
//! `SimRelay` keeps rooms by id, applies decoded intents to each room's
//! [`RelayRoom`] and broadcasts the full snapshot to every link in the room
//! after each one, just like the real relay. Each link also gets the current
//! snapshot once when it attaches.
//!
//! Tests can forcibly drop every link of a room and make the relay refuse new
//! connections, to exercise the channel's reconnection.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use poker_client::{Link, TransportError};
use poker_proto::{ClientMessage, Session};
use tokio::sync::mpsc;

use crate::RelayRoom;

#[derive(Debug, Default)]
struct RoomEntry {
    room: RelayRoom,
    /// Link id -> sender feeding that link's inbound queue.
    links: HashMap<u64, mpsc::UnboundedSender<String>>,
}

impl RoomEntry {
    fn broadcast(&mut self) {
        let text = match self.room.session().encode() {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(%error, "cannot encode snapshot");
                return;
            },
        };
        self.links.retain(|_, link| link.send(text.clone()).is_ok());
    }
}

#[derive(Debug, Default)]
struct RelayState {
    rooms: HashMap<String, RoomEntry>,
    refusing: bool,
    next_link: u64,
}

/// Shared in-process relay. Clones share the same rooms.
#[derive(Debug, Clone, Default)]
pub struct SimRelay {
    state: Arc<Mutex<RelayState>>,
}

impl SimRelay {
    /// Empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new link to `room_id`.
    ///
    /// The room is created on first attach. The link receives the current
    /// snapshot immediately. Must be called within a tokio runtime.
    pub fn attach(&self, room_id: &str) -> Result<Link, TransportError> {
        let (to_relay_tx, mut to_relay_rx) = mpsc::unbounded_channel::<String>();
        let (to_view_tx, to_view_rx) = mpsc::unbounded_channel::<String>();

        let link_id = {
            let mut state = self.lock();
            if state.refusing {
                return Err(TransportError::Connection(format!("relay refused {room_id}")));
            }
            state.next_link += 1;
            let link_id = state.next_link;

            let entry = state.rooms.entry(room_id.to_owned()).or_default();
            let greeting = entry
                .room
                .session()
                .encode()
                .map_err(|e| TransportError::Stream(e.to_string()))?;
            // Receiver is returned below, cannot be closed yet.
            let _ = to_view_tx.send(greeting);
            entry.links.insert(link_id, to_view_tx);
            link_id
        };
        tracing::debug!(room = room_id, link = link_id, "link attached");

        let relay = self.clone();
        let room_id = room_id.to_owned();
        tokio::spawn(async move {
            while let Some(text) = to_relay_rx.recv().await {
                if !relay.deliver(&room_id, link_id, &text) {
                    break;
                }
            }
            relay.detach(&room_id, link_id);
        });

        Ok(Link::new(to_relay_tx, to_view_rx))
    }

    /// Drop every link of `room_id`. Views see their link close.
    pub fn drop_links(&self, room_id: &str) {
        if let Some(entry) = self.lock().rooms.get_mut(room_id) {
            tracing::debug!(room = room_id, links = entry.links.len(), "dropping links");
            entry.links.clear();
        }
    }

    /// Refuse (or accept again) new links.
    pub fn set_refusing(&self, refusing: bool) {
        self.lock().refusing = refusing;
    }

    /// Current snapshot of `room_id`.
    pub fn snapshot(&self, room_id: &str) -> Option<Session> {
        self.lock().rooms.get(room_id).map(|entry| entry.room.session().clone())
    }

    /// Number of links attached to `room_id`.
    pub fn link_count(&self, room_id: &str) -> usize {
        self.lock().rooms.get(room_id).map_or(0, |entry| entry.links.len())
    }

    /// Apply one frame from `link_id`. Returns `false` once the link is gone.
    fn deliver(&self, room_id: &str, link_id: u64, text: &str) -> bool {
        let mut state = self.lock();
        let Some(entry) = state.rooms.get_mut(room_id) else {
            return false;
        };
        if !entry.links.contains_key(&link_id) {
            return false;
        }

        match ClientMessage::decode(text) {
            Ok(message) => {
                tracing::trace!(room = room_id, link = link_id, kind = message.kind(), "intent");
                entry.room.apply(&message);
                entry.broadcast();
            },
            Err(error) => tracing::warn!(%error, room = room_id, "relay dropped malformed intent"),
        }
        true
    }

    fn detach(&self, room_id: &str, link_id: u64) {
        if let Some(entry) = self.lock().rooms.get_mut(room_id) {
            entry.links.remove(&link_id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use poker_proto::{Estimate, intent};

    use super::*;

    #[tokio::test]
    async fn attach_creates_room_and_registers_link() {
        let relay = SimRelay::new();
        let _link = relay.attach("r").unwrap();

        assert_eq!(relay.link_count("r"), 1);
        assert_eq!(relay.snapshot("r"), Some(Session::default()));
        assert_eq!(relay.snapshot("other"), None);
    }

    #[test]
    fn refusing_relay_rejects_attach() {
        let relay = SimRelay::new();
        relay.set_refusing(true);
        assert!(relay.attach("r").is_err());
        assert_eq!(relay.link_count("r"), 0);
    }

    #[tokio::test]
    async fn deliver_applies_and_broadcasts() {
        let relay = SimRelay::new();
        let _link = relay.attach("r").unwrap();

        let text = intent::vote("alice", Some("2")).encode().unwrap();
        assert!(relay.deliver("r", 1, &text));
        assert_eq!(relay.snapshot("r").unwrap().estimates, vec![Estimate::voted("alice", "2")]);

        relay.drop_links("r");
        assert!(!relay.deliver("r", 1, &text));
        assert_eq!(relay.link_count("r"), 0);
    }
}
