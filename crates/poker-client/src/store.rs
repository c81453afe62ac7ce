//! Session store.
//!
//! One [`SessionStore`] per view holds everything the view renders. Writers
//! are split by field group: connection state and snapshot come from channel
//! events, identity and the local estimate from user actions. Subscribers are
//! notified through a [`watch`] channel, and only when a value actually changed.

use std::sync::Arc;

use poker_proto::Session;
use tokio::sync::watch;

use crate::{ConnectionState, Deck};

/// Everything a session view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Relay host the room lives on.
    pub host_name: String,
    /// Current room. `None` until a room is created or opened.
    pub room_id: Option<String>,
    /// Human-readable room name.
    pub room_name: String,
    /// Local participant name.
    pub username: String,
    /// Active card deck.
    pub deck: Deck,
    /// Transport state.
    pub connection: ConnectionState,
    /// Local participant's current estimate.
    pub my_estimate: Option<String>,
    /// Local reveal toggle.
    pub estimates_visible: bool,
    /// Last snapshot from the relay.
    pub session: Option<Session>,
}

/// Shared, observable session state.
///
/// Cloning yields another handle to the same state. Every setter is a no-op
/// (and notifies nobody) when the value is unchanged, and returns whether the
/// state changed.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    /// Store holding `initial`.
    pub fn new(initial: SessionState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Receiver notified after every effective change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Set the relay host.
    pub fn set_host_name(&self, host_name: impl Into<String>) -> bool {
        self.set(|s| &mut s.host_name, host_name.into())
    }

    /// Set or clear the room id.
    pub fn set_room_id(&self, room_id: Option<String>) -> bool {
        self.set(|s| &mut s.room_id, room_id)
    }

    /// Set the room name.
    pub fn set_room_name(&self, room_name: impl Into<String>) -> bool {
        self.set(|s| &mut s.room_name, room_name.into())
    }

    /// Set the participant name.
    pub fn set_username(&self, username: impl Into<String>) -> bool {
        self.set(|s| &mut s.username, username.into())
    }

    /// Set the active deck.
    pub fn set_deck(&self, deck: Deck) -> bool {
        self.set(|s| &mut s.deck, deck)
    }

    /// Record the transport state.
    pub fn set_connection(&self, connection: ConnectionState) -> bool {
        self.set(|s| &mut s.connection, connection)
    }

    /// Set or clear the local estimate.
    pub fn set_my_estimate(&self, estimate: Option<String>) -> bool {
        self.set(|s| &mut s.my_estimate, estimate)
    }

    /// Set the local reveal toggle.
    pub fn set_estimates_visible(&self, visible: bool) -> bool {
        self.set(|s| &mut s.estimates_visible, visible)
    }

    /// Replace or discard the snapshot.
    pub fn set_session(&self, session: Option<Session>) -> bool {
        self.set(|s| &mut s.session, session)
    }

    /// Leave the room: room id, connection, local estimate, reveal toggle and
    /// snapshot go back to their defaults in one notification. Identity (host,
    /// room name, username, deck) is kept.
    pub fn reset_session(&self) -> bool {
        self.tx.send_if_modified(|state| {
            let reset = SessionState {
                host_name: std::mem::take(&mut state.host_name),
                room_name: std::mem::take(&mut state.room_name),
                username: std::mem::take(&mut state.username),
                deck: state.deck,
                ..SessionState::default()
            };
            let before = std::mem::replace(state, reset);
            before != *state
        })
    }

    /// Forget the local estimate and hide estimates, in one notification.
    pub fn clear_votes(&self) -> bool {
        self.tx.send_if_modified(|state| {
            let estimate = replace_if_changed(&mut state.my_estimate, None);
            let visible = replace_if_changed(&mut state.estimates_visible, false);
            estimate || visible
        })
    }

    fn set<T: PartialEq>(&self, field: impl FnOnce(&mut SessionState) -> &mut T, value: T) -> bool {
        self.tx.send_if_modified(|state| replace_if_changed(field(state), value))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use poker_proto::Estimate;

    use super::*;

    fn active_state() -> SessionState {
        SessionState {
            host_name: "alice".into(),
            room_id: Some("r1".into()),
            room_name: "Sprint 12".into(),
            username: "alice".into(),
            deck: Deck::TShirt,
            connection: ConnectionState::Open,
            my_estimate: Some("M".into()),
            estimates_visible: true,
            session: Some(Session { estimates: vec![Estimate::voted("alice", "M")], is_visible: true }),
        }
    }

    #[test]
    fn unchanged_value_does_not_notify() {
        let store = SessionStore::default();
        let mut rx = store.subscribe();

        assert!(store.set_username("bob"));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!store.set_username("bob"));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn reset_session_keeps_identity() {
        let store = SessionStore::new(active_state());
        assert!(store.reset_session());

        let state = store.state();
        assert_eq!(state.host_name, "alice");
        assert_eq!(state.room_name, "Sprint 12");
        assert_eq!(state.username, "alice");
        assert_eq!(state.deck, Deck::TShirt);
        assert_eq!(state.room_id, None);
        assert_eq!(state.connection, ConnectionState::Closed);
        assert_eq!(state.my_estimate, None);
        assert!(!state.estimates_visible);
        assert_eq!(state.session, None);

        assert!(!store.reset_session());
    }

    #[test]
    fn clear_votes_touches_only_estimate_and_toggle() {
        let store = SessionStore::new(active_state());
        assert!(store.clear_votes());

        let state = store.state();
        assert_eq!(state.my_estimate, None);
        assert!(!state.estimates_visible);
        assert_eq!(state.room_id.as_deref(), Some("r1"));
        assert!(state.session.is_some());

        assert!(!store.clear_votes());
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::default();
        let other = store.clone();
        other.set_deck(Deck::PowersOfTwo);
        assert_eq!(store.state().deck, Deck::PowersOfTwo);
    }
}
