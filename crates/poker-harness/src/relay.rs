//! Relay room semantics.
//!
//! Pure reference behavior of a relay room: how each intent mutates the
//! authoritative [`Session`]. [`SimRelay`](crate::SimRelay) wraps this with
//! links and broadcasting.

use poker_proto::{ClientMessage, Estimate, Session};

/// Authoritative state of one room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayRoom {
    session: Session,
}

impl RelayRoom {
    /// Empty room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply an intent.
    ///
    /// - `vote` upserts by username, appending on first sight
    /// - `reset` clears every estimate and hides them, in one step
    /// - `removeUser` drops the entry
    /// - `reveal` sets the reveal flag
    pub fn apply(&mut self, message: &ClientMessage) {
        let session = &mut self.session;
        match message {
            ClientMessage::Vote { username, estimate } => {
                match session.estimates.iter_mut().find(|e| &e.username == username) {
                    Some(entry) => entry.estimate.clone_from(estimate),
                    None => session.estimates.push(Estimate {
                        username: username.clone(),
                        estimate: estimate.clone(),
                    }),
                }
            },
            ClientMessage::Reset => {
                for entry in &mut session.estimates {
                    entry.estimate = None;
                }
                session.is_visible = false;
            },
            ClientMessage::RemoveUser { username } => {
                session.estimates.retain(|e| &e.username != username);
            },
            ClientMessage::Reveal { is_visible } => session.is_visible = *is_visible,
        }
    }
}
