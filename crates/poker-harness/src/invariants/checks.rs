//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use poker_client::ConnectionState;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// A snapshot never lists the same participant twice.
///
/// The relay upserts by name, so duplicates mean a vote was appended instead
/// of updated.
pub struct UniqueParticipants;

impl Invariant for UniqueParticipants {
    fn name(&self) -> &'static str {
        "unique_participants"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let sessions =
            state.views.iter().filter_map(|v| v.session.as_ref()).chain(state.relay.as_ref());
        for session in sessions {
            let mut seen = HashSet::new();
            for name in session.usernames() {
                if !seen.insert(name) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("{name} listed twice in {session:?}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A closed view holds no snapshot.
///
/// Stale state must not be displayed once the view has left the room.
pub struct NoSessionWhenClosed;

impl Invariant for NoSessionWhenClosed {
    fn name(&self) -> &'static str {
        "no_session_when_closed"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            if view.connection == ConnectionState::Closed && view.session.is_some() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("{} is closed but holds {:?}", view.username, view.session),
                });
            }
        }
        Ok(())
    }
}

/// Every open view shows the relay's session.
///
/// Only meaningful at quiescence, once every broadcast has been delivered.
pub struct SessionConvergence;

impl Invariant for SessionConvergence {
    fn name(&self) -> &'static str {
        "session_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(relay) = &state.relay else {
            return Ok(());
        };
        for view in state.views.iter().filter(|v| v.connection == ConnectionState::Open) {
            if view.session.as_ref() != Some(relay) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{} shows {:?}, relay has {relay:?}",
                        view.username, view.session
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Open members agree with their own entry and the reveal flag.
///
/// Only meaningful at quiescence.
pub struct LocalEstimateMatchesRelay;

impl Invariant for LocalEstimateMatchesRelay {
    fn name(&self) -> &'static str {
        "local_estimate_matches_relay"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in state.views.iter().filter(|v| v.connection == ConnectionState::Open) {
            let Some(session) = &view.session else {
                continue;
            };
            let Some(entry) = session.entry(&view.username) else {
                continue;
            };
            if entry.estimate != view.my_estimate || session.is_visible != view.estimates_visible {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{}: local ({:?}, visible {}) vs snapshot ({:?}, visible {})",
                        view.username,
                        view.my_estimate,
                        view.estimates_visible,
                        entry.estimate,
                        session.is_visible
                    ),
                });
            }
        }
        Ok(())
    }
}
