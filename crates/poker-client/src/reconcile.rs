//! Session reconciler.
//!
//! Derives facts about the local participant from a snapshot and detects when
//! the room's votes have been cleared, so the view can drop its local
//! estimate and reveal toggle.

use poker_proto::{Estimate, Session};

/// Whether `username` has an entry in `session`.
pub fn is_member(session: &Session, username: &str) -> bool {
    session.entry(username).is_some()
}

/// Every estimate absent and estimates hidden.
///
/// An empty first load and the snapshot after a reset look the same; both
/// count as cleared.
pub fn is_estimates_cleared(session: &Session) -> bool {
    !session.is_visible && session.estimates.iter().all(|e| e.estimate.is_none())
}

/// The participant's own entry.
pub fn own_entry<'a>(session: &'a Session, username: &str) -> Option<&'a Estimate> {
    session.entry(username)
}

/// Per-snapshot facts about the local participant, derived in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFacts {
    /// The participant has an entry.
    pub is_member: bool,
    /// Nobody has voted and estimates are hidden.
    pub estimates_cleared: bool,
    /// The participant's estimate as the relay knows it. `None` if absent or
    /// not a member.
    pub own_estimate: Option<String>,
}

impl SessionFacts {
    /// Derive facts for `username`.
    pub fn derive(session: &Session, username: &str) -> Self {
        let own = own_entry(session, username);
        Self {
            is_member: own.is_some(),
            estimates_cleared: is_estimates_cleared(session),
            own_estimate: own.and_then(|e| e.estimate.clone()),
        }
    }
}

/// Edge detector for the "estimates cleared" condition.
///
/// Starts as "not cleared", so the first cleared snapshot after a
/// (re)connect fires as well.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    cleared: bool,
}

impl Reconciler {
    /// Fresh detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a snapshot. Returns `true` when cleared went from false to true.
    pub fn observe(&mut self, session: &Session) -> bool {
        let cleared = is_estimates_cleared(session);
        let fired = cleared && !self.cleared;
        self.cleared = cleared;
        fired
    }

    /// Forget history, e.g. when the view connects or leaves a room.
    pub fn reset(&mut self) {
        self.cleared = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(estimates: Vec<Estimate>, is_visible: bool) -> Session {
        Session { estimates, is_visible }
    }

    #[test]
    fn membership_is_by_name() {
        let s = session(vec![Estimate::absent("alice"), Estimate::voted("bob", "3")], false);
        assert!(is_member(&s, "alice"));
        assert!(is_member(&s, "bob"));
        assert!(!is_member(&s, "carol"));
        assert!(!is_member(&s, "Alice"));
    }

    #[test]
    fn cleared_requires_no_votes_and_hidden() {
        assert!(is_estimates_cleared(&session(vec![], false)));
        assert!(is_estimates_cleared(&session(vec![Estimate::absent("a")], false)));
        assert!(!is_estimates_cleared(&session(vec![Estimate::absent("a")], true)));
        assert!(!is_estimates_cleared(&session(vec![Estimate::voted("a", "1")], false)));
    }

    #[test]
    fn facts_for_member_and_stranger() {
        let s = session(vec![Estimate::voted("bob", "8")], false);
        assert_eq!(SessionFacts::derive(&s, "bob"), SessionFacts {
            is_member: true,
            estimates_cleared: false,
            own_estimate: Some("8".into()),
        });
        assert_eq!(SessionFacts::derive(&s, "eve"), SessionFacts {
            is_member: false,
            estimates_cleared: false,
            own_estimate: None,
        });
    }

    #[test]
    fn detector_fires_on_rising_edge_only() {
        let mut reconciler = Reconciler::new();
        let voted = session(vec![Estimate::voted("a", "5")], false);
        let cleared = session(vec![Estimate::absent("a")], false);

        assert!(reconciler.observe(&cleared));
        assert!(!reconciler.observe(&cleared));
        assert!(!reconciler.observe(&voted));
        assert!(reconciler.observe(&cleared));
    }

    #[test]
    fn detector_fires_again_after_reset() {
        let mut reconciler = Reconciler::new();
        let cleared = session(vec![], false);
        reconciler.observe(&cleared);
        reconciler.reset();
        assert!(reconciler.observe(&cleared));
    }
}
