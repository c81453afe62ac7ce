//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use poker_app::App;
use poker_client::{ConnectionState, SessionState};
use poker_proto::Session;

/// Snapshot of the entire system: every view plus the relay's room.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-view state snapshots.
    pub views: Vec<ViewSnapshot>,
    /// The relay's authoritative session. `None` if unknown.
    pub relay: Option<Session>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no views).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single view.
    pub fn single(view: ViewSnapshot) -> Self {
        Self { views: vec![view], relay: None }
    }

    /// Create a snapshot from several views.
    pub fn from_views(views: Vec<ViewSnapshot>) -> Self {
        Self { views, relay: None }
    }

    /// Attach the relay's session.
    #[must_use]
    pub fn with_relay(mut self, session: Option<Session>) -> Self {
        self.relay = session;
        self
    }
}

/// Snapshot of one view's observable state.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    /// Participant name.
    pub username: String,
    /// Transport state.
    pub connection: ConnectionState,
    /// Local estimate.
    pub my_estimate: Option<String>,
    /// Local reveal toggle.
    pub estimates_visible: bool,
    /// Last snapshot the view holds.
    pub session: Option<Session>,
}

impl ViewSnapshot {
    /// Capture an App's observable state.
    pub fn from_app(app: &App) -> Self {
        Self::from_state(&app.store().state())
    }

    /// Capture a store state.
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            username: state.username.trim().to_owned(),
            connection: state.connection,
            my_estimate: state.my_estimate.clone(),
            estimates_visible: state.estimates_visible,
            session: state.session.clone(),
        }
    }
}
