//! Properties every participant view must satisfy.
//!
//! Each check reads a [`SystemSnapshot`]: the observable state of one or
//! more views plus, when known, the relay's authoritative session for their
//! room. Some checks hold after every step; the rest only once each
//! broadcast has been delivered, which is why there are two registries.
//!
//! ```ignore
//! let snapshot = SystemSnapshot::single(ViewSnapshot::from_app(&app)).with_relay(Some(session));
//! InvariantRegistry::quiescent().assert_all(&snapshot, "after vote");
//! ```

mod checks;
mod snapshot;

pub use checks::{
    LocalEstimateMatchesRelay, NoSessionWhenClosed, SessionConvergence, UniqueParticipants,
};
pub use snapshot::{SystemSnapshot, ViewSnapshot};
use thiserror::Error;

/// Outcome of a single check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{invariant}: {message}")]
pub struct Violation {
    /// Name of the check that failed.
    pub invariant: &'static str,
    /// Which view and what it showed.
    pub message: String,
}

/// A property checked against a [`SystemSnapshot`].
pub trait Invariant: Send + Sync {
    /// Short name used in violation reports.
    fn name(&self) -> &'static str;

    /// Check the snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Ordered set of invariants.
#[derive(Default)]
pub struct InvariantRegistry {
    checks: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// No checks at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that hold at any point, even with broadcasts in flight:
    /// [`UniqueParticipants`] and [`NoSessionWhenClosed`].
    pub fn standard() -> Self {
        Self::new().with(UniqueParticipants).with(NoSessionWhenClosed)
    }

    /// [`standard`](Self::standard) plus [`SessionConvergence`] and
    /// [`LocalEstimateMatchesRelay`], for when nothing is left to deliver.
    pub fn quiescent() -> Self {
        Self::standard().with(SessionConvergence).with(LocalEstimateMatchesRelay)
    }

    /// Append a check.
    #[must_use]
    pub fn with<I: Invariant + 'static>(mut self, invariant: I) -> Self {
        self.checks.push(Box::new(invariant));
        self
    }

    /// Names of the registered checks, in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|check| check.name())
    }

    /// Run every check and collect each failure.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.checks.iter().filter_map(|check| check.check(state).err()).collect();
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Panic with every failure, labelled with `context`. Test-only helper.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let lines: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("invariants broken {context}:\n  {}", lines.join("\n  "));
        }
    }

    /// Number of checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when no check is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
