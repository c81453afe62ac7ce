//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for the terminal view in simulation tests so the
//! same [`poker_app::Runtime`] loop runs in production and under test. Every
//! render is recorded, and optionally checked against an invariant registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use poker_app::{App, Driver};
use poker_client::SessionState;

use crate::invariants::{InvariantRegistry, SystemSnapshot, ViewSnapshot};

/// Render failed an invariant check.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invariant violated on render {render}: {violations}")]
pub struct SimDriverError {
    /// Index of the failing render.
    pub render: usize,
    /// Violations joined into one line.
    pub violations: String,
}

/// Simulation driver for deterministic testing.
///
/// Clones share the recorded frames, so a test can keep one handle while the
/// Runtime owns the other.
#[derive(Clone, Default)]
pub struct SimDriver {
    frames: Arc<Mutex<Vec<SessionState>>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Driver that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `registry` against the view on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.lock().len()
    }

    /// State at the most recent render.
    pub fn last_frame(&self) -> Option<SessionState> {
        self.lock().last().cloned()
    }

    /// Every rendered state, oldest first.
    pub fn frames(&self) -> Vec<SessionState> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SessionState>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let state = app.store().state();
        let render = {
            let mut frames = self.lock();
            frames.push(state.clone());
            frames.len()
        };

        if let Some(registry) = &self.invariants {
            let snapshot = SystemSnapshot::single(ViewSnapshot::from_state(&state));
            if let Err(violations) = registry.check_all(&snapshot) {
                let violations: Vec<_> = violations.iter().map(ToString::to_string).collect();
                return Err(SimDriverError { render, violations: violations.join("; ") });
            }
        }
        Ok(())
    }
}
