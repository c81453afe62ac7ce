//! Connector that attaches views to a [`SimRelay`].

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use poker_client::{Connector, Endpoint, Link, TransportError};

use crate::SimRelay;

/// [`Connector`] over an in-process [`SimRelay`].
///
/// The endpoint's room id selects the room; the host is ignored. Counts every
/// connection attempt, refused ones included.
#[derive(Debug, Clone)]
pub struct SimConnector {
    relay: SimRelay,
    attempts: Arc<AtomicUsize>,
}

impl SimConnector {
    /// Connector attaching to `relay`.
    pub fn new(relay: SimRelay) -> Self {
        Self { relay, attempts: Arc::new(AtomicUsize::new(0)) }
    }

    /// Connection attempts so far, across clones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for SimConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Link, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.relay.attach(&endpoint.room_id)
    }
}
