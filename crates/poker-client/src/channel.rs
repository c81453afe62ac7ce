//! Transport channel state machine.
//!
//! Owns the connection lifecycle for one view: which room it targets, whether a
//! link is open, the single pending outbound message, and the reconnection
//! schedule. Uses the action pattern: every input returns the actions the
//! driver must execute. No I/O happens here.
//!
//! # State Machine
//!
//! ```text
//!            connect            link_opened
//! ┌────────┐ ─────────> ┌────────────┐ ─────────> ┌──────┐
//! │ Closed │            │ Connecting │            │ Open │
//! └────────┘ <───────── └────────────┘ <───────── └──────┘
//!      ^     disconnect     │    ^     link_closed    │
//!      │                    └────┘                    │
//!      │           link_failed / retry_elapsed        │
//!      └──────────────────────────────────────────────┘
//!                        disconnect
//! ```

use poker_proto::Session;

use crate::{
    Backoff, BackoffConfig, ChannelAction, ChannelEvent, ConnectionState, Endpoint, LinkId,
};

/// Channel configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Reconnection backoff.
    pub backoff: BackoffConfig,
}

/// Pure connection state machine.
///
/// # Invariants
///
/// - At most one pending message; a newer `send` replaces it.
/// - The pending message is flushed the moment the link opens and discarded on
///   `disconnect` or when switching endpoints.
/// - Only the current [`LinkId`] can change state. Late results from replaced
///   attempts are ignored.
/// - State changes are emitted exactly once each, never repeated.
#[derive(Debug, Clone)]
pub struct Channel {
    state: ConnectionState,
    endpoint: Option<Endpoint>,
    pending: Option<String>,
    link: LinkId,
    backoff: Backoff,
}

impl Channel {
    /// Create a closed channel.
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            state: ConnectionState::Closed,
            endpoint: None,
            pending: None,
            link: LinkId(0),
            backoff: Backoff::new(config.backoff),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Target endpoint while connecting or open.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Message waiting for the link to open.
    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Current link attempt.
    #[must_use]
    pub fn link(&self) -> LinkId {
        self.link
    }

    /// Target `endpoint`.
    ///
    /// No-op while already connecting to or open on the same endpoint. A
    /// connection to a different endpoint is closed first, and its pending
    /// message dropped.
    pub fn connect(&mut self, endpoint: Endpoint) -> Vec<ChannelAction> {
        if self.state != ConnectionState::Closed && self.endpoint.as_ref() == Some(&endpoint) {
            tracing::trace!(%endpoint, "connect ignored: already targeting endpoint");
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.state != ConnectionState::Closed {
            tracing::debug!(%endpoint, "switching endpoint");
            actions.push(ChannelAction::Close);
            self.pending = None;
        }

        self.backoff.reset();
        self.endpoint = Some(endpoint.clone());
        let link = self.next_link();
        actions.push(ChannelAction::Open { endpoint, link });
        actions.extend(self.transition(ConnectionState::Connecting));
        actions
    }

    /// Stop targeting any endpoint. Idempotent.
    ///
    /// Closes the link, cancels any scheduled retry and discards the pending
    /// message.
    pub fn disconnect(&mut self) -> Vec<ChannelAction> {
        self.pending = None;
        self.endpoint = None;
        if self.state == ConnectionState::Closed {
            return Vec::new();
        }

        // Invalidate in-flight opens and retries.
        self.next_link();
        let mut actions = vec![ChannelAction::Close];
        actions.extend(self.transition(ConnectionState::Closed));
        actions
    }

    /// Queue a text frame.
    ///
    /// Transmitted immediately when open. Otherwise it becomes the single
    /// pending message, replacing any older one.
    pub fn send(&mut self, text: String) -> Vec<ChannelAction> {
        if self.state == ConnectionState::Open {
            return vec![ChannelAction::Transmit(text)];
        }
        if self.pending.replace(text).is_some() {
            tracing::debug!("pending message replaced");
        }
        Vec::new()
    }

    /// Link attempt `link` succeeded.
    pub fn link_opened(&mut self, link: LinkId) -> Vec<ChannelAction> {
        if !self.is_current(link) || self.state != ConnectionState::Connecting {
            tracing::trace!(link = link.0, "stale link opened");
            return Vec::new();
        }

        self.backoff.reset();
        let mut actions = self.transition(ConnectionState::Open);
        if let Some(text) = self.pending.take() {
            actions.push(ChannelAction::Transmit(text));
        }
        actions
    }

    /// Link attempt `link` could not be opened.
    pub fn link_failed(&mut self, link: LinkId) -> Vec<ChannelAction> {
        if !self.is_current(link) || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.schedule_retry()
    }

    /// Link `link` closed without a `disconnect`.
    pub fn link_closed(&mut self, link: LinkId) -> Vec<ChannelAction> {
        if !self.is_current(link) || self.state == ConnectionState::Closed {
            return Vec::new();
        }
        let mut actions = self.transition(ConnectionState::Connecting);
        actions.extend(self.schedule_retry());
        actions
    }

    /// Retry timer for `link` fired.
    pub fn retry_elapsed(&mut self, link: LinkId) -> Vec<ChannelAction> {
        if !self.is_current(link) || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        let Some(endpoint) = self.endpoint.clone() else {
            return Vec::new();
        };
        let link = self.next_link();
        tracing::debug!(%endpoint, link = link.0, "retrying");
        vec![ChannelAction::Open { endpoint, link }]
    }

    /// Text frame arrived on `link`.
    ///
    /// Valid snapshots are emitted in arrival order. Malformed frames are
    /// logged and dropped without changing state.
    pub fn frame_received(&mut self, link: LinkId, text: &str) -> Vec<ChannelAction> {
        if !self.is_current(link) || self.state != ConnectionState::Open {
            return Vec::new();
        }
        match Session::decode(text) {
            Ok(session) => vec![ChannelAction::Emit(ChannelEvent::Snapshot(session))],
            Err(error) => {
                tracing::warn!(%error, len = text.len(), "dropping malformed frame");
                Vec::new()
            },
        }
    }

    fn is_current(&self, link: LinkId) -> bool {
        link == self.link
    }

    fn next_link(&mut self) -> LinkId {
        self.link = LinkId(self.link.0.wrapping_add(1));
        self.link
    }

    fn schedule_retry(&mut self) -> Vec<ChannelAction> {
        let delay = self.backoff.next_delay();
        tracing::info!(
            attempt = self.backoff.attempt(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "connection lost, scheduling retry"
        );
        vec![ChannelAction::ScheduleRetry { delay, link: self.link }]
    }

    fn transition(&mut self, to: ConnectionState) -> Vec<ChannelAction> {
        if self.state == to {
            return Vec::new();
        }
        tracing::debug!(from = %self.state, %to, "connection state");
        self.state = to;
        vec![ChannelAction::Emit(ChannelEvent::State(to))]
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new(ChannelConfig::default())
    }
}
