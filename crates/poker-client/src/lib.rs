//! Client
//!
//! Realtime session core for poker planning. Keeps one view in sync with a
//! room hosted on a relay: the relay pushes a full session snapshot after
//! every change, and the client sends small intent messages back.
//!
//! # Architecture
//!
//! The connection lifecycle is a Sans-IO state machine ([`Channel`]) that
//! returns [`ChannelAction`]s. [`TransportChannel`] drives it on a tokio task
//! with any [`Connector`]; the view only ever sees [`ChannelEvent`]s.
//!
//! # Components
//!
//! - [`Channel`]: connection state, pending message, reconnection schedule
//! - [`TransportChannel`]: actor task executing channel actions
//! - [`SessionStore`]: observable per-view state
//! - [`Reconciler`]: snapshot facts and the "votes cleared" edge detector
//! - [`RoomLink`]: shareable room links
//! - [`Deck`]: card decks
//!
//! # Transport (optional)
//!
//! With the `websocket` feature (default), [`websocket::WebSocketConnector`]
//! connects to real relays.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backoff;
mod channel;
mod deck;
mod endpoint;
mod event;
mod link;
mod reconcile;
mod store;
mod transport;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use backoff::{Backoff, BackoffConfig, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY};
pub use channel::{Channel, ChannelConfig};
pub use deck::{Deck, ParseDeckError};
pub use endpoint::{Endpoint, Scheme};
pub use event::{ChannelAction, ChannelEvent, ConnectionState, LinkId};
pub use link::{LinkError, ROUTE, RoomLink};
pub use reconcile::{Reconciler, SessionFacts, is_estimates_cleared, is_member, own_entry};
pub use store::{SessionState, SessionStore};
pub use transport::{Connector, Link, TransportChannel, TransportError};
