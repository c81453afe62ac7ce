//! Poker planning wire protocol.
//!
//! Every frame exchanged with the relay is a UTF-8 JSON text frame. Clients
//! send [`ClientMessage`] intents; the relay answers every mutation by
//! broadcasting the full [`Session`] snapshot to all participants of the room.
//! There are no partial-update frames and no acknowledgements.
//!
//! # Components
//!
//! - [`ClientMessage`]: outbound intents (`vote`, `reset`, `removeUser`,
//!   `reveal`)
//! - [`Session`]: inbound authoritative snapshot of a room
//! - [`intent`]: constructors mapping user actions to intents

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod intent;
mod message;
mod session;

pub use error::{ProtocolError, Result};
pub use message::ClientMessage;
pub use session::{Estimate, Session};
