//! Line-oriented terminal client for poker planning.
//!
//! Commands are read from stdin one per line ([`commands`]) and the session
//! view is printed to stdout after every change ([`view`]). The session
//! itself runs in [`poker_app::Runtime`] over a WebSocket connection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod view;

pub use commands::{Command, CommandError, HELP, Overlay, parse};
pub use view::{TextDriver, qr, render};
