//! Simulation harness for poker planning sessions.
//!
//! An in-process relay that speaks the same JSON frames as a real one, and a
//! [`Connector`](poker_client::Connector) that attaches views to it. Tests run
//! the production channel, App and Runtime against it, drop links and refuse
//! connections to exercise reconnection, and check invariants across views.
//! [`SimView`] bundles one participant's Runtime with a recording
//! [`SimDriver`].
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! view invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod relay;
pub mod sim_connector;
pub mod sim_driver;
pub mod sim_relay;
pub mod sim_view;

pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, LocalEstimateMatchesRelay, NoSessionWhenClosed,
    SessionConvergence, SystemSnapshot, UniqueParticipants, ViewSnapshot, Violation,
};
pub use relay::RelayRoom;
pub use sim_connector::SimConnector;
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_relay::SimRelay;
pub use sim_view::{SimView, SimViewError};
