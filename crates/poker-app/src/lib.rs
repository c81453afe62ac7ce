//! Application layer for poker planning
//!
//! Pure session view state machine and a generic runtime, so the same
//! orchestration runs in the CLI and in simulation tests.
//!
//! # Components
//!
//! - [`App`]: session view state machine (validation, confirmation,
//!   reconciliation)
//! - [`Driver`]: trait for presentation
//! - [`Runtime`]: event loop joining App, channel and Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::UserInput;
pub use runtime::Runtime;
pub use state::{AppConfig, Confirmation, DEFAULT_ORIGIN};
