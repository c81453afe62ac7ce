//! Event loop for one session view.
//!
//! The Runtime coordinates:
//! - [`App`]: session view state machine
//! - [`TransportChannel`]: connection to the relay
//! - [`Driver`]: presentation
//!
//! Every input and channel event is handled to completion before the next
//! one is taken.

use poker_client::{ChannelConfig, ChannelEvent, Connector, TransportChannel};
use tokio::sync::mpsc;

use crate::{App, AppAction, Driver, UserInput};

/// Runtime that owns the App, the channel and the driver.
///
/// Dropping the runtime (including on every exit path of [`Runtime::run`])
/// drops the channel, which closes the connection.
pub struct Runtime<D: Driver> {
    app: App,
    driver: D,
    channel: TransportChannel,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime, spawning the channel actor on the current tokio
    /// runtime.
    pub fn new<C: Connector>(app: App, driver: D, connector: C, config: ChannelConfig) -> Self {
        let (channel, events) = TransportChannel::spawn(connector, config);
        Self { app, driver, channel, events }
    }

    /// The view state.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run until `inputs` ends or [`UserInput::Quit`] arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<UserInput>) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let actions = tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.app.handle_input(input),
                    None => break,
                },
                Some(event) = self.events.recv() => self.app.handle(event.into()),
            };

            if self.execute(actions)? {
                break;
            }
        }

        tracing::debug!("runtime stopped");
        Ok(())
    }

    /// Execute actions. Returns `true` if the application should quit.
    fn execute(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => return Ok(true),
                AppAction::Connect { endpoint } => self.channel.connect(endpoint),
                AppAction::Disconnect => self.channel.disconnect(),
                AppAction::Send(message) => {
                    tracing::debug!(kind = message.kind(), "sending intent");
                    self.channel.send(&message);
                },
            }
        }
        Ok(false)
    }
}
