//! One participant's view running against a [`SimRelay`].
//!
//! Wires the production [`Runtime`] to a [`SimConnector`] and a
//! [`SimDriver`], and hands tests the view's store and input queue.

use std::time::Duration;

use poker_app::{App, AppConfig, Runtime, UserInput};
use poker_client::{ChannelConfig, SessionState, SessionStore};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{InvariantRegistry, SimConnector, SimDriver, SimDriverError, SimRelay, ViewSnapshot};

/// Errors surfaced while driving a [`SimView`].
#[derive(Debug, thiserror::Error)]
pub enum SimViewError {
    /// The runtime stopped and accepts no more input.
    #[error("view runtime stopped")]
    Stopped,

    /// A condition did not hold in time.
    #[error("view did not reach the expected state within {0:?}")]
    Timeout(Duration),

    /// A render failed an invariant check.
    #[error(transparent)]
    Render(#[from] SimDriverError),

    /// The runtime task panicked or was cancelled.
    #[error("view task failed: {0}")]
    Join(String),
}

/// A running view: App, channel and driver on their own task.
pub struct SimView {
    store: SessionStore,
    inputs: mpsc::Sender<UserInput>,
    driver: SimDriver,
    connector: SimConnector,
    task: JoinHandle<Result<(), SimDriverError>>,
}

impl SimView {
    /// Spawn a view over `store` attached to `relay`.
    ///
    /// Every render is checked against [`InvariantRegistry::standard`].
    /// Must be called within a tokio runtime.
    pub fn spawn(relay: &SimRelay, store: SessionStore) -> Self {
        Self::spawn_with(relay, store, ChannelConfig::default())
    }

    /// Like [`SimView::spawn`] with a custom channel config.
    pub fn spawn_with(relay: &SimRelay, store: SessionStore, config: ChannelConfig) -> Self {
        let app = App::new(store.clone(), AppConfig::default());
        let driver = SimDriver::new().with_invariants(InvariantRegistry::standard());
        let connector = SimConnector::new(relay.clone());
        let runtime = Runtime::new(app, driver.clone(), connector.clone(), config);

        let (inputs, inputs_rx) = mpsc::channel(32);
        let task = tokio::spawn(runtime.run(inputs_rx));
        Self { store, inputs, driver, connector, task }
    }

    /// The view's store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The view's driver.
    pub fn driver(&self) -> &SimDriver {
        &self.driver
    }

    /// Connection attempts made by this view's channel.
    pub fn attempts(&self) -> usize {
        self.connector.attempts()
    }

    /// Observable state for invariant checks.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::from_state(&self.store.state())
    }

    /// Queue one user input.
    pub async fn input(&self, input: UserInput) -> Result<(), SimViewError> {
        self.inputs.send(input).await.map_err(|_| SimViewError::Stopped)
    }

    /// Wait until `predicate` holds for the view's state.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionState) -> bool,
        within: Duration,
    ) -> Result<SessionState, SimViewError> {
        let mut rx = self.store.subscribe();
        let waited =
            tokio::time::timeout(within, async move { rx.wait_for(predicate).await.map(|s| s.clone()) })
                .await;
        match waited {
            Ok(Ok(state)) => Ok(state),
            Ok(Err(_)) => Err(SimViewError::Stopped),
            Err(_) => Err(SimViewError::Timeout(within)),
        }
    }

    /// Quit the view and wait for its runtime to stop.
    pub async fn shutdown(self) -> Result<(), SimViewError> {
        // The runtime may already be gone; its result is reported below.
        let _ = self.inputs.send(UserInput::Quit).await;
        match self.task.await {
            Ok(result) => result.map_err(SimViewError::from),
            Err(error) => Err(SimViewError::Join(error.to_string())),
        }
    }
}
