//! Integration tests for the Runtime event loop.
//!
//! A loopback connector hands each link's server side to the test, and a
//! recording driver captures every render.

use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use poker_app::{App, AppConfig, Driver, Runtime, UserInput};
use poker_client::{
    ChannelConfig, ConnectionState, Connector, Endpoint, Link, SessionState, SessionStore,
    TransportError,
};
use poker_proto::{Estimate, Session};
use tokio::sync::mpsc;

struct Peer {
    endpoint: Endpoint,
    from_client: mpsc::UnboundedReceiver<String>,
    to_client: mpsc::UnboundedSender<String>,
}

struct Loopback {
    peers: mpsc::UnboundedSender<Peer>,
}

impl Connector for Loopback {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Link, TransportError> {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        self.peers
            .send(Peer { endpoint: endpoint.clone(), from_client: out_rx, to_client: in_tx })
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Link::new(out_tx, in_rx))
    }
}

#[derive(Clone, Default)]
struct Recorder {
    frames: Arc<Mutex<Vec<SessionState>>>,
}

impl Recorder {
    fn last(&self) -> Option<SessionState> {
        self.frames.lock().unwrap().last().cloned()
    }

    fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl Driver for Recorder {
    type Error = Infallible;

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.frames.lock().unwrap().push(app.store().state());
        Ok(())
    }
}

fn app(username: &str) -> (App, SessionStore) {
    let store = SessionStore::default();
    store.set_host_name("relay.test");
    store.set_room_name("Sprint");
    store.set_username(username);
    (App::new(store.clone(), AppConfig::default()), store)
}

/// Wait until the view has the link open and a snapshot in hand.
async fn wait_for_session(store: &SessionStore, check: impl Fn(&Session) -> bool) {
    store
        .subscribe()
        .wait_for(|s| {
            s.connection == ConnectionState::Open && s.session.as_ref().is_some_and(&check)
        })
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn create_vote_and_quit() {
    let (peers_tx, mut peers) = mpsc::unbounded_channel();
    let recorder = Recorder::default();
    let (app, store) = app("alice");
    let runtime =
        Runtime::new(app, recorder.clone(), Loopback { peers: peers_tx }, ChannelConfig::default());

    let (inputs, inputs_rx) = mpsc::channel(8);
    let run = tokio::spawn(runtime.run(inputs_rx));

    inputs.send(UserInput::CreateRoom).await.unwrap();
    let mut peer = peers.recv().await.unwrap();
    assert_eq!(peer.endpoint.host, "relay.test");

    // The relay greets every link with the current snapshot.
    let empty = Session::default();
    peer.to_client.send(empty.encode().unwrap()).unwrap();
    wait_for_session(&store, |_| true).await;

    inputs.send(UserInput::JoinRoom).await.unwrap();
    assert_eq!(peer.from_client.recv().await.unwrap(), r#"{"type":"vote","username":"alice"}"#);

    let joined = Session { estimates: vec![Estimate::absent("alice")], is_visible: false };
    peer.to_client.send(joined.encode().unwrap()).unwrap();
    wait_for_session(&store, |s| !s.estimates.is_empty()).await;

    inputs.send(UserInput::Vote("5".into())).await.unwrap();
    assert_eq!(
        peer.from_client.recv().await.unwrap(),
        r#"{"type":"vote","username":"alice","estimate":"5"}"#
    );

    inputs.send(UserInput::Quit).await.unwrap();
    run.await.unwrap().unwrap();

    let last = recorder.last().unwrap();
    assert_eq!(last.connection, ConnectionState::Open);
    assert_eq!(last.my_estimate.as_deref(), Some("5"));

    // Runtime is gone, so is the link.
    assert_eq!(peer.from_client.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn closing_input_stops_runtime() {
    let (peers_tx, _peers) = mpsc::unbounded_channel();
    let recorder = Recorder::default();
    let (app, _store) = app("bob");
    let runtime =
        Runtime::new(app, recorder.clone(), Loopback { peers: peers_tx }, ChannelConfig::default());

    let (inputs, inputs_rx) = mpsc::channel(1);
    drop(inputs);
    runtime.run(inputs_rx).await.unwrap();

    // Initial render only.
    assert_eq!(recorder.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn disconnect_resets_view() {
    let (peers_tx, mut peers) = mpsc::unbounded_channel();
    let recorder = Recorder::default();
    let (app, store) = app("carol");
    let runtime =
        Runtime::new(app, recorder.clone(), Loopback { peers: peers_tx }, ChannelConfig::default());

    let (inputs, inputs_rx) = mpsc::channel(8);
    let run = tokio::spawn(runtime.run(inputs_rx));

    inputs.send(UserInput::CreateRoom).await.unwrap();
    let mut peer = peers.recv().await.unwrap();
    peer.to_client.send(Session::default().encode().unwrap()).unwrap();
    wait_for_session(&store, |_| true).await;

    inputs.send(UserInput::Disconnect).await.unwrap();
    assert_eq!(peer.from_client.recv().await, None);

    inputs.send(UserInput::Quit).await.unwrap();
    run.await.unwrap().unwrap();

    let last = recorder.last().unwrap();
    assert_eq!(last.connection, ConnectionState::Closed);
    assert_eq!(last.room_id, None);
    assert_eq!(last.session, None);
    assert_eq!(last.username, "carol");
}
