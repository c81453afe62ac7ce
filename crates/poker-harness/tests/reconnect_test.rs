//! Reconnection against the in-process relay.
//!
//! Links are dropped and the relay refuses connections for a while; views
//! must come back on their own, resynchronize from the next snapshot and
//! deliver only the latest intent queued while offline.

use std::time::Duration;

use poker_app::UserInput;
use poker_client::{
    ChannelConfig, ChannelEvent, ConnectionState, Endpoint, RoomLink, SessionState, SessionStore,
    TransportChannel,
};
use poker_harness::{InvariantRegistry, SimConnector, SimRelay, SimView, SystemSnapshot};
use poker_proto::{Estimate, Session, intent};
use tokio::sync::mpsc;

const WITHIN: Duration = Duration::from_secs(60);

fn has_session(check: impl Fn(&Session) -> bool) -> impl FnMut(&SessionState) -> bool {
    move |s| s.connection == ConnectionState::Open && s.session.as_ref().is_some_and(&check)
}

async fn voting_view(relay: &SimRelay, username: &str, card: &str) -> (SimView, String) {
    let store = SessionStore::default();
    store.set_host_name("relay.test");
    store.set_room_name("Sprint");
    store.set_username(username);
    let view = SimView::spawn(relay, store);

    view.input(UserInput::CreateRoom).await.unwrap();
    let state = view.wait_for(has_session(|_| true), WITHIN).await.unwrap();
    view.input(UserInput::JoinRoom).await.unwrap();
    view.wait_for(has_session(|s| s.entry(username).is_some()), WITHIN).await.unwrap();
    view.input(UserInput::Vote(card.into())).await.unwrap();
    view.wait_for(
        has_session(|s| s.entry(username).and_then(|e| e.estimate.as_deref()) == Some(card)),
        WITHIN,
    )
    .await
    .unwrap();

    (view, state.room_id.unwrap())
}

/// Receive channel events until a snapshot matching `check` arrives.
async fn next_snapshot(
    events: &mut mpsc::UnboundedReceiver<ChannelEvent>,
    check: impl Fn(&Session) -> bool,
) -> Session {
    tokio::time::timeout(WITHIN, async {
        loop {
            match events.recv().await {
                Some(ChannelEvent::Snapshot(session)) if check(&session) => return session,
                Some(_) => {},
                None => panic!("channel stopped"),
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn dropped_links_reconnect_and_resync() {
    let relay = SimRelay::new();
    let (alice, room_id) = voting_view(&relay, "alice", "3").await;
    assert_eq!(alice.attempts(), 1);

    relay.drop_links(&room_id);
    let state = alice.wait_for(|s| s.connection == ConnectionState::Connecting, WITHIN).await.unwrap();
    // The last snapshot stays on screen while reconnecting.
    assert!(state.session.is_some());
    assert_eq!(state.my_estimate.as_deref(), Some("3"));

    // Someone else votes while Alice is away.
    let (bob, mut bob_events) =
        TransportChannel::spawn(SimConnector::new(relay.clone()), ChannelConfig::default());
    bob.connect(Endpoint::new("relay.test", room_id.clone()));
    bob.send(&intent::vote("bob", Some("8")));
    next_snapshot(&mut bob_events, |s| s.entry("bob").is_some()).await;

    let state = alice
        .wait_for(has_session(|s| s.entry("bob").is_some() && s.entry("alice").is_some()), WITHIN)
        .await
        .unwrap();
    assert_eq!(state.my_estimate.as_deref(), Some("3"));
    assert_eq!(alice.attempts(), 2);

    let snapshot = SystemSnapshot::single(alice.snapshot()).with_relay(relay.snapshot(&room_id));
    InvariantRegistry::quiescent().assert_all(&snapshot, "after reconnect");

    alice.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn latest_intent_wins_while_relay_refuses() {
    let relay = SimRelay::new();
    relay.set_refusing(true);

    let connector = SimConnector::new(relay.clone());
    let (channel, mut events) = TransportChannel::spawn(connector.clone(), ChannelConfig::default());
    channel.connect(Endpoint::new("relay.test", "room-1"));
    channel.send(&intent::vote("dan", Some("1")));
    channel.send(&intent::vote("erin", Some("2")));

    // Attempts at 0s, 0.5s and 1.5s are all refused.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(connector.attempts(), 3);
    assert_eq!(relay.link_count("room-1"), 0);

    relay.set_refusing(false);
    let session = next_snapshot(&mut events, |s| !s.estimates.is_empty()).await;

    assert_eq!(session.estimates, vec![Estimate::voted("erin", "2")]);
    assert_eq!(relay.snapshot("room-1").unwrap(), session);
    assert_eq!(connector.attempts(), 4);
}

#[tokio::test(start_paused = true)]
async fn reopening_after_disconnect_starts_fresh() {
    let relay = SimRelay::new();
    let (alice, room_id) = voting_view(&relay, "alice", "5").await;
    let before = alice.store().state();
    let link = RoomLink {
        host_name: before.host_name.clone(),
        room_id: room_id.clone(),
        room_name: before.room_name.clone(),
    };

    alice.input(UserInput::Disconnect).await.unwrap();
    let state = alice.wait_for(|s| s.connection == ConnectionState::Closed, WITHIN).await.unwrap();
    assert_eq!(state.session, None);
    assert_eq!(state.my_estimate, None);
    assert_eq!(state.room_id, None);
    assert_eq!(state.username, "alice");

    tokio::time::timeout(WITHIN, async {
        while relay.link_count(&room_id) > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    // The relay kept the vote; reopening adopts it from the first snapshot.
    alice.input(UserInput::OpenLink(link)).await.unwrap();
    let state = alice.wait_for(has_session(|s| s.entry("alice").is_some()), WITHIN).await.unwrap();
    assert_eq!(state.my_estimate.as_deref(), Some("5"));
    assert_eq!(state.room_id.as_deref(), Some(room_id.as_str()));

    let snapshot = SystemSnapshot::single(alice.snapshot()).with_relay(relay.snapshot(&room_id));
    InvariantRegistry::quiescent().assert_all(&snapshot, "after reopening");

    alice.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn views_in_other_rooms_are_unaffected_by_drops() {
    let relay = SimRelay::new();
    let (alice, alice_room) = voting_view(&relay, "alice", "2").await;
    let (bob, bob_room) = voting_view(&relay, "bob", "8").await;
    assert_ne!(alice_room, bob_room);

    relay.drop_links(&alice_room);
    alice.wait_for(|s| s.connection == ConnectionState::Connecting, WITHIN).await.unwrap();
    alice.wait_for(|s| s.connection == ConnectionState::Open, WITHIN).await.unwrap();

    assert_eq!(bob.attempts(), 1);
    assert_eq!(bob.store().state().connection, ConnectionState::Open);
    assert_eq!(relay.snapshot(&bob_room).unwrap().estimates, vec![Estimate::voted("bob", "8")]);

    alice.shutdown().await.unwrap();
    bob.shutdown().await.unwrap();
}
