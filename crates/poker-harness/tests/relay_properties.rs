//! Property-based tests for relay room semantics.
//!
//! Arbitrary intent sequences from several participants, applied to a
//! [`RelayRoom`], must keep snapshots well formed and give each intent its
//! documented effect.

use poker_harness::{InvariantRegistry, RelayRoom, SystemSnapshot};
use poker_proto::{ClientMessage, intent};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dan"];
const CARDS: [&str; 5] = ["1", "2", "3", "5", "?"];

fn name_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NAMES.to_vec())
}

fn message_strategy() -> impl Strategy<Value = ClientMessage> {
    prop_oneof![
        4 => (name_strategy(), prop::option::of(prop::sample::select(CARDS.to_vec())))
            .prop_map(|(name, card)| intent::vote(name, card)),
        1 => Just(intent::reset()),
        1 => name_strategy().prop_map(intent::remove_user),
        1 => any::<bool>().prop_map(intent::reveal),
    ]
}

fn room_after(messages: &[ClientMessage]) -> RelayRoom {
    let mut room = RelayRoom::new();
    for message in messages {
        room.apply(message);
    }
    room
}

proptest! {
    #[test]
    fn prop_participants_stay_unique(messages in prop::collection::vec(message_strategy(), 0..64)) {
        let registry = InvariantRegistry::standard();
        let mut room = RelayRoom::new();
        for message in &messages {
            room.apply(message);
            let state = SystemSnapshot::empty().with_relay(Some(room.session().clone()));
            prop_assert!(registry.check_all(&state).is_ok());
        }
    }

    #[test]
    fn prop_reset_clears_everything_at_once(messages in prop::collection::vec(message_strategy(), 0..32)) {
        let mut room = room_after(&messages);
        let names_before: Vec<String> = room.session().usernames().map(str::to_owned).collect();

        room.apply(&intent::reset());

        let session = room.session();
        prop_assert!(!session.is_visible);
        prop_assert!(session.estimates.iter().all(|e| e.estimate.is_none()));
        let names_after: Vec<String> = session.usernames().map(str::to_owned).collect();
        prop_assert_eq!(names_before, names_after);
    }

    #[test]
    fn prop_vote_makes_member_with_that_estimate(
        messages in prop::collection::vec(message_strategy(), 0..32),
        name in name_strategy(),
        card in prop::option::of(prop::sample::select(CARDS.to_vec())),
    ) {
        let mut room = room_after(&messages);
        let count_before = room.session().estimates.len();
        let was_member = room.session().entry(name).is_some();

        room.apply(&intent::vote(name, card));

        let entry = room.session().entry(name);
        prop_assert_eq!(entry.and_then(|e| e.estimate.as_deref()), card);
        let expected = if was_member { count_before } else { count_before + 1 };
        prop_assert_eq!(room.session().estimates.len(), expected);
    }

    #[test]
    fn prop_retraction_keeps_entry_removal_drops_it(
        messages in prop::collection::vec(message_strategy(), 0..32),
        name in name_strategy(),
    ) {
        let mut retracted = room_after(&messages);
        retracted.apply(&intent::vote(name, Some("3")));
        let mut removed = retracted.clone();

        retracted.apply(&intent::vote(name, None));
        removed.apply(&intent::remove_user(name));

        prop_assert!(retracted.session().entry(name).is_some());
        prop_assert!(removed.session().entry(name).is_none());
        prop_assert_ne!(retracted.session(), removed.session());
    }

    #[test]
    fn prop_intents_survive_the_wire(messages in prop::collection::vec(message_strategy(), 0..32)) {
        // What the relay receives is what the view built.
        let direct = room_after(&messages);
        let mut over_wire = RelayRoom::new();
        for message in &messages {
            let text = message.encode().unwrap();
            over_wire.apply(&ClientMessage::decode(&text).unwrap());
        }
        prop_assert_eq!(direct.session(), over_wire.session());

        let text = direct.session().encode().unwrap();
        prop_assert_eq!(&poker_proto::Session::decode(&text).unwrap(), direct.session());
    }
}
