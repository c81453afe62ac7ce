//! Fuzz target for the Channel state machine
//!
//! # Strategy
//!
//! - Commands: connect (two endpoints), disconnect, send
//! - Link callbacks: opened, failed, closed, retry elapsed and inbound frames,
//!   each for the current link or a stale one
//!
//! # Invariants
//!
//! - Closed schedules no retry
//! - Open holds no pending message
//! - Transmit only happens while Open
//! - State events are only emitted on an actual change
//! - Link ids never decrease

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use poker_client::{
    Channel, ChannelAction, ChannelConfig, ChannelEvent, ConnectionState, Endpoint, LinkId,
};

#[derive(Debug, Clone, Arbitrary)]
enum ChannelOp {
    Connect { second_room: bool },
    Disconnect,
    Send(u8),
    Opened(LinkChoice),
    Failed(LinkChoice),
    Closed(LinkChoice),
    RetryElapsed(LinkChoice),
    Frame(LinkChoice, String),
}

#[derive(Debug, Clone, Arbitrary)]
enum LinkChoice {
    Current,
    Stale(u8),
}

fn pick(channel: &Channel, choice: &LinkChoice) -> LinkId {
    match choice {
        LinkChoice::Current => channel.link(),
        LinkChoice::Stale(back) => LinkId(channel.link().0.saturating_sub(u64::from(*back) + 1)),
    }
}

fuzz_target!(|ops: Vec<ChannelOp>| {
    let mut channel = Channel::new(ChannelConfig::default());
    let mut last_link = channel.link();

    for op in ops {
        let before = channel.state();
        let actions = match &op {
            ChannelOp::Connect { second_room } => {
                let room = if *second_room { "room-b" } else { "room-a" };
                channel.connect(Endpoint::new("relay.test", room))
            }
            ChannelOp::Disconnect => channel.disconnect(),
            ChannelOp::Send(n) => channel.send(format!("{{\"type\":\"vote\",\"username\":\"u{n}\"}}")),
            ChannelOp::Opened(choice) => channel.link_opened(pick(&channel, choice)),
            ChannelOp::Failed(choice) => channel.link_failed(pick(&channel, choice)),
            ChannelOp::Closed(choice) => channel.link_closed(pick(&channel, choice)),
            ChannelOp::RetryElapsed(choice) => channel.retry_elapsed(pick(&channel, choice)),
            ChannelOp::Frame(choice, text) => channel.frame_received(pick(&channel, choice), text),
        };

        let mut state = before;
        for action in &actions {
            match action {
                ChannelAction::Emit(ChannelEvent::State(next)) => {
                    assert_ne!(*next, state, "state event without change after {op:?}");
                    state = *next;
                }
                ChannelAction::Transmit(_) => {
                    assert_eq!(channel.state(), ConnectionState::Open, "transmit while not open");
                }
                _ => {}
            }
        }
        assert_eq!(state, channel.state(), "emitted state diverges after {op:?}");

        match channel.state() {
            ConnectionState::Closed => {
                assert!(!actions.iter().any(|a| matches!(a, ChannelAction::ScheduleRetry { .. })));
            }
            ConnectionState::Open => assert!(channel.pending().is_none()),
            ConnectionState::Connecting => {}
        }

        assert!(channel.link() >= last_link);
        last_link = channel.link();
    }
});
