//! Fuzz target for Session::decode and ClientMessage::decode
//!
//! Relay frames are untrusted text. Decoding must never panic, and anything
//! that decodes must encode again and decode to the same value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use poker_proto::{ClientMessage, Session};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(session) = Session::decode(text) {
        let encoded = session.encode().expect("decoded snapshot must encode");
        assert_eq!(Session::decode(&encoded).ok(), Some(session));
    }

    if let Ok(message) = ClientMessage::decode(text) {
        let encoded = message.encode().expect("decoded intent must encode");
        assert_eq!(ClientMessage::decode(&encoded).ok(), Some(message));
    }
});
