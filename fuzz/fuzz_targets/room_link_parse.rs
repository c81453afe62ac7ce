//! Fuzz target for RoomLink::parse
//!
//! Shared links are pasted by users. Parsing must never panic, and a parsed
//! link must survive being rendered back to a URL.

#![no_main]

use libfuzzer_sys::fuzz_target;
use poker_client::RoomLink;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(link) = RoomLink::parse(text) {
        let url = link.to_url("http://localhost:3000").expect("parsed link must render");
        assert_eq!(RoomLink::parse(url.as_str()).ok(), Some(link));
    }
});
