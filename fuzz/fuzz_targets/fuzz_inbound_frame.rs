//! Fuzz target: inbound peer frames
//!
//! Drives arbitrary text through the codec and the router and asserts that
//! neither panics, that every accepted envelope fits its fixed-capacity
//! fields, and that the router only yields a command for a known event.
//!
//! cargo fuzz run fuzz_inbound_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use tankpump::app::commands::PeerCommand;
use tankpump::protocol::codec::{self, EVENT_CAP, VALUE_CAP};
use tankpump::protocol::decode_inbound;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(env) = codec::decode(text) {
        assert!(env.event.len() <= EVENT_CAP);
        assert!(env.value.len() <= VALUE_CAP);
    }

    if let Some(cmd) = decode_inbound(text) {
        // Re-decoding the same frame must agree with the router.
        let env = codec::decode(text).expect("routed frame must decode");
        assert!(PeerCommand::is_known(&env.event));
        assert_eq!(PeerCommand::parse(&env.event, &env.value), Ok(Some(cmd)));
    }
});
