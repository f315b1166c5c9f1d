//! Fuzz target for the remote `set` handler.
//!
//! Only the three exact action words may be accepted, and a rejected
//! request must leave the state alone.

#![no_main]

use led_indicator::LedState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let requested = String::from_utf8_lossy(data);
    let mut state = LedState::new();
    state.set("blink");

    let accepted = state.set(&requested);
    assert_eq!(accepted, matches!(&*requested, "on" | "off" | "blink"));
    if accepted {
        assert_eq!(state.get(), &*requested);
    } else {
        assert_eq!(state.get(), "blink");
    }
});
