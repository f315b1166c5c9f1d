//! Fuzz target for TOML config parsing.
//!
//! Ensures that malformed TOML input doesn't cause panics, in parsing or
//! in validation.

#![no_main]

use led_indicator::Config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8 strings
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<Config>(s) {
            let _ = config.validate();
        }
    }
});
