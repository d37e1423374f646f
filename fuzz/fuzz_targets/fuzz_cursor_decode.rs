//! Fuzz target for pagination cursor decoding.
//!
//! Cursors come back from callers verbatim, so decoding must reject any
//! string without panicking, and anything it accepts must re-encode.
//!
//! # Running
//!
//! ```bash
//! cd fuzz
//! cargo +nightly fuzz run fuzz_cursor_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use linnet_core::cursor;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(key) = cursor::decode(input) {
            let encoded = cursor::encode(&key).expect("decoded key re-encodes");
            assert_eq!(cursor::decode(&encoded).ok(), Some(key));
        }
    }
});
