//! Fuzz target for the JSON filter parser and evaluator.
//!
//! Arbitrary JSON is parsed as a filter; accepted filters are evaluated
//! against a fixed node. Neither step may panic.
//!
//! # Running
//!
//! ```bash
//! cd fuzz
//! cargo +nightly fuzz run fuzz_filter_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use linnet_core::{json_to_filter, Fields, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(filter) = json_to_filter(&json) {
        let mut node = Fields::new();
        node.insert("status".to_string(), Value::from("pending"));
        node.insert("total".to_string(), Value::Int(42));
        node.insert("ratio".to_string(), Value::Float(0.5));
        node.insert("paid".to_string(), Value::Bool(true));
        let _ = filter.matches(&node);
    }
});
