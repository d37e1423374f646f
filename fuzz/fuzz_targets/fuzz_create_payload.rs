//! Fuzz target for nested create payload expansion.
//!
//! Checks that arbitrary payloads either fail cleanly or produce exactly one
//! adjacency row per non-root node.
//!
//! # Running
//!
//! ```bash
//! cd fuzz
//! cargo +nightly fuzz run fuzz_create_payload
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use linnet_core::record::Stamp;
use linnet_core::{EdgeDefinition, EdgeSchema, ItemGenerator};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let schema = EdgeSchema::new(vec![
        EdgeDefinition::new("Customer", "orders", "Order", "OrdersOnCustomer")
            .with_counterpart("Order", "customer"),
        EdgeDefinition::new("Order", "customer", "Customer", "OrdersOnCustomer")
            .with_principal(false)
            .with_counterpart("Customer", "orders"),
    ]);
    let stamp = Stamp::new(chrono::DateTime::UNIX_EPOCH, "fuzz");
    if let Ok(generated) = ItemGenerator::new(&schema, stamp).generate_payload("Customer", &payload, None) {
        assert_eq!(
            generated.edge_count() + generated.roots.len(),
            generated.node_count()
        );
    }
});
