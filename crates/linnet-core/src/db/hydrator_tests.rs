//! Tests for node hydration.

use std::sync::Arc;

use serde_json::json;

use super::hydrator::Hydrator;
use crate::graph::ItemGenerator;
use crate::record::{Item, PrimaryKey};
use crate::store::{KeyValueStore, MemoryStore, PutCondition};
use crate::test_support::{customer_order_schema, stamp};

const TABLE: &str = "linnet";
const NOW: i64 = 1_517_446_800;

async fn seed_customers(store: &MemoryStore, count: usize) -> Vec<String> {
    let schema = customer_order_schema();
    let data: Vec<_> = (0..count).map(|i| json!({ "name": format!("c{i}") })).collect();
    let generated = ItemGenerator::new(&schema, stamp())
        .generate_payload("Customer", &json!({ "data": data }), None)
        .unwrap();
    for item in &generated.items {
        store
            .put_item(TABLE, item.to_attributes(), PutCondition::Always)
            .await
            .unwrap();
    }
    generated.roots
}

#[tokio::test]
async fn test_empty_input() {
    let store = Arc::new(MemoryStore::new());
    let hydrated = Hydrator::new(store, TABLE, 25, NOW).hydrate(&[]).await;
    assert!(hydrated.nodes.is_empty());
    assert!(hydrated.errors.is_empty());
}

#[tokio::test]
async fn test_hydrates_across_batches() {
    let store = Arc::new(MemoryStore::new());
    let ids = seed_customers(&store, 12).await;

    let hydrated = Hydrator::new(Arc::clone(&store), TABLE, 5, NOW)
        .hydrate(&ids)
        .await;

    assert!(hydrated.errors.is_empty());
    assert_eq!(hydrated.nodes.len(), 12);
    assert!(hydrated.nodes.iter().all(|n| n.type_name == "Customer"));
}

#[tokio::test]
async fn test_missing_and_expired_nodes_left_out() {
    let store = Arc::new(MemoryStore::new());
    let mut ids = seed_customers(&store, 3).await;
    store
        .update_ttl(TABLE, &PrimaryKey::node(ids[0].as_str()), NOW)
        .await
        .unwrap();
    ids.push("missing".to_string());

    let hydrated = Hydrator::new(Arc::clone(&store), TABLE, 25, NOW)
        .hydrate(&ids)
        .await;

    assert_eq!(hydrated.nodes.len(), 2);
    assert!(hydrated.nodes.iter().all(|n| n.id != ids[0]));
}

#[tokio::test]
async fn test_only_node_rows_are_fetched() {
    let store = Arc::new(MemoryStore::new());
    let schema = customer_order_schema();
    let generated = ItemGenerator::new(&schema, stamp())
        .generate_payload(
            "Customer",
            &json!({ "data": { "orders": { "data": [{ "status": "X" }] } } }),
            None,
        )
        .unwrap();
    for item in &generated.items {
        store
            .put_item(TABLE, item.to_attributes(), PutCondition::Always)
            .await
            .unwrap();
    }

    let hydrated = Hydrator::new(Arc::clone(&store), TABLE, 25, NOW)
        .hydrate(&generated.roots)
        .await;

    assert_eq!(hydrated.nodes.len(), 1);
    assert!(generated.items.iter().any(|i| matches!(i, Item::Edge(_))));
}

#[tokio::test]
async fn test_batch_failure_is_collected() {
    let store = Arc::new(MemoryStore::new());
    let ids = seed_customers(&store, 4).await;
    store.inject_throttling(1);

    let hydrated = Hydrator::new(Arc::clone(&store), TABLE, 2, NOW)
        .hydrate(&ids)
        .await;

    assert_eq!(hydrated.errors.len(), 1);
    assert_eq!(hydrated.nodes.len(), 2);
}
