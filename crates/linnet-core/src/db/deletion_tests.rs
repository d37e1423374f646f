//! Tests for soft deletion.

use serde_json::json;

use super::deletion::{effective_ttl, DeletionScanner};
use crate::graph::{Generated, ItemGenerator};
use crate::record::{PrimaryKey, TTL};
use crate::store::{KeyValueStore, MemoryStore, PutCondition};
use crate::test_support::{customer_order_schema, stamp};
use crate::value::Value;

const TABLE: &str = "linnet";
const NOW: i64 = 1_517_446_800;

async fn seed(store: &MemoryStore, orders: usize) -> Generated {
    let schema = customer_order_schema();
    let data: Vec<_> = (0..orders).map(|_| json!({ "status": "X" })).collect();
    let generated = ItemGenerator::new(&schema, stamp())
        .generate_payload(
            "Customer",
            &json!({ "data": { "name": "A", "orders": { "data": data } } }),
            None,
        )
        .unwrap();
    for item in &generated.items {
        store
            .put_item(TABLE, item.to_attributes(), PutCondition::IfNotExists)
            .await
            .unwrap();
    }
    generated
}

#[test]
fn test_effective_ttl_policy() {
    assert_eq!(effective_ttl(None, NOW, 30), NOW);
    assert_eq!(effective_ttl(Some(NOW + 60), NOW, 30), NOW + 60);
    assert_eq!(effective_ttl(Some(NOW - 60), NOW, 30), NOW - 60);
    assert_eq!(effective_ttl(Some(0), NOW, 30), NOW - 30 * 60);
}

#[tokio::test]
async fn test_marks_node_and_principal_edges() {
    let store = MemoryStore::new();
    let generated = seed(&store, 3).await;
    let root = &generated.roots[0];

    let deleted = DeletionScanner::new(&store, TABLE, 1000)
        .soft_delete(root, NOW, NOW)
        .await;

    assert!(deleted.errors.is_empty());
    let count = deleted.count;
    // 1 Node + 3 edges partitioned on the customer.
    assert_eq!(count, 4);
    let node = store.get(TABLE, &PrimaryKey::node(root.as_str())).unwrap();
    assert_eq!(node.get(TTL), Some(&Value::Int(NOW)));
}

#[tokio::test]
async fn test_second_delete_does_not_recount() {
    let store = MemoryStore::new();
    let generated = seed(&store, 2).await;
    let root = &generated.roots[0];
    let scanner = DeletionScanner::new(&store, TABLE, 1000);

    assert_eq!(scanner.soft_delete(root, NOW, NOW).await.count, 3);
    let again = scanner.soft_delete(root, NOW - 60, NOW).await;

    assert_eq!(again.count, 0);
    let node = store.get(TABLE, &PrimaryKey::node(root.as_str())).unwrap();
    assert_eq!(node.get(TTL), Some(&Value::Int(NOW)));
}

#[tokio::test]
async fn test_paginates_large_partitions() {
    let store = MemoryStore::new();
    let generated = seed(&store, 9).await;

    let deleted = DeletionScanner::new(&store, TABLE, 2)
        .soft_delete(&generated.roots[0], NOW, NOW)
        .await;

    assert_eq!(deleted.count, 10);
    assert_eq!(store.query_calls(), 5);
}

#[tokio::test]
async fn test_future_ttl_is_brought_forward() {
    let store = MemoryStore::new();
    let generated = seed(&store, 0).await;
    let key = PrimaryKey::node(generated.roots[0].as_str());
    store.update_ttl(TABLE, &key, NOW + 3600).await.unwrap();

    let deleted = DeletionScanner::new(&store, TABLE, 1000)
        .soft_delete(&generated.roots[0], NOW, NOW)
        .await;

    assert_eq!(deleted.count, 1);
    assert_eq!(store.get(TABLE, &key).unwrap().get(TTL), Some(&Value::Int(NOW)));
}

#[tokio::test]
async fn test_delete_many_sums_counts() {
    let store = MemoryStore::new();
    let a = seed(&store, 1).await;
    let b = seed(&store, 2).await;
    let ids = vec![a.roots[0].clone(), b.roots[0].clone(), "missing".to_string()];

    let total = DeletionScanner::new(&store, TABLE, 1000)
        .soft_delete_many(&ids, NOW, NOW)
        .await;

    assert_eq!(total.count, 5);
    assert!(total.errors.is_empty());
}

#[tokio::test]
async fn test_delete_many_continues_past_failing_id() {
    let store = MemoryStore::new();
    let a = seed(&store, 1).await;
    let b = seed(&store, 2).await;
    let c = seed(&store, 0).await;
    store.fail_writes_for(&b.roots[0]);
    let ids = vec![a.roots[0].clone(), b.roots[0].clone(), c.roots[0].clone()];

    let total = DeletionScanner::new(&store, TABLE, 1000)
        .soft_delete_many(&ids, NOW, NOW)
        .await;

    // a: Node + 1 edge, c: Node. Each of b's 3 rows fails.
    assert_eq!(total.count, 3);
    assert_eq!(total.errors.len(), 3);
    for id in [&a.roots[0], &c.roots[0]] {
        let node = store.get(TABLE, &PrimaryKey::node(id.as_str())).unwrap();
        assert_eq!(node.get(TTL), Some(&Value::Int(NOW)));
    }
    let b_node = store.get(TABLE, &PrimaryKey::node(b.roots[0].as_str())).unwrap();
    assert_eq!(b_node.get(TTL), None);
}

#[tokio::test]
async fn test_throttled_update_does_not_stop_the_scan() {
    let store = MemoryStore::new();
    let generated = seed(&store, 2).await;
    store.inject_throttling(1);

    let deleted = DeletionScanner::new(&store, TABLE, 1000)
        .soft_delete(&generated.roots[0], NOW, NOW)
        .await;

    assert_eq!(deleted.count, 2);
    assert_eq!(deleted.errors.len(), 1);
    assert!(deleted.errors[0].is_retryable());
}
