//! Tests for row marshalling.

use super::record::{
    is_reserved_field, EdgeRecord, Item, NodeRecord, PrimaryKey, DATA_TYPE, EDGE, NAMED_TYPE,
    NODE_MARKER, TTL,
};
use crate::error::Error;
use crate::schema::EdgeDefinition;
use crate::test_support::stamp;
use crate::value::Value;

#[test]
fn test_node_attributes() {
    let node = NodeRecord::new("n1", "Customer", stamp()).with_field("name", "A");
    let attrs = Item::Node(node.clone()).to_attributes();

    assert_eq!(attrs.get("id"), Some(&Value::from("n1")));
    assert_eq!(attrs.get(DATA_TYPE), Some(&Value::from(NODE_MARKER)));
    assert_eq!(attrs.get(NAMED_TYPE), Some(&Value::from("Customer")));
    assert_eq!(attrs.get("name"), Some(&Value::from("A")));
    assert_eq!(
        attrs.get("createdAt"),
        Some(&Value::from("2018-02-01T01:00:00.000000010Z"))
    );
    assert!(!attrs.contains_key(TTL));

    assert_eq!(Item::from_attributes(attrs).unwrap(), Item::Node(node));
}

#[test]
fn test_edge_attributes() {
    let edge = EdgeDefinition::new("Customer", "orders", "Order", "OrdersOnCustomer")
        .with_counterpart("Order", "customer");
    let mut record = EdgeRecord::link(&edge, "c1", "o1", stamp());
    record.ttl = Some(10);
    let attrs = Item::Edge(record.clone()).to_attributes();

    assert_eq!(attrs.get(DATA_TYPE), Some(&Value::from("OrdersOnCustomer::o1")));
    assert_eq!(attrs.get(EDGE), Some(&Value::from("o1")));
    assert_eq!(attrs.get(TTL), Some(&Value::Int(10)));

    assert_eq!(Item::from_attributes(attrs).unwrap(), Item::Edge(record));
}

#[test]
fn test_non_principal_link_swaps_endpoints() {
    let edge = EdgeDefinition::new("Order", "customer", "Customer", "OrdersOnCustomer")
        .with_principal(false)
        .with_counterpart("Customer", "orders");
    let record = EdgeRecord::link(&edge, "o1", "c1", stamp());

    assert_eq!(record.id, "c1");
    assert_eq!(record.neighbor, "o1");
    assert_eq!(record.named_type, "Customer");
    assert_eq!(record.sort_key(), "OrdersOnCustomer::o1");
}

#[test]
fn test_missing_key_is_internal_error() {
    let err = Item::from_attributes(Default::default()).unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
    assert!(PrimaryKey::from_attributes(&Default::default()).is_err());
}

#[test]
fn test_expiry() {
    let mut node = NodeRecord::new("n1", "Customer", stamp());
    assert!(!Item::Node(node.clone()).is_expired(100));
    node.ttl = Some(100);
    assert!(Item::Node(node.clone()).is_expired(100));
    assert!(!Item::Node(node).is_expired(99));
}

#[test]
fn test_reserved_fields() {
    assert!(is_reserved_field("id"));
    assert!(is_reserved_field("linnet:anything"));
    assert!(is_reserved_field("createdBy"));
    assert!(!is_reserved_field("name"));
    assert!(!is_reserved_field("identity"));
}
