//! Tests for nested payload expansion.

use serde_json::json;

use super::generator::ItemGenerator;
use crate::error::Error;
use crate::record::{Item, SORT_SEPARATOR};
use crate::test_support::{customer_order_schema, stamp};
use crate::value::Value;

#[test]
fn test_absent_or_null_data_yields_nothing() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());

    let generated = generator.generate("Customer", None, None, None).unwrap();
    assert!(generated.items.is_empty());

    let generated = generator
        .generate_payload("Customer", &json!({ "data": null }), None)
        .unwrap();
    assert!(generated.items.is_empty());
    assert!(generated.roots.is_empty());
}

#[test]
fn test_single_object_creates_one_node() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({ "data": { "name": "A", "age": 40 } });

    let generated = generator.generate_payload("Customer", &payload, None).unwrap();

    assert_eq!(generated.items.len(), 1);
    let node = generated.items[0].as_node().unwrap();
    assert_eq!(node.type_name, "Customer");
    assert_eq!(node.fields.get("name"), Some(&Value::from("A")));
    assert_eq!(node.fields.get("age"), Some(&Value::Int(40)));
    assert_eq!(generated.roots, vec![node.id.clone()]);
}

#[test]
fn test_nested_principal_edge_layout() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({
        "data": { "name": "A", "orders": { "data": [{ "status": "X" }] } }
    });

    let generated = generator.generate_payload("Customer", &payload, None).unwrap();

    assert_eq!(generated.node_count(), 2);
    assert_eq!(generated.edge_count(), 1);

    let customer = generated.items.last().and_then(Item::as_node).unwrap();
    assert_eq!(customer.type_name, "Customer");
    assert!(!customer.fields.contains_key("orders"));

    let order = generated
        .items
        .iter()
        .filter_map(Item::as_node)
        .find(|n| n.type_name == "Order")
        .unwrap();
    let edge = generated.items.iter().find_map(Item::as_edge).unwrap();
    assert_eq!(edge.id, customer.id);
    assert_eq!(edge.neighbor, order.id);
    assert_eq!(edge.named_type, "Order");
    assert_eq!(
        edge.sort_key(),
        format!("OrdersOnCustomer{SORT_SEPARATOR}{}", order.id)
    );
}

#[test]
fn test_nested_non_principal_edge_swaps_roles() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({
        "data": { "status": "X", "customer": { "data": { "name": "B" } } }
    });

    let generated = generator.generate_payload("Order", &payload, None).unwrap();

    let order = generated.items.last().and_then(Item::as_node).unwrap();
    let customer = generated
        .items
        .iter()
        .filter_map(Item::as_node)
        .find(|n| n.type_name == "Customer")
        .unwrap();
    let edge = generated.items.iter().find_map(Item::as_edge).unwrap();
    assert_eq!(edge.id, customer.id);
    assert_eq!(edge.neighbor, order.id);
    assert_eq!(edge.named_type, "Customer");
}

#[test]
fn test_deep_nesting_counts() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({
        "data": [
            {
                "name": "A",
                "orders": { "data": [
                    { "status": "X", "products": { "data": [{ "sku": 1 }, { "sku": 2 }] } },
                    { "status": "Y" }
                ] }
            },
            { "name": "B" }
        ]
    });

    let generated = generator.generate_payload("Customer", &payload, None).unwrap();

    // 2 customers + 2 orders + 2 products.
    assert_eq!(generated.node_count(), 6);
    // A->X, A->Y, X->1, X->2. Grandchildren never link to A.
    assert_eq!(generated.edge_count(), 4);
    assert_eq!(generated.roots.len(), 2);
}

#[test]
fn test_root_id_applies_to_first_object_only() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({ "data": [{ "name": "A" }, { "name": "B" }] });

    let generated = generator
        .generate_payload("Customer", &payload, Some("fixed"))
        .unwrap();

    assert_eq!(generated.roots[0], "fixed");
    assert_ne!(generated.roots[1], "fixed");
}

#[test]
fn test_edge_field_must_be_object() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({ "data": { "orders": "nope" } });

    let err = generator.generate_payload("Customer", &payload, None).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_cardinality_one_rejects_many_children() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({
        "data": { "customer": { "data": [{ "name": "A" }, { "name": "B" }] } }
    });

    let err = generator.generate_payload("Order", &payload, None).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_connections_not_implemented() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({ "data": { "name": "A" }, "connections": { "orders": ["x"] } });

    let err = generator.generate_payload("Customer", &payload, None).unwrap_err();
    assert!(matches!(err, Error::NotImplemented(_)));
}

#[test]
fn test_reserved_fields_rejected() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());

    for field in ["id", "linnet:ttl", "createdAt"] {
        let mut data = serde_json::Map::new();
        data.insert(field.to_string(), json!("x"));
        let payload = json!({ "data": data });
        let err = generator.generate_payload("Customer", &payload, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{field}");
    }
}

#[test]
fn test_null_fields_are_dropped() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({ "data": { "name": null, "orders": null } });

    let generated = generator.generate_payload("Customer", &payload, None).unwrap();
    let node = generated.items[0].as_node().unwrap();
    assert!(node.fields.is_empty());
    assert_eq!(generated.edge_count(), 0);
}

#[test]
fn test_non_object_data_entry_rejected() {
    let schema = customer_order_schema();
    let generator = ItemGenerator::new(&schema, stamp());
    let payload = json!({ "data": [1, 2] });

    let err = generator.generate_payload("Customer", &payload, None).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
