//! Tests for edge definitions and schema lookup.

use super::schema::{Cardinality, EdgeDefinition, EdgeSchema};
use crate::test_support::customer_order_schema;

const SCHEMA_JSON: &str = r#"[
  {
    "typeName": "Customer", "field": "orders", "fieldType": "Order",
    "edgeName": "OrdersOnCustomer", "required": false, "cardinality": "MANY",
    "principal": "TRUE", "counterpart": { "typeName": "Order", "field": "customer" }
  },
  {
    "typeName": "Order", "field": "customer", "fieldType": "Customer",
    "edgeName": "OrdersOnCustomer", "required": true, "cardinality": "ONE",
    "principal": "FALSE", "counterpart": { "typeName": "Customer", "field": "orders" }
  }
]"#;

#[test]
fn test_parse_wire_format() {
    let schema = EdgeSchema::from_json(SCHEMA_JSON).unwrap();
    assert_eq!(schema.definitions().len(), 2);

    let orders = schema.edge_for_field("Customer", "orders").unwrap();
    assert!(orders.principal);
    assert_eq!(orders.cardinality, Cardinality::Many);

    let customer = schema.edge_for_field("Order", "customer").unwrap();
    assert!(!customer.principal);
    assert!(customer.required);
    assert_eq!(customer.cardinality, Cardinality::One);
    schema.validate().unwrap();
}

#[test]
fn test_principal_accepts_bool_and_rejects_garbage() {
    let json = SCHEMA_JSON.replace("\"TRUE\"", "true");
    let schema = EdgeSchema::from_json(&json).unwrap();
    assert!(schema.edge_for_field("Customer", "orders").unwrap().principal);

    let json = SCHEMA_JSON.replace("\"TRUE\"", "\"MAYBE\"");
    assert!(EdgeSchema::from_json(&json).is_err());
}

#[test]
fn test_serializes_principal_as_string() {
    let edge = EdgeDefinition::new("A", "b", "B", "BOnA").with_counterpart("B", "a");
    let json = serde_json::to_value(&edge).unwrap();
    assert_eq!(json["principal"], "TRUE");
    assert_eq!(json["cardinality"], "MANY");
    assert_eq!(json["typeName"], "A");
}

#[test]
fn test_edges_on_type_in_declaration_order() {
    let schema = customer_order_schema();
    let fields: Vec<_> = schema.edges_on_type("Order").map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["customer", "products"]);
    assert_eq!(schema.edges_on_type("Nothing").count(), 0);
}

#[test]
fn test_field_lookup_is_scoped_by_type() {
    let schema = customer_order_schema();
    // Both Customer and Product declare `orders`.
    let on_customer = schema.edge_for_field("Customer", "orders").unwrap();
    let on_product = schema.edge_for_field("Product", "orders").unwrap();
    assert_eq!(on_customer.edge_name, "OrdersOnCustomer");
    assert_eq!(on_product.edge_name, "ProductsOnOrder");
    assert!(schema.edge_for_field("Customer", "name").is_none());
}

#[test]
fn test_counterpart_and_validation() {
    let schema = customer_order_schema();
    schema.validate().unwrap();

    let orders = schema.edge_for_field("Customer", "orders").unwrap();
    let back = schema
        .edge_for_field(&orders.counterpart.type_name, &orders.counterpart.field)
        .unwrap();
    assert!(orders.mirrors(back));
    assert_eq!(back.type_name, "Order");
    assert!(!orders.mirrors(orders));
}

#[test]
fn test_validation_rejects_missing_mirror() {
    let schema = EdgeSchema::new(vec![
        EdgeDefinition::new("Customer", "orders", "Order", "OrdersOnCustomer")
            .with_counterpart("Order", "customer"),
    ]);
    assert!(schema.validate().is_err());

    let both_principal = EdgeSchema::new(vec![
        EdgeDefinition::new("Customer", "orders", "Order", "OrdersOnCustomer")
            .with_counterpart("Order", "customer"),
        EdgeDefinition::new("Order", "customer", "Customer", "OrdersOnCustomer")
            .with_counterpart("Customer", "orders"),
    ]);
    assert!(both_principal.validate().is_err());
}
