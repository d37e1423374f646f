//! Tests for field values.

use super::value::{fields_from_json, ScalarKind, Value};
use serde_json::json;

#[test]
fn test_from_json_scalars() {
    assert_eq!(Value::from_json(json!(true)), Some(Value::Bool(true)));
    assert_eq!(Value::from_json(json!(42)), Some(Value::Int(42)));
    assert_eq!(Value::from_json(json!(1.5)), Some(Value::Float(1.5)));
    assert_eq!(Value::from_json(json!("x")), Some(Value::from("x")));
    assert_eq!(Value::from_json(json!(null)), None);
}

#[test]
fn test_from_json_drops_nested_nulls() {
    let value = Value::from_json(json!({"a": 1, "b": null, "c": [1, null, 2]})).unwrap();
    let fields = value.as_node().unwrap();
    assert_eq!(fields.len(), 2);
    assert!(!fields.contains_key("b"));
    assert_eq!(
        fields.get("c"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn test_large_unsigned_becomes_float() {
    let value = Value::from_json(json!(u64::MAX)).unwrap();
    assert_eq!(value.kind(), ScalarKind::Float);
}

#[test]
fn test_kind_dispatch() {
    assert_eq!(Value::from(false).kind(), ScalarKind::Bool);
    assert_eq!(Value::from(1_i64).kind(), ScalarKind::Int);
    assert_eq!(Value::from(1.0).kind(), ScalarKind::Float);
    assert_eq!(Value::from("s").kind(), ScalarKind::String);
    assert_eq!(Value::List(vec![]).kind(), ScalarKind::List);
    assert_eq!(Value::Node(Default::default()).kind(), ScalarKind::Node);
}

#[test]
fn test_serializes_untagged() {
    let map = json!({"name": "A", "age": 3, "tags": ["x"], "nested": {"ok": true}});
    let fields = fields_from_json(map.as_object().unwrap().clone());
    let out = serde_json::to_value(&fields).unwrap();
    assert_eq!(out, map);

    let back: indexmap::IndexMap<String, Value> = serde_json::from_value(out).unwrap();
    assert_eq!(back, fields);
}

#[test]
fn test_numeric_view() {
    assert_eq!(Value::Int(2).as_number(), Some(2.0));
    assert_eq!(Value::Float(2.5).as_number(), Some(2.5));
    assert_eq!(Value::from("2").as_number(), None);
}
