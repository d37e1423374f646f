//! JSON-to-FilterConfig conversion.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "status": { "equalTo": "X", "beginsWith": "pend" },
//!   "total":  { "between": [10, 20] },
//!   "paid":   { "equalTo": true }
//! }
//! ```
//!
//! `null` operands are ignored, which is how GraphQL input objects arrive
//! when a caller leaves an operator unset.

use serde_json::Value as Json;

use super::{FieldFilter, FilterConfig, Operand, Operator, Predicate};
use crate::error::{Error, Result};
use crate::value::{ScalarKind, Value};

/// Converts a JSON filter object into a [`FilterConfig`].
pub fn json_to_filter(filter: &Json) -> Result<FilterConfig> {
    let obj = filter
        .as_object()
        .ok_or_else(|| Error::InvalidInput("filter must be an object".to_string()))?;

    let mut config = FilterConfig::default();
    for (field, operators) in obj {
        if operators.is_null() {
            continue;
        }
        let operators = operators.as_object().ok_or_else(|| {
            Error::InvalidInput(format!("filter for {field} must be an object of operators"))
        })?;

        let mut predicates = Vec::with_capacity(operators.len());
        for (name, operand) in operators {
            let op = Operator::from_name(name)
                .ok_or_else(|| Error::InvalidInput(format!("unknown filter operator {name}")))?;
            if operand.is_null() {
                continue;
            }
            predicates.push(Predicate {
                op,
                operand: parse_operand(field, op, operand)?,
            });
        }
        config.fields.push(FieldFilter {
            field: field.clone(),
            predicates,
        });
    }
    Ok(config)
}

fn parse_operand(field: &str, op: Operator, operand: &Json) -> Result<Operand> {
    if op == Operator::Between {
        let bounds = operand
            .as_array()
            .filter(|b| b.len() == 2)
            .ok_or_else(|| {
                Error::InvalidInput(format!("between on {field} takes exactly two bounds"))
            })?;
        let low = numeric(field, &bounds[0])?;
        let high = numeric(field, &bounds[1])?;
        return Ok(Operand::Range(low, high));
    }

    match Value::from_json(operand.clone()) {
        Some(value @ (Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_))) => {
            Ok(Operand::Value(value))
        }
        _ => Err(Error::InvalidInput(format!(
            "{} on {field} takes a scalar operand",
            op.name()
        ))),
    }
}

fn numeric(field: &str, bound: &Json) -> Result<Value> {
    match Value::from_json(bound.clone()) {
        Some(value) if matches!(value.kind(), ScalarKind::Int | ScalarKind::Float) => Ok(value),
        _ => Err(Error::InvalidInput(format!(
            "between bounds on {field} must be numbers"
        ))),
    }
}
