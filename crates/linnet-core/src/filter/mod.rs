//! In-memory predicate evaluation over hydrated nodes.
//!
//! A [`FilterConfig`] maps field names to a set of operators. A node passes
//! when any configured field satisfies any of its operators: operators and
//! fields are OR-combined. Evaluation dispatches on the runtime
//! [`ScalarKind`] of the node's value; a missing field or a kind the
//! operator does not apply to is simply not satisfied.

mod json_filter;


pub use json_filter::json_to_filter;

use std::cmp::Ordering;

use crate::value::{Fields, ScalarKind, Value};

/// Comparison operator names accepted in filter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `notEqualTo`
    NotEqualTo,
    /// `equalTo`
    EqualTo,
    /// `lessThan`
    LessThan,
    /// `lessThanOrEqualTo`
    LessThanOrEqualTo,
    /// `greaterThan`
    GreaterThan,
    /// `greaterThanOrEqualTo`
    GreaterThanOrEqualTo,
    /// `contains`: substring for strings, equality for numbers.
    Contains,
    /// `notContains`: negated substring for strings, inequality for numbers.
    NotContains,
    /// `beginsWith` (strings only).
    BeginsWith,
    /// `endsWith` (strings only).
    EndsWith,
    /// `between`: inclusive `[low, high]` (numbers only).
    Between,
}

impl Operator {
    /// Parses a wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "notEqualTo" => Self::NotEqualTo,
            "equalTo" => Self::EqualTo,
            "lessThan" => Self::LessThan,
            "lessThanOrEqualTo" => Self::LessThanOrEqualTo,
            "greaterThan" => Self::GreaterThan,
            "greaterThanOrEqualTo" => Self::GreaterThanOrEqualTo,
            "contains" => Self::Contains,
            "notContains" => Self::NotContains,
            "beginsWith" => Self::BeginsWith,
            "endsWith" => Self::EndsWith,
            "between" => Self::Between,
            _ => return None,
        })
    }

    /// Wire name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NotEqualTo => "notEqualTo",
            Self::EqualTo => "equalTo",
            Self::LessThan => "lessThan",
            Self::LessThanOrEqualTo => "lessThanOrEqualTo",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEqualTo => "greaterThanOrEqualTo",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::BeginsWith => "beginsWith",
            Self::EndsWith => "endsWith",
            Self::Between => "between",
        }
    }
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single value.
    Value(Value),
    /// Inclusive bounds for `between`.
    Range(Value, Value),
}

/// One operator applied to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Operator.
    pub op: Operator,
    /// Operand.
    pub operand: Operand,
}

impl Predicate {
    /// Creates a single-operand predicate.
    #[must_use]
    pub fn new(op: Operator, operand: impl Into<Value>) -> Self {
        Self {
            op,
            operand: Operand::Value(operand.into()),
        }
    }

    /// Creates a `between` predicate.
    #[must_use]
    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self {
            op: Operator::Between,
            operand: Operand::Range(low.into(), high.into()),
        }
    }

    /// Evaluates the predicate against a field value.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (value.kind(), &self.operand) {
            (ScalarKind::Bool, Operand::Value(Value::Bool(rhs))) => {
                let lhs = value.as_bool() == Some(*rhs);
                match self.op {
                    Operator::EqualTo => lhs,
                    Operator::NotEqualTo => !lhs,
                    _ => false,
                }
            }
            (ScalarKind::String, Operand::Value(Value::String(rhs))) => {
                value.as_str().is_some_and(|lhs| match_string(self.op, lhs, rhs))
            }
            (ScalarKind::Int | ScalarKind::Float, operand) => match_number(self.op, value, operand),
            _ => false,
        }
    }
}

fn match_string(op: Operator, lhs: &str, rhs: &str) -> bool {
    match op {
        Operator::NotEqualTo => lhs != rhs,
        Operator::EqualTo => lhs == rhs,
        Operator::LessThan => lhs < rhs,
        Operator::LessThanOrEqualTo => lhs <= rhs,
        Operator::GreaterThan => lhs > rhs,
        Operator::GreaterThanOrEqualTo => lhs >= rhs,
        Operator::Contains => lhs.contains(rhs),
        Operator::NotContains => !lhs.contains(rhs),
        Operator::BeginsWith => lhs.starts_with(rhs),
        Operator::EndsWith => lhs.ends_with(rhs),
        Operator::Between => false,
    }
}

/// Compares two numeric values; integers compare exactly, anything involving
/// a float compares as `f64`.
fn compare_numbers(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        _ => lhs.as_number()?.partial_cmp(&rhs.as_number()?),
    }
}

fn match_number(op: Operator, lhs: &Value, operand: &Operand) -> bool {
    match (op, operand) {
        (Operator::Between, Operand::Range(low, high)) => {
            matches!(
                compare_numbers(lhs, low),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                compare_numbers(lhs, high),
                Some(Ordering::Less | Ordering::Equal)
            )
        }
        (_, Operand::Value(rhs)) => {
            let Some(ord) = compare_numbers(lhs, rhs) else {
                return false;
            };
            match op {
                Operator::EqualTo | Operator::Contains => ord == Ordering::Equal,
                Operator::NotEqualTo | Operator::NotContains => ord != Ordering::Equal,
                Operator::LessThan => ord == Ordering::Less,
                Operator::LessThanOrEqualTo => ord != Ordering::Greater,
                Operator::GreaterThan => ord == Ordering::Greater,
                Operator::GreaterThanOrEqualTo => ord != Ordering::Less,
                Operator::BeginsWith | Operator::EndsWith | Operator::Between => false,
            }
        }
        _ => false,
    }
}

/// Operators configured for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Field name.
    pub field: String,
    /// Predicates, OR-combined.
    pub predicates: Vec<Predicate>,
}

/// A full filter: field filters OR-combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    /// Per-field operators.
    pub fields: Vec<FieldFilter>,
}

impl FilterConfig {
    /// Adds a predicate on `field` (builder pattern).
    #[must_use]
    pub fn with(mut self, field: &str, predicate: Predicate) -> Self {
        match self.fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.predicates.push(predicate),
            None => self.fields.push(FieldFilter {
                field: field.to_string(),
                predicates: vec![predicate],
            }),
        }
        self
    }

    /// Returns true when no predicate is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.predicates.is_empty())
    }

    /// True when any configured field of `node` satisfies any of its operators.
    #[must_use]
    pub fn matches(&self, node: &Fields) -> bool {
        self.fields.iter().any(|filter| {
            node.get(&filter.field)
                .is_some_and(|value| filter.predicates.iter().any(|p| p.matches(value)))
        })
    }

    /// Keeps the nodes that pass, preserving order.
    #[must_use]
    pub fn filter_nodes(&self, nodes: Vec<Fields>) -> Vec<Fields> {
        nodes.into_iter().filter(|node| self.matches(node)).collect()
    }
}
