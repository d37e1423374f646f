//! Edge definitions and the schema lookup built from them.
//!
//! Edge definitions are supplied by the caller (usually generated from a
//! GraphQL schema) and are never stored per instance. Each logical
//! relationship is described twice, once from each side, and the two
//! definitions share an edge name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How many nodes can sit on the other side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    /// At most one connected node.
    One,
    /// Any number of connected nodes.
    Many,
}

/// The type and field on the other side of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeCounterpart {
    /// Type name on the other side.
    pub type_name: String,
    /// Field on that type pointing back.
    pub field: String,
}

/// Schema metadata for one relationship field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDefinition {
    /// Type where this edge is found.
    pub type_name: String,
    /// Field on `type_name` where this edge is found.
    pub field: String,
    /// Return type of the field.
    pub field_type: String,
    /// Name shared by both directions of the relationship.
    pub edge_name: String,
    /// Whether the field is non-null.
    #[serde(default)]
    pub required: bool,
    /// One or many.
    pub cardinality: Cardinality,
    /// When true this side's id is the partition of the stored edge row.
    #[serde(with = "principal_flag")]
    pub principal: bool,
    /// The mirror definition.
    pub counterpart: EdgeCounterpart,
}

impl EdgeDefinition {
    /// Creates a principal edge definition with `MANY` cardinality.
    #[must_use]
    pub fn new(type_name: &str, field: &str, field_type: &str, edge_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            field: field.to_string(),
            field_type: field_type.to_string(),
            edge_name: edge_name.to_string(),
            required: false,
            cardinality: Cardinality::Many,
            principal: true,
            counterpart: EdgeCounterpart {
                type_name: field_type.to_string(),
                field: String::new(),
            },
        }
    }

    /// Sets the cardinality (builder pattern).
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Sets the principal flag (builder pattern).
    #[must_use]
    pub fn with_principal(mut self, principal: bool) -> Self {
        self.principal = principal;
        self
    }

    /// Sets the required flag (builder pattern).
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the counterpart (builder pattern).
    #[must_use]
    pub fn with_counterpart(mut self, type_name: &str, field: &str) -> Self {
        self.counterpart = EdgeCounterpart {
            type_name: type_name.to_string(),
            field: field.to_string(),
        };
        self
    }

    /// Returns true when `other` describes the same relationship from the other side.
    #[must_use]
    pub fn mirrors(&self, other: &EdgeDefinition) -> bool {
        self.edge_name == other.edge_name
            && self.principal != other.principal
            && self.type_name == other.counterpart.type_name
            && self.field == other.counterpart.field
            && other.type_name == self.counterpart.type_name
            && other.field == self.counterpart.field
    }
}

/// Accepts the wire form `"TRUE"`/`"FALSE"` as well as JSON booleans.
mod principal_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "TRUE" } else { "FALSE" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => Ok(b),
            Flag::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Flag::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            Flag::Text(s) => Err(de::Error::custom(format!(
                "principal must be TRUE or FALSE, got {s:?}"
            ))),
        }
    }
}

/// Static lookup of edge definitions by owning type and by field.
#[derive(Debug, Clone, Default)]
pub struct EdgeSchema {
    definitions: Vec<EdgeDefinition>,
    by_type: HashMap<String, Vec<usize>>,
    by_field: HashMap<(String, String), usize>,
}

impl EdgeSchema {
    /// Builds the lookup tables. Later duplicates of a `(type, field)` pair
    /// are ignored for field lookup.
    #[must_use]
    pub fn new(definitions: Vec<EdgeDefinition>) -> Self {
        let mut by_type: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_field = HashMap::new();
        for (idx, def) in definitions.iter().enumerate() {
            by_type.entry(def.type_name.clone()).or_default().push(idx);
            by_field
                .entry((def.type_name.clone(), def.field.clone()))
                .or_insert(idx);
        }
        Self {
            definitions,
            by_type,
            by_field,
        }
    }

    /// Parses a JSON array of edge definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<EdgeDefinition> = serde_json::from_str(json)?;
        Ok(Self::new(definitions))
    }

    /// Returns every definition.
    #[must_use]
    pub fn definitions(&self) -> &[EdgeDefinition] {
        &self.definitions
    }

    /// Returns true when no definitions are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the edges declared on `type_name`, in declaration order.
    pub fn edges_on_type<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a EdgeDefinition> {
        self.by_type
            .get(type_name)
            .into_iter()
            .flatten()
            .map(|&idx| &self.definitions[idx])
    }

    /// Returns the edge declared on `type_name.field`, if any.
    #[must_use]
    pub fn edge_for_field(&self, type_name: &str, field: &str) -> Option<&EdgeDefinition> {
        self.by_field
            .get(&(type_name.to_string(), field.to_string()))
            .map(|&idx| &self.definitions[idx])
    }

    /// Checks that every principal definition has exactly one mirrored
    /// non-principal definition with the same edge name, and vice versa.
    pub fn validate(&self) -> Result<()> {
        for def in &self.definitions {
            let mirrors = self
                .definitions
                .iter()
                .filter(|other| def.mirrors(other))
                .count();
            if mirrors != 1 {
                return Err(Error::InvalidInput(format!(
                    "edge {} on {}.{} has {} mirrored counterparts, expected 1",
                    def.edge_name, def.type_name, def.field, mirrors
                )));
            }
        }
        Ok(())
    }
}
