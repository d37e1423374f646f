//! Nested create payload expansion.
//!
//! A create payload is `{ data: <object | array>, connections? }`, where any
//! field of a data object that names a declared edge holds another payload
//! of the same shape for the edge's target type. [`ItemGenerator`] walks
//! that tree and flattens it into Node rows plus one adjacency row per
//! parent/child pair.

use serde_json::{Map, Value as Json};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::record::{is_reserved_field, EdgeRecord, Item, NodeRecord, Stamp};
use crate::schema::{Cardinality, EdgeSchema};
use crate::value::Value;

/// Items produced from one payload level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generated {
    /// Every row to write, children before their parents.
    pub items: Vec<Item>,
    /// Ids of the Nodes created directly from this level's `data`.
    pub roots: Vec<String>,
}

impl Generated {
    /// Number of Node rows.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.items.iter().filter(|i| i.as_node().is_some()).count()
    }

    /// Number of adjacency rows.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.items.iter().filter(|i| i.as_edge().is_some()).count()
    }
}

/// Flattens nested create payloads using the edge schema.
#[derive(Debug, Clone)]
pub struct ItemGenerator<'a> {
    schema: &'a EdgeSchema,
    stamp: Stamp,
}

impl<'a> ItemGenerator<'a> {
    /// Creates a generator stamping every row with `stamp`.
    #[must_use]
    pub fn new(schema: &'a EdgeSchema, stamp: Stamp) -> Self {
        Self { schema, stamp }
    }

    /// Expands `data`/`connections` for `type_name`.
    ///
    /// `root_id`, when given, becomes the id of the first top-level Node.
    pub fn generate(
        &self,
        type_name: &str,
        data: Option<&Json>,
        connections: Option<&Json>,
        root_id: Option<&str>,
    ) -> Result<Generated> {
        let generated = self.level(type_name, data, connections, root_id)?;
        debug!(
            type_name,
            nodes = generated.node_count(),
            edges = generated.edge_count(),
            "generated items"
        );
        Ok(generated)
    }

    /// Expands a full payload object (`{ data, connections }`).
    pub fn generate_payload(
        &self,
        type_name: &str,
        payload: &Json,
        root_id: Option<&str>,
    ) -> Result<Generated> {
        match payload {
            Json::Null => Ok(Generated::default()),
            Json::Object(obj) => {
                self.generate(type_name, obj.get("data"), obj.get("connections"), root_id)
            }
            _ => Err(Error::InvalidInput(format!(
                "create payload for {type_name} must be an object"
            ))),
        }
    }

    fn level(
        &self,
        type_name: &str,
        data: Option<&Json>,
        connections: Option<&Json>,
        root_id: Option<&str>,
    ) -> Result<Generated> {
        if connections.is_some_and(|c| !c.is_null()) {
            return Err(Error::NotImplemented(format!(
                "connections on {type_name}: linking to existing nodes is not supported"
            )));
        }

        let mut out = Generated::default();
        let mut forced = root_id;
        for object in extract_data(type_name, data)? {
            let id = forced
                .take()
                .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
            self.node(type_name, id, object, &mut out)?;
        }
        Ok(out)
    }

    fn node(
        &self,
        type_name: &str,
        id: String,
        object: &Map<String, Json>,
        out: &mut Generated,
    ) -> Result<()> {
        let mut node = NodeRecord::new(id.clone(), type_name, self.stamp.clone());

        for (field, value) in object {
            if is_reserved_field(field) {
                return Err(Error::InvalidInput(format!(
                    "field {field} on {type_name} is reserved"
                )));
            }

            let Some(edge) = self.schema.edge_for_field(type_name, field) else {
                if let Some(value) = Value::from_json(value.clone()) {
                    node.fields.insert(field.clone(), value);
                }
                continue;
            };

            let nested = match value {
                Json::Null => continue,
                Json::Object(nested) => nested,
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "edge field {field} on {type_name} expects a nested object"
                    )))
                }
            };
            let children = self.level(
                &edge.field_type,
                nested.get("data"),
                nested.get("connections"),
                None,
            )?;
            if edge.cardinality == Cardinality::One && children.roots.len() > 1 {
                return Err(Error::InvalidInput(format!(
                    "edge field {field} on {type_name} accepts one node, got {}",
                    children.roots.len()
                )));
            }

            for child in &children.roots {
                out.items.push(Item::Edge(EdgeRecord::link(
                    edge,
                    &id,
                    child,
                    self.stamp.clone(),
                )));
            }
            out.items.extend(children.items);
        }

        out.items.push(Item::Node(node));
        out.roots.push(id);
        Ok(())
    }
}

fn extract_data<'j>(type_name: &str, data: Option<&'j Json>) -> Result<Vec<&'j Map<String, Json>>> {
    match data {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(Json::Object(obj)) => Ok(vec![obj]),
        Some(Json::Array(entries)) => entries
            .iter()
            .filter(|entry| !entry.is_null())
            .map(|entry| {
                entry.as_object().ok_or_else(|| {
                    Error::InvalidInput(format!("data entries for {type_name} must be objects"))
                })
            })
            .collect(),
        Some(_) => Err(Error::InvalidInput(format!(
            "data for {type_name} must be an object or an array of objects"
        ))),
    }
}
